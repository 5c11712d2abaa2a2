//! Request context and path resolution.

use std::convert::Infallible;

use axum::Router;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, Request};
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use uuid::Uuid;

/// Mount point of the REST API.
pub const API_PREFIX: &str = "/pulp/api";

/// Header carrying the id principals are recorded under.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Gives a request with no `x-request-id` a fresh UUID.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrincipalRequestId;

impl MakeRequestId for PrincipalRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::try_from(Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Assign request ids on the way in and echo them on the response, so a caller can match
/// a reply to the principal recorded for it.
pub fn with_request_ids<S>(router: Router<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let header = HeaderName::from_static(REQUEST_ID_HEADER);
    router
        .layer(PropagateRequestIdLayer::new(header.clone()))
        .layer(SetRequestIdLayer::new(header, PrincipalRequestId))
}

/// What the auth decorators and path resolvers need from a request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    pub request_id: String,
}

impl RequestContext {
    /// Context with no headers and a fresh request id.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HeaderMap::new(),
            request_id: Uuid::new_v4().to_string(),
        }
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn header(&self, name: &HeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    // Values are copied out synchronously so the returned future does not borrow `parts`.
    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let request_id = parts
            .extensions
            .get::<RequestId>()
            .map(RequestId::header_value)
            .or_else(|| parts.headers.get(REQUEST_ID_HEADER))
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let context = Self {
            method: parts.method.clone(),
            path: parts.uri.path().to_owned(),
            headers: parts.headers.clone(),
            request_id,
        };
        async move { Ok(context) }
    }
}

/// Path of the requested resource, relative to the API mount point.
pub trait ResourcePathResolver: Send + Sync {
    fn resource_path(&self, request: &RequestContext) -> String;
}

/// Full URI path of the request, used to build `_href` values.
pub trait UriPathResolver: Send + Sync {
    fn uri_path(&self, request: &RequestContext) -> String;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ApiResourcePath;

impl ResourcePathResolver for ApiResourcePath {
    fn resource_path(&self, request: &RequestContext) -> String {
        let path = request
            .path
            .strip_prefix(API_PREFIX)
            .unwrap_or(&request.path);
        with_trailing_slash(path)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RequestUriPath;

impl UriPathResolver for RequestUriPath {
    fn uri_path(&self, request: &RequestContext) -> String {
        with_trailing_slash(&request.path)
    }
}

/// `base` with `segment/` appended.
pub fn extend_uri_path(base: &str, segment: &str) -> String {
    format!("{}/{}/", base.trim_end_matches('/'), segment)
}

fn with_trailing_slash(path: &str) -> String {
    if path.ends_with('/') {
        path.to_owned()
    } else {
        format!("{path}/")
    }
}
