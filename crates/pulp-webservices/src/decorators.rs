//! Authentication and authorization checks run by the views.

use std::sync::Arc;

use axum::http::{HeaderName, StatusCode};

use crate::collaborators::Collaborators;
use crate::error::HttpError;
use crate::http::RequestContext;
use crate::managers::{Operation, Principal, PrincipalManager};

/// Recognizes requests already authenticated by a fronting proxy.
pub trait PreAuthenticator: Send + Sync {
    fn check_preauthenticated(&self, request: &RequestContext) -> Option<String>;
}

/// Trusts the login placed in a configured header.
#[derive(Debug, Clone)]
pub struct HeaderPreAuthenticator {
    header: HeaderName,
}

impl HeaderPreAuthenticator {
    pub fn new(header: HeaderName) -> Self {
        Self { header }
    }
}

impl PreAuthenticator for HeaderPreAuthenticator {
    fn check_preauthenticated(&self, request: &RequestContext) -> Option<String> {
        request
            .header(&self.header)
            .map(str::trim)
            .filter(|login| !login.is_empty())
            .map(str::to_owned)
    }
}

/// Decides what a consumer may touch.
pub trait ConsumerAuthorizer: Send + Sync {
    fn is_consumer_authorized(
        &self,
        resource: &str,
        consumer_id: &str,
        operation: Operation,
    ) -> bool;
}

/// Consumers may only act on their own `/v2/consumers/<id>/` subtree.
#[derive(Debug, Clone, Copy, Default)]
pub struct OwnConsumerAuthorizer;

impl ConsumerAuthorizer for OwnConsumerAuthorizer {
    fn is_consumer_authorized(
        &self,
        resource: &str,
        consumer_id: &str,
        _operation: Operation,
    ) -> bool {
        let own = format!("/v2/consumers/{consumer_id}/");
        resource.starts_with(&own)
    }
}

/// Keeps the request's principal registered until dropped.
#[must_use]
pub struct PrincipalScope {
    manager: Arc<dyn PrincipalManager>,
    request_id: String,
    principal: Principal,
}

impl PrincipalScope {
    fn enter(manager: Arc<dyn PrincipalManager>, request_id: &str, principal: Principal) -> Self {
        manager.set_principal(request_id, principal.clone());
        Self {
            manager,
            request_id: request_id.to_owned(),
            principal,
        }
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }
}

impl Drop for PrincipalScope {
    fn drop(&mut self) {
        self.manager.clear_principal(&self.request_id);
    }
}

/// Checks that the caller may perform `operation` on the requested resource.
///
/// A pre-authenticated user is checked against the user query manager. Without
/// one, a consumer id header is checked against the consumer authorizer.
/// Neither present is a 401; a refused check is a 403.
pub fn auth_required(
    collaborators: &Collaborators,
    request: &RequestContext,
    operation: Operation,
) -> Result<PrincipalScope, HttpError> {
    let errors = collaborators.http_error.get();
    let resource = collaborators.resource_path.get().resource_path(request);

    let principal = if let Some(login) = collaborators
        .pre_authenticator
        .get()
        .check_preauthenticated(request)
    {
        let users = collaborators.user_query_manager.get();
        if !users.is_authorized(&resource, &login, operation) {
            tracing::debug!(%login, %resource, %operation, "user not authorized");
            return Err(errors.http_error(
                StatusCode::FORBIDDEN,
                &format!("{login} is not authorized to {operation} {resource}"),
            ));
        }
        Principal::User(login)
    } else if let Some(consumer_id) = request.header(&collaborators.consumer_header) {
        let consumers = collaborators.consumer_authorizer.get();
        if !consumers.is_consumer_authorized(&resource, consumer_id, operation) {
            tracing::debug!(%consumer_id, %resource, %operation, "consumer not authorized");
            return Err(errors.http_error(
                StatusCode::FORBIDDEN,
                &format!("consumer {consumer_id} is not authorized to {operation} {resource}"),
            ));
        }
        Principal::Consumer(consumer_id.to_owned())
    } else {
        return Err(errors.http_error(StatusCode::UNAUTHORIZED, "authentication required"));
    };

    Ok(PrincipalScope::enter(
        collaborators.principal_manager.get(),
        &request.request_id,
        principal,
    ))
}

pub fn super_user_required(
    collaborators: &Collaborators,
    request: &RequestContext,
) -> Result<PrincipalScope, HttpError> {
    let errors = collaborators.http_error.get();
    let Some(login) = collaborators
        .pre_authenticator
        .get()
        .check_preauthenticated(request)
    else {
        return Err(errors.http_error(StatusCode::UNAUTHORIZED, "authentication required"));
    };
    if !collaborators.user_query_manager.get().is_superuser(&login) {
        return Err(errors.http_error(
            StatusCode::FORBIDDEN,
            &format!("{login} is not a super user"),
        ));
    }
    Ok(PrincipalScope::enter(
        collaborators.principal_manager.get(),
        &request.request_id,
        Principal::User(login),
    ))
}
