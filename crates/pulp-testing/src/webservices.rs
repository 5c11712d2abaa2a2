//! Mocked collaborators for webservice tests.
//!
//! [`WebservicesFixture::set_up`] swaps all seven collaborators of a [`Collaborators`]
//! for recording mocks. By default every request is pre-authenticated as
//! [`MOCK_LOGIN`], authorized, and resolves to the `/mock/` path.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use axum::http::StatusCode;

use pulp_webservices::collaborators::Collaborators;
use pulp_webservices::decorators::{ConsumerAuthorizer, PreAuthenticator};
use pulp_webservices::error::{HttpError, HttpErrorFactory};
use pulp_webservices::http::{RequestContext, ResourcePathResolver, UriPathResolver};
use pulp_webservices::managers::{
    InMemoryPrincipalManager, Operation, Principal, PrincipalManager, UserQueryManager,
};

use crate::patch::PatchSet;
use crate::recorder::CallRecorder;

pub const MOCK_URI_ROOT: &str = "/mock";
pub const MOCK_LOGIN: &str = "ws-user";

/// `/mock/<segments...>/`, the path the mocked resolvers hand out.
pub fn mock_uri_path(segments: &[&str]) -> String {
    let mut path = MOCK_URI_ROOT.to_owned();
    for segment in segments {
        path.push('/');
        path.push_str(segment);
    }
    path.push('/');
    path
}

// ── Mocks ────────────────────────────────────────────────────────────────────

pub struct MockPreAuthenticator {
    login: Mutex<Option<String>>,
    pub calls: CallRecorder<String>,
}

impl MockPreAuthenticator {
    pub fn set_login(&self, login: Option<&str>) {
        *self.login.lock().unwrap_or_else(PoisonError::into_inner) = login.map(str::to_owned);
    }
}

impl PreAuthenticator for MockPreAuthenticator {
    fn check_preauthenticated(&self, request: &RequestContext) -> Option<String> {
        self.calls.record(request.path.clone());
        self.login
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

pub struct MockConsumerAuthorizer {
    pub authorized: AtomicBool,
    pub calls: CallRecorder<(String, String, Operation)>,
}

impl ConsumerAuthorizer for MockConsumerAuthorizer {
    fn is_consumer_authorized(
        &self,
        resource: &str,
        consumer_id: &str,
        operation: Operation,
    ) -> bool {
        self.calls
            .record((resource.to_owned(), consumer_id.to_owned(), operation));
        self.authorized.load(Ordering::SeqCst)
    }
}

/// Stands in for both path resolvers.
pub struct MockPathResolver {
    path: Mutex<String>,
    pub calls: CallRecorder<String>,
}

impl MockPathResolver {
    pub fn set_path(&self, path: impl Into<String>) {
        *self.path.lock().unwrap_or_else(PoisonError::into_inner) = path.into();
    }

    fn resolve(&self, request: &RequestContext) -> String {
        self.calls.record(request.path.clone());
        self.path
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ResourcePathResolver for MockPathResolver {
    fn resource_path(&self, request: &RequestContext) -> String {
        self.resolve(request)
    }
}

impl UriPathResolver for MockPathResolver {
    fn uri_path(&self, request: &RequestContext) -> String {
        self.resolve(request)
    }
}

#[derive(Default)]
pub struct MockHttpErrorFactory {
    pub calls: CallRecorder<(StatusCode, String)>,
}

impl HttpErrorFactory for MockHttpErrorFactory {
    fn http_error(&self, status: StatusCode, message: &str) -> HttpError {
        self.calls.record((status, message.to_owned()));
        HttpError {
            status,
            message: message.to_owned(),
        }
    }
}

/// Records principal changes and keeps them like the real manager.
#[derive(Default)]
pub struct MockPrincipalManager {
    inner: InMemoryPrincipalManager,
    pub set_calls: CallRecorder<(String, Principal)>,
    pub clear_calls: CallRecorder<String>,
}

impl PrincipalManager for MockPrincipalManager {
    fn set_principal(&self, request_id: &str, principal: Principal) {
        self.set_calls
            .record((request_id.to_owned(), principal.clone()));
        self.inner.set_principal(request_id, principal);
    }

    fn get_principal(&self, request_id: &str) -> Option<Principal> {
        self.inner.get_principal(request_id)
    }

    fn clear_principal(&self, request_id: &str) {
        self.clear_calls.record(request_id.to_owned());
        self.inner.clear_principal(request_id);
    }
}

pub struct MockUserQueryManager {
    pub superuser: AtomicBool,
    pub authorized: AtomicBool,
    pub is_superuser_calls: CallRecorder<String>,
    pub is_authorized_calls: CallRecorder<(String, String, Operation)>,
}

impl UserQueryManager for MockUserQueryManager {
    fn is_superuser(&self, login: &str) -> bool {
        self.is_superuser_calls.record(login.to_owned());
        self.superuser.load(Ordering::SeqCst)
    }

    fn is_authorized(&self, resource: &str, login: &str, operation: Operation) -> bool {
        self.is_authorized_calls
            .record((resource.to_owned(), login.to_owned(), operation));
        self.authorized.load(Ordering::SeqCst)
    }
}

// ── Fixture ──────────────────────────────────────────────────────────────────

pub struct WebservicesFixture {
    collaborators: Arc<Collaborators>,
    patches: PatchSet,
    pub pre_authenticator: Arc<MockPreAuthenticator>,
    pub consumer_authorizer: Arc<MockConsumerAuthorizer>,
    pub resource_path: Arc<MockPathResolver>,
    pub http_error: Arc<MockHttpErrorFactory>,
    pub principal_manager: Arc<MockPrincipalManager>,
    pub user_query_manager: Arc<MockUserQueryManager>,
    pub uri_path: Arc<MockPathResolver>,
}

impl WebservicesFixture {
    /// Patch every collaborator of `collaborators` with a mock.
    pub fn set_up(collaborators: &Arc<Collaborators>) -> Self {
        let pre_authenticator = Arc::new(MockPreAuthenticator {
            login: Mutex::new(Some(MOCK_LOGIN.to_owned())),
            calls: CallRecorder::default(),
        });
        let consumer_authorizer = Arc::new(MockConsumerAuthorizer {
            authorized: AtomicBool::new(true),
            calls: CallRecorder::default(),
        });
        let resource_path = Arc::new(MockPathResolver {
            path: Mutex::new(mock_uri_path(&[])),
            calls: CallRecorder::default(),
        });
        let http_error = Arc::new(MockHttpErrorFactory::default());
        let principal_manager = Arc::new(MockPrincipalManager::default());
        let user_query_manager = Arc::new(MockUserQueryManager {
            superuser: AtomicBool::new(false),
            authorized: AtomicBool::new(true),
            is_superuser_calls: CallRecorder::default(),
            is_authorized_calls: CallRecorder::default(),
        });
        let uri_path = Arc::new(MockPathResolver {
            path: Mutex::new(mock_uri_path(&[])),
            calls: CallRecorder::default(),
        });

        let mut patches = PatchSet::new();
        let patched: Arc<dyn PreAuthenticator> = pre_authenticator.clone();
        patches.patch("pre_authenticator", collaborators, |c| &c.pre_authenticator, patched);
        let patched: Arc<dyn ConsumerAuthorizer> = consumer_authorizer.clone();
        patches.patch("consumer_authorizer", collaborators, |c| &c.consumer_authorizer, patched);
        let patched: Arc<dyn ResourcePathResolver> = resource_path.clone();
        patches.patch("resource_path", collaborators, |c| &c.resource_path, patched);
        let patched: Arc<dyn HttpErrorFactory> = http_error.clone();
        patches.patch("http_error", collaborators, |c| &c.http_error, patched);
        let patched: Arc<dyn PrincipalManager> = principal_manager.clone();
        patches.patch("principal_manager", collaborators, |c| &c.principal_manager, patched);
        let patched: Arc<dyn UserQueryManager> = user_query_manager.clone();
        patches.patch("user_query_manager", collaborators, |c| &c.user_query_manager, patched);
        let patched: Arc<dyn UriPathResolver> = uri_path.clone();
        patches.patch("uri_path", collaborators, |c| &c.uri_path, patched);

        Self {
            collaborators: Arc::clone(collaborators),
            patches,
            pre_authenticator,
            consumer_authorizer,
            resource_path,
            http_error,
            principal_manager,
            user_query_manager,
            uri_path,
        }
    }

    pub fn collaborators(&self) -> &Arc<Collaborators> {
        &self.collaborators
    }

    /// Put the real collaborators back. Panics after all of them were tried if any failed.
    pub fn tear_down(mut self) {
        let failed = self.patches.stop_all();
        assert!(failed.is_empty(), "failed to stop patches: {failed:?}");
    }

    /// Assert the authorization check ran exactly once, for `operation`.
    #[track_caller]
    pub fn validate_auth(&self, operation: Operation) {
        self.user_query_manager
            .is_authorized_calls
            .assert_called_once_matching(&format!("for {operation}"), |(_, _, op)| {
                *op == operation
            });
    }

    pub fn get_mock_uri_path(&self, segments: &[&str]) -> String {
        mock_uri_path(segments)
    }
}
