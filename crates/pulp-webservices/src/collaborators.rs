//! Swappable collaborators of the auth decorators and views.

use std::sync::{Arc, PoisonError, RwLock};

use axum::http::HeaderName;

use pulp_config::{ConfigError, ServerConfig};

use crate::decorators::{
    ConsumerAuthorizer, HeaderPreAuthenticator, OwnConsumerAuthorizer, PreAuthenticator,
};
use crate::error::{DefaultHttpErrorFactory, HttpErrorFactory};
use crate::http::{ApiResourcePath, RequestUriPath, ResourcePathResolver, UriPathResolver};
use crate::managers::{
    InMemoryPrincipalManager, PermissionTable, PrincipalManager, UserQueryManager,
};

pub const DEFAULT_USER_HEADER: &str = "x-pulp-remote-user";
pub const DEFAULT_CONSUMER_HEADER: &str = "x-pulp-consumer-id";

/// A shared implementation that can be replaced while the server runs.
pub struct Slot<T: ?Sized> {
    inner: RwLock<Arc<T>>,
}

impl<T: ?Sized> Slot<T> {
    pub fn new(value: Arc<T>) -> Self {
        Self {
            inner: RwLock::new(value),
        }
    }

    pub fn get(&self) -> Arc<T> {
        Arc::clone(&self.inner.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Installs `value` and hands back the implementation it displaced.
    pub fn replace(&self, value: Arc<T>) -> Arc<T> {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, value)
    }
}

pub struct Collaborators {
    pub pre_authenticator: Slot<dyn PreAuthenticator>,
    pub consumer_authorizer: Slot<dyn ConsumerAuthorizer>,
    pub resource_path: Slot<dyn ResourcePathResolver>,
    pub http_error: Slot<dyn HttpErrorFactory>,
    pub principal_manager: Slot<dyn PrincipalManager>,
    pub user_query_manager: Slot<dyn UserQueryManager>,
    pub uri_path: Slot<dyn UriPathResolver>,
    pub consumer_header: HeaderName,
}

impl Collaborators {
    fn build(user_header: HeaderName, consumer_header: HeaderName, superuser: &str) -> Self {
        let pre_authenticator: Arc<dyn PreAuthenticator> =
            Arc::new(HeaderPreAuthenticator::new(user_header));
        let consumer_authorizer: Arc<dyn ConsumerAuthorizer> = Arc::new(OwnConsumerAuthorizer);
        let resource_path: Arc<dyn ResourcePathResolver> = Arc::new(ApiResourcePath);
        let http_error: Arc<dyn HttpErrorFactory> = Arc::new(DefaultHttpErrorFactory);
        let principal_manager: Arc<dyn PrincipalManager> =
            Arc::new(InMemoryPrincipalManager::default());
        let user_query_manager: Arc<dyn UserQueryManager> =
            Arc::new(PermissionTable::new().with_superuser(superuser));
        let uri_path: Arc<dyn UriPathResolver> = Arc::new(RequestUriPath);

        Self {
            pre_authenticator: Slot::new(pre_authenticator),
            consumer_authorizer: Slot::new(consumer_authorizer),
            resource_path: Slot::new(resource_path),
            http_error: Slot::new(http_error),
            principal_manager: Slot::new(principal_manager),
            user_query_manager: Slot::new(user_query_manager),
            uri_path: Slot::new(uri_path),
            consumer_header,
        }
    }

    /// Reads the auth headers and the default login from `[authentication]`/`[server]`.
    pub fn from_config(config: &ServerConfig) -> Result<Self, ConfigError> {
        let user_header = header_option(config, "authentication", "user_header")?;
        let consumer_header = header_option(config, "authentication", "consumer_header")?;
        let superuser = config.settings().require("server", "default_login")?;
        Ok(Self::build(user_header, consumer_header, superuser))
    }
}

impl Default for Collaborators {
    fn default() -> Self {
        Self::build(
            HeaderName::from_static(DEFAULT_USER_HEADER),
            HeaderName::from_static(DEFAULT_CONSUMER_HEADER),
            "admin",
        )
    }
}

fn header_option(
    config: &ServerConfig,
    section: &str,
    key: &str,
) -> Result<HeaderName, ConfigError> {
    let value = config.settings().require(section, key)?;
    HeaderName::try_from(value.to_ascii_lowercase()).map_err(|_| ConfigError::InvalidValue {
        section: section.to_owned(),
        key: key.to_owned(),
        value: value.to_owned(),
    })
}
