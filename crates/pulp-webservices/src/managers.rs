//! Principal and user-query managers used by the auth decorators.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};

/// Operations a permission can grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
    Execute,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Read => "READ",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::Execute => "EXECUTE",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who a request is acting as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    User(String),
    Consumer(String),
}

/// Tracks the principal of each in-flight request, keyed by request id.
pub trait PrincipalManager: Send + Sync {
    fn set_principal(&self, request_id: &str, principal: Principal);
    fn get_principal(&self, request_id: &str) -> Option<Principal>;
    fn clear_principal(&self, request_id: &str);
}

#[derive(Debug, Default)]
pub struct InMemoryPrincipalManager {
    principals: Mutex<HashMap<String, Principal>>,
}

impl PrincipalManager for InMemoryPrincipalManager {
    fn set_principal(&self, request_id: &str, principal: Principal) {
        self.principals
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(request_id.to_owned(), principal);
    }

    fn get_principal(&self, request_id: &str) -> Option<Principal> {
        self.principals
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(request_id)
            .cloned()
    }

    fn clear_principal(&self, request_id: &str) {
        self.principals
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(request_id);
    }
}

/// Answers permission questions about users.
pub trait UserQueryManager: Send + Sync {
    fn is_superuser(&self, login: &str) -> bool;
    fn is_authorized(&self, resource: &str, login: &str, operation: Operation) -> bool;
}

#[derive(Debug, Clone)]
struct Grant {
    login: String,
    resource: String,
    operations: Vec<Operation>,
}

/// Static permission table. A grant on a resource covers everything below it.
#[derive(Debug, Clone, Default)]
pub struct PermissionTable {
    superusers: HashSet<String>,
    grants: Vec<Grant>,
}

impl PermissionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_superuser(mut self, login: impl Into<String>) -> Self {
        self.superusers.insert(login.into());
        self
    }

    pub fn grant(
        mut self,
        login: impl Into<String>,
        resource: impl Into<String>,
        operations: &[Operation],
    ) -> Self {
        self.grants.push(Grant {
            login: login.into(),
            resource: resource.into(),
            operations: operations.to_vec(),
        });
        self
    }
}

impl UserQueryManager for PermissionTable {
    fn is_superuser(&self, login: &str) -> bool {
        self.superusers.contains(login)
    }

    fn is_authorized(&self, resource: &str, login: &str, operation: Operation) -> bool {
        self.is_superuser(login)
            || self.grants.iter().any(|g| {
                g.login == login
                    && resource.starts_with(&g.resource)
                    && g.operations.contains(&operation)
            })
    }
}
