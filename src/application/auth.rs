//! Administrator identity, delegated to an external identity provider.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An authenticated administrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminPrincipal {
    pub user_id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl AdminPrincipal {
    /// Identity recorded in audit columns such as `updated_by`.
    pub fn actor_label(&self) -> &str {
        &self.user_id
    }
}

/// Account returned by the provider after a successful signup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminAccount {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("missing credentials")]
    Missing,
    #[error("invalid or expired session")]
    Invalid,
    #[error("identity provider rejected the request: {0}")]
    Rejected(String),
    #[error("identity provider unavailable: {0}")]
    Provider(String),
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolve a bearer token to an administrator.
    async fn verify(&self, token: &str) -> Result<AdminPrincipal, AuthError>;

    /// Create an administrator account.
    async fn create_admin(
        &self,
        email: &str,
        password: &str,
        name: Option<&str>,
    ) -> Result<AdminAccount, AuthError>;
}
