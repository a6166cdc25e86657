//! Identity provider implementations.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url, header::AUTHORIZATION};
use serde::Deserialize;
use serde_json::{Value, json};
use subtle::ConstantTimeEq;
use tracing::{debug, warn};

use crate::application::auth::{AdminAccount, AdminPrincipal, AuthError, IdentityProvider};
use crate::infra::error::InfraError;

const TARGET: &str = "vitrine::identity";
const API_KEY_HEADER: &str = "apikey";

#[derive(Debug, Deserialize)]
struct HostedUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    user_metadata: Option<HostedUserMetadata>,
}

#[derive(Debug, Default, Deserialize)]
struct HostedUserMetadata {
    #[serde(default)]
    name: Option<String>,
}

impl HostedUser {
    fn name(&self) -> Option<String> {
        self.user_metadata.as_ref().and_then(|meta| meta.name.clone())
    }
}

/// Client for a hosted auth service exposing `/auth/v1`.
#[derive(Clone, Debug)]
pub struct HostedIdentityProvider {
    client: Client,
    base: Url,
    service_key: String,
}

impl HostedIdentityProvider {
    pub fn new(base_url: &str, service_key: String, timeout: Duration) -> Result<Self, InfraError> {
        let mut base = Url::parse(base_url)
            .map_err(|err| InfraError::identity(format!("invalid base url: {err}")))?;
        // Endpoints are joined relative to the base, so keep any path prefix.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let client = Client::builder()
            .user_agent(Self::user_agent())
            .timeout(timeout)
            .build()
            .map_err(|err| InfraError::identity(err.to_string()))?;
        Ok(Self {
            client,
            base,
            service_key,
        })
    }

    pub fn user_agent() -> &'static str {
        concat!("vitrine/", env!("CARGO_PKG_VERSION"))
    }

    fn url(&self, path: &str) -> Result<Url, AuthError> {
        self.base
            .join(path)
            .map_err(|err| AuthError::Provider(err.to_string()))
    }
}

#[async_trait]
impl IdentityProvider for HostedIdentityProvider {
    async fn verify(&self, token: &str) -> Result<AdminPrincipal, AuthError> {
        if token.trim().is_empty() {
            return Err(AuthError::Missing);
        }

        let response = self
            .client
            .get(self.url("auth/v1/user")?)
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .header(API_KEY_HEADER, &self.service_key)
            .send()
            .await
            .map_err(|err| AuthError::Provider(err.to_string()))?;

        let status = response.status();
        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            debug!(target = TARGET, status = status.as_u16(), "Session rejected");
            return Err(AuthError::Invalid);
        }
        if !status.is_success() {
            warn!(target = TARGET, status = status.as_u16(), "Session lookup failed");
            return Err(AuthError::Provider(format!("status {status}")));
        }

        let user: HostedUser = response
            .json()
            .await
            .map_err(|err| AuthError::Provider(format!("failed to parse user: {err}")))?;
        if user.id.trim().is_empty() {
            return Err(AuthError::Invalid);
        }

        Ok(AdminPrincipal {
            name: user.name(),
            user_id: user.id,
            email: user.email,
        })
    }

    async fn create_admin(
        &self,
        email: &str,
        password: &str,
        name: Option<&str>,
    ) -> Result<AdminAccount, AuthError> {
        let body = json!({
            "email": email,
            "password": password,
            "user_metadata": {"name": name, "role": "admin"},
            "email_confirm": true,
        });

        let response = self
            .client
            .post(self.url("auth/v1/admin/users")?)
            .header(AUTHORIZATION, format!("Bearer {}", self.service_key))
            .header(API_KEY_HEADER, &self.service_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| AuthError::Provider(err.to_string()))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|err| AuthError::Provider(err.to_string()))?;
        if !status.is_success() {
            let message = rejection_message(&bytes).unwrap_or_else(|| format!("status {status}"));
            warn!(target = TARGET, status = status.as_u16(), %message, "Admin signup rejected");
            return Err(AuthError::Rejected(message));
        }

        let user: HostedUser = serde_json::from_slice(&bytes)
            .map_err(|err| AuthError::Provider(format!("failed to parse user: {err}")))?;
        Ok(AdminAccount {
            name: user.name().or_else(|| name.map(str::to_string)),
            email: user.email.clone().unwrap_or_else(|| email.to_string()),
            id: user.id,
        })
    }
}

fn rejection_message(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    ["msg", "message", "error_description", "error"]
        .iter()
        .find_map(|field| value.get(*field).and_then(Value::as_str))
        .map(str::to_string)
}

/// Fixed token table for local runs and tests.
#[derive(Clone, Debug, Default)]
pub struct StaticIdentityProvider {
    tokens: HashMap<String, AdminPrincipal>,
}

impl StaticIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(mut self, token: impl Into<String>, principal: AdminPrincipal) -> Self {
        self.tokens.insert(token.into(), principal);
        self
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn verify(&self, token: &str) -> Result<AdminPrincipal, AuthError> {
        if token.is_empty() {
            return Err(AuthError::Missing);
        }
        let mut matched = None;
        for (candidate, principal) in &self.tokens {
            if bool::from(candidate.as_bytes().ct_eq(token.as_bytes())) {
                matched = Some(principal);
            }
        }
        matched.cloned().ok_or(AuthError::Invalid)
    }

    async fn create_admin(
        &self,
        _email: &str,
        _password: &str,
        _name: Option<&str>,
    ) -> Result<AdminAccount, AuthError> {
        Err(AuthError::Rejected(
            "signup requires a hosted identity provider".to_string(),
        ))
    }
}

/// Used when no provider is configured; nobody can authenticate.
#[derive(Clone, Copy, Debug, Default)]
pub struct DisabledIdentityProvider;

#[async_trait]
impl IdentityProvider for DisabledIdentityProvider {
    async fn verify(&self, _token: &str) -> Result<AdminPrincipal, AuthError> {
        Err(AuthError::Invalid)
    }

    async fn create_admin(
        &self,
        _email: &str,
        _password: &str,
        _name: Option<&str>,
    ) -> Result<AdminAccount, AuthError> {
        Err(AuthError::Rejected(
            "identity provider is not configured".to_string(),
        ))
    }
}
