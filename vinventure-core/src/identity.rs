use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::CoreResult;

/// Which external backend authenticated the caller. Admission logic never branches on
/// this; it exists so the user directory can key external subjects per backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IdentityProvider {
    Federated,
    Directory,
}

impl IdentityProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdentityProvider::Federated => "FEDERATED",
            IdentityProvider::Directory => "DIRECTORY",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "FEDERATED" => Some(IdentityProvider::Federated),
            "DIRECTORY" => Some(IdentityProvider::Directory),
            _ => None,
        }
    }
}

/// The outcome of verifying a bearer credential: a stable subject within the issuing
/// backend, plus whatever profile claims the token carried.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalIdentity {
    pub provider: IdentityProvider,
    pub subject: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
}

/// Verifies an opaque bearer credential and extracts the caller's external identity.
/// Two variants exist (federated-login tokens and managed-directory tokens); which one
/// is active is decided once at process bootstrap, never per request.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn resolve(&self, bearer_token: &str) -> CoreResult<ExternalIdentity>;
}

/// Resolver backed by a fixed token table. Used in tests and local tooling where no
/// token-issuing backend is running.
pub struct StaticTokenResolver {
    entries: Vec<(String, ExternalIdentity)>,
}

impl StaticTokenResolver {
    pub fn new(entries: Vec<(String, ExternalIdentity)>) -> Self {
        Self { entries }
    }
}

#[async_trait]
impl IdentityResolver for StaticTokenResolver {
    async fn resolve(&self, bearer_token: &str) -> CoreResult<ExternalIdentity> {
        tracing::debug!("Resolving bearer token against static table");
        self.entries
            .iter()
            .find(|(token, _)| token == bearer_token)
            .map(|(_, identity)| identity.clone())
            .ok_or_else(|| {
                crate::CoreError::AuthenticationError("Unknown bearer token".to_string())
            })
    }
}
