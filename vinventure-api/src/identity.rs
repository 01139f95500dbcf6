use async_trait::async_trait;
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use vinventure_core::identity::{ExternalIdentity, IdentityProvider, IdentityResolver};
use vinventure_core::{CoreError, CoreResult};

// ============================================================================
// Federated login provider (social/federated sign-in tokens)
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct FederatedClaims {
    pub sub: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub exp: usize,
}

/// Verifies tokens minted by the federated login provider. The subject claim is the
/// stable external identifier.
pub struct FederatedTokenResolver {
    secret: String,
}

impl FederatedTokenResolver {
    pub fn new(secret: String) -> Self {
        Self { secret }
    }
}

#[async_trait]
impl IdentityResolver for FederatedTokenResolver {
    async fn resolve(&self, bearer_token: &str) -> CoreResult<ExternalIdentity> {
        let token_data = decode::<FederatedClaims>(
            bearer_token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| CoreError::AuthenticationError(e.to_string()))?;

        let claims = token_data.claims;
        Ok(ExternalIdentity {
            provider: IdentityProvider::Federated,
            subject: claims.sub,
            email: claims.email,
            display_name: claims.name,
        })
    }
}

// ============================================================================
// Managed user-directory provider
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct DirectoryClaims {
    pub username: String,
    pub email: Option<String>,
    pub iss: String,
    pub exp: usize,
}

/// Verifies access tokens issued by the managed user directory. The directory pins its
/// issuer and identifies accounts by username rather than a `sub` claim.
pub struct DirectoryTokenResolver {
    secret: String,
    issuer: String,
}

impl DirectoryTokenResolver {
    pub fn new(secret: String, issuer: String) -> Self {
        Self { secret, issuer }
    }
}

#[async_trait]
impl IdentityResolver for DirectoryTokenResolver {
    async fn resolve(&self, bearer_token: &str) -> CoreResult<ExternalIdentity> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.issuer]);

        let token_data = decode::<DirectoryClaims>(
            bearer_token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| CoreError::AuthenticationError(e.to_string()))?;

        let claims = token_data.claims;
        Ok(ExternalIdentity {
            provider: IdentityProvider::Directory,
            subject: claims.username,
            email: claims.email,
            display_name: None,
        })
    }
}
