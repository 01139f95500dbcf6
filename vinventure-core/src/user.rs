use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use vinventure_shared::pii::Masked;

use crate::identity::IdentityProvider;
use crate::CoreResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Guest,
    WineryAdmin,
    PlatformAdmin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Guest => "GUEST",
            UserRole::WineryAdmin => "WINERY_ADMIN",
            UserRole::PlatformAdmin => "PLATFORM_ADMIN",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "GUEST" => Some(UserRole::Guest),
            "WINERY_ADMIN" => Some(UserRole::WineryAdmin),
            "PLATFORM_ADMIN" => Some(UserRole::PlatformAdmin),
            _ => None,
        }
    }
}

/// A marketplace account, keyed to the external identity that authenticated it.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: Uuid,
    pub provider: IdentityProvider,
    pub external_subject: String,
    pub email: Option<Masked<String>>,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub role: UserRole,
    pub preferences: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Provisioning payload for a user seen for the first time.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub provider: IdentityProvider,
    pub external_subject: String,
    pub email: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub preferences: Option<serde_json::Value>,
}

/// Directory of marketplace accounts.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Look up the account bound to an external identity, provisioning a GUEST
    /// account on first sight.
    async fn find_or_create(&self, new_user: NewUser) -> CoreResult<User>;

    async fn get(&self, id: Uuid) -> CoreResult<Option<User>>;

    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> CoreResult<User>;
}
