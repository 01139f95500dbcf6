use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Approval lifecycle of a winery listing. Only APPROVED wineries are publicly
/// searchable or bookable against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WineryStatus {
    Pending,
    Approved,
    Rejected,
    Suspended,
}

impl WineryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WineryStatus::Pending => "PENDING",
            WineryStatus::Approved => "APPROVED",
            WineryStatus::Rejected => "REJECTED",
            WineryStatus::Suspended => "SUSPENDED",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "PENDING" => Some(WineryStatus::Pending),
            "APPROVED" => Some(WineryStatus::Approved),
            "REJECTED" => Some(WineryStatus::Rejected),
            "SUSPENDED" => Some(WineryStatus::Suspended),
            _ => None,
        }
    }
}

pub const WINE_TYPES: &[&str] = &["Red", "White", "Rosé", "Sparkling", "Dessert", "Fortified"];

#[derive(Debug, Clone, Serialize)]
pub struct Winery {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub region: String,
    pub country: String,
    pub address: String,
    pub city: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub wine_types: Vec<String>,
    pub sustainable: bool,
    pub featured: bool,
    pub rating: Option<f64>,
    pub status: WineryStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Compact winery view joined onto experiences and bookings.
#[derive(Debug, Clone, Serialize)]
pub struct WinerySummary {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub city: String,
    pub region: String,
    pub rating: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewWinery {
    pub name: String,
    pub description: Option<String>,
    pub region: String,
    pub country: String,
    pub address: String,
    pub city: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    #[serde(default)]
    pub wine_types: Vec<String>,
    #[serde(default)]
    pub sustainable: bool,
}

impl NewWinery {
    /// Listings start in PENDING; required fields mirror the public submission form.
    pub fn validate(&self) -> vinventure_core::CoreResult<()> {
        if self.name.trim().is_empty()
            || self.address.trim().is_empty()
            || self.city.trim().is_empty()
            || self.region.trim().is_empty()
            || self.country.trim().is_empty()
        {
            return Err(vinventure_core::CoreError::ValidationError(
                "Missing required fields".to_string(),
            ));
        }
        Ok(())
    }
}

/// Partial update. `status` and `featured` are honored only for platform admins; owner
/// edits force the listing back to PENDING for re-approval.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WineryUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub wine_types: Option<Vec<String>>,
    pub sustainable: Option<bool>,
    pub featured: Option<bool>,
    pub status: Option<WineryStatus>,
}

impl WineryUpdate {
    /// Strip the moderation-only fields and force re-approval.
    pub fn restricted_to_owner(mut self) -> Self {
        self.featured = None;
        self.status = Some(WineryStatus::Pending);
        self
    }
}
