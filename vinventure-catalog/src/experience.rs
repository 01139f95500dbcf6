use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use vinventure_core::{CoreError, CoreResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExperienceType {
    Tasting,
    Tour,
    VirtualEvent,
    PrivateEvent,
}

impl ExperienceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExperienceType::Tasting => "TASTING",
            ExperienceType::Tour => "TOUR",
            ExperienceType::VirtualEvent => "VIRTUAL_EVENT",
            ExperienceType::PrivateEvent => "PRIVATE_EVENT",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "TASTING" => Some(ExperienceType::Tasting),
            "TOUR" => Some(ExperienceType::Tour),
            "VIRTUAL_EVENT" => Some(ExperienceType::VirtualEvent),
            "PRIVATE_EVENT" => Some(ExperienceType::PrivateEvent),
            _ => None,
        }
    }
}

/// A bookable offering of a winery. Prices are integer minor units; deactivation is a
/// soft flag because bookings keep referencing the row.
#[derive(Debug, Clone, Serialize)]
pub struct Experience {
    pub id: Uuid,
    pub winery_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub experience_type: ExperienceType,
    pub price_cents: i32,
    pub duration_minutes: i32,
    pub max_guests: i32,
    pub rating: Option<f64>,
    pub is_active: bool,
    pub available_time_slots: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Experience {
    pub fn is_bookable(&self) -> bool {
        self.is_active
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewExperience {
    pub title: String,
    pub description: Option<String>,
    pub experience_type: ExperienceType,
    pub price_cents: i32,
    pub duration_minutes: i32,
    pub max_guests: i32,
    #[serde(default)]
    pub available_time_slots: Vec<String>,
}

impl NewExperience {
    pub fn validate(&self) -> CoreResult<()> {
        if self.title.trim().is_empty() {
            return Err(CoreError::ValidationError("Title is required".to_string()));
        }
        if self.price_cents < 0 {
            return Err(CoreError::ValidationError(
                "Price must not be negative".to_string(),
            ));
        }
        if self.max_guests < 1 {
            return Err(CoreError::ValidationError(
                "Guest capacity must be at least 1".to_string(),
            ));
        }
        if self.duration_minutes < 1 {
            return Err(CoreError::ValidationError(
                "Duration must be at least one minute".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tasting() -> NewExperience {
        NewExperience {
            title: "Estate Tasting".to_string(),
            description: None,
            experience_type: ExperienceType::Tasting,
            price_cents: 4500,
            duration_minutes: 90,
            max_guests: 8,
            available_time_slots: vec!["10:00".to_string(), "14:00".to_string()],
        }
    }

    #[test]
    fn valid_experience_passes() {
        assert!(tasting().validate().is_ok());
    }

    #[test]
    fn invariants_are_enforced() {
        let mut exp = tasting();
        exp.price_cents = -1;
        assert!(exp.validate().is_err());

        let mut exp = tasting();
        exp.max_guests = 0;
        assert!(exp.validate().is_err());

        let mut exp = tasting();
        exp.title = "  ".to_string();
        assert!(exp.validate().is_err());
    }

    #[test]
    fn type_round_trips_through_text() {
        for t in [
            ExperienceType::Tasting,
            ExperienceType::Tour,
            ExperienceType::VirtualEvent,
            ExperienceType::PrivateEvent,
        ] {
            assert_eq!(ExperienceType::parse(t.as_str()), Some(t));
        }
    }
}
