use serde::Deserialize;
use uuid::Uuid;

use crate::experience::ExperienceType;

fn non_empty(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim().to_string();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    })
}

/// Winery search filters. All set filters combine with AND; `search` is a
/// case-insensitive substring match against name, description and region. Results are
/// ordered featured first, then rating descending, then newest first.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WineryFilters {
    pub search: Option<String>,
    pub region: Option<String>,
    pub wine_type: Option<String>,
    pub sustainable: Option<bool>,
    pub featured: Option<bool>,
}

impl WineryFilters {
    /// Drop blank strings so they do not turn into accidental match-nothing filters.
    pub fn normalized(self) -> Self {
        Self {
            search: non_empty(self.search),
            region: non_empty(self.region),
            wine_type: non_empty(self.wine_type),
            sustainable: self.sustainable,
            featured: self.featured,
        }
    }
}

/// Experience search filters; ranges are inclusive. Results are ordered rating
/// descending, then newest first.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExperienceFilters {
    pub winery_id: Option<Uuid>,
    pub experience_type: Option<ExperienceType>,
    pub min_price_cents: Option<i32>,
    pub max_price_cents: Option<i32>,
    pub min_duration_minutes: Option<i32>,
    pub max_duration_minutes: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_strings_are_dropped() {
        let filters = WineryFilters {
            search: Some("  ".to_string()),
            region: Some(" Douro ".to_string()),
            wine_type: Some(String::new()),
            sustainable: Some(true),
            featured: None,
        }
        .normalized();

        assert_eq!(filters.search, None);
        assert_eq!(filters.region.as_deref(), Some("Douro"));
        assert_eq!(filters.wine_type, None);
        assert_eq!(filters.sustainable, Some(true));
    }
}
