pub mod experience;
pub mod repository;
pub mod search;
pub mod winery;

pub use experience::{Experience, ExperienceType, NewExperience};
pub use repository::{CatalogRepository, ExperienceDetail, ExperienceWithWinery, WineryWithExperiences};
pub use search::{ExperienceFilters, WineryFilters};
pub use winery::{NewWinery, Winery, WineryStatus, WinerySummary, WineryUpdate};
