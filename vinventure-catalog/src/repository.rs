use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;
use vinventure_core::pagination::PageRequest;
use vinventure_core::CoreResult;

use crate::experience::{Experience, NewExperience};
use crate::search::{ExperienceFilters, WineryFilters};
use crate::winery::{NewWinery, Winery, WinerySummary, WineryStatus, WineryUpdate};

/// An experience with its owning winery fully loaded; what the admission service reads.
#[derive(Debug, Clone, Serialize)]
pub struct ExperienceDetail {
    #[serde(flatten)]
    pub experience: Experience,
    pub winery: Winery,
}

/// Search result row: experience plus a compact winery view.
#[derive(Debug, Clone, Serialize)]
pub struct ExperienceWithWinery {
    #[serde(flatten)]
    pub experience: Experience,
    pub winery: WinerySummary,
}

/// Winery detail/search row with its active experiences included.
#[derive(Debug, Clone, Serialize)]
pub struct WineryWithExperiences {
    #[serde(flatten)]
    pub winery: Winery,
    pub experiences: Vec<Experience>,
}

/// Read/write access to the winery + experience catalog. The booking side only ever
/// reads from it.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn get_experience(&self, id: Uuid) -> CoreResult<Option<ExperienceDetail>>;

    async fn search_experiences(
        &self,
        filters: &ExperienceFilters,
        page: &PageRequest,
    ) -> CoreResult<(Vec<ExperienceWithWinery>, i64)>;

    async fn create_experience(
        &self,
        winery_id: Uuid,
        experience: NewExperience,
    ) -> CoreResult<Experience>;

    /// Soft deactivation; bookings keep referencing the row.
    async fn deactivate_experience(&self, id: Uuid) -> CoreResult<Option<Experience>>;

    async fn get_winery(&self, id: Uuid) -> CoreResult<Option<WineryWithExperiences>>;

    async fn find_winery_by_owner(&self, owner_id: Uuid) -> CoreResult<Option<Winery>>;

    async fn search_wineries(
        &self,
        filters: &WineryFilters,
        page: &PageRequest,
    ) -> CoreResult<(Vec<WineryWithExperiences>, i64)>;

    async fn create_winery(&self, owner_id: Uuid, winery: NewWinery) -> CoreResult<Winery>;

    async fn update_winery(&self, id: Uuid, update: WineryUpdate) -> CoreResult<Option<Winery>>;

    async fn set_winery_status(
        &self,
        id: Uuid,
        status: WineryStatus,
    ) -> CoreResult<Option<Winery>>;
}
