use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;
use vinventure_catalog::{Experience, WinerySummary};
use vinventure_core::pagination::PageRequest;
use vinventure_core::CoreResult;

use crate::booking::{Booking, BookingStatus, NewBooking};

/// A booking with its experience and winery joined, as returned by every read path.
#[derive(Debug, Clone, Serialize)]
pub struct BookingDetail {
    #[serde(flatten)]
    pub booking: Booking,
    pub experience: Experience,
    pub winery: WinerySummary,
}

/// Persistence for bookings. Implementations must guarantee that `insert` is atomic
/// with respect to slot exclusivity: two concurrent inserts for the same
/// (experience, date, time slot) may not both succeed while either would hold the
/// slot. The Postgres implementation does this with a partial unique index surfaced as
/// a ConflictError.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn insert(&self, booking: NewBooking) -> CoreResult<BookingDetail>;

    /// Advisory lookup used for an early 409 before paying for the insert. Never a
    /// substitute for the insert-time guarantee.
    async fn find_conflicting(
        &self,
        experience_id: Uuid,
        slot_date: NaiveDate,
        time_slot: &str,
    ) -> CoreResult<Option<Uuid>>;

    async fn get(&self, id: Uuid) -> CoreResult<Option<BookingDetail>>;

    async fn list_by_guest(
        &self,
        guest_id: Uuid,
        status: Option<BookingStatus>,
        page: &PageRequest,
    ) -> CoreResult<(Vec<BookingDetail>, i64)>;

    /// Conditional transition: succeeds only while the stored status is still `from`.
    /// Returns None when the row is gone or the status moved concurrently.
    async fn update_status(
        &self,
        id: Uuid,
        from: BookingStatus,
        to: BookingStatus,
    ) -> CoreResult<Option<BookingDetail>>;
}
