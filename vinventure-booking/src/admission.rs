use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;
use vinventure_catalog::CatalogRepository;
use vinventure_core::authz;
use vinventure_core::pagination::{PageRequest, Pagination};
use vinventure_core::user::User;
use vinventure_core::{CoreError, CoreResult};

use crate::booking::{BookingStatus, NewBooking};
use crate::repository::{BookingDetail, BookingRepository};

/// A guest's booking submission. Required fields are optional here so that a missing
/// field surfaces as a ValidationError instead of a body-deserialization rejection.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub experience_id: Option<Uuid>,
    pub date: Option<NaiveDate>,
    pub time_slot: Option<String>,
    pub guests: Option<i32>,
    pub special_requests: Option<String>,
    pub contact_info: Option<serde_json::Value>,
}

/// Winery-side verdict on a pending booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingDecision {
    Confirm,
    Reject,
}

#[derive(Debug, Clone)]
pub struct AdmissionConfig {
    /// Upper bound on one admission attempt. Timeouts are transient: the slot index
    /// makes a retry safe.
    pub timeout: Duration,
    pub default_page_limit: u32,
    pub max_page_limit: u32,
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            default_page_limit: 20,
            max_page_limit: 100,
        }
    }
}

/// Decides whether a booking request may be accepted and persists it. The catalog is
/// read-only from here; the booking store is the only shared mutable resource, and the
/// slot-exclusivity race is closed at insert time by the store, not by any lock held
/// across the validate steps.
pub struct AdmissionService {
    catalog: Arc<dyn CatalogRepository>,
    bookings: Arc<dyn BookingRepository>,
    config: AdmissionConfig,
}

impl AdmissionService {
    pub fn new(
        catalog: Arc<dyn CatalogRepository>,
        bookings: Arc<dyn BookingRepository>,
        config: AdmissionConfig,
    ) -> Self {
        Self {
            catalog,
            bookings,
            config,
        }
    }

    pub async fn submit(&self, guest_id: Uuid, request: BookingRequest) -> CoreResult<BookingDetail> {
        tokio::time::timeout(self.config.timeout, self.submit_inner(guest_id, request))
            .await
            .map_err(|_| CoreError::InternalError("Admission timed out".to_string()))?
    }

    async fn submit_inner(
        &self,
        guest_id: Uuid,
        request: BookingRequest,
    ) -> CoreResult<BookingDetail> {
        let experience_id = request
            .experience_id
            .ok_or_else(|| CoreError::ValidationError("experienceId is required".to_string()))?;
        let slot_date = request
            .date
            .ok_or_else(|| CoreError::ValidationError("date is required".to_string()))?;
        let time_slot = request
            .time_slot
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .ok_or_else(|| CoreError::ValidationError("timeSlot is required".to_string()))?;
        let guests = request
            .guests
            .ok_or_else(|| CoreError::ValidationError("guests is required".to_string()))?;
        if guests < 1 {
            return Err(CoreError::ValidationError(
                "guests must be a positive integer".to_string(),
            ));
        }

        let detail = self
            .catalog
            .get_experience(experience_id)
            .await?
            .ok_or_else(|| CoreError::NotFoundError("Experience not found".to_string()))?;
        if !detail.experience.is_bookable() {
            return Err(CoreError::InactiveResourceError(
                "Experience is not open for booking".to_string(),
            ));
        }
        if guests > detail.experience.max_guests {
            return Err(CoreError::CapacityError(format!(
                "Too many guests for this experience (max {})",
                detail.experience.max_guests
            )));
        }

        // Advisory pre-check: answer the common case with a 409 before paying for an
        // insert. The authoritative check is the store's active-slot unique index.
        if self
            .bookings
            .find_conflicting(experience_id, slot_date, &time_slot)
            .await?
            .is_some()
        {
            return Err(CoreError::ConflictError(
                "Time slot already booked".to_string(),
            ));
        }

        let total_amount_cents = detail.experience.price_cents as i64 * guests as i64;

        let created = self
            .bookings
            .insert(NewBooking {
                guest_id,
                experience_id,
                slot_date,
                time_slot,
                guests,
                total_amount_cents,
                special_requests: request.special_requests,
                contact_info: request.contact_info.unwrap_or_else(|| serde_json::json!({})),
            })
            .await?;

        tracing::info!("Booking admitted: {}", created.booking.id);
        Ok(created)
    }

    /// The guest's own bookings, newest first, with pagination metadata.
    pub async fn list(
        &self,
        guest_id: Uuid,
        status: Option<String>,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> CoreResult<(Vec<BookingDetail>, Pagination)> {
        let status = match status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => Some(BookingStatus::parse(&raw.to_uppercase()).ok_or_else(|| {
                CoreError::ValidationError(format!("Unknown status filter: {}", raw))
            })?),
            None => None,
        };
        let page = PageRequest::new(
            page,
            limit,
            self.config.default_page_limit,
            self.config.max_page_limit,
        );
        let (bookings, total) = self.bookings.list_by_guest(guest_id, status, &page).await?;
        Ok((bookings, Pagination::new(total, &page)))
    }

    pub async fn get_owned(&self, actor: &User, booking_id: Uuid) -> CoreResult<BookingDetail> {
        let detail = self
            .bookings
            .get(booking_id)
            .await?
            .ok_or_else(|| CoreError::NotFoundError("Booking not found".to_string()))?;
        authz::require_owner(actor, detail.booking.guest_id, "Booking")?;
        Ok(detail)
    }

    /// Guest-side cancellation of their own booking.
    pub async fn cancel(&self, actor: &User, booking_id: Uuid) -> CoreResult<BookingDetail> {
        let detail = self
            .bookings
            .get(booking_id)
            .await?
            .ok_or_else(|| CoreError::NotFoundError("Booking not found".to_string()))?;
        authz::require_owner(actor, detail.booking.guest_id, "Booking")?;

        let current = detail.booking.status;
        if !current.can_transition_to(BookingStatus::Cancelled) {
            return Err(CoreError::ValidationError(format!(
                "Cannot cancel a {} booking",
                current.as_str()
            )));
        }
        self.bookings
            .update_status(booking_id, current, BookingStatus::Cancelled)
            .await?
            .ok_or_else(|| CoreError::ConflictError("Booking changed concurrently".to_string()))
    }

    /// Winery-side confirm/reject of a pending booking for one of its experiences.
    pub async fn decide(
        &self,
        actor: &User,
        booking_id: Uuid,
        decision: BookingDecision,
    ) -> CoreResult<BookingDetail> {
        let detail = self
            .bookings
            .get(booking_id)
            .await?
            .ok_or_else(|| CoreError::NotFoundError("Booking not found".to_string()))?;
        authz::require_winery_manager(actor, detail.winery.owner_id)?;

        let target = match decision {
            BookingDecision::Confirm => BookingStatus::Confirmed,
            BookingDecision::Reject => BookingStatus::Rejected,
        };
        let current = detail.booking.status;
        if !current.can_transition_to(target) {
            return Err(CoreError::ValidationError(format!(
                "Cannot move a {} booking to {}",
                current.as_str(),
                target.as_str()
            )));
        }
        self.bookings
            .update_status(booking_id, current, target)
            .await?
            .ok_or_else(|| CoreError::ConflictError("Booking changed concurrently".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::Booking;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use std::collections::HashMap;
    use std::sync::Mutex;
    use vinventure_catalog::{
        Experience, ExperienceDetail, ExperienceFilters, ExperienceType, ExperienceWithWinery,
        NewExperience, NewWinery, Winery, WineryFilters, WineryStatus, WinerySummary,
        WineryUpdate, WineryWithExperiences,
    };
    use vinventure_core::identity::IdentityProvider;
    use vinventure_core::user::UserRole;
    use vinventure_shared::pii::Masked;

    fn winery(owner_id: Uuid) -> Winery {
        let now = Utc::now();
        Winery {
            id: Uuid::new_v4(),
            owner_id,
            name: "Quinta Alta".to_string(),
            description: None,
            region: "Douro".to_string(),
            country: "Portugal".to_string(),
            address: "Estrada N222".to_string(),
            city: "Pinhão".to_string(),
            email: None,
            phone: None,
            website: None,
            wine_types: vec!["Red".to_string()],
            sustainable: true,
            featured: false,
            rating: Some(4.7),
            status: WineryStatus::Approved,
            created_at: now,
            updated_at: now,
        }
    }

    fn experience_detail(
        owner_id: Uuid,
        price_cents: i32,
        max_guests: i32,
        is_active: bool,
    ) -> ExperienceDetail {
        let winery = winery(owner_id);
        let now = Utc::now();
        ExperienceDetail {
            experience: Experience {
                id: Uuid::new_v4(),
                winery_id: winery.id,
                title: "Estate Tasting".to_string(),
                description: None,
                experience_type: ExperienceType::Tasting,
                price_cents,
                duration_minutes: 90,
                max_guests,
                rating: None,
                is_active,
                available_time_slots: vec!["10:00".to_string()],
                created_at: now,
                updated_at: now,
            },
            winery,
        }
    }

    fn user(id: Uuid, role: UserRole) -> User {
        User {
            id,
            provider: IdentityProvider::Federated,
            external_subject: id.to_string(),
            email: None,
            name: None,
            phone: None,
            role,
            preferences: serde_json::json!({}),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn request(experience_id: Uuid, date: &str, time_slot: &str, guests: i32) -> BookingRequest {
        BookingRequest {
            experience_id: Some(experience_id),
            date: Some(date.parse().unwrap()),
            time_slot: Some(time_slot.to_string()),
            guests: Some(guests),
            special_requests: None,
            contact_info: None,
        }
    }

    struct MemCatalog {
        experiences: HashMap<Uuid, ExperienceDetail>,
    }

    impl MemCatalog {
        fn with(details: Vec<ExperienceDetail>) -> Self {
            Self {
                experiences: details
                    .into_iter()
                    .map(|d| (d.experience.id, d))
                    .collect(),
            }
        }
    }

    #[async_trait]
    impl CatalogRepository for MemCatalog {
        async fn get_experience(&self, id: Uuid) -> CoreResult<Option<ExperienceDetail>> {
            Ok(self.experiences.get(&id).cloned())
        }

        async fn search_experiences(
            &self,
            _filters: &ExperienceFilters,
            _page: &PageRequest,
        ) -> CoreResult<(Vec<ExperienceWithWinery>, i64)> {
            unimplemented!()
        }

        async fn create_experience(
            &self,
            _winery_id: Uuid,
            _experience: NewExperience,
        ) -> CoreResult<Experience> {
            unimplemented!()
        }

        async fn deactivate_experience(&self, _id: Uuid) -> CoreResult<Option<Experience>> {
            unimplemented!()
        }

        async fn get_winery(&self, _id: Uuid) -> CoreResult<Option<WineryWithExperiences>> {
            unimplemented!()
        }

        async fn find_winery_by_owner(&self, _owner_id: Uuid) -> CoreResult<Option<Winery>> {
            unimplemented!()
        }

        async fn search_wineries(
            &self,
            _filters: &WineryFilters,
            _page: &PageRequest,
        ) -> CoreResult<(Vec<WineryWithExperiences>, i64)> {
            unimplemented!()
        }

        async fn create_winery(&self, _owner_id: Uuid, _winery: NewWinery) -> CoreResult<Winery> {
            unimplemented!()
        }

        async fn update_winery(
            &self,
            _id: Uuid,
            _update: WineryUpdate,
        ) -> CoreResult<Option<Winery>> {
            unimplemented!()
        }

        async fn set_winery_status(
            &self,
            _id: Uuid,
            _status: WineryStatus,
        ) -> CoreResult<Option<Winery>> {
            unimplemented!()
        }
    }

    /// In-memory booking store. Insert checks slot exclusivity under one lock, which is
    /// the same guarantee the partial unique index gives the Postgres implementation.
    struct MemBookings {
        catalog: HashMap<Uuid, ExperienceDetail>,
        rows: Mutex<(Vec<BookingDetail>, i64)>,
    }

    impl MemBookings {
        fn with(details: Vec<ExperienceDetail>) -> Self {
            Self {
                catalog: details
                    .into_iter()
                    .map(|d| (d.experience.id, d))
                    .collect(),
                rows: Mutex::new((Vec::new(), 0)),
            }
        }

        fn count(&self) -> usize {
            self.rows.lock().unwrap().0.len()
        }

        fn seed(&self, booking: NewBooking, status: BookingStatus) {
            let detail = self.build_detail(&booking, status, 0);
            self.rows.lock().unwrap().0.push(detail);
        }

        fn build_detail(&self, booking: &NewBooking, status: BookingStatus, seq: i64) -> BookingDetail {
            let exp = self.catalog.get(&booking.experience_id).unwrap();
            let created_at = Utc.timestamp_opt(1_700_000_000 + seq, 0).unwrap();
            BookingDetail {
                booking: Booking {
                    id: Uuid::new_v4(),
                    guest_id: booking.guest_id,
                    experience_id: booking.experience_id,
                    slot_date: booking.slot_date,
                    time_slot: booking.time_slot.clone(),
                    guests: booking.guests,
                    total_amount_cents: booking.total_amount_cents,
                    status,
                    special_requests: booking.special_requests.clone(),
                    contact_info: Masked(booking.contact_info.clone()),
                    created_at,
                    updated_at: created_at,
                },
                experience: exp.experience.clone(),
                winery: WinerySummary {
                    id: exp.winery.id,
                    owner_id: exp.winery.owner_id,
                    name: exp.winery.name.clone(),
                    city: exp.winery.city.clone(),
                    region: exp.winery.region.clone(),
                    rating: exp.winery.rating,
                },
            }
        }
    }

    #[async_trait]
    impl BookingRepository for MemBookings {
        async fn insert(&self, booking: NewBooking) -> CoreResult<BookingDetail> {
            let mut guard = self.rows.lock().unwrap();
            let taken = guard.0.iter().any(|b| {
                b.booking.experience_id == booking.experience_id
                    && b.booking.slot_date == booking.slot_date
                    && b.booking.time_slot == booking.time_slot
                    && b.booking.status.holds_slot()
            });
            if taken {
                return Err(CoreError::ConflictError(
                    "Time slot already booked".to_string(),
                ));
            }
            guard.1 += 1;
            let seq = guard.1;
            let detail = self.build_detail(&booking, BookingStatus::Pending, seq);
            guard.0.push(detail.clone());
            Ok(detail)
        }

        async fn find_conflicting(
            &self,
            experience_id: Uuid,
            slot_date: NaiveDate,
            time_slot: &str,
        ) -> CoreResult<Option<Uuid>> {
            let guard = self.rows.lock().unwrap();
            Ok(guard
                .0
                .iter()
                .find(|b| {
                    b.booking.experience_id == experience_id
                        && b.booking.slot_date == slot_date
                        && b.booking.time_slot == time_slot
                        && b.booking.status.holds_slot()
                })
                .map(|b| b.booking.id))
        }

        async fn get(&self, id: Uuid) -> CoreResult<Option<BookingDetail>> {
            let guard = self.rows.lock().unwrap();
            Ok(guard.0.iter().find(|b| b.booking.id == id).cloned())
        }

        async fn list_by_guest(
            &self,
            guest_id: Uuid,
            status: Option<BookingStatus>,
            page: &PageRequest,
        ) -> CoreResult<(Vec<BookingDetail>, i64)> {
            let guard = self.rows.lock().unwrap();
            let mut rows: Vec<BookingDetail> = guard
                .0
                .iter()
                .filter(|b| b.booking.guest_id == guest_id)
                .filter(|b| status.map_or(true, |s| b.booking.status == s))
                .cloned()
                .collect();
            rows.sort_by(|a, b| b.booking.created_at.cmp(&a.booking.created_at));
            let total = rows.len() as i64;
            let rows = rows
                .into_iter()
                .skip(page.offset() as usize)
                .take(page.limit() as usize)
                .collect();
            Ok((rows, total))
        }

        async fn update_status(
            &self,
            id: Uuid,
            from: BookingStatus,
            to: BookingStatus,
        ) -> CoreResult<Option<BookingDetail>> {
            let mut guard = self.rows.lock().unwrap();
            for row in guard.0.iter_mut() {
                if row.booking.id == id && row.booking.status == from {
                    row.booking.status = to;
                    row.booking.updated_at = Utc::now();
                    return Ok(Some(row.clone()));
                }
            }
            Ok(None)
        }
    }

    fn service(details: Vec<ExperienceDetail>) -> (Arc<AdmissionService>, Arc<MemBookings>) {
        let catalog = Arc::new(MemCatalog::with(details.clone()));
        let bookings = Arc::new(MemBookings::with(details));
        let service = Arc::new(AdmissionService::new(
            catalog,
            bookings.clone(),
            AdmissionConfig::default(),
        ));
        (service, bookings)
    }

    #[tokio::test]
    async fn valid_request_creates_pending_booking_with_flat_price() {
        let owner = Uuid::new_v4();
        let detail = experience_detail(owner, 4500, 8, true);
        let experience_id = detail.experience.id;
        let (service, store) = service(vec![detail]);

        let created = service
            .submit(Uuid::new_v4(), request(experience_id, "2024-06-01", "10:00", 4))
            .await
            .unwrap();

        assert_eq!(created.booking.status, BookingStatus::Pending);
        assert_eq!(created.booking.total_amount_cents, 18_000);
        assert_eq!(created.winery.name, "Quinta Alta");
        assert_eq!(store.count(), 1);
    }

    #[tokio::test]
    async fn capacity_violation_writes_nothing() {
        let detail = experience_detail(Uuid::new_v4(), 4500, 8, true);
        let experience_id = detail.experience.id;
        let (service, store) = service(vec![detail]);

        let err = service
            .submit(Uuid::new_v4(), request(experience_id, "2024-06-01", "10:00", 9))
            .await
            .unwrap_err();

        assert!(matches!(err, CoreError::CapacityError(_)));
        assert_eq!(store.count(), 0);
    }

    #[tokio::test]
    async fn inactive_experience_is_not_bookable() {
        let detail = experience_detail(Uuid::new_v4(), 4500, 8, false);
        let experience_id = detail.experience.id;
        let (service, store) = service(vec![detail]);

        let err = service
            .submit(Uuid::new_v4(), request(experience_id, "2024-06-01", "10:00", 2))
            .await
            .unwrap_err();

        assert!(matches!(err, CoreError::InactiveResourceError(_)));
        assert_eq!(store.count(), 0);
    }

    #[tokio::test]
    async fn unknown_experience_is_not_found() {
        let (service, _) = service(vec![experience_detail(Uuid::new_v4(), 4500, 8, true)]);

        let err = service
            .submit(Uuid::new_v4(), request(Uuid::new_v4(), "2024-06-01", "10:00", 2))
            .await
            .unwrap_err();

        assert!(matches!(err, CoreError::NotFoundError(_)));
    }

    #[tokio::test]
    async fn missing_or_nonpositive_fields_fail_validation() {
        let detail = experience_detail(Uuid::new_v4(), 4500, 8, true);
        let experience_id = detail.experience.id;
        let (service, store) = service(vec![detail]);
        let guest = Uuid::new_v4();

        let mut missing_guests = request(experience_id, "2024-06-01", "10:00", 1);
        missing_guests.guests = None;
        let err = service.submit(guest, missing_guests).await.unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(_)));

        let err = service
            .submit(guest, request(experience_id, "2024-06-01", "10:00", 0))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(_)));

        let mut blank_slot = request(experience_id, "2024-06-01", "", 2);
        blank_slot.time_slot = Some("   ".to_string());
        let err = service.submit(guest, blank_slot).await.unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(_)));

        assert_eq!(store.count(), 0);
    }

    #[tokio::test]
    async fn second_submission_for_the_same_slot_conflicts() {
        let detail = experience_detail(Uuid::new_v4(), 4500, 8, true);
        let experience_id = detail.experience.id;
        let (service, _) = service(vec![detail]);

        service
            .submit(Uuid::new_v4(), request(experience_id, "2024-06-01", "10:00", 4))
            .await
            .unwrap();
        let err = service
            .submit(Uuid::new_v4(), request(experience_id, "2024-06-01", "10:00", 2))
            .await
            .unwrap_err();

        assert!(matches!(err, CoreError::ConflictError(_)));
    }

    #[tokio::test]
    async fn released_slots_can_be_rebooked() {
        let detail = experience_detail(Uuid::new_v4(), 4500, 8, true);
        let experience_id = detail.experience.id;
        let (service, store) = service(vec![detail]);

        store.seed(
            NewBooking {
                guest_id: Uuid::new_v4(),
                experience_id,
                slot_date: "2024-06-01".parse().unwrap(),
                time_slot: "10:00".to_string(),
                guests: 2,
                total_amount_cents: 9_000,
                special_requests: None,
                contact_info: serde_json::json!({}),
            },
            BookingStatus::Rejected,
        );

        let created = service
            .submit(Uuid::new_v4(), request(experience_id, "2024-06-01", "10:00", 2))
            .await
            .unwrap();
        assert_eq!(created.booking.status, BookingStatus::Pending);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_double_submission_admits_exactly_one() {
        let detail = experience_detail(Uuid::new_v4(), 4500, 8, true);
        let experience_id = detail.experience.id;
        let (service, store) = service(vec![detail]);

        let a = tokio::spawn({
            let service = service.clone();
            async move {
                service
                    .submit(Uuid::new_v4(), request(experience_id, "2024-06-01", "10:00", 4))
                    .await
            }
        });
        let b = tokio::spawn({
            let service = service.clone();
            async move {
                service
                    .submit(Uuid::new_v4(), request(experience_id, "2024-06-01", "10:00", 3))
                    .await
            }
        });

        let results = [a.await.unwrap(), b.await.unwrap()];
        let admitted = results.iter().filter(|r| r.is_ok()).count();
        let conflicts = results
            .iter()
            .filter(|r| matches!(r, Err(CoreError::ConflictError(_))))
            .count();

        assert_eq!(admitted, 1);
        assert_eq!(conflicts, 1);
        assert_eq!(store.count(), 1);
    }

    #[tokio::test]
    async fn listing_is_paginated_newest_first_and_stable() {
        let detail = experience_detail(Uuid::new_v4(), 1000, 8, true);
        let experience_id = detail.experience.id;
        let (service, _) = service(vec![detail]);
        let guest = Uuid::new_v4();

        for day in 1..=25 {
            service
                .submit(
                    guest,
                    request(experience_id, &format!("2024-06-{:02}", day), "10:00", 1),
                )
                .await
                .unwrap();
        }

        let (page1, meta1) = service
            .list(guest, None, Some(1), Some(10))
            .await
            .unwrap();
        let (page2, meta2) = service
            .list(guest, None, Some(2), Some(10))
            .await
            .unwrap();

        assert_eq!(meta1.total, 25);
        assert_eq!(meta1.total_pages, 3);
        assert_eq!(meta2, Pagination { total: 25, page: 2, limit: 10, total_pages: 3 });
        assert_eq!(page1.len(), 10);
        assert_eq!(page2.len(), 10);

        // Newest first: the first row is the last slot booked.
        assert_eq!(page1[0].booking.slot_date, "2024-06-25".parse().unwrap());

        let ids1: Vec<Uuid> = page1.iter().map(|b| b.booking.id).collect();
        assert!(page2.iter().all(|b| !ids1.contains(&b.booking.id)));

        let (page99, meta99) = service
            .list(guest, None, Some(99), Some(10))
            .await
            .unwrap();
        assert!(page99.is_empty());
        assert_eq!(meta99.total, 25);
    }

    #[tokio::test]
    async fn listing_filters_by_status_case_insensitively() {
        let owner = Uuid::new_v4();
        let detail = experience_detail(owner, 1000, 8, true);
        let experience_id = detail.experience.id;
        let (service, _) = service(vec![detail]);
        let guest = Uuid::new_v4();

        let first = service
            .submit(guest, request(experience_id, "2024-06-01", "10:00", 1))
            .await
            .unwrap();
        service
            .submit(guest, request(experience_id, "2024-06-02", "10:00", 1))
            .await
            .unwrap();
        service
            .cancel(&user(guest, UserRole::Guest), first.booking.id)
            .await
            .unwrap();

        let (cancelled, meta) = service
            .list(guest, Some("cancelled".to_string()), None, None)
            .await
            .unwrap();
        assert_eq!(meta.total, 1);
        assert_eq!(cancelled[0].booking.id, first.booking.id);

        let err = service
            .list(guest, Some("ARCHIVED".to_string()), None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(_)));
    }

    #[tokio::test]
    async fn guests_cannot_cancel_someone_elses_booking() {
        let detail = experience_detail(Uuid::new_v4(), 1000, 8, true);
        let experience_id = detail.experience.id;
        let (service, _) = service(vec![detail]);
        let guest = Uuid::new_v4();

        let created = service
            .submit(guest, request(experience_id, "2024-06-01", "10:00", 1))
            .await
            .unwrap();

        let stranger = user(Uuid::new_v4(), UserRole::Guest);
        let err = service.cancel(&stranger, created.booking.id).await.unwrap_err();
        assert!(matches!(err, CoreError::AuthorizationError(_)));
    }

    #[tokio::test]
    async fn cancelled_bookings_stay_cancelled() {
        let detail = experience_detail(Uuid::new_v4(), 1000, 8, true);
        let experience_id = detail.experience.id;
        let (service, _) = service(vec![detail]);
        let guest = Uuid::new_v4();

        let created = service
            .submit(guest, request(experience_id, "2024-06-01", "10:00", 1))
            .await
            .unwrap();
        let actor = user(guest, UserRole::Guest);
        service.cancel(&actor, created.booking.id).await.unwrap();

        let err = service.cancel(&actor, created.booking.id).await.unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(_)));
    }

    #[tokio::test]
    async fn winery_admin_confirms_and_rejects_only_own_bookings() {
        let owner = Uuid::new_v4();
        let detail = experience_detail(owner, 1000, 8, true);
        let experience_id = detail.experience.id;
        let (service, _) = service(vec![detail]);
        let guest = Uuid::new_v4();

        let created = service
            .submit(guest, request(experience_id, "2024-06-01", "10:00", 1))
            .await
            .unwrap();

        let other_admin = user(Uuid::new_v4(), UserRole::WineryAdmin);
        let err = service
            .decide(&other_admin, created.booking.id, BookingDecision::Confirm)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::AuthorizationError(_)));

        let admin = user(owner, UserRole::WineryAdmin);
        let confirmed = service
            .decide(&admin, created.booking.id, BookingDecision::Confirm)
            .await
            .unwrap();
        assert_eq!(confirmed.booking.status, BookingStatus::Confirmed);

        // CONFIRMED -> REJECTED is not a legal transition.
        let err = service
            .decide(&admin, created.booking.id, BookingDecision::Reject)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(_)));
    }
}
