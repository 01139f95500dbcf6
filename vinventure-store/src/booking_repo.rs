use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;
use vinventure_booking::booking::{Booking, BookingStatus, NewBooking};
use vinventure_booking::repository::{BookingDetail, BookingRepository};
use vinventure_catalog::{Experience, ExperienceType, WinerySummary};
use vinventure_core::pagination::PageRequest;
use vinventure_core::{CoreError, CoreResult};
use vinventure_shared::pii::Masked;

pub struct PgBookingRepository {
    pool: PgPool,
}

impl PgBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn internal(e: sqlx::Error) -> CoreError {
    tracing::error!("Booking store failure: {}", e);
    CoreError::InternalError(e.to_string())
}

/// Name of the partial unique index that makes PENDING/CONFIRMED bookings exclusive per
/// (experience, date, time slot). A 23505 on it is the losing side of a booking race.
const ACTIVE_SLOT_INDEX: &str = "bookings_active_slot_idx";

const DETAIL_SELECT: &str = "SELECT b.id, b.user_id, b.experience_id, b.slot_date, b.time_slot, \
     b.guests, b.total_amount_cents, b.status, b.special_requests, b.contact_info, \
     b.created_at, b.updated_at, \
     e.winery_id, e.title AS e_title, e.description AS e_description, \
     e.experience_type AS e_experience_type, e.price_cents AS e_price_cents, \
     e.duration_minutes AS e_duration_minutes, e.max_guests AS e_max_guests, \
     e.rating AS e_rating, e.is_active AS e_is_active, \
     e.available_time_slots AS e_available_time_slots, e.created_at AS e_created_at, \
     e.updated_at AS e_updated_at, \
     w.owner_id AS w_owner_id, w.name AS w_name, w.city AS w_city, w.region AS w_region, \
     w.rating AS w_rating \
     FROM bookings b \
     JOIN experiences e ON e.id = b.experience_id \
     JOIN wineries w ON w.id = e.winery_id";

// Internal struct for type-safe querying
#[derive(sqlx::FromRow)]
struct BookingJoinRow {
    id: Uuid,
    user_id: Uuid,
    experience_id: Uuid,
    slot_date: NaiveDate,
    time_slot: String,
    guests: i32,
    total_amount_cents: i64,
    status: String,
    special_requests: Option<String>,
    contact_info: serde_json::Value,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
    winery_id: Uuid,
    e_title: String,
    e_description: Option<String>,
    e_experience_type: String,
    e_price_cents: i32,
    e_duration_minutes: i32,
    e_max_guests: i32,
    e_rating: Option<f64>,
    e_is_active: bool,
    e_available_time_slots: Vec<String>,
    e_created_at: chrono::DateTime<chrono::Utc>,
    e_updated_at: chrono::DateTime<chrono::Utc>,
    w_owner_id: Uuid,
    w_name: String,
    w_city: String,
    w_region: String,
    w_rating: Option<f64>,
}

impl TryFrom<BookingJoinRow> for BookingDetail {
    type Error = CoreError;

    fn try_from(row: BookingJoinRow) -> Result<Self, CoreError> {
        let status = BookingStatus::parse(&row.status).ok_or_else(|| {
            CoreError::InternalError(format!("Corrupt booking status: {}", row.status))
        })?;
        let experience_type = ExperienceType::parse(&row.e_experience_type).ok_or_else(|| {
            CoreError::InternalError(format!("Corrupt experience type: {}", row.e_experience_type))
        })?;

        Ok(BookingDetail {
            booking: Booking {
                id: row.id,
                guest_id: row.user_id,
                experience_id: row.experience_id,
                slot_date: row.slot_date,
                time_slot: row.time_slot,
                guests: row.guests,
                total_amount_cents: row.total_amount_cents,
                status,
                special_requests: row.special_requests,
                contact_info: Masked(row.contact_info),
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            experience: Experience {
                id: row.experience_id,
                winery_id: row.winery_id,
                title: row.e_title,
                description: row.e_description,
                experience_type,
                price_cents: row.e_price_cents,
                duration_minutes: row.e_duration_minutes,
                max_guests: row.e_max_guests,
                rating: row.e_rating,
                is_active: row.e_is_active,
                available_time_slots: row.e_available_time_slots,
                created_at: row.e_created_at,
                updated_at: row.e_updated_at,
            },
            winery: WinerySummary {
                id: row.winery_id,
                owner_id: row.w_owner_id,
                name: row.w_name,
                city: row.w_city,
                region: row.w_region,
                rating: row.w_rating,
            },
        })
    }
}

#[async_trait]
impl BookingRepository for PgBookingRepository {
    async fn insert(&self, booking: NewBooking) -> CoreResult<BookingDetail> {
        let booking_id = Uuid::new_v4();

        let inserted = sqlx::query(
            r#"
            INSERT INTO bookings
                (id, user_id, experience_id, slot_date, time_slot, guests,
                 total_amount_cents, status, special_requests, contact_info)
            VALUES ($1, $2, $3, $4, $5, $6, $7, 'PENDING', $8, $9)
            "#,
        )
        .bind(booking_id)
        .bind(booking.guest_id)
        .bind(booking.experience_id)
        .bind(booking.slot_date)
        .bind(booking.time_slot)
        .bind(booking.guests)
        .bind(booking.total_amount_cents)
        .bind(booking.special_requests)
        .bind(booking.contact_info)
        .execute(&self.pool)
        .await;

        match inserted {
            Ok(_) => {}
            Err(sqlx::Error::Database(db))
                if db.code().as_deref() == Some("23505")
                    && db.constraint() == Some(ACTIVE_SLOT_INDEX) =>
            {
                return Err(CoreError::ConflictError(
                    "Time slot already booked".to_string(),
                ));
            }
            Err(e) => return Err(internal(e)),
        }

        self.get(booking_id).await?.ok_or_else(|| {
            CoreError::InternalError(format!("Booking {} vanished after insert", booking_id))
        })
    }

    async fn find_conflicting(
        &self,
        experience_id: Uuid,
        slot_date: NaiveDate,
        time_slot: &str,
    ) -> CoreResult<Option<Uuid>> {
        sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT id FROM bookings
            WHERE experience_id = $1 AND slot_date = $2 AND time_slot = $3
              AND status IN ('PENDING', 'CONFIRMED')
            LIMIT 1
            "#,
        )
        .bind(experience_id)
        .bind(slot_date)
        .bind(time_slot)
        .fetch_optional(&self.pool)
        .await
        .map_err(internal)
    }

    async fn get(&self, id: Uuid) -> CoreResult<Option<BookingDetail>> {
        let row = sqlx::query_as::<_, BookingJoinRow>(&format!("{} WHERE b.id = $1", DETAIL_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(internal)?;

        row.map(BookingDetail::try_from).transpose()
    }

    async fn list_by_guest(
        &self,
        guest_id: Uuid,
        status: Option<BookingStatus>,
        page: &PageRequest,
    ) -> CoreResult<(Vec<BookingDetail>, i64)> {
        let rows: Vec<BookingJoinRow> = if let Some(status) = status {
            sqlx::query_as(&format!(
                "{} WHERE b.user_id = $1 AND b.status = $2 \
                 ORDER BY b.created_at DESC LIMIT $3 OFFSET $4",
                DETAIL_SELECT
            ))
            .bind(guest_id)
            .bind(status.as_str())
            .bind(page.limit() as i64)
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(internal)?
        } else {
            sqlx::query_as(&format!(
                "{} WHERE b.user_id = $1 ORDER BY b.created_at DESC LIMIT $2 OFFSET $3",
                DETAIL_SELECT
            ))
            .bind(guest_id)
            .bind(page.limit() as i64)
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(internal)?
        };

        let total: i64 = if let Some(status) = status {
            sqlx::query_scalar("SELECT COUNT(*) FROM bookings WHERE user_id = $1 AND status = $2")
                .bind(guest_id)
                .bind(status.as_str())
                .fetch_one(&self.pool)
                .await
                .map_err(internal)?
        } else {
            sqlx::query_scalar("SELECT COUNT(*) FROM bookings WHERE user_id = $1")
                .bind(guest_id)
                .fetch_one(&self.pool)
                .await
                .map_err(internal)?
        };

        let bookings = rows
            .into_iter()
            .map(BookingDetail::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((bookings, total))
    }

    async fn update_status(
        &self,
        id: Uuid,
        from: BookingStatus,
        to: BookingStatus,
    ) -> CoreResult<Option<BookingDetail>> {
        let result = sqlx::query(
            "UPDATE bookings SET status = $3, updated_at = NOW() WHERE id = $1 AND status = $2",
        )
        .bind(id)
        .bind(from.as_str())
        .bind(to.as_str())
        .execute(&self.pool)
        .await
        .map_err(internal)?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get(id).await
    }
}
