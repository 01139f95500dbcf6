use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::collections::HashMap;
use uuid::Uuid;
use vinventure_catalog::{
    CatalogRepository, Experience, ExperienceDetail, ExperienceFilters, ExperienceType,
    ExperienceWithWinery, NewExperience, NewWinery, Winery, WineryFilters, WineryStatus,
    WinerySummary, WineryUpdate, WineryWithExperiences,
};
use vinventure_core::pagination::PageRequest;
use vinventure_core::{CoreError, CoreResult};

pub struct PgCatalogRepository {
    pool: PgPool,
}

impl PgCatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn internal(e: sqlx::Error) -> CoreError {
    tracing::error!("Catalog store failure: {}", e);
    CoreError::InternalError(e.to_string())
}

const WINERY_COLUMNS: &str = "id, owner_id, name, description, region, country, address, city, \
     email, phone, website, wine_types, sustainable, featured, rating, status, created_at, updated_at";

const EXPERIENCE_COLUMNS: &str = "id, winery_id, title, description, experience_type, price_cents, \
     duration_minutes, max_guests, rating, is_active, available_time_slots, created_at, updated_at";

// Internal structs for type-safe querying
#[derive(sqlx::FromRow)]
struct WineryRow {
    id: Uuid,
    owner_id: Uuid,
    name: String,
    description: Option<String>,
    region: String,
    country: String,
    address: String,
    city: String,
    email: Option<String>,
    phone: Option<String>,
    website: Option<String>,
    wine_types: Vec<String>,
    sustainable: bool,
    featured: bool,
    rating: Option<f64>,
    status: String,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl TryFrom<WineryRow> for Winery {
    type Error = CoreError;

    fn try_from(row: WineryRow) -> Result<Self, CoreError> {
        let status = WineryStatus::parse(&row.status)
            .ok_or_else(|| CoreError::InternalError(format!("Corrupt winery status: {}", row.status)))?;
        Ok(Winery {
            id: row.id,
            owner_id: row.owner_id,
            name: row.name,
            description: row.description,
            region: row.region,
            country: row.country,
            address: row.address,
            city: row.city,
            email: row.email,
            phone: row.phone,
            website: row.website,
            wine_types: row.wine_types,
            sustainable: row.sustainable,
            featured: row.featured,
            rating: row.rating,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ExperienceRow {
    id: Uuid,
    winery_id: Uuid,
    title: String,
    description: Option<String>,
    experience_type: String,
    price_cents: i32,
    duration_minutes: i32,
    max_guests: i32,
    rating: Option<f64>,
    is_active: bool,
    available_time_slots: Vec<String>,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl TryFrom<ExperienceRow> for Experience {
    type Error = CoreError;

    fn try_from(row: ExperienceRow) -> Result<Self, CoreError> {
        let experience_type = ExperienceType::parse(&row.experience_type).ok_or_else(|| {
            CoreError::InternalError(format!("Corrupt experience type: {}", row.experience_type))
        })?;
        Ok(Experience {
            id: row.id,
            winery_id: row.winery_id,
            title: row.title,
            description: row.description,
            experience_type,
            price_cents: row.price_cents,
            duration_minutes: row.duration_minutes,
            max_guests: row.max_guests,
            rating: row.rating,
            is_active: row.is_active,
            available_time_slots: row.available_time_slots,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ExperienceJoinRow {
    id: Uuid,
    winery_id: Uuid,
    title: String,
    description: Option<String>,
    experience_type: String,
    price_cents: i32,
    duration_minutes: i32,
    max_guests: i32,
    rating: Option<f64>,
    is_active: bool,
    available_time_slots: Vec<String>,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
    w_owner_id: Uuid,
    w_name: String,
    w_city: String,
    w_region: String,
    w_rating: Option<f64>,
}

impl TryFrom<ExperienceJoinRow> for ExperienceWithWinery {
    type Error = CoreError;

    fn try_from(row: ExperienceJoinRow) -> Result<Self, CoreError> {
        let winery = WinerySummary {
            id: row.winery_id,
            owner_id: row.w_owner_id,
            name: row.w_name,
            city: row.w_city,
            region: row.w_region,
            rating: row.w_rating,
        };
        let experience = Experience::try_from(ExperienceRow {
            id: row.id,
            winery_id: row.winery_id,
            title: row.title,
            description: row.description,
            experience_type: row.experience_type,
            price_cents: row.price_cents,
            duration_minutes: row.duration_minutes,
            max_guests: row.max_guests,
            rating: row.rating,
            is_active: row.is_active,
            available_time_slots: row.available_time_slots,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })?;
        Ok(ExperienceWithWinery { experience, winery })
    }
}

fn push_winery_filters(qb: &mut QueryBuilder<'_, Postgres>, filters: &WineryFilters) {
    if let Some(search) = &filters.search {
        let pattern = format!("%{}%", search);
        qb.push(" AND (name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR description ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR region ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(region) = &filters.region {
        qb.push(" AND region ILIKE ").push_bind(format!("%{}%", region));
    }
    if let Some(wine_type) = &filters.wine_type {
        qb.push(" AND wine_types @> ").push_bind(vec![wine_type.clone()]);
    }
    if filters.sustainable == Some(true) {
        qb.push(" AND sustainable = TRUE");
    }
    if filters.featured == Some(true) {
        qb.push(" AND featured = TRUE");
    }
}

fn push_experience_filters(qb: &mut QueryBuilder<'_, Postgres>, filters: &ExperienceFilters) {
    if let Some(winery_id) = filters.winery_id {
        qb.push(" AND e.winery_id = ").push_bind(winery_id);
    }
    if let Some(experience_type) = filters.experience_type {
        qb.push(" AND e.experience_type = ").push_bind(experience_type.as_str());
    }
    if let Some(min) = filters.min_price_cents {
        qb.push(" AND e.price_cents >= ").push_bind(min);
    }
    if let Some(max) = filters.max_price_cents {
        qb.push(" AND e.price_cents <= ").push_bind(max);
    }
    if let Some(min) = filters.min_duration_minutes {
        qb.push(" AND e.duration_minutes >= ").push_bind(min);
    }
    if let Some(max) = filters.max_duration_minutes {
        qb.push(" AND e.duration_minutes <= ").push_bind(max);
    }
}

impl PgCatalogRepository {
    async fn active_experiences_for(&self, winery_ids: &[Uuid]) -> CoreResult<HashMap<Uuid, Vec<Experience>>> {
        let rows = sqlx::query_as::<_, ExperienceRow>(&format!(
            "SELECT {} FROM experiences WHERE winery_id = ANY($1) AND is_active = TRUE \
             ORDER BY rating DESC NULLS LAST, created_at DESC",
            EXPERIENCE_COLUMNS
        ))
        .bind(winery_ids.to_vec())
        .fetch_all(&self.pool)
        .await
        .map_err(internal)?;

        let mut by_winery: HashMap<Uuid, Vec<Experience>> = HashMap::new();
        for row in rows {
            let experience = Experience::try_from(row)?;
            by_winery.entry(experience.winery_id).or_default().push(experience);
        }
        Ok(by_winery)
    }
}

#[async_trait]
impl CatalogRepository for PgCatalogRepository {
    async fn get_experience(&self, id: Uuid) -> CoreResult<Option<ExperienceDetail>> {
        let row = sqlx::query_as::<_, ExperienceRow>(&format!(
            "SELECT {} FROM experiences WHERE id = $1",
            EXPERIENCE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(internal)?;

        let Some(row) = row else {
            return Ok(None);
        };
        let experience = Experience::try_from(row)?;

        let winery_row = sqlx::query_as::<_, WineryRow>(&format!(
            "SELECT {} FROM wineries WHERE id = $1",
            WINERY_COLUMNS
        ))
        .bind(experience.winery_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(internal)?
        .ok_or_else(|| {
            CoreError::InternalError(format!("Experience {} has no winery row", experience.id))
        })?;

        Ok(Some(ExperienceDetail {
            experience,
            winery: winery_row.try_into()?,
        }))
    }

    async fn search_experiences(
        &self,
        filters: &ExperienceFilters,
        page: &PageRequest,
    ) -> CoreResult<(Vec<ExperienceWithWinery>, i64)> {
        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT e.id, e.winery_id, e.title, e.description, e.experience_type, e.price_cents, \
             e.duration_minutes, e.max_guests, e.rating, e.is_active, e.available_time_slots, \
             e.created_at, e.updated_at, w.owner_id AS w_owner_id, w.name AS w_name, \
             w.city AS w_city, w.region AS w_region, w.rating AS w_rating \
             FROM experiences e JOIN wineries w ON w.id = e.winery_id \
             WHERE e.is_active = TRUE AND w.status = 'APPROVED'",
        );
        push_experience_filters(&mut qb, filters);
        qb.push(" ORDER BY e.rating DESC NULLS LAST, e.created_at DESC LIMIT ")
            .push_bind(page.limit() as i64)
            .push(" OFFSET ")
            .push_bind(page.offset());

        let rows: Vec<ExperienceJoinRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(internal)?;

        let mut count_qb = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) FROM experiences e JOIN wineries w ON w.id = e.winery_id \
             WHERE e.is_active = TRUE AND w.status = 'APPROVED'",
        );
        push_experience_filters(&mut count_qb, filters);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(internal)?;

        let results = rows
            .into_iter()
            .map(ExperienceWithWinery::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((results, total))
    }

    async fn create_experience(
        &self,
        winery_id: Uuid,
        experience: NewExperience,
    ) -> CoreResult<Experience> {
        let row = sqlx::query_as::<_, ExperienceRow>(&format!(
            r#"
            INSERT INTO experiences
                (id, winery_id, title, description, experience_type, price_cents,
                 duration_minutes, max_guests, available_time_slots, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, TRUE)
            RETURNING {}
            "#,
            EXPERIENCE_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(winery_id)
        .bind(experience.title)
        .bind(experience.description)
        .bind(experience.experience_type.as_str())
        .bind(experience.price_cents)
        .bind(experience.duration_minutes)
        .bind(experience.max_guests)
        .bind(experience.available_time_slots)
        .fetch_one(&self.pool)
        .await
        .map_err(internal)?;

        row.try_into()
    }

    async fn deactivate_experience(&self, id: Uuid) -> CoreResult<Option<Experience>> {
        let row = sqlx::query_as::<_, ExperienceRow>(&format!(
            "UPDATE experiences SET is_active = FALSE, updated_at = NOW() WHERE id = $1 RETURNING {}",
            EXPERIENCE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(internal)?;

        row.map(Experience::try_from).transpose()
    }

    async fn get_winery(&self, id: Uuid) -> CoreResult<Option<WineryWithExperiences>> {
        let row = sqlx::query_as::<_, WineryRow>(&format!(
            "SELECT {} FROM wineries WHERE id = $1",
            WINERY_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(internal)?;

        let Some(row) = row else {
            return Ok(None);
        };
        let winery = Winery::try_from(row)?;
        let mut experiences = self.active_experiences_for(&[winery.id]).await?;
        let experiences = experiences.remove(&winery.id).unwrap_or_default();

        Ok(Some(WineryWithExperiences { winery, experiences }))
    }

    async fn find_winery_by_owner(&self, owner_id: Uuid) -> CoreResult<Option<Winery>> {
        let row = sqlx::query_as::<_, WineryRow>(&format!(
            "SELECT {} FROM wineries WHERE owner_id = $1 ORDER BY created_at LIMIT 1",
            WINERY_COLUMNS
        ))
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(internal)?;

        row.map(Winery::try_from).transpose()
    }

    async fn search_wineries(
        &self,
        filters: &WineryFilters,
        page: &PageRequest,
    ) -> CoreResult<(Vec<WineryWithExperiences>, i64)> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM wineries WHERE status = 'APPROVED'",
            WINERY_COLUMNS
        ));
        push_winery_filters(&mut qb, filters);
        qb.push(" ORDER BY featured DESC, rating DESC NULLS LAST, created_at DESC LIMIT ")
            .push_bind(page.limit() as i64)
            .push(" OFFSET ")
            .push_bind(page.offset());

        let rows: Vec<WineryRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(internal)?;

        let mut count_qb =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM wineries WHERE status = 'APPROVED'");
        push_winery_filters(&mut count_qb, filters);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(internal)?;

        let wineries = rows
            .into_iter()
            .map(Winery::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        let ids: Vec<Uuid> = wineries.iter().map(|w| w.id).collect();
        let mut experiences = self.active_experiences_for(&ids).await?;

        let results = wineries
            .into_iter()
            .map(|winery| {
                let experiences = experiences.remove(&winery.id).unwrap_or_default();
                WineryWithExperiences { winery, experiences }
            })
            .collect();

        Ok((results, total))
    }

    async fn create_winery(&self, owner_id: Uuid, winery: NewWinery) -> CoreResult<Winery> {
        let row = sqlx::query_as::<_, WineryRow>(&format!(
            r#"
            INSERT INTO wineries
                (id, owner_id, name, description, region, country, address, city,
                 email, phone, website, wine_types, sustainable, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, 'PENDING')
            RETURNING {}
            "#,
            WINERY_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(owner_id)
        .bind(winery.name)
        .bind(winery.description)
        .bind(winery.region)
        .bind(winery.country)
        .bind(winery.address)
        .bind(winery.city)
        .bind(winery.email)
        .bind(winery.phone)
        .bind(winery.website)
        .bind(winery.wine_types)
        .bind(winery.sustainable)
        .fetch_one(&self.pool)
        .await
        .map_err(internal)?;

        row.try_into()
    }

    async fn update_winery(&self, id: Uuid, update: WineryUpdate) -> CoreResult<Option<Winery>> {
        let row = sqlx::query_as::<_, WineryRow>(&format!(
            r#"
            UPDATE wineries
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                region = COALESCE($4, region),
                country = COALESCE($5, country),
                address = COALESCE($6, address),
                city = COALESCE($7, city),
                email = COALESCE($8, email),
                phone = COALESCE($9, phone),
                website = COALESCE($10, website),
                wine_types = COALESCE($11, wine_types),
                sustainable = COALESCE($12, sustainable),
                featured = COALESCE($13, featured),
                status = COALESCE($14, status),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            WINERY_COLUMNS
        ))
        .bind(id)
        .bind(update.name)
        .bind(update.description)
        .bind(update.region)
        .bind(update.country)
        .bind(update.address)
        .bind(update.city)
        .bind(update.email)
        .bind(update.phone)
        .bind(update.website)
        .bind(update.wine_types)
        .bind(update.sustainable)
        .bind(update.featured)
        .bind(update.status.map(|s| s.as_str()))
        .fetch_optional(&self.pool)
        .await
        .map_err(internal)?;

        row.map(Winery::try_from).transpose()
    }

    async fn set_winery_status(
        &self,
        id: Uuid,
        status: WineryStatus,
    ) -> CoreResult<Option<Winery>> {
        let row = sqlx::query_as::<_, WineryRow>(&format!(
            "UPDATE wineries SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
            WINERY_COLUMNS
        ))
        .bind(id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(internal)?;

        row.map(Winery::try_from).transpose()
    }
}
