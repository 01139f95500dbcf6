use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;
use vinventure_catalog::{ExperienceFilters, ExperienceType, NewExperience, WineryStatus};
use vinventure_core::pagination::{PageRequest, Pagination};
use vinventure_core::user::UserRole;
use vinventure_core::{authz, CoreError};

use crate::error::AppError;
use crate::middleware::auth::resolve_user;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct ExperienceListQuery {
    winery_id: Option<Uuid>,
    #[serde(rename = "type")]
    experience_type: Option<ExperienceType>,
    min_price_cents: Option<i32>,
    max_price_cents: Option<i32>,
    min_duration_minutes: Option<i32>,
    max_duration_minutes: Option<i32>,
    page: Option<u32>,
    limit: Option<u32>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/experiences", get(list_experiences).post(create_experience))
        .route("/v1/experiences/{id}/deactivate", post(deactivate_experience))
}

/// GET /v1/experiences — public search over active experiences of approved wineries.
async fn list_experiences(
    State(state): State<AppState>,
    Query(query): Query<ExperienceListQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let filters = ExperienceFilters {
        winery_id: query.winery_id,
        experience_type: query.experience_type,
        min_price_cents: query.min_price_cents,
        max_price_cents: query.max_price_cents,
        min_duration_minutes: query.min_duration_minutes,
        max_duration_minutes: query.max_duration_minutes,
    };
    let page = PageRequest::new(
        query.page,
        query.limit,
        state.business_rules.default_page_limit,
        state.business_rules.max_page_limit,
    );

    let (experiences, total) = state.catalog.search_experiences(&filters, &page).await?;

    Ok(Json(json!({
        "experiences": experiences,
        "pagination": Pagination::new(total, &page),
    })))
}

/// POST /v1/experiences — a winery admin adds an offering to their approved winery.
async fn create_experience(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<NewExperience>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let user = resolve_user(&state, &headers).await?;
    authz::require_role(&user, UserRole::WineryAdmin)?;

    let winery = state
        .catalog
        .find_winery_by_owner(user.id)
        .await?
        .ok_or_else(|| {
            CoreError::ValidationError("No winery registered for this account".to_string())
        })?;
    if winery.status != WineryStatus::Approved {
        return Err(CoreError::ValidationError(
            "Winery is not approved yet".to_string(),
        )
        .into());
    }

    req.validate()?;
    let experience = state.catalog.create_experience(winery.id, req).await?;

    info!("Experience created: {}", experience.id);

    Ok((StatusCode::CREATED, Json(json!({ "experience": experience }))))
}

/// POST /v1/experiences/:id/deactivate — soft removal; bookings keep their reference.
async fn deactivate_experience(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(experience_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let user = resolve_user(&state, &headers).await?;

    let detail = state
        .catalog
        .get_experience(experience_id)
        .await?
        .ok_or_else(|| CoreError::NotFoundError("Experience not found".to_string()))?;
    authz::require_winery_manager(&user, detail.winery.owner_id)?;

    let experience = state
        .catalog
        .deactivate_experience(experience_id)
        .await?
        .ok_or_else(|| CoreError::NotFoundError("Experience not found".to_string()))?;

    Ok(Json(json!({ "experience": experience })))
}
