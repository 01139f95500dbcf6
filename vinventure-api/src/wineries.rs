use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, patch},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;
use vinventure_catalog::{NewWinery, WineryFilters, WineryStatus, WineryUpdate};
use vinventure_core::pagination::PageRequest;
use vinventure_core::user::UserRole;
use vinventure_core::{authz, CoreError};
use vinventure_shared::models::events::WinerySubmittedEvent;

use crate::error::AppError;
use crate::middleware::auth::resolve_user;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct WineryListQuery {
    search: Option<String>,
    region: Option<String>,
    wine_type: Option<String>,
    sustainable: Option<bool>,
    featured: Option<bool>,
    page: Option<u32>,
    limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct SetStatusRequest {
    status: WineryStatus,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/wineries", get(list_wineries).post(create_winery))
        .route("/v1/wineries/{id}", get(get_winery).put(update_winery))
        .route("/v1/wineries/{id}/status", patch(set_winery_status))
}

/// GET /v1/wineries — public search over approved wineries.
async fn list_wineries(
    State(state): State<AppState>,
    Query(query): Query<WineryListQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let filters = WineryFilters {
        search: query.search,
        region: query.region,
        wine_type: query.wine_type,
        sustainable: query.sustainable,
        featured: query.featured,
    }
    .normalized();
    let page = PageRequest::new(
        query.page,
        query.limit,
        state.business_rules.default_page_limit,
        state.business_rules.max_page_limit,
    );

    let (wineries, total) = state.catalog.search_wineries(&filters, &page).await?;

    Ok(Json(json!({
        "wineries": wineries,
        "pagination": vinventure_core::pagination::Pagination::new(total, &page),
    })))
}

/// GET /v1/wineries/:id — public detail; unapproved listings look absent.
async fn get_winery(
    State(state): State<AppState>,
    Path(winery_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let winery = state
        .catalog
        .get_winery(winery_id)
        .await?
        .ok_or_else(|| CoreError::NotFoundError("Winery not found".to_string()))?;

    if winery.winery.status != WineryStatus::Approved {
        return Err(CoreError::NotFoundError("Winery not available".to_string()).into());
    }

    Ok(Json(json!({ "winery": winery })))
}

/// POST /v1/wineries — winery admins submit a listing; it starts in PENDING.
async fn create_winery(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<NewWinery>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let user = resolve_user(&state, &headers).await?;
    authz::require_role(&user, UserRole::WineryAdmin)?;
    req.validate()?;

    let winery = state.catalog.create_winery(user.id, req).await?;

    let event = WinerySubmittedEvent {
        winery_id: winery.id,
        owner_id: winery.owner_id,
        name: winery.name.clone(),
        region: winery.region.clone(),
        timestamp: chrono::Utc::now().timestamp(),
    };
    if let Ok(payload) = serde_json::to_string(&event) {
        let _ = state
            .kafka
            .publish("winery.submitted", &winery.id.to_string(), &payload)
            .await;
    }

    info!("Winery submitted: {}", winery.id);

    Ok((StatusCode::CREATED, Json(json!({ "winery": winery }))))
}

/// PUT /v1/wineries/:id — owner edits go back to PENDING; platform admins edit freely.
async fn update_winery(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(winery_id): Path<Uuid>,
    Json(update): Json<WineryUpdate>,
) -> Result<Json<serde_json::Value>, AppError> {
    let user = resolve_user(&state, &headers).await?;

    let existing = state
        .catalog
        .get_winery(winery_id)
        .await?
        .ok_or_else(|| CoreError::NotFoundError("Winery not found".to_string()))?;
    authz::require_owner(&user, existing.winery.owner_id, "Winery")?;

    let update = if user.role == UserRole::PlatformAdmin {
        update
    } else {
        update.restricted_to_owner()
    };

    let winery = state
        .catalog
        .update_winery(winery_id, update)
        .await?
        .ok_or_else(|| CoreError::NotFoundError("Winery not found".to_string()))?;

    Ok(Json(json!({ "winery": winery })))
}

/// PATCH /v1/wineries/:id/status — moderation, platform admins only.
async fn set_winery_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(winery_id): Path<Uuid>,
    Json(req): Json<SetStatusRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let user = resolve_user(&state, &headers).await?;
    authz::require_platform_admin(&user)?;

    let winery = state
        .catalog
        .set_winery_status(winery_id, req.status)
        .await?
        .ok_or_else(|| CoreError::NotFoundError("Winery not found".to_string()))?;

    info!("Winery {} moved to {}", winery.id, winery.status.as_str());

    Ok(Json(json!({ "winery": winery })))
}
