use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;
use vinventure_booking::{BookingDecision, BookingRequest};
use vinventure_core::user::User;
use vinventure_shared::models::events::{BookingCreatedEvent, BookingStatusChangedEvent};

use crate::error::AppError;
use crate::middleware::auth::authenticate;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct ListBookingsQuery {
    status: Option<String>,
    page: Option<u32>,
    limit: Option<u32>,
}

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/v1/bookings", post(create_booking).get(list_bookings))
        .route("/v1/bookings/{id}", get(get_booking))
        .route("/v1/bookings/{id}/cancel", post(cancel_booking))
        .route("/v1/bookings/{id}/confirm", post(confirm_booking))
        .route("/v1/bookings/{id}/reject", post(reject_booking))
        .route_layer(axum::middleware::from_fn_with_state(state, authenticate))
}

/// POST /v1/bookings
async fn create_booking(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(req): Json<BookingRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let created = state.admission.submit(user.id, req).await?;

    let event = BookingCreatedEvent {
        booking_id: created.booking.id,
        experience_id: created.booking.experience_id,
        winery_id: created.winery.id,
        guest_id: created.booking.guest_id,
        slot_date: created.booking.slot_date,
        time_slot: created.booking.time_slot.clone(),
        guests: created.booking.guests,
        total_amount: created.booking.total_amount_cents,
        timestamp: chrono::Utc::now().timestamp(),
    };
    if let Ok(payload) = serde_json::to_string(&event) {
        let _ = state
            .kafka
            .publish("booking.created", &created.booking.id.to_string(), &payload)
            .await;
    }

    info!("Booking created: {}", created.booking.id);

    Ok((StatusCode::CREATED, Json(json!({ "booking": created }))))
}

/// GET /v1/bookings?status=&page=&limit=
async fn list_bookings(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Query(query): Query<ListBookingsQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let (bookings, pagination) = state
        .admission
        .list(user.id, query.status, query.page, query.limit)
        .await?;

    Ok(Json(json!({
        "bookings": bookings,
        "pagination": pagination,
    })))
}

/// GET /v1/bookings/:id
async fn get_booking(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let booking = state.admission.get_owned(&user, booking_id).await?;
    Ok(Json(json!({ "booking": booking })))
}

/// POST /v1/bookings/:id/cancel
async fn cancel_booking(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let before = state.admission.get_owned(&user, booking_id).await?;
    let updated = state.admission.cancel(&user, booking_id).await?;

    publish_status_change(&state, before.booking.status.as_str(), &updated, "CUSTOMER").await;

    Ok(Json(json!({ "booking": updated })))
}

/// POST /v1/bookings/:id/confirm
async fn confirm_booking(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let updated = state
        .admission
        .decide(&user, booking_id, BookingDecision::Confirm)
        .await?;

    publish_status_change(&state, "PENDING", &updated, "WINERY").await;
    info!("Booking confirmed: {}", updated.booking.id);

    Ok(Json(json!({ "booking": updated })))
}

/// POST /v1/bookings/:id/reject
async fn reject_booking(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let updated = state
        .admission
        .decide(&user, booking_id, BookingDecision::Reject)
        .await?;

    publish_status_change(&state, "PENDING", &updated, "WINERY").await;

    Ok(Json(json!({ "booking": updated })))
}

async fn publish_status_change(
    state: &AppState,
    previous: &str,
    updated: &vinventure_booking::BookingDetail,
    actor: &str,
) {
    let event = BookingStatusChangedEvent {
        booking_id: updated.booking.id,
        experience_id: updated.booking.experience_id,
        previous_status: previous.to_string(),
        new_status: updated.booking.status.as_str().to_string(),
        actor: actor.to_string(),
        timestamp: chrono::Utc::now().timestamp(),
    };
    if let Ok(payload) = serde_json::to_string(&event) {
        let _ = state
            .kafka
            .publish(
                "booking.status_changed",
                &updated.booking.id.to_string(),
                &payload,
            )
            .await;
    }
}
