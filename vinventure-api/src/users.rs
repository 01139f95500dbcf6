use axum::{
    extract::State,
    routing::get,
    Extension, Json, Router,
};
use serde_json::json;
use vinventure_core::user::{ProfileUpdate, User};

use crate::error::AppError;
use crate::middleware::auth::authenticate;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/v1/users/me", get(get_profile).put(update_profile))
        .route_layer(axum::middleware::from_fn_with_state(state, authenticate))
}

/// GET /v1/users/me
async fn get_profile(Extension(user): Extension<User>) -> Json<serde_json::Value> {
    Json(json!({ "user": user }))
}

/// PUT /v1/users/me
async fn update_profile(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<serde_json::Value>, AppError> {
    let user = state.users.update_profile(user.id, update).await?;
    Ok(Json(json!({ "user": user })))
}
