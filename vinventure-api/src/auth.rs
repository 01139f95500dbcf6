use axum::{extract::State, routing::post, Json, Router};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::identity::FederatedClaims;
use crate::state::AppState;
use vinventure_core::CoreError;

#[derive(Debug, Serialize)]
struct AuthResponse {
    token: String,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/auth/guest", post(login_guest))
}

/// Dev/demo convenience: mint a short-lived federated-format token so the flows can be
/// exercised without a running login provider.
async fn login_guest(State(state): State<AppState>) -> Result<Json<AuthResponse>, AppError> {
    let claims = FederatedClaims {
        sub: format!("guest-{}", Uuid::new_v4()),
        email: None,
        name: Some("Guest".to_owned()),
        exp: (Utc::now() + Duration::seconds(state.auth.expiration as i64)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(state.auth.secret.as_bytes()),
    )
    .map_err(|e| CoreError::InternalError(format!("Token encoding failed: {}", e)))?;

    Ok(Json(AuthResponse { token }))
}
