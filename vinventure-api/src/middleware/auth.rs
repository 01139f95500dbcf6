use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use vinventure_core::user::{NewUser, User};
use vinventure_core::CoreError;

use crate::error::AppError;
use crate::state::AppState;

fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let auth_header = headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            CoreError::AuthenticationError("Missing or invalid authorization header".to_string())
        })?;

    auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        AppError::from(CoreError::AuthenticationError(
            "Missing or invalid authorization header".to_string(),
        ))
    })
}

/// Verify the bearer credential with the active identity backend and load the
/// marketplace account behind it, provisioning a GUEST account on first sight.
pub async fn resolve_user(state: &AppState, headers: &HeaderMap) -> Result<User, AppError> {
    let token = bearer_token(headers)?;
    let identity = state.identity.resolve(token).await?;
    let user = state
        .users
        .find_or_create(NewUser {
            provider: identity.provider,
            external_subject: identity.subject,
            email: identity.email,
            name: identity.display_name,
        })
        .await?;
    Ok(user)
}

/// Router-level authentication for surfaces where every route needs a caller identity.
/// The resolved user is injected as a request extension.
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = resolve_user(&state, req.headers()).await?;
    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}
