use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use vinventure_core::CoreError;

#[derive(Debug)]
pub enum AppError {
    Core(CoreError),
    Anyhow(anyhow::Error),
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        Self::Core(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Anyhow(err)
    }
}

fn status_for(err: &CoreError) -> StatusCode {
    match err {
        CoreError::ValidationError(_) => StatusCode::BAD_REQUEST,
        // A guest can fix an over-capacity request, so it is a 400, not a 409.
        CoreError::CapacityError(_) => StatusCode::BAD_REQUEST,
        // Inactive resources are indistinguishable from absent ones to callers.
        CoreError::NotFoundError(_) | CoreError::InactiveResourceError(_) => StatusCode::NOT_FOUND,
        CoreError::ConflictError(_) => StatusCode::CONFLICT,
        CoreError::AuthenticationError(_) => StatusCode::UNAUTHORIZED,
        CoreError::AuthorizationError(_) => StatusCode::FORBIDDEN,
        CoreError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, kind, error_message) = match self {
            AppError::Core(CoreError::InternalError(msg)) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Internal Server Error".to_string(),
                )
            }
            AppError::Core(err) => (status_for(&err), err.kind(), err.to_string()),
            AppError::Anyhow(err) => {
                tracing::error!("Internal Server Error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Internal Server Error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
            "kind": kind,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_maps_to_stable_status_codes() {
        let cases = [
            (CoreError::ValidationError("x".into()), StatusCode::BAD_REQUEST),
            (CoreError::CapacityError("x".into()), StatusCode::BAD_REQUEST),
            (CoreError::NotFoundError("x".into()), StatusCode::NOT_FOUND),
            (
                CoreError::InactiveResourceError("x".into()),
                StatusCode::NOT_FOUND,
            ),
            (CoreError::ConflictError("x".into()), StatusCode::CONFLICT),
            (
                CoreError::AuthenticationError("x".into()),
                StatusCode::UNAUTHORIZED,
            ),
            (
                CoreError::AuthorizationError("x".into()),
                StatusCode::FORBIDDEN,
            ),
            (
                CoreError::InternalError("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            let response = AppError::Core(err).into_response();
            assert_eq!(response.status(), expected);
        }
    }

    #[test]
    fn internal_detail_is_not_leaked() {
        let response =
            AppError::Core(CoreError::InternalError("pg password wrong".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        // Body content is checked in the integration tests; the status is the contract here.
    }
}
