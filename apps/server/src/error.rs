use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use goalshare_core::auth::AuthError;
use goalshare_core::errors::{DatabaseError, Error as CoreError};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Core(#[from] CoreError),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Internal(String),
    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    code: u16,
    message: String,
}

fn core_status(err: &CoreError) -> StatusCode {
    match err {
        CoreError::Validation(_) => StatusCode::BAD_REQUEST,
        CoreError::Auth(AuthError::InvalidEmail(_)) => StatusCode::BAD_REQUEST,
        CoreError::Auth(AuthError::DeliveryFailed(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        CoreError::Auth(_) => StatusCode::UNAUTHORIZED,
        CoreError::PermissionDenied(_) => StatusCode::FORBIDDEN,
        CoreError::Database(DatabaseError::NotFound(_)) => StatusCode::NOT_FOUND,
        CoreError::ConstraintViolation(_)
        | CoreError::Database(DatabaseError::UniqueViolation(_)) => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Core(e) => (core_status(e), e.to_string()),
            ApiError::Unauthorized(reason) => (StatusCode::UNAUTHORIZED, reason.clone()),
            ApiError::Internal(reason) => (StatusCode::INTERNAL_SERVER_ERROR, reason.clone()),
            ApiError::Anyhow(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
        };
        if status.is_server_error() {
            tracing::error!("Request failed: {}", message);
        }
        let body = Json(ErrorBody {
            code: status.as_u16(),
            message,
        });
        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use goalshare_core::errors::ValidationError;

    fn status_of(err: CoreError) -> StatusCode {
        ApiError::from(err).into_response().status()
    }

    #[test]
    fn core_errors_map_to_http_statuses() {
        assert_eq!(
            status_of(CoreError::Validation(ValidationError::InvalidInput("x".into()))),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(CoreError::Auth(AuthError::InvalidCode)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(CoreError::PermissionDenied("x".into())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(status_of(CoreError::not_found("goal")), StatusCode::NOT_FOUND);
        assert_eq!(
            status_of(CoreError::ConstraintViolation("x".into())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(CoreError::Unexpected("x".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
