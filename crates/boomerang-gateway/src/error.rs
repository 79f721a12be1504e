use crate::model::ErrorResponse;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use boomerang_core::{CoreError, ShortenerError};
use boomerang_redirector::RedirectorError;
use thiserror::Error;
use tracing::error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Unavailable(String),
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ShortenerError> for AppError {
    fn from(error: ShortenerError) -> Self {
        match error {
            ShortenerError::InvalidUrl(_) | ShortenerError::InvalidExpiration(_) => {
                AppError::BadRequest(error.to_string())
            }
            ShortenerError::Exhausted { .. } | ShortenerError::Unavailable { .. } => {
                AppError::Unavailable(error.to_string())
            }
            ShortenerError::Storage(_) => AppError::Internal(error.to_string()),
        }
    }
}

impl From<RedirectorError> for AppError {
    fn from(error: RedirectorError) -> Self {
        match error {
            RedirectorError::MalformedId(_) => AppError::BadRequest(error.to_string()),
            RedirectorError::NotFound(_) => AppError::NotFound(error.to_string()),
            RedirectorError::Storage(_) => AppError::Internal(error.to_string()),
        }
    }
}

impl From<CoreError> for AppError {
    fn from(error: CoreError) -> Self {
        AppError::BadRequest(error.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = %status, error = %self, "request failed");
        }

        let body = ErrorResponse {
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boomerang_core::{RegistryError, UrlId};

    #[test]
    fn shortener_errors_map_to_statuses() {
        let cases = [
            (ShortenerError::InvalidUrl("x".into()), StatusCode::BAD_REQUEST),
            (
                ShortenerError::InvalidExpiration("past".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                ShortenerError::Exhausted { capacity: 1 },
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                ShortenerError::Unavailable {
                    attempts: 3,
                    source: RegistryError::Timeout("slow".into()),
                },
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                ShortenerError::Storage("broken".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, status) in cases {
            assert_eq!(AppError::from(error).status(), status);
        }
    }

    #[test]
    fn redirector_errors_map_to_statuses() {
        assert_eq!(
            AppError::from(RedirectorError::MalformedId("abc".into())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(RedirectorError::NotFound(UrlId::new(0))).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::from(RedirectorError::Storage(RegistryError::InvalidData(
                "bad".into()
            )))
            .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
