//! JSON envelopes shared by every route.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::application::{AppError, Pagination, StorageError};
use crate::domain::ValidationError;

/// A successful response: `{data, pagination?, status_code}`.
#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
    pub status_code: u16,
}

impl<T: Serialize> DataResponse<T> {
    pub fn new(status: StatusCode, data: T) -> (StatusCode, Json<Self>) {
        Self::build(status, data, None)
    }

    pub fn paginated(status: StatusCode, data: T, pagination: Pagination) -> (StatusCode, Json<Self>) {
        Self::build(status, data, Some(pagination))
    }

    fn build(
        status: StatusCode,
        data: T,
        pagination: Option<Pagination>,
    ) -> (StatusCode, Json<Self>) {
        (
            status,
            Json(Self {
                data,
                pagination,
                status_code: status.as_u16(),
            }),
        )
    }
}

/// A failed response: `{message, status_code}`.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
    pub status_code: u16,
}

/// An error ready to be sent to the client.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::bad_request(err.to_string())
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::Validation(err) => err.into(),
            AppError::Storage(err @ StorageError::Timeout(_)) => {
                tracing::error!("{err}");
                Self::new(StatusCode::GATEWAY_TIMEOUT, "The request timed out")
            }
            err @ AppError::TotalOutOfRange(_) => {
                tracing::error!("{err}");
                Self::new(StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
            }
            // Storage details are for the server log only.
            AppError::Storage(err) => {
                tracing::error!("An unexpected storage error occurred: {err}");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected error occurred, check the server logs for more details",
                )
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            message: self.message,
            status_code: self.status.as_u16(),
        };
        (self.status, Json(body)).into_response()
    }
}
