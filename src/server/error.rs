//! HTTP error mapping
//!
//! Every failure leaves the server as `{"error": "<message>"}` with a
//! user-facing message; internal detail only goes to the log.

use actix_web::error::BlockingError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::application::{ApplicationError, ErrorKind};
use crate::domain::DomainError;

pub const MSG_INVALID_GARDEN: &str = "Dữ liệu vườn không hợp lệ.";
pub const MSG_DUPLICATE_GARDEN: &str = "Tên vườn đã tồn tại.";
pub const MSG_GARDEN_NOT_FOUND: &str = "Không tìm thấy vườn.";
pub const MSG_INVALID_CELL: &str = "Hàng hoặc cột không hợp lệ.";
pub const MSG_INVALID_FILE: &str = "Tên tệp không hợp lệ.";
pub const MSG_INVALID_BODY: &str = "Dữ liệu gửi lên không hợp lệ.";
pub const MSG_PAYLOAD_TOO_LARGE: &str = "Dữ liệu gửi lên quá lớn.";
pub const MSG_INTERNAL: &str = "Đã có lỗi xảy ra ở server!";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("invalid garden payload")]
    InvalidGarden,

    #[error("row or col missing or not an integer")]
    InvalidCell,

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("request body exceeds the upload limit")]
    PayloadTooLarge,

    #[error(transparent)]
    App(#[from] ApplicationError),

    #[error("blocking task failed: {0}")]
    Blocking(#[from] BlockingError),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    fn public_message(&self) -> &'static str {
        match self {
            ApiError::InvalidGarden => MSG_INVALID_GARDEN,
            ApiError::InvalidCell => MSG_INVALID_CELL,
            ApiError::BadRequest(_) => MSG_INVALID_BODY,
            ApiError::PayloadTooLarge => MSG_PAYLOAD_TOO_LARGE,
            ApiError::App(e) => match e {
                ApplicationError::Domain(DomainError::InvalidFileName(_)) => MSG_INVALID_FILE,
                ApplicationError::Domain(_) => MSG_INVALID_GARDEN,
                ApplicationError::Conflict(_) => MSG_DUPLICATE_GARDEN,
                ApplicationError::NotFound(_) => MSG_GARDEN_NOT_FOUND,
                _ => MSG_INTERNAL,
            },
            ApiError::Blocking(_) => MSG_INTERNAL,
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidGarden | ApiError::InvalidCell | ApiError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::App(e) => match e.kind() {
                ErrorKind::Validation => StatusCode::BAD_REQUEST,
                ErrorKind::Conflict => StatusCode::CONFLICT,
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Blocking(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!("request failed: {self}");
        }
        HttpResponse::build(status).json(json!({ "error": self.public_message() }))
    }
}
