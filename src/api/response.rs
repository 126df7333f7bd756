use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::{CredentialError, SessionTokenError};
use crate::auth::reset::ResetTokenError;
use crate::storage::{DatabaseError, PairingError};

// ============================================================================
// JSend status enum
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JSendStatus {
    Error,
    Fail,
    Success,
}

// ============================================================================
// JSend success envelope
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct JSend<T: Serialize> {
    pub data: T,
    pub status: JSendStatus,
}

impl<T: Serialize> JSend<T> {
    pub fn success(data: T) -> Json<JSend<T>> {
        Json(JSend {
            data,
            status: JSendStatus::Success,
        })
    }
}

// ============================================================================
// JSend fail envelope (client errors, 4xx)
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct JSendFail {
    pub data: FailData,
    pub status: JSendStatus,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FailData {
    pub message: String,
}

impl JSendFail {
    pub fn response(
        status_code: StatusCode,
        message: impl Into<String>,
    ) -> (StatusCode, Json<JSendFail>) {
        (
            status_code,
            Json(JSendFail {
                data: FailData {
                    message: message.into(),
                },
                status: JSendStatus::Fail,
            }),
        )
    }
}

// ============================================================================
// JSend error envelope (server errors, 5xx)
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct JSendError {
    pub message: String,
    pub status: JSendStatus,
}

impl JSendError {
    pub fn response(
        status_code: StatusCode,
        message: impl Into<String>,
    ) -> (StatusCode, Json<JSendError>) {
        (
            status_code,
            Json(JSendError {
                message: message.into(),
                status: JSendStatus::Error,
            }),
        )
    }
}

// ============================================================================
// Simple acknowledgment payload
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub msg: String,
}

impl MessageResponse {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { msg: msg.into() }
    }
}

// ============================================================================
// Unified error type for handlers
// ============================================================================

/// The failure taxonomy surfaced to callers.
///
/// 4xx variants render as a JSend `fail`, `Internal` as a JSend `error`.
/// `Internal` carries a detail string for the log; the caller only ever
/// sees the generic message.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("already logged in")]
    AlreadyAuthenticated,
    #[error("already helping someone")]
    AlreadyHelping,
    #[error("email already in use")]
    EmailInUse,
    #[error("internal server error")]
    Internal(String),
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("request unavailable")]
    RequestUnavailable,
    #[error("not authorized")]
    Unauthorized,
}

impl ApiError {
    pub fn internal(detail: impl Into<String>) -> Self {
        ApiError::Internal(detail.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::AlreadyAuthenticated
            | ApiError::AlreadyHelping
            | ApiError::RequestUnavailable => StatusCode::CONFLICT,
            ApiError::EmailInUse | ApiError::InvalidCredentials => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        if let ApiError::Internal(ref detail) = self {
            tracing::error!(detail = %detail, "Request failed");
        }

        let status = self.status_code();
        let message = self.to_string();
        if status.is_server_error() {
            let (status, json) = JSendError::response(status, message);
            (status, json).into_response()
        } else {
            let (status, json) = JSendFail::response(status, message);
            (status, json).into_response()
        }
    }
}

impl From<DatabaseError> for ApiError {
    fn from(e: DatabaseError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl From<PairingError> for ApiError {
    fn from(e: PairingError) -> Self {
        match e {
            PairingError::AlreadyHelping => ApiError::AlreadyHelping,
            PairingError::Database(inner) => ApiError::Internal(inner.to_string()),
            PairingError::Unavailable => ApiError::RequestUnavailable,
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<CredentialError> for ApiError {
    fn from(e: CredentialError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl From<SessionTokenError> for ApiError {
    fn from(e: SessionTokenError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl From<ResetTokenError> for ApiError {
    fn from(e: ResetTokenError) -> Self {
        ApiError::Internal(e.to_string())
    }
}
