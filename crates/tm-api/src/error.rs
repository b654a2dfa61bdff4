//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Every non-2xx response carries the same body shape:
//!
//! ```json
//! {"Error": "License Not Found", "SubCode": "NotFound"}
//! ```
//!
//! Validation, not-found and internal failures are disjoint variants.
//! Internal failures are logged where they are raised, with the operation
//! that failed, and only a fixed per-operation message reaches the client.

use std::fmt::Display;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tm_core::LicenseStoreError;
use utoipa::ToSchema;

/// Message returned whenever a license id does not resolve.
pub const LICENSE_NOT_FOUND: &str = "License Not Found";

/// Machine-readable discriminator carried in every error body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum SubCode {
    /// The request body or path failed validation.
    InvalidData,
    /// The license does not exist.
    NotFound,
    /// Anything else went wrong.
    InternalServerError,
    /// The session token is missing or invalid.
    InvalidToken,
    /// The caller is authenticated but lacks project-manager privilege.
    UserNotPermitted,
}

impl SubCode {
    /// Return the wire representation of this sub code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidData => "InvalidData",
            Self::NotFound => "NotFound",
            Self::InternalServerError => "InternalServerError",
            Self::InvalidToken => "InvalidToken",
            Self::UserNotPermitted => "UserNotPermitted",
        }
    }
}

impl std::fmt::Display for SubCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JSON error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    /// Human-readable message.
    #[serde(rename = "Error")]
    pub error: String,
    /// Machine-readable code.
    #[serde(rename = "SubCode")]
    pub sub_code: SubCode,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// Malformed or incomplete request (400).
    #[error("{0}")]
    InvalidData(String),

    /// License absent (404).
    #[error("{0}")]
    NotFound(String),

    /// Missing, invalid or insufficient credentials (401).
    #[error("{message}")]
    Unauthorized { sub_code: SubCode, message: String },

    /// Unexpected failure (500). Holds only the client-facing message; the
    /// cause was logged by [`AppError::internal`].
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    /// The 404 returned for every unknown license id.
    pub fn license_not_found() -> Self {
        Self::NotFound(LICENSE_NOT_FOUND.to_string())
    }

    /// Log an unexpected failure with its operation context and return a
    /// 500 that carries only `message`.
    pub fn internal(operation: &'static str, message: &str, cause: &dyn Display) -> Self {
        tracing::error!(operation, error = %cause, "{operation} - unhandled error");
        Self::Internal(message.to_string())
    }

    /// Map a store failure: a missing license becomes a 404, anything else a
    /// logged 500 with `message`.
    pub fn from_store(err: LicenseStoreError, operation: &'static str, message: &str) -> Self {
        match err {
            LicenseStoreError::NotFound(_) => Self::license_not_found(),
            other => Self::internal(operation, message, &other),
        }
    }

    /// Return the HTTP status code and sub code for this error.
    fn status_and_code(&self) -> (StatusCode, SubCode) {
        match self {
            Self::InvalidData(_) => (StatusCode::BAD_REQUEST, SubCode::InvalidData),
            Self::NotFound(_) => (StatusCode::NOT_FOUND, SubCode::NotFound),
            Self::Unauthorized { sub_code, .. } => (StatusCode::UNAUTHORIZED, *sub_code),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, SubCode::InternalServerError),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, sub_code) = self.status_and_code();
        let body = ErrorBody {
            error: self.to_string(),
            sub_code,
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use tm_core::LicenseId;

    async fn response_parts(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn status_codes() {
        assert_eq!(
            AppError::InvalidData("x".into()).status_and_code(),
            (StatusCode::BAD_REQUEST, SubCode::InvalidData)
        );
        assert_eq!(
            AppError::license_not_found().status_and_code(),
            (StatusCode::NOT_FOUND, SubCode::NotFound)
        );
        assert_eq!(
            AppError::Unauthorized {
                sub_code: SubCode::UserNotPermitted,
                message: "nope".into(),
            }
            .status_and_code(),
            (StatusCode::UNAUTHORIZED, SubCode::UserNotPermitted)
        );
        assert_eq!(
            AppError::Internal("boom".into()).status_and_code(),
            (StatusCode::INTERNAL_SERVER_ERROR, SubCode::InternalServerError)
        );
    }

    #[test]
    fn sub_code_serializes_as_its_name() {
        for code in [
            SubCode::InvalidData,
            SubCode::NotFound,
            SubCode::InternalServerError,
            SubCode::InvalidToken,
            SubCode::UserNotPermitted,
        ] {
            let json = serde_json::to_value(code).unwrap();
            assert_eq!(json, serde_json::Value::String(code.as_str().to_string()));
        }
    }

    #[tokio::test]
    async fn not_found_body_matches_wire_format() {
        let (status, body) = response_parts(AppError::license_not_found()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            body,
            serde_json::json!({"Error": "License Not Found", "SubCode": "NotFound"})
        );
    }

    #[tokio::test]
    async fn internal_hides_cause() {
        let err = AppError::internal(
            "License GET",
            "Unable to fetch license",
            &"db connection failed",
        );
        let (status, body) = response_parts(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["Error"], "Unable to fetch license");
        assert_eq!(body["SubCode"], "InternalServerError");
        assert!(!body.to_string().contains("db connection"));
    }

    #[test]
    fn store_not_found_maps_to_404() {
        let err = AppError::from_store(
            LicenseStoreError::NotFound(LicenseId::new(3)),
            "License DELETE",
            "Unable to delete license",
        );
        assert!(matches!(err, AppError::NotFound(ref m) if m == LICENSE_NOT_FOUND));
    }

    #[test]
    fn store_backend_maps_to_internal_with_fixed_message() {
        let err = AppError::from_store(
            LicenseStoreError::Backend("pool timed out".into()),
            "License DELETE",
            "Unable to delete license",
        );
        assert!(matches!(err, AppError::Internal(ref m) if m == "Unable to delete license"));
    }
}
