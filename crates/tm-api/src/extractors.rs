//! # Request Extraction & Validation
//!
//! Provides the [`Validate`] trait for request DTOs and helpers that turn
//! axum rejections into messages the handlers can surface or replace.
//!
//! Handlers take `Result<Json<T>, JsonRejection>` rather than `Json<T>` so a
//! malformed body becomes an `InvalidData` error in the API's own error shape
//! instead of axum's plain-text rejection.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::Path;
use axum::Json;
use tm_core::LicenseId;

use crate::error::AppError;

/// Trait for request types that check rules serde cannot express.
pub trait Validate {
    /// Validate business rules. Returns an error message on failure.
    fn validate(&self) -> Result<(), String>;
}

/// Unwrap a JSON body, returning the deserializer's message on failure.
pub fn extract_json<T>(result: Result<Json<T>, JsonRejection>) -> Result<T, String> {
    result.map(|Json(v)| v).map_err(|err| err.body_text())
}

/// Unwrap a JSON body and run its [`Validate`] rules.
pub fn extract_validated_json<T: Validate>(
    result: Result<Json<T>, JsonRejection>,
) -> Result<T, String> {
    let value = extract_json(result)?;
    value.validate()?;
    Ok(value)
}

/// Unwrap the `{id}` path segment as a license id.
pub fn extract_license_id(result: Result<Path<i64>, PathRejection>) -> Result<LicenseId, AppError> {
    result
        .map(|Path(id)| LicenseId::new(id))
        .map_err(|err| AppError::InvalidData(err.body_text()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::extract::FromRequest;
    use axum::http::Request;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Named {
        name: String,
    }

    impl Validate for Named {
        fn validate(&self) -> Result<(), String> {
            if self.name.trim().is_empty() {
                return Err("name must not be empty".to_string());
            }
            Ok(())
        }
    }

    async fn json_from(body: &'static str) -> Result<Json<Named>, JsonRejection> {
        let request = Request::builder()
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap();
        Json::<Named>::from_request(request, &()).await
    }

    #[tokio::test]
    async fn valid_body_passes() {
        let named = extract_validated_json(json_from(r#"{"name":"CC0"}"#).await).unwrap();
        assert_eq!(named.name, "CC0");
    }

    #[tokio::test]
    async fn wrong_type_reports_deserializer_message() {
        let err = extract_json(json_from(r#"{"name":123}"#).await).unwrap_err();
        assert!(err.contains("invalid type"), "got: {err}");
    }

    #[tokio::test]
    async fn syntax_error_is_reported() {
        assert!(extract_json(json_from("{not json").await).is_err());
    }

    #[tokio::test]
    async fn validation_rule_runs_after_deserialization() {
        let err = extract_validated_json(json_from(r#"{"name":"  "}"#).await).unwrap_err();
        assert_eq!(err, "name must not be empty");
    }
}
