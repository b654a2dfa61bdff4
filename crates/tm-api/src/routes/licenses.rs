//! # Imagery Licenses
//!
//! CRUD over the licenses that project managers attach to imagery sources.
//! Reads are public; every write requires project-manager privilege.
//!
//! ## Endpoints
//!
//! - `POST /licenses` - create license
//! - `GET /licenses` - list licenses
//! - `GET /licenses/:id` - get license
//! - `PATCH /licenses/:id` - update license
//! - `DELETE /licenses/:id` - delete license
//!
//! A create that fails validation answers with a fixed message, while an
//! update surfaces the validator's message. Existing clients depend on both
//! forms. Likewise an empty collection answers 404 rather than `[]`.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tm_core::{License, LicenseFields};
use utoipa::ToSchema;

use crate::auth::ProjectManager;
use crate::error::{AppError, ErrorBody};
use crate::extractors::{extract_json, extract_license_id, extract_validated_json, Validate};
use crate::state::AppState;

const CREATE_FAILED: &str = "Unable to create new mapping license";
const FETCH_FAILED: &str = "Unable to fetch license";
const UPDATE_FAILED: &str = "Unable to update license";
const DELETE_FAILED: &str = "Unable to delete license";
const LIST_FAILED: &str = "Unable to fetch all licenses";

// ── Request/Response DTOs ───────────────────────────────────────────

/// Request to create a license.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateLicenseRequest {
    /// Ignored on create; the store assigns the id.
    #[serde(default)]
    pub license_id: Option<i64>,
    /// Display name, e.g. "Public Domain". Required.
    #[schema(example = "Public Domain")]
    pub name: Option<String>,
    #[schema(example = "This imagery is in the public domain.")]
    pub description: Option<String>,
    /// Text shown to mappers before they use the imagery.
    #[schema(example = "This imagery is in the public domain.")]
    pub plain_text: Option<String>,
}

impl CreateLicenseRequest {
    fn into_fields(self) -> LicenseFields {
        LicenseFields {
            name: self.name,
            description: self.description,
            plain_text: self.plain_text,
        }
    }
}

impl Validate for CreateLicenseRequest {
    fn validate(&self) -> Result<(), String> {
        match self.name.as_deref() {
            None => Err("name is required".to_string()),
            Some(name) if name.trim().is_empty() => Err("name must not be empty".to_string()),
            Some(_) => Ok(()),
        }
    }
}

/// Request to update a license. Absent fields keep their stored values.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateLicenseRequest {
    /// Overwritten with the id from the path.
    #[serde(default)]
    pub license_id: Option<i64>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub plain_text: Option<String>,
}

impl UpdateLicenseRequest {
    fn into_fields(self) -> LicenseFields {
        LicenseFields {
            name: self.name,
            description: self.description,
            plain_text: self.plain_text,
        }
    }
}

impl Validate for UpdateLicenseRequest {
    fn validate(&self) -> Result<(), String> {
        if self.license_id.is_none() {
            return Err("licenseId must be bound before validation".to_string());
        }
        if let Some(ref name) = self.name {
            if name.trim().is_empty() {
                return Err("name must not be empty if provided".to_string());
            }
        }
        Ok(())
    }
}

/// A license as returned to clients.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LicenseDto {
    pub license_id: i64,
    pub name: Option<String>,
    pub description: Option<String>,
    pub plain_text: Option<String>,
}

impl From<License> for LicenseDto {
    fn from(license: License) -> Self {
        Self {
            license_id: license.id.get(),
            name: license.name,
            description: license.description,
            plain_text: license.plain_text,
        }
    }
}

/// Response to a successful create.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatedLicense {
    pub license_id: i64,
}

/// Response to a successful delete.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeletedLicense {
    #[serde(rename = "Success")]
    pub success: String,
}

// ── Router ──────────────────────────────────────────────────────────

/// Build the licenses router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/licenses", get(list_licenses).post(create_license))
        .route(
            "/licenses/:id",
            get(get_license).patch(update_license).delete(delete_license),
        )
}

// ── Item Handlers ───────────────────────────────────────────────────

/// POST /licenses: Create a new mapping license.
#[utoipa::path(
    post,
    path = "/licenses",
    request_body = CreateLicenseRequest,
    params(("Authorization" = String, Header, description = "Session token, e.g. `Token project_manager:42:secret`")),
    responses(
        (status = 201, description = "New license created", body = CreatedLicense),
        (status = 400, description = "Invalid request", body = ErrorBody),
        (status = 401, description = "Unauthorized - invalid credentials", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody),
    ),
    tag = "licenses"
)]
pub async fn create_license(
    State(state): State<AppState>,
    ProjectManager(caller): ProjectManager,
    body: Result<Json<CreateLicenseRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedLicense>), AppError> {
    let req = extract_validated_json(body).map_err(|reason| {
        tracing::warn!(%reason, "error validating license create request");
        AppError::InvalidData(CREATE_FAILED.to_string())
    })?;

    let id = state
        .licenses
        .create(req.into_fields())
        .await
        .map_err(|err| AppError::internal("License POST", CREATE_FAILED, &err))?;

    tracing::info!(license_id = %id, user_id = ?caller.user_id, "license created");
    Ok((
        StatusCode::CREATED,
        Json(CreatedLicense {
            license_id: id.get(),
        }),
    ))
}

/// GET /licenses/:id: Get a single license.
#[utoipa::path(
    get,
    path = "/licenses/{id}",
    params(("id" = i64, Path, description = "Unique license ID")),
    responses(
        (status = 200, description = "License found", body = LicenseDto),
        (status = 404, description = "License not found", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody),
    ),
    tag = "licenses"
)]
pub async fn get_license(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<LicenseDto>, AppError> {
    let id = extract_license_id(id)?;
    state
        .licenses
        .get(id)
        .await
        .map(|license| Json(license.into()))
        .map_err(|err| AppError::from_store(err, "License GET", FETCH_FAILED))
}

/// PATCH /licenses/:id: Update a license.
#[utoipa::path(
    patch,
    path = "/licenses/{id}",
    request_body = UpdateLicenseRequest,
    params(
        ("id" = i64, Path, description = "Unique license ID"),
        ("Authorization" = String, Header, description = "Session token, e.g. `Token project_manager:42:secret`"),
    ),
    responses(
        (status = 200, description = "License updated", body = LicenseDto),
        (status = 400, description = "Invalid request", body = ErrorBody),
        (status = 401, description = "Unauthorized - invalid credentials", body = ErrorBody),
        (status = 404, description = "License not found", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody),
    ),
    tag = "licenses"
)]
pub async fn update_license(
    State(state): State<AppState>,
    ProjectManager(caller): ProjectManager,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<UpdateLicenseRequest>, JsonRejection>,
) -> Result<Json<LicenseDto>, AppError> {
    let id = extract_license_id(id)?;
    let mut req = extract_json(body).map_err(invalid_update)?;
    req.license_id = Some(id.get());
    req.validate().map_err(invalid_update)?;

    let license = state
        .licenses
        .update(id, req.into_fields())
        .await
        .map_err(|err| AppError::from_store(err, "License PATCH", UPDATE_FAILED))?;

    tracing::info!(license_id = %id, user_id = ?caller.user_id, "license updated");
    Ok(Json(license.into()))
}

fn invalid_update(reason: String) -> AppError {
    tracing::warn!(%reason, "error validating license update request");
    AppError::InvalidData(reason)
}

/// DELETE /licenses/:id: Delete a license.
#[utoipa::path(
    delete,
    path = "/licenses/{id}",
    params(
        ("id" = i64, Path, description = "Unique license ID"),
        ("Authorization" = String, Header, description = "Session token, e.g. `Token project_manager:42:secret`"),
    ),
    responses(
        (status = 200, description = "License deleted", body = DeletedLicense),
        (status = 401, description = "Unauthorized - invalid credentials", body = ErrorBody),
        (status = 404, description = "License not found", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody),
    ),
    tag = "licenses"
)]
pub async fn delete_license(
    State(state): State<AppState>,
    ProjectManager(caller): ProjectManager,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<DeletedLicense>, AppError> {
    let id = extract_license_id(id)?;
    state
        .licenses
        .delete(id)
        .await
        .map_err(|err| AppError::from_store(err, "License DELETE", DELETE_FAILED))?;

    tracing::info!(license_id = %id, user_id = ?caller.user_id, "license deleted");
    Ok(Json(DeletedLicense {
        success: "License deleted".to_string(),
    }))
}

// ── Collection Handlers ─────────────────────────────────────────────

/// GET /licenses: List all imagery licenses.
#[utoipa::path(
    get,
    path = "/licenses",
    responses(
        (status = 200, description = "Licenses found", body = Vec<LicenseDto>),
        (status = 404, description = "Licenses not found", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody),
    ),
    tag = "licenses"
)]
pub async fn list_licenses(State(state): State<AppState>) -> Result<Json<Vec<LicenseDto>>, AppError> {
    let licenses = state
        .licenses
        .list()
        .await
        .map_err(|err| AppError::from_store(err, "Licenses GET", LIST_FAILED))?;

    if licenses.is_empty() {
        return Err(AppError::license_not_found());
    }
    Ok(Json(licenses.into_iter().map(LicenseDto::from).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tm_core::LicenseId;

    fn create_req(json: serde_json::Value) -> Result<CreateLicenseRequest, serde_json::Error> {
        serde_json::from_value(json)
    }

    #[test]
    fn create_request_reads_camel_case_fields() {
        let req = create_req(serde_json::json!({
            "name": "Public Domain",
            "description": "d",
            "plainText": "t"
        }))
        .unwrap();
        assert!(req.validate().is_ok());
        let fields = req.into_fields();
        assert_eq!(fields.plain_text.as_deref(), Some("t"));
    }

    #[test]
    fn create_request_requires_name() {
        let req = create_req(serde_json::json!({"description": "d"})).unwrap();
        assert_eq!(req.validate().unwrap_err(), "name is required");

        let blank = create_req(serde_json::json!({"name": " "})).unwrap();
        assert!(blank.validate().is_err());
    }

    #[test]
    fn create_request_rejects_wrong_types_and_unknown_fields() {
        assert!(create_req(serde_json::json!({"name": 123})).is_err());
        assert!(create_req(serde_json::json!({"name": "x", "colour": "red"})).is_err());
    }

    #[test]
    fn null_counts_as_absent() {
        let req = create_req(serde_json::json!({"name": "x", "description": null})).unwrap();
        assert!(req.description.is_none());
    }

    #[test]
    fn update_request_validates_only_after_id_is_bound() {
        let mut req: UpdateLicenseRequest =
            serde_json::from_value(serde_json::json!({"description": "new"})).unwrap();
        assert!(req.validate().is_err());
        req.license_id = Some(4);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn update_request_rejects_blank_name() {
        let mut req: UpdateLicenseRequest =
            serde_json::from_value(serde_json::json!({"name": ""})).unwrap();
        req.license_id = Some(1);
        assert!(req.validate().unwrap_err().contains("name must not be empty"));
    }

    #[test]
    fn license_dto_uses_wire_names() {
        let dto = LicenseDto::from(License::new(
            LicenseId::new(7),
            LicenseFields {
                name: Some("Public Domain".into()),
                description: None,
                plain_text: Some("text".into()),
            },
        ));
        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "licenseId": 7,
                "name": "Public Domain",
                "description": null,
                "plainText": "text"
            })
        );
    }

    #[test]
    fn deleted_license_body() {
        let json = serde_json::to_value(DeletedLicense {
            success: "License deleted".into(),
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"Success": "License deleted"}));
    }
}
