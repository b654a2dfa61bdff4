//! # OpenAPI Specification Assembly
//!
//! Collects the utoipa-documented handlers into a single OpenAPI document
//! served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI spec for the license API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Tasking Manager Imagery Licenses API",
        version = "0.1.0",
        description = "Manage the licenses that govern use of imagery in mapping projects.",
        license(name = "BSD-2-Clause")
    ),
    paths(
        crate::routes::licenses::create_license,
        crate::routes::licenses::get_license,
        crate::routes::licenses::update_license,
        crate::routes::licenses::delete_license,
        crate::routes::licenses::list_licenses,
    ),
    components(schemas(
        crate::error::ErrorBody,
        crate::error::SubCode,
        crate::routes::licenses::CreateLicenseRequest,
        crate::routes::licenses::UpdateLicenseRequest,
        crate::routes::licenses::LicenseDto,
        crate::routes::licenses::CreatedLicense,
        crate::routes::licenses::DeletedLicense,
    )),
    tags(
        (name = "licenses", description = "Imagery license management"),
    )
)]
pub struct ApiDoc;

/// Build the OpenAPI router.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

/// GET /openapi.json: Return the generated OpenAPI specification.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_lists_every_license_path() {
        let spec = ApiDoc::openapi();
        assert!(spec.paths.paths.contains_key("/licenses"));
        assert!(spec.paths.paths.contains_key("/licenses/{id}"));
    }

    #[test]
    fn spec_serializes_to_json() {
        let json = serde_json::to_value(ApiDoc::openapi()).unwrap();
        assert_eq!(json["info"]["title"], "Tasking Manager Imagery Licenses API");
    }
}
