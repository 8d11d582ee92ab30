//! Request handlers.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Multipart, Path, State};
use axum::response::Response;
use axum::Json;

use crate::application::aggregation::AggregationService;
use crate::application::errors::AppError;
use crate::application::ingest::IngestApplicationUseCase;
use crate::config::Config;
use crate::domain::manifest::ParseMode;
use crate::presentation::middleware::app_error_to_response;
use crate::presentation::models::{
    ApplicationCreateResponse, ApplicationSummaryDto, DependencyDetailDto, DependencyStatusDto,
    ErrorResponse, HealthResponse, UniqueDependencyDto, VersionLookupRequest,
    VersionLookupResponse,
};

/// Shared handler state, wired once in `create_app`.
#[derive(Clone)]
pub struct AppState {
    pub ingest: Arc<IngestApplicationUseCase>,
    pub aggregation: Arc<AggregationService>,
    pub config: Arc<Config>,
    pub startup_time: Instant,
}

/// The decoded multipart ingestion form.
struct IngestForm {
    name: String,
    description: String,
    manifest_text: String,
    mode: ParseMode,
}

async fn read_ingest_form(mut multipart: Multipart) -> Result<IngestForm, AppError> {
    let mut name = None;
    let mut description = None;
    let mut manifest_text = None;
    let mut mode = ParseMode::Strict;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("malformed multipart body: {}", e)))?
    {
        match field.name().unwrap_or_default() {
            "name" => {
                name = Some(field.text().await.map_err(|e| {
                    AppError::validation(format!("unreadable 'name' field: {}", e))
                })?);
            }
            "description" => {
                description = Some(field.text().await.map_err(|e| {
                    AppError::validation(format!("unreadable 'description' field: {}", e))
                })?);
            }
            "requirements" => {
                let bytes = field.bytes().await.map_err(|e| {
                    AppError::validation(format!("unreadable 'requirements' file: {}", e))
                })?;
                let text = String::from_utf8(bytes.to_vec()).map_err(|_| {
                    AppError::Manifest(crate::domain::manifest::ManifestParseError::new(
                        0,
                        "",
                        "requirements file is not valid UTF-8",
                    ))
                })?;
                manifest_text = Some(text);
            }
            "lenient" => {
                let value = field.text().await.unwrap_or_default();
                if matches!(value.trim(), "true" | "1" | "yes") {
                    mode = ParseMode::Lenient;
                }
            }
            other => {
                tracing::debug!(field = other, "ignoring unknown multipart field");
            }
        }
    }

    Ok(IngestForm {
        name: name.ok_or_else(|| AppError::validation("missing form field 'name'"))?,
        description: description
            .ok_or_else(|| AppError::validation("missing form field 'description'"))?,
        manifest_text: manifest_text
            .ok_or_else(|| AppError::validation("missing form field 'requirements'"))?,
        mode,
    })
}

/// POST /application - Register an application from a requirements manifest
#[utoipa::path(
    post,
    path = "/application",
    request_body(content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Application created or replaced", body = ApplicationCreateResponse),
        (status = 400, description = "Malformed or duplicated manifest entries", body = ErrorResponse),
        (status = 422, description = "Invalid form data", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    ),
    tag = "applications"
)]
pub async fn create_application(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ApplicationCreateResponse>, Response> {
    let form = read_ingest_form(multipart)
        .await
        .map_err(app_error_to_response)?;

    let application = state
        .ingest
        .execute(&form.name, &form.description, &form.manifest_text, form.mode)
        .await
        .map_err(app_error_to_response)?;

    Ok(Json(ApplicationCreateResponse {
        name: application.name,
        description: application.description,
    }))
}

/// GET /applications - All applications with their vulnerability flag
#[utoipa::path(
    get,
    path = "/applications",
    responses(
        (status = 200, description = "Applications with vulnerability flags", body = Vec<ApplicationSummaryDto>),
        (status = 500, description = "Lookup or storage failure", body = ErrorResponse)
    ),
    tag = "applications"
)]
pub async fn list_applications(
    State(state): State<AppState>,
) -> Result<Json<Vec<ApplicationSummaryDto>>, Response> {
    let overview = state
        .aggregation
        .application_overview()
        .await
        .map_err(app_error_to_response)?;
    Ok(Json(overview.into_iter().map(Into::into).collect()))
}

/// GET /application/{name}/dependencies - One application's dependencies
#[utoipa::path(
    get,
    path = "/application/{name}/dependencies",
    params(("name" = String, Path, description = "Application name")),
    responses(
        (status = 200, description = "Dependencies with vulnerability flags", body = Vec<DependencyStatusDto>),
        (status = 404, description = "Unknown application", body = ErrorResponse),
        (status = 500, description = "Lookup or storage failure", body = ErrorResponse)
    ),
    tag = "applications"
)]
pub async fn get_application_dependencies(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Vec<DependencyStatusDto>>, Response> {
    let dependencies = state
        .aggregation
        .application_dependencies(&name)
        .await
        .map_err(app_error_to_response)?;
    Ok(Json(dependencies.into_iter().map(Into::into).collect()))
}

/// GET /dependencies - Distinct dependencies across all applications
#[utoipa::path(
    get,
    path = "/dependencies",
    responses(
        (status = 200, description = "Distinct (name, version spec) pairs", body = Vec<UniqueDependencyDto>),
        (status = 500, description = "Lookup or storage failure", body = ErrorResponse)
    ),
    tag = "dependencies"
)]
pub async fn list_unique_dependencies(
    State(state): State<AppState>,
) -> Result<Json<Vec<UniqueDependencyDto>>, Response> {
    let unique = state
        .aggregation
        .unique_dependencies()
        .await
        .map_err(app_error_to_response)?;
    Ok(Json(unique.into_iter().map(Into::into).collect()))
}

/// GET /dependency/{name} - Usage detail grouped by version spec
#[utoipa::path(
    get,
    path = "/dependency/{name}",
    params(("name" = String, Path, description = "Package name")),
    responses(
        (status = 200, description = "Per-version-spec usage and vulnerabilities", body = Vec<DependencyDetailDto>),
        (status = 404, description = "No application uses this dependency", body = ErrorResponse),
        (status = 500, description = "Lookup or storage failure", body = ErrorResponse)
    ),
    tag = "dependencies"
)]
pub async fn get_dependency_detail(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Vec<DependencyDetailDto>>, Response> {
    let details = state
        .aggregation
        .dependency_detail(&name)
        .await
        .map_err(app_error_to_response)?;
    Ok(Json(details.into_iter().map(Into::into).collect()))
}

/// GET /dependency/batch/{name} - Same detail via one batched upstream call
#[utoipa::path(
    get,
    path = "/dependency/batch/{name}",
    params(("name" = String, Path, description = "Package name")),
    responses(
        (status = 200, description = "Per-version-spec usage and vulnerabilities", body = Vec<DependencyDetailDto>),
        (status = 404, description = "No application uses this dependency", body = ErrorResponse),
        (status = 500, description = "Lookup failure or batch result mismatch", body = ErrorResponse)
    ),
    tag = "dependencies"
)]
pub async fn get_dependency_detail_batched(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Vec<DependencyDetailDto>>, Response> {
    let details = state
        .aggregation
        .dependency_detail_batched(&name)
        .await
        .map_err(app_error_to_response)?;
    Ok(Json(details.into_iter().map(Into::into).collect()))
}

/// GET /dependency-no-version/{name} - Usage ignoring version specs
#[utoipa::path(
    get,
    path = "/dependency-no-version/{name}",
    params(("name" = String, Path, description = "Package name")),
    responses(
        (status = 200, description = "Applications using the dependency at any version", body = DependencyDetailDto),
        (status = 404, description = "No application uses this dependency", body = ErrorResponse),
        (status = 500, description = "Lookup or storage failure", body = ErrorResponse)
    ),
    tag = "dependencies"
)]
pub async fn get_dependency_no_version(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<DependencyDetailDto>, Response> {
    let detail = state
        .aggregation
        .dependency_no_version(&name)
        .await
        .map_err(app_error_to_response)?;
    Ok(Json(detail.into()))
}

/// POST /dependency-version - Direct lookup for an explicit version spec
#[utoipa::path(
    post,
    path = "/dependency-version",
    request_body = VersionLookupRequest,
    responses(
        (status = 200, description = "Vulnerabilities for the given spec", body = VersionLookupResponse),
        (status = 500, description = "Lookup failure", body = ErrorResponse)
    ),
    tag = "dependencies"
)]
pub async fn lookup_dependency_version(
    State(state): State<AppState>,
    Json(request): Json<VersionLookupRequest>,
) -> Result<Json<VersionLookupResponse>, Response> {
    let lookup = state
        .aggregation
        .lookup_version(&request.name, &request.version_spec)
        .await
        .map_err(app_error_to_response)?;
    Ok(Json(lookup.into()))
}

/// GET /health - Liveness probe
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is alive", body = HealthResponse)),
    tag = "health"
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.startup_time.elapsed().as_secs(),
    })
}
