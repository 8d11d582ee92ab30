//! Route definitions and middleware stack.

use std::time::Duration;

use axum::{
    Router,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::Config;
use crate::presentation::controllers::{
    AppState, create_application, get_application_dependencies, get_dependency_detail,
    get_dependency_detail_batched, get_dependency_no_version, health_check, list_applications,
    list_unique_dependencies, lookup_dependency_version,
};
use crate::presentation::models::{
    ApplicationCreateResponse, ApplicationSummaryDto, DependencyDetailDto, DependencyStatusDto,
    ErrorResponse, HealthResponse, UniqueDependencyDto, VersionLookupRequest,
    VersionLookupResponse,
};

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::presentation::controllers::create_application,
        crate::presentation::controllers::list_applications,
        crate::presentation::controllers::get_application_dependencies,
        crate::presentation::controllers::list_unique_dependencies,
        crate::presentation::controllers::get_dependency_detail,
        crate::presentation::controllers::get_dependency_detail_batched,
        crate::presentation::controllers::get_dependency_no_version,
        crate::presentation::controllers::lookup_dependency_version,
        crate::presentation::controllers::health_check
    ),
    components(
        schemas(
            ApplicationCreateResponse,
            ApplicationSummaryDto,
            DependencyStatusDto,
            UniqueDependencyDto,
            DependencyDetailDto,
            VersionLookupRequest,
            VersionLookupResponse,
            HealthResponse,
            ErrorResponse
        )
    ),
    tags(
        (name = "applications", description = "Application registration and per-application dependency views"),
        (name = "dependencies", description = "Cross-application dependency and vulnerability lookup endpoints"),
        (name = "health", description = "System health monitoring endpoints")
    ),
    info(
        title = "Vulntrack API",
        version = "1.0.0",
        description = "Tracks Python application dependencies and their known vulnerabilities via the OSV database."
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    )
)]
pub struct ApiDoc;

/// Create the application router with the middleware stack
pub fn build_router(state: AppState, config: &Config) -> Router {
    let api_routes = Router::new()
        .route("/application", post(create_application))
        .route("/applications", get(list_applications))
        .route(
            "/application/{name}/dependencies",
            get(get_application_dependencies),
        )
        .route("/dependencies", get(list_unique_dependencies))
        .route("/dependency/{name}", get(get_dependency_detail))
        .route("/dependency/batch/{name}", get(get_dependency_detail_batched))
        .route(
            "/dependency-no-version/{name}",
            get(get_dependency_no_version),
        )
        .route("/dependency-version", post(lookup_dependency_version))
        .route("/health", get(health_check));

    // Build CORS layer from configuration
    let cors_layer =
        if config.server.allowed_origins.len() == 1 && config.server.allowed_origins[0] == "*" {
            CorsLayer::new()
                .allow_origin(tower_http::cors::AllowOrigin::mirror_request())
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers([
                    axum::http::header::CONTENT_TYPE,
                    axum::http::header::ACCEPT,
                    axum::http::header::USER_AGENT,
                    axum::http::header::ORIGIN,
                ])
                .allow_credentials(false)
                .max_age(Duration::from_secs(3600))
        } else {
            let mut layer = CorsLayer::new();
            for origin in &config.server.allowed_origins {
                match axum::http::HeaderValue::from_str(origin) {
                    Ok(origin_header) => {
                        layer = layer.allow_origin(origin_header);
                    }
                    Err(_) => {
                        tracing::warn!(origin, "Invalid CORS origin in config; skipping");
                    }
                }
            }
            layer
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers([
                    axum::http::header::CONTENT_TYPE,
                    axum::http::header::ACCEPT,
                    axum::http::header::USER_AGENT,
                    axum::http::header::ORIGIN,
                ])
                .allow_credentials(false)
                .max_age(Duration::from_secs(3600))
        };

    let mut router = api_routes;

    // Conditionally expose Swagger UI based on configuration (avoid leaking docs in production).
    if config.server.enable_docs {
        router =
            router.merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    }

    let service_builder = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_seconds,
        )));

    router.layer(service_builder).with_state(state)
}
