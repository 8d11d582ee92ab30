//! API request and response models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::aggregation::{
    ApplicationStatus, DependencyDetail, DependencyStatus, UniqueDependencyStatus, VersionLookup,
};

/// Response for a created or replaced application.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApplicationCreateResponse {
    #[schema(example = "TestApp")]
    pub name: String,
    #[schema(example = "Payment backend")]
    pub description: String,
}

/// One application with its any-dependency-vulnerable flag.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApplicationSummaryDto {
    pub name: String,
    pub vulnerable: bool,
}

impl From<ApplicationStatus> for ApplicationSummaryDto {
    fn from(status: ApplicationStatus) -> Self {
        Self {
            name: status.name,
            vulnerable: status.vulnerable,
        }
    }
}

/// One dependency of an application with its vulnerability flag.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DependencyStatusDto {
    #[schema(example = "fastapi")]
    pub name: String,
    pub vulnerable: bool,
    #[schema(example = "==0.103.0")]
    pub version_specs: Option<String>,
}

impl From<DependencyStatus> for DependencyStatusDto {
    fn from(status: DependencyStatus) -> Self {
        Self {
            name: status.name,
            vulnerable: status.vulnerable,
            version_specs: status.version_specs,
        }
    }
}

/// A distinct `(name, version spec)` pair across all applications.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UniqueDependencyDto {
    pub name: String,
    pub version_specs: Option<String>,
    pub vulnerable: bool,
}

impl From<UniqueDependencyStatus> for UniqueDependencyDto {
    fn from(status: UniqueDependencyStatus) -> Self {
        Self {
            name: status.name,
            version_specs: status.version_specs,
            vulnerable: status.vulnerable,
        }
    }
}

/// Usage and vulnerability detail for one version spec of a dependency.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DependencyDetailDto {
    #[schema(example = "==0.103.0")]
    pub version_specs: Option<String>,
    pub application_usage: Vec<String>,
    /// Opaque vulnerability records from OSV, passed through verbatim.
    pub osv_vulns: Vec<serde_json::Value>,
    pub usage_count: usize,
}

impl From<DependencyDetail> for DependencyDetailDto {
    fn from(detail: DependencyDetail) -> Self {
        Self {
            version_specs: detail.version_specs,
            application_usage: detail.application_usage,
            osv_vulns: detail.osv_vulns,
            usage_count: detail.usage_count,
        }
    }
}

/// Request body for a direct version-spec lookup.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VersionLookupRequest {
    #[schema(example = "fastapi")]
    pub name: String,
    #[schema(example = "==0.103.0")]
    pub version_spec: String,
}

/// Response for a direct version-spec lookup.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VersionLookupResponse {
    pub version_spec: String,
    pub osv_vulns: Vec<serde_json::Value>,
}

impl From<VersionLookup> for VersionLookupResponse {
    fn from(lookup: VersionLookup) -> Self {
        Self {
            version_spec: lookup.version_spec,
            osv_vulns: lookup.osv_vulns,
        }
    }
}

/// Liveness response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "healthy")]
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}

/// Error envelope returned for every failed request.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Machine-readable error code
    #[schema(example = "MANIFEST_PARSE_ERROR")]
    pub code: String,

    /// Human-readable error message
    #[schema(example = "invalid requirements file: line 3: missing version")]
    pub message: String,

    /// Additional error context
    pub details: Option<serde_json::Value>,

    /// Unique request identifier for tracking
    pub request_id: Uuid,

    /// Error occurrence timestamp
    pub timestamp: DateTime<Utc>,
}
