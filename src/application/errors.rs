//! Application-level error taxonomy.
//!
//! Every failure is surfaced to the caller with a descriptive message; none
//! are swallowed or downgraded. In particular a vulnerability lookup failure
//! is never interpreted as "not vulnerable".

use thiserror::Error;

use crate::domain::manifest::ManifestParseError;
use crate::domain::repositories::StoreError;
use crate::infrastructure::api_clients::LookupError;

#[derive(Debug, Error)]
pub enum AppError {
    /// Bad input file; maps to HTTP 400.
    #[error("invalid requirements file: {0}")]
    Manifest(#[from] ManifestParseError),

    /// The same package declared twice in one manifest; HTTP 400.
    #[error("duplicate dependency '{name}' in manifest")]
    DuplicateDependency { name: String },

    /// Schema mismatch on internal data; HTTP 422. Should not occur on
    /// well-formed input and signals a bug when it does.
    #[error("validation failed: {message}")]
    Validation { message: String },

    /// Unknown application or dependency; HTTP 404.
    #[error("{resource} not found")]
    NotFound { resource: String },

    /// Upstream vulnerability source failure; HTTP 500.
    #[error("vulnerability lookup failed: {0}")]
    Lookup(#[from] LookupError),

    /// Database failure; HTTP 500.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation {
            message: message.into(),
        }
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        AppError::NotFound {
            resource: resource.into(),
        }
    }
}
