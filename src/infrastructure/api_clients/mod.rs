//! Clients for the external vulnerability source.

pub mod osv;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure talking to the vulnerability source. Never interpreted as "not
/// vulnerable" by callers; always surfaced.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("network error calling vulnerability API: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("vulnerability API returned HTTP {status}")]
    Status { status: u16 },

    #[error("invalid JSON response from vulnerability API: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("batch response length mismatch: expected {expected} results, got {actual}")]
    BatchLengthMismatch { expected: usize, actual: usize },

    #[error("cache serialization error: {0}")]
    Cache(#[source] serde_json::Error),
}

/// Opaque vulnerability result for one `(name, version spec)` pair.
///
/// The inner records are passed through verbatim; this service only tests
/// the list for non-emptiness.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OsvResponse {
    #[serde(default)]
    pub vulns: Vec<serde_json::Value>,
}

/// Lookup interface against the vulnerability source.
#[async_trait]
pub trait VulnerabilityApiClient: Send + Sync {
    /// Query vulnerabilities for a single `(name, version spec)` pair. An
    /// empty spec means "any/unspecified version".
    async fn query(&self, name: &str, version_spec: &str) -> Result<OsvResponse, LookupError>;

    /// Query one name across several version specs in a single upstream
    /// call. Order-preserving: one result per input spec, same order. A
    /// result count that differs from the request count is a hard error,
    /// never zip-truncated.
    async fn query_batch(
        &self,
        name: &str,
        version_specs: &[String],
    ) -> Result<Vec<OsvResponse>, LookupError>;

    /// True iff the source reports at least one vulnerability. Lookup
    /// failures propagate; absence is never inferred from an error.
    async fn is_vulnerable(&self, name: &str, version_spec: &str) -> Result<bool, LookupError> {
        Ok(!self.query(name, version_spec).await?.vulns.is_empty())
    }
}

pub use osv::OsvApiClient;
