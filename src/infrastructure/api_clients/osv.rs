//! OSV (<https://osv.dev>) API client with time-bounded result caching.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{LookupError, OsvResponse, VulnerabilityApiClient};
use crate::infrastructure::cache::VulnerabilityCache;

/// The package ecosystem this service tracks.
const ECOSYSTEM: &str = "PyPI";

#[derive(Debug, Serialize)]
struct OsvPackage<'a> {
    name: &'a str,
    ecosystem: &'a str,
}

#[derive(Debug, Serialize)]
struct OsvQuery<'a> {
    version: &'a str,
    package: OsvPackage<'a>,
}

#[derive(Debug, Serialize)]
struct OsvBatchRequest<'a> {
    queries: Vec<OsvQuery<'a>>,
}

#[derive(Debug, Deserialize)]
struct OsvBatchResponse {
    #[serde(default)]
    results: Vec<OsvResponse>,
}

/// Client for the OSV query endpoints.
///
/// Results are cached per `(name, version spec)` (and per batch tuple) in
/// the injected [`VulnerabilityCache`], so repeated queries for the same
/// dependency do not repeatedly hit the external service within the TTL.
pub struct OsvApiClient {
    http: Client,
    base_url: String,
    cache: Arc<VulnerabilityCache>,
}

impl OsvApiClient {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        cache: Arc<VulnerabilityCache>,
    ) -> Result<Self, LookupError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            cache,
        })
    }

    fn query_cache_key(name: &str, version_spec: &str) -> String {
        format!("osv:query:{}:{}", name, version_spec)
    }

    fn batch_cache_key(name: &str, version_specs: &[String]) -> String {
        format!("osv:batch:{}:{}", name, version_specs.join(";"))
    }

    async fn post_json<B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<serde_json::Value, LookupError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.http.post(&url).json(body).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status {
                status: status.as_u16(),
            });
        }

        let raw = response.text().await?;
        serde_json::from_str(&raw).map_err(LookupError::InvalidJson)
    }
}

#[async_trait]
impl VulnerabilityApiClient for OsvApiClient {
    #[tracing::instrument(skip(self))]
    async fn query(&self, name: &str, version_spec: &str) -> Result<OsvResponse, LookupError> {
        let key = Self::query_cache_key(name, version_spec);
        if let Some(cached) = self.cache.get(&key).await.map_err(LookupError::Cache)? {
            tracing::debug!(name, version_spec, "vulnerability cache hit");
            return Ok(cached);
        }

        let body = OsvQuery {
            version: version_spec,
            package: OsvPackage {
                name,
                ecosystem: ECOSYSTEM,
            },
        };
        let raw = self.post_json("/v1/query", &body).await?;
        let result: OsvResponse =
            serde_json::from_value(raw).map_err(LookupError::InvalidJson)?;

        self.cache
            .set(&key, &result)
            .await
            .map_err(LookupError::Cache)?;
        Ok(result)
    }

    #[tracing::instrument(skip(self), fields(specs = version_specs.len()))]
    async fn query_batch(
        &self,
        name: &str,
        version_specs: &[String],
    ) -> Result<Vec<OsvResponse>, LookupError> {
        let key = Self::batch_cache_key(name, version_specs);
        if let Some(cached) = self.cache.get(&key).await.map_err(LookupError::Cache)? {
            tracing::debug!(name, "batch vulnerability cache hit");
            return Ok(cached);
        }

        let body = OsvBatchRequest {
            queries: version_specs
                .iter()
                .map(|spec| OsvQuery {
                    version: spec,
                    package: OsvPackage {
                        name,
                        ecosystem: ECOSYSTEM,
                    },
                })
                .collect(),
        };
        let raw = self.post_json("/v1/querybatch", &body).await?;
        let parsed: OsvBatchResponse =
            serde_json::from_value(raw).map_err(LookupError::InvalidJson)?;

        // One result per query, same order. A short or long result list
        // would silently mis-attribute vulnerabilities, so it aborts.
        if parsed.results.len() != version_specs.len() {
            return Err(LookupError::BatchLengthMismatch {
                expected: version_specs.len(),
                actual: parsed.results.len(),
            });
        }

        self.cache
            .set(&key, &parsed.results)
            .await
            .map_err(LookupError::Cache)?;
        Ok(parsed.results)
    }
}
