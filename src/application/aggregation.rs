//! Derived read views over the dependency store, correlated with the
//! vulnerability source.
//!
//! Fan-out/fan-in rules:
//! - Per-application flags short-circuit on the first vulnerable dependency,
//!   walking dependencies in snapshot insertion order. A lookup failure
//!   aborts the whole computation even if a later dependency would have been
//!   found vulnerable first; failure always wins over unseen work.
//! - Detail views group usages by distinct version spec and fetch each
//!   spec's vulnerabilities once, not once per application.

use std::collections::HashMap;
use std::sync::Arc;

use crate::application::errors::AppError;
use crate::domain::entities::Dependency;
use crate::domain::repositories::ApplicationRepository;
use crate::infrastructure::api_clients::{LookupError, VulnerabilityApiClient};

/// Per-application vulnerability flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationStatus {
    pub name: String,
    pub vulnerable: bool,
}

/// Per-dependency vulnerability flag within one application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyStatus {
    pub name: String,
    pub vulnerable: bool,
    pub version_specs: Option<String>,
}

/// A distinct `(name, version spec)` pair across all applications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueDependencyStatus {
    pub name: String,
    pub version_specs: Option<String>,
    pub vulnerable: bool,
}

/// Usage and vulnerability detail for one version spec of a dependency.
#[derive(Debug, Clone, PartialEq)]
pub struct DependencyDetail {
    pub version_specs: Option<String>,
    pub application_usage: Vec<String>,
    pub osv_vulns: Vec<serde_json::Value>,
    pub usage_count: usize,
}

/// Result of a direct single-version lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct VersionLookup {
    pub version_spec: String,
    pub osv_vulns: Vec<serde_json::Value>,
}

/// Computes the derived read views.
pub struct AggregationService {
    repository: Arc<dyn ApplicationRepository>,
    vulnerability_client: Arc<dyn VulnerabilityApiClient>,
}

impl AggregationService {
    pub fn new(
        repository: Arc<dyn ApplicationRepository>,
        vulnerability_client: Arc<dyn VulnerabilityApiClient>,
    ) -> Self {
        Self {
            repository,
            vulnerability_client,
        }
    }

    /// All applications with their any-dependency-vulnerable flag.
    #[tracing::instrument(skip(self))]
    pub async fn application_overview(&self) -> Result<Vec<ApplicationStatus>, AppError> {
        let applications = self.repository.list_applications().await?;

        let mut statuses = Vec::with_capacity(applications.len());
        for application in applications {
            let dependencies = self.repository.list_dependencies(application.id).await?;
            let vulnerable = self.any_vulnerable(&dependencies).await?;
            statuses.push(ApplicationStatus {
                name: application.name,
                vulnerable,
            });
        }
        Ok(statuses)
    }

    /// The dependency list of one application, each with its flag.
    #[tracing::instrument(skip(self))]
    pub async fn application_dependencies(
        &self,
        name: &str,
    ) -> Result<Vec<DependencyStatus>, AppError> {
        let application = self
            .repository
            .find_application(name)
            .await?
            .ok_or_else(|| AppError::not_found(format!("application '{}'", name)))?;

        let dependencies = self.repository.list_dependencies(application.id).await?;

        let mut statuses = Vec::with_capacity(dependencies.len());
        for dependency in dependencies {
            let vulnerable = self
                .vulnerability_client
                .is_vulnerable(&dependency.name, dependency.version_specs.as_deref().unwrap_or(""))
                .await?;
            statuses.push(DependencyStatus {
                name: dependency.name,
                vulnerable,
                version_specs: dependency.version_specs,
            });
        }
        Ok(statuses)
    }

    /// Distinct `(name, version spec)` pairs across all applications, in
    /// first-encounter order, each annotated with its vulnerability flag.
    #[tracing::instrument(skip(self))]
    pub async fn unique_dependencies(&self) -> Result<Vec<UniqueDependencyStatus>, AppError> {
        let dependencies = self.repository.list_all_dependencies().await?;

        let mut seen = std::collections::HashSet::new();
        let mut unique = Vec::new();
        for dependency in dependencies {
            let key = (dependency.name.clone(), dependency.version_specs.clone());
            if !seen.insert(key) {
                continue;
            }
            let vulnerable = self
                .vulnerability_client
                .is_vulnerable(&dependency.name, dependency.version_specs.as_deref().unwrap_or(""))
                .await?;
            unique.push(UniqueDependencyStatus {
                name: dependency.name,
                version_specs: dependency.version_specs,
                vulnerable,
            });
        }
        Ok(unique)
    }

    /// Usage of `name` grouped by version spec, one lookup per distinct
    /// spec. Errors with 404 when no application depends on the name.
    #[tracing::instrument(skip(self))]
    pub async fn dependency_detail(&self, name: &str) -> Result<Vec<DependencyDetail>, AppError> {
        let (order, mut groups) = self.grouped_usage(name).await?;

        let mut details = Vec::with_capacity(order.len());
        for spec in order {
            let applications = groups.remove(&spec).unwrap_or_default();
            let response = self
                .vulnerability_client
                .query(name, spec.as_deref().unwrap_or(""))
                .await?;
            details.push(DependencyDetail {
                version_specs: spec,
                usage_count: applications.len(),
                application_usage: applications,
                osv_vulns: response.vulns,
            });
        }
        Ok(details)
    }

    /// Same view as [`dependency_detail`], resolved with one batched
    /// upstream call over the distinct specs.
    ///
    /// [`dependency_detail`]: AggregationService::dependency_detail
    #[tracing::instrument(skip(self))]
    pub async fn dependency_detail_batched(
        &self,
        name: &str,
    ) -> Result<Vec<DependencyDetail>, AppError> {
        let (order, mut groups) = self.grouped_usage(name).await?;

        let specs: Vec<String> = order
            .iter()
            .map(|spec| spec.clone().unwrap_or_default())
            .collect();
        let results = self.vulnerability_client.query_batch(name, &specs).await?;

        // The client already rejects mismatched batches; re-check here so a
        // non-conforming client implementation cannot mis-zip results.
        if results.len() != order.len() {
            return Err(AppError::Lookup(LookupError::BatchLengthMismatch {
                expected: order.len(),
                actual: results.len(),
            }));
        }

        let details = order
            .into_iter()
            .zip(results)
            .map(|(spec, response)| {
                let applications = groups.remove(&spec).unwrap_or_default();
                DependencyDetail {
                    version_specs: spec,
                    usage_count: applications.len(),
                    application_usage: applications,
                    osv_vulns: response.vulns,
                }
            })
            .collect();
        Ok(details)
    }

    /// Applications depending on `name` regardless of version spec, with a
    /// single lookup for the unspecified version.
    #[tracing::instrument(skip(self))]
    pub async fn dependency_no_version(&self, name: &str) -> Result<DependencyDetail, AppError> {
        let usage = self.repository.find_dependency_usage(name).await?;
        if usage.is_empty() {
            return Err(AppError::not_found(format!("dependency '{}'", name)));
        }

        let mut seen = std::collections::HashSet::new();
        let applications: Vec<String> = usage
            .into_iter()
            .map(|row| row.application_name)
            .filter(|app| seen.insert(app.clone()))
            .collect();

        let response = self.vulnerability_client.query(name, "").await?;
        Ok(DependencyDetail {
            version_specs: None,
            usage_count: applications.len(),
            application_usage: applications,
            osv_vulns: response.vulns,
        })
    }

    /// Direct single lookup for an explicit `(name, version spec)` pair.
    #[tracing::instrument(skip(self))]
    pub async fn lookup_version(
        &self,
        name: &str,
        version_spec: &str,
    ) -> Result<VersionLookup, AppError> {
        let response = self.vulnerability_client.query(name, version_spec).await?;
        Ok(VersionLookup {
            version_spec: version_spec.to_string(),
            osv_vulns: response.vulns,
        })
    }

    /// Short-circuiting any-vulnerable scan in insertion order.
    async fn any_vulnerable(&self, dependencies: &[Dependency]) -> Result<bool, AppError> {
        for dependency in dependencies {
            let vulnerable = self
                .vulnerability_client
                .is_vulnerable(&dependency.name, dependency.version_specs.as_deref().unwrap_or(""))
                .await?;
            if vulnerable {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Group `(version spec, application)` usages of `name` by spec,
    /// preserving first-encounter order of the distinct specs.
    async fn grouped_usage(
        &self,
        name: &str,
    ) -> Result<(Vec<Option<String>>, HashMap<Option<String>, Vec<String>>), AppError> {
        let usage = self.repository.find_dependency_usage(name).await?;
        if usage.is_empty() {
            return Err(AppError::not_found(format!("dependency '{}'", name)));
        }

        let mut order: Vec<Option<String>> = Vec::new();
        let mut groups: HashMap<Option<String>, Vec<String>> = HashMap::new();
        for row in usage {
            let entry = groups.entry(row.version_specs.clone()).or_insert_with(|| {
                order.push(row.version_specs.clone());
                Vec::new()
            });
            entry.push(row.application_name);
        }
        Ok((order, groups))
    }
}
