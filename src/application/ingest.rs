//! Manifest ingestion: parse, normalize, and replace an application's
//! dependency snapshot in one atomic step.

use std::sync::Arc;

use crate::application::errors::AppError;
use crate::domain::entities::{Application, NewDependency};
use crate::domain::manifest::{self, ParseMode};
use crate::domain::repositories::ApplicationRepository;
use crate::domain::version_spec::{normalize_extras, normalize_version_specs};

pub struct IngestApplicationUseCase {
    repository: Arc<dyn ApplicationRepository>,
}

impl IngestApplicationUseCase {
    pub fn new(repository: Arc<dyn ApplicationRepository>) -> Self {
        Self { repository }
    }

    /// Ingest a manifest for `name`, replacing any prior snapshot.
    ///
    /// Parse and validation failures abort before any database mutation;
    /// the store applies the replacement as a single transaction.
    #[tracing::instrument(skip(self, manifest_text))]
    pub async fn execute(
        &self,
        name: &str,
        description: &str,
        manifest_text: &str,
        mode: ParseMode,
    ) -> Result<Application, AppError> {
        let requirements = manifest::parse_manifest(manifest_text, mode)?;

        if let Some(duplicate) = manifest::find_duplicate_name(&requirements) {
            return Err(AppError::DuplicateDependency {
                name: duplicate.to_string(),
            });
        }

        let dependencies = requirements
            .iter()
            .map(|req| {
                if req.name.is_empty() {
                    return Err(AppError::validation("dependency with empty package name"));
                }
                Ok(NewDependency {
                    name: req.name.clone(),
                    version_specs: normalize_version_specs(&req.constraints),
                    extras: normalize_extras(&req.extras),
                })
            })
            .collect::<Result<Vec<_>, AppError>>()?;

        let application = self
            .repository
            .replace_snapshot(name, description, &dependencies)
            .await?;

        tracing::info!(
            application = name,
            dependencies = dependencies.len(),
            "ingested dependency snapshot"
        );
        Ok(application)
    }
}
