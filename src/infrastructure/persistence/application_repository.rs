//! SQLx implementation of the application repository.

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::domain::entities::{Application, Dependency, DependencyUsage, NewDependency};
use crate::domain::repositories::{ApplicationRepository, StoreError};

/// SQLite-backed store for applications and their dependency snapshots.
pub struct SqlxApplicationRepository {
    pool: SqlitePool,
}

impl SqlxApplicationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApplicationRepository for SqlxApplicationRepository {
    #[tracing::instrument(skip(self, dependencies), fields(dependency_count = dependencies.len()))]
    async fn replace_snapshot(
        &self,
        name: &str,
        description: &str,
        dependencies: &[NewDependency],
    ) -> Result<Application, StoreError> {
        let mut tx = self.pool.begin().await?;

        let existing: Option<Application> =
            sqlx::query_as("SELECT id, name, description FROM applications WHERE name = ?")
                .bind(name)
                .fetch_optional(&mut *tx)
                .await?;

        let application_id = match existing {
            Some(application) => {
                // Replace-on-reingest: drop the whole previous snapshot and
                // overwrite the description before inserting the new rows.
                sqlx::query("DELETE FROM dependencies WHERE application_id = ?")
                    .bind(application.id)
                    .execute(&mut *tx)
                    .await?;
                sqlx::query("UPDATE applications SET description = ? WHERE id = ?")
                    .bind(description)
                    .bind(application.id)
                    .execute(&mut *tx)
                    .await?;
                application.id
            }
            None => {
                let result =
                    sqlx::query("INSERT INTO applications (name, description) VALUES (?, ?)")
                        .bind(name)
                        .bind(description)
                        .execute(&mut *tx)
                        .await?;
                result.last_insert_rowid()
            }
        };

        // Insert in manifest order; row ids preserve it for later reads.
        for dependency in dependencies {
            sqlx::query(
                "INSERT INTO dependencies (application_id, name, version_specs, extras) \
                 VALUES (?, ?, ?, ?)",
            )
            .bind(application_id)
            .bind(&dependency.name)
            .bind(&dependency.version_specs)
            .bind(&dependency.extras)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(Application {
            id: application_id,
            name: name.to_string(),
            description: description.to_string(),
        })
    }

    #[tracing::instrument(skip(self))]
    async fn list_applications(&self) -> Result<Vec<Application>, StoreError> {
        let applications =
            sqlx::query_as("SELECT id, name, description FROM applications ORDER BY id")
                .fetch_all(&self.pool)
                .await?;
        Ok(applications)
    }

    #[tracing::instrument(skip(self))]
    async fn find_application(&self, name: &str) -> Result<Option<Application>, StoreError> {
        let application =
            sqlx::query_as("SELECT id, name, description FROM applications WHERE name = ?")
                .bind(name)
                .fetch_optional(&self.pool)
                .await?;
        Ok(application)
    }

    #[tracing::instrument(skip(self))]
    async fn list_dependencies(
        &self,
        application_id: i64,
    ) -> Result<Vec<Dependency>, StoreError> {
        let dependencies = sqlx::query_as(
            "SELECT id, application_id, name, version_specs, extras \
             FROM dependencies WHERE application_id = ? ORDER BY id",
        )
        .bind(application_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(dependencies)
    }

    #[tracing::instrument(skip(self))]
    async fn list_all_dependencies(&self) -> Result<Vec<Dependency>, StoreError> {
        let dependencies = sqlx::query_as(
            "SELECT id, application_id, name, version_specs, extras \
             FROM dependencies ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(dependencies)
    }

    #[tracing::instrument(skip(self))]
    async fn find_dependency_usage(
        &self,
        name: &str,
    ) -> Result<Vec<DependencyUsage>, StoreError> {
        // Names are unique within one application, so each row already is a
        // distinct (version spec, application) pair.
        let usage = sqlx::query_as(
            "SELECT d.version_specs AS version_specs, a.name AS application_name \
             FROM dependencies d \
             JOIN applications a ON a.id = d.application_id \
             WHERE d.name = ? \
             ORDER BY d.id",
        )
        .bind(name)
        .fetch_all(&self.pool)
        .await?;
        Ok(usage)
    }
}
