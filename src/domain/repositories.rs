//! Repository abstraction over the application store.

use async_trait::async_trait;
use thiserror::Error;

use super::entities::{Application, Dependency, DependencyUsage, NewDependency};

/// Database failure surfaced by the store; mapped to HTTP 500.
#[derive(Debug, Error)]
#[error("database error: {0}")]
pub struct StoreError(#[from] pub sqlx::Error);

/// Owns the relationship between an application and its current dependency
/// snapshot, enforcing replace-on-reingest semantics.
#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    /// Atomically replace an application's dependency snapshot.
    ///
    /// Creates the application when the name is new; otherwise deletes all
    /// existing dependency rows and overwrites the description. Either the
    /// full replacement commits or nothing is visible.
    async fn replace_snapshot(
        &self,
        name: &str,
        description: &str,
        dependencies: &[NewDependency],
    ) -> Result<Application, StoreError>;

    /// All applications, in creation order.
    async fn list_applications(&self) -> Result<Vec<Application>, StoreError>;

    /// Look up one application by its identity key.
    async fn find_application(&self, name: &str) -> Result<Option<Application>, StoreError>;

    /// The dependency rows of one application, in snapshot insertion order
    /// (manifest line order).
    async fn list_dependencies(&self, application_id: i64) -> Result<Vec<Dependency>, StoreError>;

    /// Every dependency row across all applications, in insertion order.
    async fn list_all_dependencies(&self) -> Result<Vec<Dependency>, StoreError>;

    /// All `(version spec, application name)` usages of a dependency name,
    /// in insertion order.
    async fn find_dependency_usage(&self, name: &str)
        -> Result<Vec<DependencyUsage>, StoreError>;
}
