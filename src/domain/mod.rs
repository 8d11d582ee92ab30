//! Domain model: applications, their dependency snapshots, and the
//! manifest/constraint vocabulary shared by the ingestion and query paths.

pub mod entities;
pub mod manifest;
pub mod repositories;
pub mod version_spec;

pub use entities::{Application, Dependency, DependencyUsage, NewDependency};
pub use manifest::{Constraint, ManifestParseError, Operator, ParseMode, Requirement};
pub use repositories::{ApplicationRepository, StoreError};
