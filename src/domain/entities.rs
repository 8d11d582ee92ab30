//! Persistent entities owned by the application store.

use serde::{Deserialize, Serialize};

/// A registered application together with its identity key.
///
/// An application exclusively owns its dependency rows: re-ingesting a
/// manifest under the same name replaces the whole snapshot, and deleting an
/// application cascades to its dependencies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Application {
    pub id: i64,
    pub name: String,
    pub description: String,
}

/// One dependency row of an application's current snapshot.
///
/// `version_specs` and `extras` hold the canonical normalized strings;
/// `None` means "any version" / "no extras".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Dependency {
    pub id: i64,
    pub application_id: i64,
    pub name: String,
    pub version_specs: Option<String>,
    pub extras: Option<String>,
}

/// A dependency row prepared for insertion, before it has an identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDependency {
    pub name: String,
    pub version_specs: Option<String>,
    pub extras: Option<String>,
}

/// One `(version spec, application)` usage of a dependency name, in
/// snapshot insertion order.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct DependencyUsage {
    pub version_specs: Option<String>,
    pub application_name: String,
}
