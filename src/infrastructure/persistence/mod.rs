//! SQLx-backed application store.

pub mod application_repository;

pub use application_repository::SqlxApplicationRepository;

/// Embedded schema migrations, run at startup and by the test harness.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
