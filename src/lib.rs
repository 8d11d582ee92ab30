//! Vulntrack - dependency vulnerability tracking service
//!
//! Ingests Python `requirements.txt` manifests per application, stores each
//! application's dependency snapshot, and exposes aggregated views that check
//! every dependency against the OSV vulnerability database.

pub mod app;
pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod logging;
pub mod presentation;

pub use app::create_app;
pub use config::Config;
pub use logging::init_tracing;
