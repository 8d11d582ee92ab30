//! Infrastructure adapters: persistence, the OSV API client, and caching.

pub mod api_clients;
pub mod cache;
pub mod persistence;

pub use api_clients::{LookupError, OsvApiClient, OsvResponse, VulnerabilityApiClient};
pub use cache::VulnerabilityCache;
pub use persistence::SqlxApplicationRepository;
