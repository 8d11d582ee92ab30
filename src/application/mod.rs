//! Application services: ingestion and the derived read views.

pub mod aggregation;
pub mod errors;
pub mod ingest;

pub use aggregation::AggregationService;
pub use errors::AppError;
pub use ingest::IngestApplicationUseCase;
