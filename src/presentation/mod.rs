//! HTTP surface: request/response models, handlers, and router assembly.

pub mod controllers;
pub mod middleware;
pub mod models;
pub mod routes;

pub use controllers::AppState;
pub use routes::build_router;
