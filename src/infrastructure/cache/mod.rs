//! Process-wide caching for vulnerability lookups.

pub mod memory_cache;

pub use memory_cache::VulnerabilityCache;
