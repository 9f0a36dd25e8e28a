//! Work-item lifecycle and temporal-metrics engine.
//!
//! This crate has no HTTP or database dependencies. Storage is reached only
//! through [`repository::WorkItemRepository`], so the same rules run against
//! PostgreSQL in production and the in-memory store in tests.

pub mod clock;
pub mod elapsed;
pub mod error;
pub mod identifier;
pub mod lifecycle;
pub mod repository;
pub mod search;
pub mod service;
pub mod status;
pub mod types;
pub mod work_item;
