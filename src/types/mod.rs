//! Core types for the updates emitter.
//!
//! This module provides foundational types used throughout the crate:
//! - **IDs**: Strongly-typed subscription identifiers
//! - **Errors**: Application error types with thiserror derives
//! - **Config**: Observability and bus configuration

mod config;
mod errors;
mod ids;

pub use config::{BusConfig, Config, ObservabilityConfig, ISOLATE_LISTENERS_ENV, LOG_FORMAT_ENV};
pub use errors::{Error, Result};
pub use ids::SubscriptionId;
