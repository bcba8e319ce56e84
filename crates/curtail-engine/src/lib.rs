//! Link-resolution engine.
//!
//! This crate provides the [`LinkEngine`] orchestration over any
//! storage backend: content-addressed deduplication, identifier
//! allocation, code encoding, and insertion. Core types are
//! re-exported from `curtail_core`.

pub mod config;
pub mod engine;
pub mod error;

pub use config::{EngineConfig, ErrorReporter};
pub use engine::{LinkEngine, LinkService};
pub use error::EngineError;

pub use curtail_core::{Code, Flavor, Link};
