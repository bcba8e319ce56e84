//! Core types and traits for the Curtail link-resolution engine.
//!
//! This crate provides the shared vocabulary used by the codec, the
//! storage backends, and the engine: the digest function, the short
//! code and link types, the error taxonomy, and the backend contract.

pub mod backend;
pub mod code;
pub mod digest;
pub mod error;
pub mod link;

pub use backend::{Backend, IdAllocator};
pub use code::{Code, Flavor};
pub use digest::{url_digest, Digest};
pub use error::{Result, StorageError};
pub use link::Link;
