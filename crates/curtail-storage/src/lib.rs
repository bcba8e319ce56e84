//! Storage backends for the Curtail link-resolution engine.
//!
//! Three interchangeable implementations of the
//! [`Backend`](curtail_core::Backend) contract: an in-process map for
//! single-instance deployments and tests, a Redis key-value backend,
//! and an S3 object-store backend that composes an injected
//! identifier allocator. All three produce identical externally
//! observable behavior for identical call sequences.

pub mod memory;
pub mod redis;
pub mod s3;

pub use memory::MemoryBackend;
pub use redis::RedisBackend;
pub use s3::{S3Backend, S3Config};
