use crate::code::Code;
use crate::digest::Digest;
use crate::error::Result;
use async_trait::async_trait;

/// The storage contract every backend variant implements.
///
/// A backend owns three independent key spaces: `digest -> code`,
/// `code -> url`, and the identifier counter. Uniqueness is
/// first-writer-wins: exactly one `add` succeeds per digest and per
/// code, all later writers observe the matching conflict error.
///
/// `add` must be atomic to concurrent readers: the two sub-writes
/// appear either both absent or both present. The digest is the first
/// conflict checked, so callers racing on the same URL lose with
/// `DigestExists`.
#[async_trait]
pub trait Backend: Send + Sync + 'static {
    /// Atomically records `digest -> code` and `code -> long_url`.
    ///
    /// Fails with `DigestExists` if the digest is already mapped, or
    /// `CodeExists` if the code is already mapped.
    async fn add(&self, long_url: &str, digest: &Digest, code: &Code) -> Result<()>;

    /// Looks up the code stored for a digest.
    async fn get_code(&self, digest: &Digest) -> Result<Code>;

    /// Looks up the long URL stored for a code.
    async fn get_url(&self, code: &Code) -> Result<String>;

    /// Allocates the next identifier from the monotonic counter.
    ///
    /// Values are unique and strictly increasing across all concurrent
    /// callers; a value is never returned twice.
    async fn next_id(&self) -> Result<u64>;
}

/// A source of monotonic, never-repeating identifiers.
///
/// Backends with a native counter implement this alongside [`Backend`];
/// stores without one (the object-store variant) take an allocator as
/// an explicit constructor argument and delegate `next_id` to it.
#[async_trait]
pub trait IdAllocator: Send + Sync + 'static {
    /// Returns the next value from the counter.
    async fn next_id(&self) -> Result<u64>;
}
