use async_trait::async_trait;
use curtail_core::{Backend, Code, Digest, IdAllocator, Result, StorageError};
use redis::AsyncCommands;
use tracing::{debug, trace};

/// Key for the `digest -> code` key space.
fn digest_key(prefix: &str, digest: &Digest) -> String {
    format!("{}url:{}", prefix, digest)
}

/// Key for the `code -> url` key space.
fn code_key(prefix: &str, code: &Code) -> String {
    format!("{}code:{}", prefix, code)
}

/// Key for the identifier counter.
fn counter_key(prefix: &str) -> String {
    format!("{}id", prefix)
}

fn map_redis_error(operation: &str, err: redis::RedisError) -> StorageError {
    StorageError::Unavailable(format!("{operation}: {err}"))
}

/// Single-node key-value backend over Redis.
///
/// Uniqueness delegates to the store's native set-if-not-exists: `add`
/// is one `MSETNX` covering both keys, so the insert is atomic and the
/// check-then-write has no lost-update window. The counter delegates
/// to `INCR`. Key spaces are namespaced by a configurable prefix so
/// independent deployments can share one server.
#[derive(Debug, Clone)]
pub struct RedisBackend {
    conn: redis::aio::MultiplexedConnection,
    prefix: String,
}

impl RedisBackend {
    /// Creates a backend with an empty key prefix.
    pub fn new(conn: redis::aio::MultiplexedConnection) -> Self {
        Self::with_prefix(conn, "")
    }

    /// Creates a backend whose keys are namespaced by `prefix`.
    pub fn with_prefix(
        conn: redis::aio::MultiplexedConnection,
        prefix: impl Into<String>,
    ) -> Self {
        Self {
            conn,
            prefix: prefix.into(),
        }
    }
}

#[async_trait]
impl Backend for RedisBackend {
    async fn add(&self, long_url: &str, digest: &Digest, code: &Code) -> Result<()> {
        let digest_key = digest_key(&self.prefix, digest);
        let code_key = code_key(&self.prefix, code);
        trace!(code = %code, "storing link mapping");

        let mut conn = self.conn.clone();
        let stored: bool = conn
            .mset_nx(&[
                (digest_key.as_str(), code.as_str()),
                (code_key.as_str(), long_url),
            ])
            .await
            .map_err(|e| map_redis_error("failed to write link mapping", e))?;

        if stored {
            debug!(code = %code, "link mapping stored");
            return Ok(());
        }

        // Mappings are insert-only, so key existence is a stable fact
        // and classifies the conflict. The digest is checked first.
        let digest_taken: bool = conn
            .exists(&digest_key)
            .await
            .map_err(|e| map_redis_error("failed to classify insert conflict", e))?;
        if digest_taken {
            Err(StorageError::DigestExists(digest.to_string()))
        } else {
            Err(StorageError::CodeExists(code.to_string()))
        }
    }

    async fn get_code(&self, digest: &Digest) -> Result<Code> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn
            .get(digest_key(&self.prefix, digest))
            .await
            .map_err(|e| map_redis_error("failed to fetch code for digest", e))?;
        value.map(Code::new).ok_or(StorageError::NotFound)
    }

    async fn get_url(&self, code: &Code) -> Result<String> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn
            .get(code_key(&self.prefix, code))
            .await
            .map_err(|e| map_redis_error("failed to fetch url for code", e))?;
        value.ok_or(StorageError::NotFound)
    }

    async fn next_id(&self) -> Result<u64> {
        let mut conn = self.conn.clone();
        conn.incr(counter_key(&self.prefix), 1u64)
            .await
            .map_err(|e| map_redis_error("failed to increment id counter", e))
    }
}

#[async_trait]
impl IdAllocator for RedisBackend {
    async fn next_id(&self) -> Result<u64> {
        Backend::next_id(self).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use curtail_core::url_digest;

    #[test]
    fn key_layout() {
        let digest = url_digest("https://example.com");
        assert_eq!(
            digest_key("curtail:", &digest),
            format!("curtail:url:{digest}")
        );
        assert_eq!(code_key("curtail:", &Code::new("abc")), "curtail:code:abc");
        assert_eq!(counter_key("curtail:"), "curtail:id");
    }

    #[test]
    fn empty_prefix_keys_are_bare() {
        assert_eq!(code_key("", &Code::new("abc")), "code:abc");
        assert_eq!(counter_key(""), "id");
    }
}
