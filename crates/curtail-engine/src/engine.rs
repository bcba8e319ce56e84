use crate::config::{EngineConfig, ErrorReporter};
use crate::error::{EngineError, Result};
use async_trait::async_trait;
use curtail_codec::{CodeCodec, CodecSettings};
use curtail_core::{url_digest, Backend, Code, Flavor, Link, StorageError};
use std::sync::Arc;
use tracing::{debug, trace, warn};
use url::Url;

/// Longest accepted input URL, in characters.
const MAX_URL_LENGTH: usize = 2000;

/// Outward-facing contract of the link-resolution engine.
#[async_trait]
pub trait LinkService: Send + Sync + 'static {
    /// Shortens a long URL, returning the stored link.
    ///
    /// Idempotent: repeated submissions of the same URL return the
    /// same code, whatever flavor was chosen first.
    async fn shorten(&self, long_url: &str, flavor: Flavor) -> Result<Link>;

    /// Resolves a code to the stored long URL, verbatim.
    async fn resolve(&self, code: &str) -> Result<String>;
}

/// Orchestrates digest deduplication, identifier allocation, code
/// encoding, and backend insertion.
///
/// The engine holds no per-request state and is safe for unbounded
/// concurrent invocation; all mutation goes through the backend's
/// individually atomic operations and no lock is held across backend
/// calls.
#[derive(Clone)]
pub struct LinkEngine<B> {
    backend: Arc<B>,
    codec: CodeCodec,
    url_prefix: String,
    error_reporter: Option<ErrorReporter>,
}

impl<B: Backend> LinkEngine<B> {
    /// Creates an engine over the given backend.
    pub fn new(backend: B, config: EngineConfig) -> Self {
        let codec = CodeCodec::new(
            CodecSettings::builder()
                .salt(config.salt)
                .min_long_length(config.long_code_min_length)
                .build(),
        );
        Self {
            backend: Arc::new(backend),
            codec,
            url_prefix: config.url_prefix,
            error_reporter: config.error_reporter,
        }
    }

    /// Rejects oversized inputs and anything that is not an absolute
    /// http(s) URL.
    fn validate_url(long_url: &str) -> Result<()> {
        if long_url.len() > MAX_URL_LENGTH {
            return Err(EngineError::InvalidUrl(format!(
                "url exceeds {MAX_URL_LENGTH} characters"
            )));
        }

        let parsed = Url::parse(long_url)
            .map_err(|e| EngineError::InvalidUrl(format!("not an absolute url: {e}")))?;
        match parsed.scheme() {
            "http" | "https" => Ok(()),
            other => Err(EngineError::InvalidUrl(format!(
                "scheme must be http or https, got '{other}'"
            ))),
        }
    }

    fn report(&self, err: &EngineError) {
        if let Some(reporter) = &self.error_reporter {
            reporter(err);
        }
    }

    /// Wraps a backend failure as an internal error and routes it to
    /// the reporter.
    fn internal(&self, err: StorageError) -> EngineError {
        let mapped = EngineError::Storage(err.to_string());
        self.report(&mapped);
        mapped
    }
}

#[async_trait]
impl<B: Backend> LinkService for LinkEngine<B> {
    async fn shorten(&self, long_url: &str, flavor: Flavor) -> Result<Link> {
        Self::validate_url(long_url)?;
        let digest = url_digest(long_url);

        // Dedup check. A hit returns the stored mapping unchanged,
        // even when the caller asked for a different flavor.
        match self.backend.get_code(&digest).await {
            Ok(code) => {
                trace!(code = %code, "url already shortened");
                return Ok(Link::new(long_url, code, &self.url_prefix));
            }
            Err(StorageError::NotFound) => {}
            Err(e) => return Err(self.internal(e)),
        }

        let id = self.backend.next_id().await.map_err(|e| self.internal(e))?;
        let code = self.codec.encode(id, flavor);
        debug!(id, code = %code, "allocated identifier for new link");

        match self.backend.add(long_url, &digest, &code).await {
            Ok(()) => Ok(Link::new(long_url, code, &self.url_prefix)),
            Err(StorageError::DigestExists(_)) => {
                // Lost the race between the dedup check and the insert.
                // The winner's mapping is authoritative; re-read it
                // instead of failing the request.
                debug!("concurrent shorten won the digest, re-reading");
                let code = self
                    .backend
                    .get_code(&digest)
                    .await
                    .map_err(|e| self.internal(e))?;
                Ok(Link::new(long_url, code, &self.url_prefix))
            }
            Err(StorageError::CodeExists(_)) => {
                // A fresh identifier encoded to an already-taken code.
                // Surfaced rather than silently retried; retry policy
                // belongs to the caller.
                warn!(id, code = %code, "code collision on freshly allocated identifier");
                let err = EngineError::CodeCollision(code.to_string());
                self.report(&err);
                Err(err)
            }
            Err(e) => Err(self.internal(e)),
        }
    }

    async fn resolve(&self, code: &str) -> Result<String> {
        let code = Code::new(code);
        match self.backend.get_url(&code).await {
            Ok(long_url) => Ok(long_url),
            Err(StorageError::NotFound) => Err(EngineError::NotFound(code.to_string())),
            Err(e) => Err(self.internal(e)),
        }
    }
}
