use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use aws_smithy_types::timeout::TimeoutConfig;
use curtail_core::{Backend, Code, Digest, IdAllocator, Result, StorageError};
use std::fmt::Debug;
use std::time::Duration;
use tracing::{debug, trace};

/// S3 backend configuration.
#[derive(Debug, Clone, Default)]
pub struct S3Config {
    /// Bucket holding both key-space collections.
    pub bucket: String,
    /// Optional key prefix namespacing this deployment.
    pub prefix: Option<String>,
    /// Optional endpoint override (e.g. LocalStack/MinIO).
    pub endpoint: Option<String>,
    /// Operation timeout in milliseconds, including SDK retry time.
    pub timeout_ms: Option<u64>,
}

/// Distributed object-store backend.
///
/// Each key space is a separate namespaced collection of objects;
/// uniqueness is enforced per object by conditional create
/// (`If-None-Match: *`). The store has no native counter, so the
/// identifier allocator is injected at construction, typically the
/// key-value backend's counter.
///
/// The digest object is written before the code object, so writers
/// racing on the same URL always lose on the digest, the first
/// conflict the contract checks.
#[derive(Clone)]
pub struct S3Backend<A> {
    client: Client,
    bucket: String,
    prefix: String,
    allocator: A,
}

impl<A> Debug for S3Backend<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Backend")
            .field("bucket", &self.bucket)
            .field("prefix", &self.prefix)
            .finish()
    }
}

impl<A: IdAllocator> S3Backend<A> {
    /// Creates a backend from AWS SDK configuration.
    ///
    /// The S3 client inherits credentials, region, and HTTP settings
    /// from `sdk_config`; endpoint and timeout overrides come from
    /// `config`.
    pub fn new(sdk_config: &aws_config::SdkConfig, config: S3Config, allocator: A) -> Self {
        let mut builder = aws_sdk_s3::config::Builder::from(sdk_config);

        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint);
        }
        if let Some(timeout_ms) = config.timeout_ms {
            let timeout_config = TimeoutConfig::builder()
                .operation_timeout(Duration::from_millis(timeout_ms))
                .build();
            builder = builder.timeout_config(timeout_config);
        }

        Self::from_client(Client::from_conf(builder.build()), config.bucket, config.prefix, allocator)
    }

    /// Creates a backend from a pre-built client.
    pub fn from_client(
        client: Client,
        bucket: String,
        prefix: Option<String>,
        allocator: A,
    ) -> Self {
        Self {
            client,
            bucket,
            prefix: prefix.unwrap_or_default(),
            allocator,
        }
    }

    fn digest_key(&self, digest: &Digest) -> String {
        format!("{}url/{}", self.prefix, digest)
    }

    fn code_key(&self, code: &Code) -> String {
        format!("{}code/{}", self.prefix, code)
    }

    /// Creates an object only if it does not exist.
    ///
    /// Returns `Ok(false)` when the object was already created by
    /// another writer (HTTP 412 against `If-None-Match: *`).
    async fn put_if_absent(&self, key: &str, value: &str) -> Result<bool> {
        let result = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(value.as_bytes().to_vec()))
            .if_none_match("*")
            .send()
            .await;

        match result {
            Ok(_) => Ok(true),
            Err(e) if is_precondition_failed(&e) => Ok(false),
            Err(e) => Err(map_s3_error(e, key)),
        }
    }

    async fn get(&self, key: &str) -> Result<String> {
        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| map_s3_error(e, key))?;

        let bytes = response
            .body
            .collect()
            .await
            .map_err(|e| {
                StorageError::Unavailable(format!("failed to read body for key '{key}': {e}"))
            })?
            .into_bytes();

        String::from_utf8(bytes.to_vec()).map_err(|e| {
            StorageError::Unavailable(format!("object '{key}' is not valid utf-8: {e}"))
        })
    }
}

#[async_trait]
impl<A: IdAllocator> Backend for S3Backend<A> {
    async fn add(&self, long_url: &str, digest: &Digest, code: &Code) -> Result<()> {
        trace!(code = %code, "storing link objects");

        if !self.put_if_absent(&self.digest_key(digest), code.as_str()).await? {
            return Err(StorageError::DigestExists(digest.to_string()));
        }
        if !self.put_if_absent(&self.code_key(code), long_url).await? {
            return Err(StorageError::CodeExists(code.to_string()));
        }

        debug!(code = %code, "link objects stored");
        Ok(())
    }

    async fn get_code(&self, digest: &Digest) -> Result<Code> {
        self.get(&self.digest_key(digest)).await.map(Code::new)
    }

    async fn get_url(&self, code: &Code) -> Result<String> {
        self.get(&self.code_key(code)).await
    }

    async fn next_id(&self) -> Result<u64> {
        self.allocator.next_id().await
    }
}

/// Map an SDK error, classifying 404 as `NotFound` and everything else
/// as an unavailable backend with the cause attached.
fn map_s3_error<E: Debug>(err: aws_sdk_s3::error::SdkError<E>, key: &str) -> StorageError {
    use aws_sdk_s3::error::SdkError;

    match &err {
        SdkError::ServiceError(service_err) => {
            let status = service_err.raw().status().as_u16();
            match status {
                404 => StorageError::NotFound,
                _ => StorageError::Unavailable(format!(
                    "s3 error for key '{}' (HTTP {}): {:?}",
                    key, status, err
                )),
            }
        }
        _ => StorageError::Unavailable(format!("s3 error for key '{}': {:?}", key, err)),
    }
}

/// Check for a 412 Precondition Failed response to a conditional put.
fn is_precondition_failed<E: Debug>(err: &aws_sdk_s3::error::SdkError<E>) -> bool {
    use aws_sdk_s3::error::SdkError;

    match err {
        SdkError::ServiceError(service_err) => service_err.raw().status().as_u16() == 412,
        _ => false,
    }
}
