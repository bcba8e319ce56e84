//! Conformance tests for the Redis backend.
//!
//! These need a reachable Redis server. Set `CURTAIL_TEST_REDIS_URL`
//! (e.g. `redis://127.0.0.1:6379`) to run them; without it every test
//! is a no-op skip. Each test namespaces its keys with a unique prefix
//! so runs never interfere.

use curtail_core::{url_digest, Backend, Code, StorageError};
use curtail_storage::RedisBackend;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

async fn test_backend(test_name: &str) -> Option<RedisBackend> {
    let url = match std::env::var("CURTAIL_TEST_REDIS_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("CURTAIL_TEST_REDIS_URL not set, skipping");
            return None;
        }
    };

    let client = redis::Client::open(url).expect("redis url");
    let conn = client
        .get_multiplexed_async_connection()
        .await
        .expect("redis connection");

    let nonce = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock after epoch")
        .as_nanos();
    Some(RedisBackend::with_prefix(
        conn,
        format!("curtail-test:{test_name}:{nonce}:"),
    ))
}

#[tokio::test]
async fn add_then_lookup_both_key_spaces() {
    let Some(backend) = test_backend("lookup").await else {
        return;
    };
    let digest = url_digest("https://example.com");

    backend
        .add("https://example.com", &digest, &Code::new("abc123"))
        .await
        .unwrap();

    assert_eq!(
        backend.get_code(&digest).await.unwrap(),
        Code::new("abc123")
    );
    assert_eq!(
        backend.get_url(&Code::new("abc123")).await.unwrap(),
        "https://example.com"
    );
}

#[tokio::test]
async fn missing_keys_are_not_found() {
    let Some(backend) = test_backend("missing").await else {
        return;
    };

    assert!(matches!(
        backend
            .get_code(&url_digest("https://nope.example"))
            .await
            .unwrap_err(),
        StorageError::NotFound
    ));
    assert!(matches!(
        backend.get_url(&Code::new("doesNotExist")).await.unwrap_err(),
        StorageError::NotFound
    ));
}

#[tokio::test]
async fn duplicate_digest_is_rejected() {
    let Some(backend) = test_backend("dup-digest").await else {
        return;
    };
    let digest = url_digest("https://example.com");

    backend
        .add("https://example.com", &digest, &Code::new("first"))
        .await
        .unwrap();
    let err = backend
        .add("https://example.com", &digest, &Code::new("second"))
        .await
        .unwrap_err();

    assert!(matches!(err, StorageError::DigestExists(_)));
    assert_eq!(backend.get_code(&digest).await.unwrap(), Code::new("first"));
}

#[tokio::test]
async fn duplicate_code_is_rejected() {
    let Some(backend) = test_backend("dup-code").await else {
        return;
    };

    backend
        .add(
            "https://example.com/a",
            &url_digest("https://example.com/a"),
            &Code::new("shared"),
        )
        .await
        .unwrap();
    let err = backend
        .add(
            "https://example.com/b",
            &url_digest("https://example.com/b"),
            &Code::new("shared"),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, StorageError::CodeExists(_)));
    // The losing write must not have clobbered either key space.
    assert_eq!(
        backend.get_url(&Code::new("shared")).await.unwrap(),
        "https://example.com/a"
    );
    assert!(matches!(
        backend
            .get_code(&url_digest("https://example.com/b"))
            .await
            .unwrap_err(),
        StorageError::NotFound
    ));
}

#[tokio::test]
async fn concurrent_allocations_never_repeat() {
    let Some(backend) = test_backend("counter").await else {
        return;
    };
    let backend = Arc::new(backend);
    let mut handles = vec![];

    for _ in 0..50 {
        let backend = Arc::clone(&backend);
        handles.push(tokio::spawn(async move {
            Backend::next_id(backend.as_ref()).await.unwrap()
        }));
    }

    let mut seen = HashSet::new();
    for handle in handles {
        assert!(seen.insert(handle.await.unwrap()));
    }
    assert_eq!(seen.len(), 50);
}
