use crate::code::Code;
use serde::Serialize;

/// A stored link: the original URL and the short code that resolves to
/// it.
///
/// Links are immutable once created; a given long URL maps to the same
/// code for the lifetime of the store. `short_url` is the code joined
/// with the deployment's URL prefix, ready for the response encoder.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Link {
    pub long_url: String,
    pub code: Code,
    pub short_url: String,
}

impl Link {
    pub fn new(long_url: impl Into<String>, code: Code, url_prefix: &str) -> Self {
        let short_url = code.to_url(url_prefix);
        Self {
            long_url: long_url.into(),
            code,
            short_url,
        }
    }
}
