use crate::error::EngineError;
use std::sync::Arc;
use typed_builder::TypedBuilder;

/// Callback invoked with internal errors for out-of-band reporting.
///
/// The transport adapter typically closes over its request so the
/// report carries the originating request alongside the error.
pub type ErrorReporter = Arc<dyn Fn(&EngineError) + Send + Sync>;

/// Configuration surface for [`LinkEngine`](crate::LinkEngine).
#[derive(Clone, TypedBuilder)]
pub struct EngineConfig {
    /// Secret salt for the code codec.
    #[builder(default = String::from("salt"), setter(into))]
    pub salt: String,
    /// Prefix prepended to codes to form absolute short URLs.
    #[builder(default, setter(into))]
    pub url_prefix: String,
    /// Minimum length of long/obscure codes.
    #[builder(default = 12)]
    pub long_code_min_length: usize,
    /// Optional reporter for internal failures.
    #[builder(default, setter(strip_option))]
    pub error_reporter: Option<ErrorReporter>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}
