use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::fmt::Display;

/// A short code identifying a stored link.
///
/// Codes are produced by the codec from a monotonic identifier and are
/// resolved by direct lookup, never by decoding.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Code(SmolStr);

impl Code {
    /// Wraps an already-encoded code string.
    pub fn new(code: impl AsRef<str>) -> Self {
        Self(SmolStr::new(code.as_ref()))
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Generates the full short URL for this code.
    pub fn to_url(&self, url_prefix: &str) -> String {
        format!("{}{}", url_prefix, self.0)
    }
}

impl std::fmt::Debug for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Code").field(&self.0).finish()
    }
}

impl Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for Code {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Code {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = SmolStr::deserialize(deserializer)?;
        Ok(Self(s))
    }
}

/// Code-length policy chosen at creation time.
///
/// The adapter resolves its optional wire-level obscure flag into a
/// `Flavor` before the request reaches the core; the core never sees a
/// tri-state boolean.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Flavor {
    /// Compact code, the default.
    #[default]
    Short,
    /// Longer, intentionally less guessable code with a minimum length.
    Long,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_url_joins_prefix() {
        let code = Code::new("abc123");
        assert_eq!(code.to_url("https://curta.il/"), "https://curta.il/abc123");
    }

    #[test]
    fn serializes_as_bare_string() {
        let code = Code::new("abc123");
        assert_eq!(serde_json::to_string(&code).unwrap(), "\"abc123\"");
    }

    #[test]
    fn default_flavor_is_short() {
        assert_eq!(Flavor::default(), Flavor::Short);
    }
}
