//! Credential wrapper that never prints its contents.

use std::fmt;

use serde::{Deserialize, Deserializer};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Opaque wrapper around a secret string such as an API key.
///
/// `Debug` and `Display` both print `[REDACTED]`. Use [`expose`](Self::expose)
/// only when building the outbound `Authorization` header.
///
/// The backing buffer is zeroed on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct Secret(String);

impl Secret {
    /// Wrap a plain value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Read-only access to the underlying value.
    ///
    /// Callers must not log or persist the returned slice.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Whether the secret is empty or whitespace only.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl Clone for Secret {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl<'de> Deserialize<'de> for Secret {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(Self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_formatting_is_redacted() {
        let secret = Secret::new("secret_abc123");
        assert_eq!(format!("{secret:?}"), "[REDACTED]");
        assert_eq!(format!("{secret}"), "[REDACTED]");
    }

    #[test]
    fn test_expose_returns_value() {
        let secret = Secret::new("secret_abc123");
        assert_eq!(secret.expose(), "secret_abc123");
    }

    #[test]
    fn test_deserialize_from_string() {
        let secret: Secret = serde_json::from_str("\"secret_xyz\"").unwrap();
        assert_eq!(secret.expose(), "secret_xyz");
        assert!(!secret.is_blank());
    }

    #[test]
    fn test_blank_detection() {
        assert!(Secret::new("   ").is_blank());
        assert!(Secret::new("").is_blank());
    }
}
