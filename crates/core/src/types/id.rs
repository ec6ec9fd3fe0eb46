//! Newtype ID for type-safe product references.
//!
//! The backend reports product identifiers inconsistently (sometimes a JSON
//! string, sometimes a number). The ingestion boundary normalizes both to
//! this string-backed newtype, so everything downstream compares ids without
//! caring about the wire representation.

use serde::{Deserialize, Serialize};

/// A type-safe product identifier.
///
/// Opaque and stable within a catalog batch. Ordered so it can key a
/// `BTreeMap` and give carts a deterministic iteration order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Create a new ID from its string form.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the underlying string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for ProductId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ProductId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<ProductId> for String {
    fn from(id: ProductId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equality_is_stringly() {
        assert_eq!(ProductId::from("7"), ProductId::new("7"));
        assert_ne!(ProductId::from("7"), ProductId::from("07"));
    }

    #[test]
    fn test_display_roundtrip() {
        let id = ProductId::from("queso-andino");
        assert_eq!(id.to_string(), "queso-andino");
        assert_eq!(String::from(id), "queso-andino");
    }
}
