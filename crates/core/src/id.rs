//! Strongly-typed identifiers used across the domain.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Identifier of a catalog product.
///
/// Ids come from an external store and are **opaque**: some look numeric
/// (`"42"`), some do not (`"a7f3"`). Equality and hashing always use the raw
/// string. Callers that want a numeric reading must ask for it explicitly via
/// [`ProductId::as_number`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Wrap a raw id without validation.
    ///
    /// Prefer [`str::parse`] at store boundaries; this constructor exists for
    /// tests and for values that were already validated.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric reading of the id, if the whole string parses as a finite number.
    pub fn as_number(&self) -> Option<f64> {
        self.0
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
    }
}

impl core::fmt::Display for ProductId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ProductId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for ProductId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for ProductId {
    type Err = DomainError;

    fn from_str(s: &str) -> DomainResult<Self> {
        if s.trim().is_empty() {
            return Err(DomainError::invalid_id("ProductId: blank"));
        }
        Ok(Self(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_ids_are_rejected() {
        let err = "   ".parse::<ProductId>().unwrap_err();
        assert!(matches!(err, DomainError::InvalidId(_)));
    }

    #[test]
    fn ids_are_kept_verbatim() {
        let id: ProductId = "007".parse().unwrap();
        assert_eq!(id.as_str(), "007");
        assert_ne!(id, ProductId::new("7"));
    }

    #[test]
    fn numeric_reading_is_optional() {
        assert_eq!(ProductId::new("10").as_number(), Some(10.0));
        assert_eq!(ProductId::new("2.5").as_number(), Some(2.5));
        assert_eq!(ProductId::new("a").as_number(), None);
        assert_eq!(ProductId::new("inf").as_number(), None);
        assert_eq!(ProductId::new("NaN").as_number(), None);
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = ProductId::new("abc");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc\"");
        let back: ProductId = serde_json::from_str("\"abc\"").unwrap();
        assert_eq!(back, id);
    }
}
