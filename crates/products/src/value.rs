//! Product identity and the value objects products are described with.

use serde::{Deserialize, Serialize};

use cataloger_core::{AggregateId, DomainError, DomainResult, ValueObject};

/// Product identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub AggregateId);

impl ProductId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for ProductId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Category identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(pub AggregateId);

impl CategoryId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for CategoryId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Stock-keeping unit. Trimmed, non-empty, at most 255 characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sku(String);

impl Sku {
    pub fn new(sku: impl Into<String>) -> DomainResult<Self> {
        let sku = sku.into();
        if sku.is_empty() || sku.len() > 255 {
            return Err(DomainError::validation("sku must be 1..=255 characters"));
        }
        if sku.trim() != sku {
            return Err(DomainError::validation(
                "sku must not carry leading or trailing whitespace",
            ));
        }
        Ok(Self(sku))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ValueObject for Sku {}

impl core::fmt::Display for Sku {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Human-assigned category code. Same shape as attribute codes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryCode(String);

impl CategoryCode {
    pub fn new(code: impl Into<String>) -> DomainResult<Self> {
        let code = code.into();
        if code.is_empty() || code.len() > 128 {
            return Err(DomainError::validation(
                "category code must be 1..=128 characters",
            ));
        }
        if !code
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        {
            return Err(DomainError::validation(
                "category code allows only lowercase alphanumerics and underscores",
            ));
        }
        Ok(Self(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ValueObject for CategoryCode {}

impl core::fmt::Display for CategoryCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The product kinds the catalog distinguishes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductKind {
    Simple,
    Variable,
    Grouping,
}

impl ProductKind {
    /// The aggregate-type tag streams of this kind are stored under.
    pub fn aggregate_type(self) -> &'static str {
        match self {
            ProductKind::Simple => "product.simple",
            ProductKind::Variable => "product.variable",
            ProductKind::Grouping => "product.grouping",
        }
    }
}

impl core::fmt::Display for ProductKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.aggregate_type())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sku_rejects_padding_and_empty() {
        assert!(Sku::new("SNKRS-01").is_ok());
        assert!(Sku::new("").is_err());
        assert!(Sku::new(" SNKRS-01").is_err());
    }

    #[test]
    fn category_code_rejects_uppercase() {
        assert!(CategoryCode::new("summer_2026").is_ok());
        assert!(CategoryCode::new("Summer").is_err());
    }
}
