//! Attribute identity and classification shared across modules.

use serde::{Deserialize, Serialize};

use cataloger_core::{AggregateId, DomainError, DomainResult, ValueObject};

/// Attribute identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeId(pub AggregateId);

impl AttributeId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for AttributeId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Human-assigned attribute code (e.g. "color", "shoe_size").
///
/// Lowercase alphanumerics and underscores, 1..=128 characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeCode(String);

impl AttributeCode {
    pub fn new(code: impl Into<String>) -> DomainResult<Self> {
        let code = code.into();
        if code.is_empty() || code.len() > 128 {
            return Err(DomainError::validation(
                "attribute code must be 1..=128 characters",
            ));
        }
        if !code
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        {
            return Err(DomainError::validation(
                "attribute code allows only lowercase alphanumerics and underscores",
            ));
        }
        Ok(Self(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ValueObject for AttributeCode {}

impl core::fmt::Display for AttributeCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The kind of values an attribute holds.
///
/// Variable products may only bind on [`AttributeKind::Select`] attributes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeKind {
    Text,
    Numeric,
    Select,
    MultiSelect,
    Date,
    Image,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_codes() {
        assert!(AttributeCode::new("color").is_ok());
        assert!(AttributeCode::new("shoe_size_2").is_ok());
    }

    #[test]
    fn rejects_empty_and_uppercase_codes() {
        assert!(AttributeCode::new("").is_err());
        assert!(AttributeCode::new("Color").is_err());
        assert!(AttributeCode::new("shoe size").is_err());
    }
}
