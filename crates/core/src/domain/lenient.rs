//! Integers that browser forms sometimes send as strings.

use serde::{Deserialize, Deserializer};

use super::DomainError;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum LenientInt {
    Int(i64),
    Text(String),
}

impl LenientInt {
    pub fn value(&self) -> Option<i64> {
        match self {
            LenientInt::Int(n) => Some(*n),
            LenientInt::Text(s) => s.trim().parse().ok(),
        }
    }

    pub fn require(&self, field: &'static str) -> Result<i64, DomainError> {
        self.value().ok_or(DomainError::NotAnInteger { field })
    }
}

/// `deserialize_with` helper for non-negative counts such as recipe parts.
pub fn u32_from_int_or_string<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = LenientInt::deserialize(deserializer)?;
    raw.value()
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| serde::de::Error::custom("expected a non-negative integer"))
}
