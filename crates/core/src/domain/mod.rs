pub mod drink;
pub mod lenient;
pub mod pagination;
pub mod question;
pub mod quiz;

use thiserror::Error;

/// Validation failures raised before anything reaches the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("{field} is required")]
    Blank { field: &'static str },
    #[error("{field} must be an integer")]
    NotAnInteger { field: &'static str },
    #[error("difficulty must be between {min} and {max}, got {got}")]
    DifficultyOutOfRange { min: i32, max: i32, got: i64 },
    #[error("recipe must contain at least one ingredient")]
    EmptyRecipe,
    #[error("ingredient parts must be at least 1")]
    InvalidParts,
    #[error("title or recipe is required")]
    EmptyPatch,
    #[error("page must be a positive integer")]
    InvalidPage,
    #[error("invalid quiz category '{0}'")]
    InvalidCategory(String),
}

impl DomainError {
    /// Shape errors are the caller's malformed input; the rest are
    /// well-formed values the domain refuses.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            DomainError::Blank { .. }
                | DomainError::NotAnInteger { .. }
                | DomainError::EmptyPatch
                | DomainError::InvalidPage
                | DomainError::InvalidCategory(_)
        )
    }
}
