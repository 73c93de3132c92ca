use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::DomainError;

pub const MIN_DIFFICULTY: i32 = 1;
pub const MAX_DIFFICULTY: i32 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub question: String,
    pub answer: String,
    pub category: i64,
    pub difficulty: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    #[serde(rename = "type")]
    pub name: String,
}

/// A question that passed validation and is ready to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQuestion {
    pub question: String,
    pub answer: String,
    pub category: i64,
    pub difficulty: i32,
}

impl NewQuestion {
    pub fn new(
        question: &str,
        answer: &str,
        category: i64,
        difficulty: i64,
    ) -> Result<Self, DomainError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(DomainError::Blank { field: "question" });
        }
        let answer = answer.trim();
        if answer.is_empty() {
            return Err(DomainError::Blank { field: "answer" });
        }
        let difficulty = i32::try_from(difficulty)
            .ok()
            .filter(|d| (MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(d))
            .ok_or(DomainError::DifficultyOutOfRange {
                min: MIN_DIFFICULTY,
                max: MAX_DIFFICULTY,
                got: difficulty,
            })?;

        Ok(Self {
            question: question.to_string(),
            answer: answer.to_string(),
            category,
            difficulty,
        })
    }
}

/// The `{id: type}` object the frontend renders as its category list.
pub fn category_map(categories: &[Category]) -> BTreeMap<i64, String> {
    categories
        .iter()
        .map(|c| (c.id, c.name.clone()))
        .collect()
}
