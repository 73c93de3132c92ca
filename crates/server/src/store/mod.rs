//! `sqlx` implementations of the core store ports.

pub mod postgres;
pub mod sqlite;

use cafe_trivia_core::domain::drink::{Drink, Ingredient};
use cafe_trivia_core::domain::question::{Category, Question};
use cafe_trivia_core::ports::store::StoreError;

#[derive(Debug, sqlx::FromRow)]
struct CategoryRow {
    id: i64,
    name: String,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct QuestionRow {
    id: i64,
    question: String,
    answer: String,
    category: i64,
    difficulty: i32,
}

impl From<QuestionRow> for Question {
    fn from(row: QuestionRow) -> Self {
        Self {
            id: row.id,
            question: row.question,
            answer: row.answer,
            category: row.category,
            difficulty: row.difficulty,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct DrinkRow {
    id: i64,
    title: String,
    recipe: String,
}

impl TryFrom<DrinkRow> for Drink {
    type Error = StoreError;

    fn try_from(row: DrinkRow) -> Result<Self, Self::Error> {
        let recipe: Vec<Ingredient> = serde_json::from_str(&row.recipe)
            .map_err(|e| StoreError::Corrupt(format!("drink {} recipe: {e}", row.id)))?;
        Ok(Self {
            id: row.id,
            title: row.title,
            recipe,
        })
    }
}

fn encode_recipe(recipe: &[Ingredient]) -> Result<String, StoreError> {
    serde_json::to_string(recipe).map_err(|e| StoreError::Corrupt(e.to_string()))
}

fn into_drinks(rows: Vec<DrinkRow>) -> Result<Vec<Drink>, StoreError> {
    rows.into_iter().map(Drink::try_from).collect()
}

/// `%term%` with LIKE metacharacters escaped by `\`.
fn contains_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

fn backend(err: sqlx::Error) -> StoreError {
    StoreError::Backend(err.to_string())
}

fn write_error(err: sqlx::Error, what: &str) -> StoreError {
    if is_unique_violation(&err) {
        return StoreError::Conflict(format!("{what} already exists"));
    }
    StoreError::Backend(err.to_string())
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db_err)
            if db_err.code().as_deref() == Some("23505")
                || db_err.code().as_deref() == Some("2067")
    )
}
