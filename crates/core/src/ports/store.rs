//! Persistence ports. The server crate implements these over SQLite and
//! Postgres; handlers only ever see `dyn Store`.

use thiserror::Error;

use crate::domain::drink::{Drink, DrinkPatch, NewDrink};
use crate::domain::question::{Category, NewQuestion, Question};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("stored row is corrupt: {0}")]
    Corrupt(String),
    #[error("store backend error: {0}")]
    Backend(String),
}

#[async_trait::async_trait]
pub trait TriviaStore: Send + Sync {
    async fn categories(&self) -> Result<Vec<Category>, StoreError>;
    async fn category(&self, id: i64) -> Result<Option<Category>, StoreError>;

    /// All questions ordered by id.
    async fn questions(&self) -> Result<Vec<Question>, StoreError>;
    async fn questions_in_category(&self, category_id: i64) -> Result<Vec<Question>, StoreError>;

    /// Case-insensitive substring match on the question text.
    async fn search_questions(&self, term: &str) -> Result<Vec<Question>, StoreError>;

    async fn insert_question(&self, question: &NewQuestion) -> Result<i64, StoreError>;

    /// `false` when no question had that id.
    async fn delete_question(&self, id: i64) -> Result<bool, StoreError>;
}

#[async_trait::async_trait]
pub trait DrinkStore: Send + Sync {
    async fn drinks(&self) -> Result<Vec<Drink>, StoreError>;
    async fn insert_drink(&self, drink: &NewDrink) -> Result<Drink, StoreError>;
    async fn update_drink(&self, id: i64, patch: &DrinkPatch) -> Result<Option<Drink>, StoreError>;
    async fn delete_drink(&self, id: i64) -> Result<bool, StoreError>;
}

pub trait Store: TriviaStore + DrinkStore {}

impl<T: TriviaStore + DrinkStore + ?Sized> Store for T {}
