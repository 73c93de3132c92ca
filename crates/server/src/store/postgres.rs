use cafe_trivia_core::domain::drink::{Drink, DrinkPatch, NewDrink};
use cafe_trivia_core::domain::question::{Category, NewQuestion, Question};
use cafe_trivia_core::ports::store::{DrinkStore, StoreError, TriviaStore};
use sqlx::PgPool;

use super::{
    backend, contains_pattern, encode_recipe, into_drinks, write_error, CategoryRow, DrinkRow,
    QuestionRow,
};

pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl TriviaStore for PostgresStore {
    async fn categories(&self) -> Result<Vec<Category>, StoreError> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, type AS name FROM categories ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;
        Ok(rows.into_iter().map(Category::from).collect())
    }

    async fn category(&self, id: i64) -> Result<Option<Category>, StoreError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, type AS name FROM categories WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;
        Ok(row.map(Category::from))
    }

    async fn questions(&self) -> Result<Vec<Question>, StoreError> {
        let rows = sqlx::query_as::<_, QuestionRow>(
            "SELECT id, question, answer, category, difficulty FROM questions ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;
        Ok(rows.into_iter().map(Question::from).collect())
    }

    async fn questions_in_category(&self, category_id: i64) -> Result<Vec<Question>, StoreError> {
        let rows = sqlx::query_as::<_, QuestionRow>(
            "SELECT id, question, answer, category, difficulty FROM questions \
             WHERE category = $1 ORDER BY id",
        )
        .bind(category_id)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;
        Ok(rows.into_iter().map(Question::from).collect())
    }

    async fn search_questions(&self, term: &str) -> Result<Vec<Question>, StoreError> {
        let rows = sqlx::query_as::<_, QuestionRow>(
            "SELECT id, question, answer, category, difficulty FROM questions \
             WHERE question ILIKE $1 ESCAPE '\\' ORDER BY id",
        )
        .bind(contains_pattern(term))
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;
        Ok(rows.into_iter().map(Question::from).collect())
    }

    async fn insert_question(&self, question: &NewQuestion) -> Result<i64, StoreError> {
        sqlx::query_scalar::<_, i64>(
            "INSERT INTO questions (question, answer, category, difficulty) \
             VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(&question.question)
        .bind(&question.answer)
        .bind(question.category)
        .bind(question.difficulty)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| write_error(e, "question"))
    }

    async fn delete_question(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM questions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait::async_trait]
impl DrinkStore for PostgresStore {
    async fn drinks(&self) -> Result<Vec<Drink>, StoreError> {
        let rows = sqlx::query_as::<_, DrinkRow>("SELECT id, title, recipe FROM drinks ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?;
        into_drinks(rows)
    }

    async fn insert_drink(&self, drink: &NewDrink) -> Result<Drink, StoreError> {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO drinks (title, recipe) VALUES ($1, $2) RETURNING id",
        )
        .bind(&drink.title)
        .bind(encode_recipe(&drink.recipe)?)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| write_error(e, "drink title"))?;

        Ok(Drink {
            id,
            title: drink.title.clone(),
            recipe: drink.recipe.clone(),
        })
    }

    async fn update_drink(&self, id: i64, patch: &DrinkPatch) -> Result<Option<Drink>, StoreError> {
        let mut tx = self.pool.begin().await.map_err(backend)?;

        let row = sqlx::query_as::<_, DrinkRow>(
            "SELECT id, title, recipe FROM drinks WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(backend)?;
        let Some(row) = row else {
            return Ok(None);
        };

        let mut drink = Drink::try_from(row)?;
        patch.apply(&mut drink);

        sqlx::query("UPDATE drinks SET title = $1, recipe = $2 WHERE id = $3")
            .bind(&drink.title)
            .bind(encode_recipe(&drink.recipe)?)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| write_error(e, "drink title"))?;

        tx.commit().await.map_err(backend)?;
        Ok(Some(drink))
    }

    async fn delete_drink(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM drinks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        Ok(result.rows_affected() > 0)
    }
}
