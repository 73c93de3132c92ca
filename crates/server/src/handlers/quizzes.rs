use axum::extract::State;
use axum::Json;
use cafe_trivia_core::domain::quiz::{select_next, CategorySelector};

use crate::app_state::AppState;
use crate::errors::{internal, ServerError};
use crate::extract::ApiJson;
use crate::models::{QuizRequest, QuizResponse};

pub async fn next_question(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<QuizRequest>,
) -> Result<Json<QuizResponse>, ServerError> {
    let selector = CategorySelector::parse(&payload.quiz_category.id)?;

    let pool = match selector {
        CategorySelector::All => state.store.questions().await,
        CategorySelector::Category(id) => {
            state
                .store
                .category(id)
                .await
                .map_err(|e| internal(e, "category query failed"))?
                .ok_or_else(ServerError::not_found)?;
            state.store.questions_in_category(id).await
        }
    }
    .map_err(|e| internal(e, "quiz pool query failed"))?;

    let question = select_next(&pool, &payload.previous_questions, state.rng.as_ref()).await;

    match &question {
        Some(q) => tracing::debug!(question_id = q.id, ?selector, "quiz question served"),
        None => tracing::debug!(
            served = payload.previous_questions.len(),
            ?selector,
            "quiz pool exhausted"
        ),
    }

    Ok(Json(QuizResponse {
        success: true,
        question,
    }))
}
