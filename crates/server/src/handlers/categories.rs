use axum::extract::State;
use axum::Json;
use cafe_trivia_core::domain::question::category_map;

use crate::app_state::AppState;
use crate::errors::{internal, ServerError};
use crate::extract::ApiPath;
use crate::models::{CategoriesResponse, QuestionListResponse};

pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<CategoriesResponse>, ServerError> {
    let categories = state
        .store
        .categories()
        .await
        .map_err(|e| internal(e, "categories query failed"))?;

    if categories.is_empty() {
        return Err(ServerError::not_found());
    }

    Ok(Json(CategoriesResponse {
        success: true,
        categories: category_map(&categories),
    }))
}

pub async fn questions_by_category(
    State(state): State<AppState>,
    ApiPath(category_id): ApiPath<i64>,
) -> Result<Json<QuestionListResponse>, ServerError> {
    let category = state
        .store
        .category(category_id)
        .await
        .map_err(|e| internal(e, "category query failed"))?
        .ok_or_else(ServerError::not_found)?;

    let questions = state
        .store
        .questions_in_category(category_id)
        .await
        .map_err(|e| internal(e, "category questions query failed"))?;

    if questions.is_empty() {
        return Err(ServerError::not_found());
    }

    Ok(Json(QuestionListResponse {
        success: true,
        total_questions: questions.len(),
        questions,
        categories: None,
        current_category: Some(category.name),
    }))
}
