use axum::extract::State;
use axum::Json;
use cafe_trivia_core::domain::pagination::PageRequest;
use cafe_trivia_core::domain::question::{category_map, NewQuestion};

use crate::app_state::AppState;
use crate::errors::{internal, map_store_error, ServerError};
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::models::{
    CreateQuestionRequest, PageQuery, QuestionIdResponse, QuestionListResponse, SearchRequest,
};

pub async fn list_questions(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> Result<Json<QuestionListResponse>, ServerError> {
    let page = PageRequest::new(query.page, state.questions_per_page)?;

    let questions = state
        .store
        .questions()
        .await
        .map_err(|e| internal(e, "questions query failed"))?;

    let current = page.slice(&questions);
    if current.is_empty() {
        return Err(ServerError::not_found());
    }

    let categories = state
        .store
        .categories()
        .await
        .map_err(|e| internal(e, "categories query failed"))?;

    Ok(Json(QuestionListResponse {
        success: true,
        questions: current.to_vec(),
        total_questions: questions.len(),
        categories: Some(category_map(&categories)),
        current_category: None,
    }))
}

pub async fn create_question(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateQuestionRequest>,
) -> Result<Json<QuestionIdResponse>, ServerError> {
    let category = payload.category.require("category")?;
    let difficulty = payload.difficulty.require("difficulty")?;
    let question = NewQuestion::new(&payload.question, &payload.answer, category, difficulty)?;

    let known = state
        .store
        .category(category)
        .await
        .map_err(|e| map_store_error(e, "category lookup failed"))?;
    if known.is_none() {
        return Err(ServerError::unprocessable(format!(
            "category {category} does not exist"
        )));
    }

    let id = state
        .store
        .insert_question(&question)
        .await
        .map_err(|e| map_store_error(e, "question create failed"))?;

    tracing::info!(question_id = id, category, "question created");
    Ok(Json(QuestionIdResponse { success: true, id }))
}

pub async fn delete_question(
    State(state): State<AppState>,
    ApiPath(question_id): ApiPath<i64>,
) -> Result<Json<QuestionIdResponse>, ServerError> {
    let deleted = state
        .store
        .delete_question(question_id)
        .await
        .map_err(|e| map_store_error(e, "question delete failed"))?;

    if !deleted {
        return Err(ServerError::not_found());
    }

    tracing::info!(question_id, "question deleted");
    Ok(Json(QuestionIdResponse {
        success: true,
        id: question_id,
    }))
}

pub async fn search_questions(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<SearchRequest>,
) -> Result<Json<QuestionListResponse>, ServerError> {
    let term = payload.search_term.trim();
    if term.is_empty() {
        return Err(ServerError::bad_request("searchTerm is required"));
    }

    let questions = state
        .store
        .search_questions(term)
        .await
        .map_err(|e| internal(e, "question search failed"))?;

    // No match is reported as 404, same as an empty category.
    if questions.is_empty() {
        tracing::debug!(term, "search matched nothing");
        return Err(ServerError::not_found());
    }

    Ok(Json(QuestionListResponse {
        success: true,
        total_questions: questions.len(),
        questions,
        categories: None,
        current_category: None,
    }))
}
