mod categories;
mod drinks;
mod health;
mod questions;
mod quizzes;

use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::middleware;
use axum::routing::{delete, get, patch, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;
use crate::auth::{require_permission, PermissionGate};
use crate::errors;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/categories", get(categories::list_categories))
        .route(
            "/categories/:category_id/questions",
            get(categories::questions_by_category),
        )
        .route("/questions", get(questions::list_questions))
        .route("/questions", post(questions::create_question))
        .route("/questions/:question_id", delete(questions::delete_question))
        .route("/questions/search", post(questions::search_questions))
        .route("/questions/quizzes", post(quizzes::next_question))
        .route("/quizzes", post(quizzes::next_question))
        .route("/drinks", get(drinks::list_drinks))
        .route(
            "/drinks",
            post(drinks::create_drink).route_layer(middleware::from_fn_with_state(
                gate(&state, "post:drinks"),
                require_permission,
            )),
        )
        .route(
            "/drinks-detail",
            get(drinks::list_drinks_detail).route_layer(middleware::from_fn_with_state(
                gate(&state, "get:drinks-detail"),
                require_permission,
            )),
        )
        .route(
            "/drinks/:drink_id",
            patch(drinks::update_drink).route_layer(middleware::from_fn_with_state(
                gate(&state, "patch:drinks"),
                require_permission,
            )),
        )
        .route(
            "/drinks/:drink_id",
            delete(drinks::delete_drink).route_layer(middleware::from_fn_with_state(
                gate(&state, "delete:drinks"),
                require_permission,
            )),
        )
        .fallback(errors::not_found_fallback)
        .layer(middleware::map_response(errors::envelope_method_not_allowed))
        .layer(cors_layer(&state.allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn gate(state: &AppState, permission: &'static str) -> PermissionGate {
    PermissionGate::new(state.verifier.clone(), permission)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(
            origins
                .iter()
                .filter_map(|o| HeaderValue::from_str(o).ok()),
        )
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
}
