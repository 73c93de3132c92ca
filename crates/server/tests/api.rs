use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use cafe_trivia_core::domain::question::NewQuestion;
use cafe_trivia_core::ports::random::RandomSource;
use cafe_trivia_core::ports::store::{Store, TriviaStore};
use cafe_trivia_server::app_state::AppState;
use cafe_trivia_server::auth::TokenVerifier;
use cafe_trivia_server::db::connect_sqlite_memory;
use cafe_trivia_server::router;
use cafe_trivia_server::schema::apply_server_schema;
use http_body_util::BodyExt;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use tower::ServiceExt;

const SECRET: &str = "api-test-secret";
const AUDIENCE: &str = "coffee";
const ISSUER: &str = "https://coffee-shop.test/";

/// Always picks the first eligible question.
struct FirstPick;

#[async_trait::async_trait]
impl RandomSource for FirstPick {
    async fn next_f64(&self) -> f64 {
        0.0
    }
}

async fn app() -> (Router, Arc<dyn Store>) {
    let db = connect_sqlite_memory().await.unwrap();
    apply_server_schema(&db).await.unwrap();
    let store = db.store();
    let state = AppState {
        store: store.clone(),
        rng: Arc::new(FirstPick),
        verifier: Arc::new(TokenVerifier::hs256(SECRET.as_bytes(), AUDIENCE, ISSUER, 0)),
        questions_per_page: 10,
        allowed_origins: vec!["*".into()],
    };
    (router(state), store)
}

async fn add_question(store: &Arc<dyn Store>, text: &str, category: i64) -> i64 {
    let q = NewQuestion::new(text, "answer", category, 2).unwrap();
    store.insert_question(&q).await.unwrap()
}

fn now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

fn sign(claims: Value) -> String {
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

fn token(permissions: &[&str]) -> String {
    sign(json!({
        "sub": "auth0|barista",
        "aud": AUDIENCE,
        "iss": ISSUER,
        "exp": now() + 600,
        "permissions": permissions,
    }))
}

fn manager() -> String {
    token(&[
        "get:drinks-detail",
        "post:drinks",
        "patch:drinks",
        "delete:drinks",
    ])
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
    bearer: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(t) = bearer {
        builder = builder.header(AUTHORIZATION, format!("Bearer {t}"));
    }
    let request = match body {
        Some(b) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(b.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

fn assert_envelope(body: &Value, status: u16, message: &str) {
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], status);
    assert_eq!(body["message"], message);
}

#[tokio::test]
async fn health_reports_ok() {
    let (app, _) = app().await;
    let (status, body) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "status": "ok"}));
}

#[tokio::test]
async fn categories_are_an_id_to_type_map() {
    let (app, _) = app().await;
    let (status, body) = send(&app, Method::GET, "/categories", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["categories"]["1"], "Science");
    assert_eq!(body["categories"]["6"], "Sports");
    assert_eq!(body["categories"].as_object().unwrap().len(), 6);
}

#[tokio::test]
async fn questions_are_paginated_by_ten() {
    let (app, store) = app().await;
    for i in 0..12 {
        add_question(&store, &format!("Question number {i}?"), 1 + i % 6).await;
    }

    let (status, body) = send(&app, Method::GET, "/questions", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["questions"].as_array().unwrap().len(), 10);
    assert_eq!(body["total_questions"], 12);
    assert_eq!(body["categories"]["3"], "Geography");
    assert!(body["current_category"].is_null());

    let (status, body) = send(&app, Method::GET, "/questions?page=2", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let page: Vec<_> = body["questions"].as_array().unwrap().iter().collect();
    assert_eq!(page.len(), 2);
    assert_eq!(page[0]["question"], "Question number 10?");

    let (status, body) = send(&app, Method::GET, "/questions?page=3", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_envelope(&body, 404, "resource not found");

    let (status, body) = send(&app, Method::GET, "/questions?page=0", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], 400);

    let (status, _) = send(&app, Method::GET, "/questions?page=two", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn empty_question_bank_is_not_found() {
    let (app, _) = app().await;
    let (status, body) = send(&app, Method::GET, "/questions", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_envelope(&body, 404, "resource not found");
}

#[tokio::test]
async fn create_question_then_list_it() {
    let (app, _) = app().await;
    let payload = json!({
        "question": "  Who painted the Mona Lisa?  ",
        "answer": "Leonardo da Vinci",
        "category": "2",
        "difficulty": 3
    });
    let (status, body) = send(&app, Method::POST, "/questions", Some(payload), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let id = body["id"].as_i64().unwrap();

    let (_, body) = send(&app, Method::GET, "/questions", None, None).await;
    let created = &body["questions"][0];
    assert_eq!(created["id"], id);
    assert_eq!(created["question"], "Who painted the Mona Lisa?");
    assert_eq!(created["category"], 2);
    assert_eq!(created["difficulty"], 3);
}

#[tokio::test]
async fn create_question_rejects_bad_input() {
    let (app, _) = app().await;

    let blank = json!({"question": "  ", "answer": "a", "category": 1, "difficulty": 1});
    let (status, _) = send(&app, Method::POST, "/questions", Some(blank), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let hard = json!({"question": "q?", "answer": "a", "category": 1, "difficulty": 9});
    let (status, body) = send(&app, Method::POST, "/questions", Some(hard), None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], 422);

    let unknown = json!({"question": "q?", "answer": "a", "category": 99, "difficulty": 1});
    let (status, _) = send(&app, Method::POST, "/questions", Some(unknown), None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let wordy = json!({"question": "q?", "answer": "a", "category": "art", "difficulty": 1});
    let (status, _) = send(&app, Method::POST, "/questions", Some(wordy), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let missing = json!({"question": "q?"});
    let (status, body) = send(&app, Method::POST, "/questions", Some(missing), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_envelope(&body, 400, "bad request");
}

#[tokio::test]
async fn delete_question_once() {
    let (app, store) = app().await;
    let id = add_question(&store, "Delete me?", 1).await;

    let uri = format!("/questions/{id}");
    let (status, body) = send(&app, Method::DELETE, &uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "id": id}));

    let (status, _) = send(&app, Method::DELETE, &uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::DELETE, "/questions/abc", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn search_is_case_insensitive_substring() {
    let (app, store) = app().await;
    add_question(&store, "What is the title of the 1990 fantasy film?", 5).await;
    add_question(&store, "Which TITLE won the cup?", 6).await;
    add_question(&store, "How tall is Everest?", 3).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/questions/search",
        Some(json!({"searchTerm": "title"})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_questions"], 2);
    assert!(body["current_category"].is_null());

    let (status, _) = send(
        &app,
        Method::POST,
        "/questions/search",
        Some(json!({"searchTerm": "zebra"})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        Method::POST,
        "/questions/search",
        Some(json!({"searchTerm": "   "})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::POST,
        "/questions/search",
        Some(json!({"searchTerm": "100%"})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn questions_by_category() {
    let (app, store) = app().await;
    add_question(&store, "Speed of light?", 1).await;
    add_question(&store, "Boiling point of water?", 1).await;
    add_question(&store, "Capital of Peru?", 3).await;

    let (status, body) = send(&app, Method::GET, "/categories/1/questions", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_questions"], 2);
    assert_eq!(body["current_category"], "Science");
    assert!(body.get("categories").is_none());

    let (status, _) = send(&app, Method::GET, "/categories/2/questions", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::GET, "/categories/42/questions", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn quiz_never_repeats_and_ends_without_a_question() {
    let (app, store) = app().await;
    let first = add_question(&store, "First?", 4).await;
    let second = add_question(&store, "Second?", 4).await;
    add_question(&store, "Elsewhere?", 2).await;

    let quiz = |previous: Vec<i64>| {
        json!({"quiz_category": {"type": "History", "id": "4"}, "previous_questions": previous})
    };

    let (status, body) = send(&app, Method::POST, "/quizzes", Some(quiz(vec![])), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["question"]["id"], first);

    let (_, body) = send(&app, Method::POST, "/quizzes", Some(quiz(vec![first])), None).await;
    assert_eq!(body["question"]["id"], second);

    let (status, body) = send(
        &app,
        Method::POST,
        "/questions/quizzes",
        Some(quiz(vec![first, second])),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true}));
}

#[tokio::test]
async fn quiz_over_all_categories() {
    let (app, store) = app().await;
    let science = add_question(&store, "Science?", 1).await;
    let art = add_question(&store, "Art?", 2).await;

    for id in [json!(0), json!("all"), json!("0")] {
        let payload = json!({"quiz_category": {"id": id}, "previous_questions": [science]});
        let (status, body) = send(&app, Method::POST, "/quizzes", Some(payload), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["question"]["id"], art);
    }
}

#[tokio::test]
async fn quiz_rejects_bad_categories() {
    let (app, _) = app().await;

    let unknown = json!({"quiz_category": {"id": 77}, "previous_questions": []});
    let (status, _) = send(&app, Method::POST, "/quizzes", Some(unknown), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let garbage = json!({"quiz_category": {"id": "science"}, "previous_questions": []});
    let (status, _) = send(&app, Method::POST, "/quizzes", Some(garbage), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let missing = json!({"previous_questions": []});
    let (status, _) = send(&app, Method::POST, "/quizzes", Some(missing), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn empty_menu_is_not_found() {
    let (app, _) = app().await;
    let (status, body) = send(&app, Method::GET, "/drinks", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_envelope(&body, 404, "resource not found");
}

#[tokio::test]
async fn drink_lifecycle() {
    let (app, _) = app().await;
    let token = manager();

    let create = json!({
        "title": "matcha shake",
        "recipe": {"name": "milk", "color": "grey", "parts": "1"}
    });
    let (status, body) = send(&app, Method::POST, "/drinks", Some(create), Some(token.as_str())).await;
    assert_eq!(status, StatusCode::OK);
    let drink = &body["drinks"][0];
    let id = drink["id"].as_i64().unwrap();
    assert_eq!(drink["title"], "matcha shake");
    assert_eq!(drink["recipe"], json!([{"color": "grey", "name": "milk", "parts": 1}]));

    let (status, body) = send(&app, Method::GET, "/drinks", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["drinks"][0]["recipe"], json!([{"color": "grey", "parts": 1}]));

    let (status, body) = send(&app, Method::GET, "/drinks-detail", None, Some(token.as_str())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["drinks"][0]["recipe"][0]["name"], "milk");

    let uri = format!("/drinks/{id}");
    let patch = json!({"title": "matcha latte"});
    let (status, body) = send(&app, Method::PATCH, &uri, Some(patch), Some(token.as_str())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["drinks"][0]["title"], "matcha latte");
    assert_eq!(body["drinks"][0]["recipe"][0]["name"], "milk");

    let (status, body) = send(&app, Method::DELETE, &uri, None, Some(token.as_str())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "delete": id}));

    let (status, _) = send(&app, Method::DELETE, &uri, None, Some(token.as_str())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let patch = json!({"title": "ghost"});
    let (status, _) = send(&app, Method::PATCH, &uri, Some(patch), Some(token.as_str())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn drink_validation() {
    let (app, _) = app().await;
    let token = manager();
    let recipe = json!([{"name": "water", "color": "blue", "parts": 1}]);

    let create = json!({"title": "water", "recipe": recipe});
    let (status, _) = send(&app, Method::POST, "/drinks", Some(create.clone()), Some(token.as_str())).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, Method::POST, "/drinks", Some(create), Some(token.as_str())).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], 422);

    let empty = json!({"title": "air", "recipe": []});
    let (status, _) = send(&app, Method::POST, "/drinks", Some(empty), Some(token.as_str())).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let untitled = json!({"title": " ", "recipe": recipe});
    let (status, _) = send(&app, Method::POST, "/drinks", Some(untitled), Some(token.as_str())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, Method::PATCH, "/drinks/1", Some(json!({})), Some(token.as_str())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn renaming_a_drink_onto_a_taken_title_is_unprocessable() {
    let (app, _) = app().await;
    let token = manager();
    let recipe = json!([{"name": "espresso", "color": "brown", "parts": 1}]);

    let mut ids = Vec::new();
    for title in ["one", "two"] {
        let create = json!({"title": title, "recipe": recipe});
        let (status, body) =
            send(&app, Method::POST, "/drinks", Some(create), Some(token.as_str())).await;
        assert_eq!(status, StatusCode::OK);
        ids.push(body["drinks"][0]["id"].as_i64().unwrap());
    }

    let uri = format!("/drinks/{}", ids[1]);
    let rename = json!({"title": "one"});
    let (status, body) = send(&app, Method::PATCH, &uri, Some(rename), Some(token.as_str())).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_envelope(&body, 422, "drink update failed: drink title already exists");

    let (_, body) = send(&app, Method::GET, "/drinks", None, None).await;
    assert_eq!(body["drinks"][1]["title"], "two");
}

#[tokio::test]
async fn drink_writes_need_the_right_token() {
    let (app, _) = app().await;
    let create = json!({"title": "mocha", "recipe": [{"name": "coffee", "color": "brown", "parts": 2}]});

    let (status, body) = send(&app, Method::POST, "/drinks", Some(create.clone()), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "authorization_header_missing");

    let barista = token(&["get:drinks-detail"]);
    let (status, body) =
        send(&app, Method::POST, "/drinks", Some(create.clone()), Some(barista.as_str())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], 403);
    assert_eq!(body["code"], "unauthorized");

    let expired = sign(json!({
        "aud": AUDIENCE, "iss": ISSUER, "exp": now() - 600, "permissions": ["post:drinks"]
    }));
    let (status, body) =
        send(&app, Method::POST, "/drinks", Some(create.clone()), Some(expired.as_str())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "token_expired");

    let no_permissions = sign(json!({"aud": AUDIENCE, "iss": ISSUER, "exp": now() + 600}));
    let (status, body) =
        send(&app, Method::POST, "/drinks", Some(create.clone()), Some(no_permissions.as_str())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_claims");

    let wrong_issuer = sign(json!({
        "aud": AUDIENCE, "iss": "https://elsewhere/", "exp": now() + 600, "permissions": ["post:drinks"]
    }));
    let (status, body) =
        send(&app, Method::POST, "/drinks", Some(create.clone()), Some(wrong_issuer.as_str())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "invalid_claims");

    let (status, body) =
        send(&app, Method::POST, "/drinks", Some(create), Some("garbage")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "invalid_header");

    let (status, _) = send(&app, Method::GET, "/drinks-detail", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn permission_is_checked_before_the_drink_lookup() {
    let (app, _) = app().await;
    let barista = token(&["get:drinks-detail"]);
    let (status, _) = send(&app, Method::DELETE, "/drinks/999", None, Some(barista.as_str())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn unknown_routes_and_verbs_get_envelopes() {
    let (app, _) = app().await;

    let (status, body) = send(&app, Method::GET, "/nowhere", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_envelope(&body, 404, "resource not found");

    let (status, body) = send(&app, Method::PUT, "/drinks", None, None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_envelope(&body, 405, "method not allowed");

    let (status, body) = send(&app, Method::GET, "/questions/search", None, None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_envelope(&body, 405, "method not allowed");
}

#[tokio::test]
async fn cors_preflight_is_answered() {
    let (app, _) = app().await;
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/drinks")
        .header("origin", "http://localhost:8100")
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "authorization,content-type")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
}
