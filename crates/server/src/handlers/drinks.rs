use axum::extract::State;
use axum::{Extension, Json};
use cafe_trivia_core::domain::drink::{Drink, DrinkLong, DrinkPatch, DrinkShort, NewDrink};

use crate::app_state::AppState;
use crate::auth::Claims;
use crate::errors::{internal, map_store_error, ServerError};
use crate::extract::{ApiJson, ApiPath};
use crate::models::{CreateDrinkRequest, DrinkDeletedResponse, DrinksResponse, UpdateDrinkRequest};

async fn load_drinks(state: &AppState) -> Result<Vec<Drink>, ServerError> {
    let drinks = state
        .store
        .drinks()
        .await
        .map_err(|e| internal(e, "drinks query failed"))?;
    if drinks.is_empty() {
        return Err(ServerError::not_found());
    }
    Ok(drinks)
}

pub async fn list_drinks(
    State(state): State<AppState>,
) -> Result<Json<DrinksResponse<DrinkShort>>, ServerError> {
    let drinks = load_drinks(&state).await?;
    Ok(Json(DrinksResponse {
        success: true,
        drinks: drinks.iter().map(Drink::short).collect(),
    }))
}

pub async fn list_drinks_detail(
    State(state): State<AppState>,
) -> Result<Json<DrinksResponse<DrinkLong>>, ServerError> {
    let drinks = load_drinks(&state).await?;
    Ok(Json(DrinksResponse {
        success: true,
        drinks: drinks.iter().map(Drink::long).collect(),
    }))
}

pub async fn create_drink(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiJson(payload): ApiJson<CreateDrinkRequest>,
) -> Result<Json<DrinksResponse<DrinkLong>>, ServerError> {
    let drink = NewDrink::new(&payload.title, payload.recipe.into_vec())?;

    let created = state
        .store
        .insert_drink(&drink)
        .await
        .map_err(|e| map_store_error(e, "drink create failed"))?;

    tracing::info!(
        drink_id = created.id,
        subject = claims.sub.as_deref().unwrap_or("-"),
        "drink created"
    );
    Ok(Json(DrinksResponse {
        success: true,
        drinks: vec![created.long()],
    }))
}

pub async fn update_drink(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiPath(drink_id): ApiPath<i64>,
    ApiJson(payload): ApiJson<UpdateDrinkRequest>,
) -> Result<Json<DrinksResponse<DrinkLong>>, ServerError> {
    let patch = DrinkPatch::new(
        payload.title.as_deref(),
        payload.recipe.map(|r| r.into_vec()),
    )?;

    let updated = state
        .store
        .update_drink(drink_id, &patch)
        .await
        .map_err(|e| map_store_error(e, "drink update failed"))?
        .ok_or_else(ServerError::not_found)?;

    tracing::info!(
        drink_id,
        subject = claims.sub.as_deref().unwrap_or("-"),
        "drink updated"
    );
    Ok(Json(DrinksResponse {
        success: true,
        drinks: vec![updated.long()],
    }))
}

pub async fn delete_drink(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiPath(drink_id): ApiPath<i64>,
) -> Result<Json<DrinkDeletedResponse>, ServerError> {
    let deleted = state
        .store
        .delete_drink(drink_id)
        .await
        .map_err(|e| map_store_error(e, "drink delete failed"))?;

    if !deleted {
        return Err(ServerError::not_found());
    }

    tracing::info!(
        drink_id,
        subject = claims.sub.as_deref().unwrap_or("-"),
        "drink deleted"
    );
    Ok(Json(DrinkDeletedResponse {
        success: true,
        delete: drink_id,
    }))
}
