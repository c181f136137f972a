//! JSON API over saved recipes.
//!
//! Bodies are taken as drafts and validated here, so a structurally fine but
//! invalid recipe gets a 422 that says what is wrong with it.
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use mealplan::{Recipe, RecipeDraft};

use super::{AppState, RECIPE_LIST_CHANGED};
use crate::errors::{WebError, WebResult};
use crate::models::StoredRecipe;

pub async fn create(
    State(state): State<AppState>,
    Json(draft): Json<RecipeDraft>,
) -> WebResult<impl IntoResponse> {
    let recipe = Recipe::new(draft)?;
    let stored = StoredRecipe::insert(&state.db, &recipe)?;
    let location = format!("/api/v0/recipes/{}", stored.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(stored)))
}

pub async fn list(State(state): State<AppState>) -> WebResult<Json<Vec<StoredRecipe>>> {
    Ok(Json(StoredRecipe::list_all(&state.db)?))
}

pub async fn get(
    State(state): State<AppState>,
    Path(recipe_id): Path<i64>,
) -> WebResult<Json<StoredRecipe>> {
    StoredRecipe::get_by_id(&state.db, recipe_id)?
        .map(Json)
        .ok_or(WebError::NotFound)
}

pub async fn update(
    State(state): State<AppState>,
    Path(recipe_id): Path<i64>,
    Json(draft): Json<RecipeDraft>,
) -> WebResult<impl IntoResponse> {
    let recipe = Recipe::new(draft)?;
    let stored = StoredRecipe::update(&state.db, recipe_id, &recipe)?.ok_or(WebError::NotFound)?;
    let last_modified = stored.last_modified().unwrap_or_default();
    Ok(([(header::LAST_MODIFIED, last_modified)], Json(stored)))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(recipe_id): Path<i64>,
) -> WebResult<impl IntoResponse> {
    if !StoredRecipe::delete(&state.db, recipe_id)? {
        return Err(WebError::NotFound);
    }
    Ok((StatusCode::NO_CONTENT, [RECIPE_LIST_CHANGED]))
}
