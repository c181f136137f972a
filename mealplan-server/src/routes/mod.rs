use axum::{
    routing::{get, post},
    Router,
};
use mealplan::services::{PageFetcher, RecipeGenerator};
use std::sync::Arc;

use crate::database::Database;

pub mod actions;
pub mod api;
pub mod fragments;
pub mod pages;

/// Header asking the page to refresh any recipe list it shows.
pub const RECIPE_LIST_CHANGED: (&str, &str) = ("HX-Trigger", "recipeListChanged");

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub generator: Arc<dyn RecipeGenerator>,
    pub fetcher: Arc<dyn PageFetcher>,
}

/// All the routes of the app, without middleware.
pub fn router(state: AppState) -> Router {
    Router::new()
        // `GET /` goes to `index`
        .route("/", get(pages::index))
        // `GET /health` goes to `health`
        .route("/health", get(pages::health))
        // `GET /recipes` lists saved recipes, as a page or an HTMX fragment
        .route("/recipes", get(pages::recipe_list))
        // `GET /recipes/extract` shows the extraction page
        .route("/recipes/extract", get(pages::extract_page))
        // `GET /recipes/:recipe_id` goes to `recipe_page`
        .route("/recipes/:recipe_id", get(pages::recipe_page))
        // page-level actions
        .route("/recipes/extract/run", post(actions::extract_run))
        .route("/recipes/fetch-text", post(actions::fetch_text))
        .route("/recipes/modify", post(actions::modify))
        .route("/recipes/save", post(actions::save))
        .route("/recipes/delete", post(actions::delete))
        // incremental edits of the recipe form
        .route("/recipes/ui/add-ingredient", post(fragments::add_ingredient))
        .route("/recipes/ui/add-instruction", post(fragments::add_instruction))
        .route(
            "/recipes/ui/delete-ingredient/:index",
            post(fragments::delete_ingredient),
        )
        .route(
            "/recipes/ui/delete-instruction/:index",
            post(fragments::delete_instruction),
        )
        .route("/recipes/ui/update-diff", post(fragments::update_diff))
        .route("/recipes/ui/adjust-makes", post(fragments::adjust_makes))
        .route("/recipes/ui/adjust-servings", post(fragments::adjust_servings))
        // JSON API
        .route("/api/v0/recipes", get(api::list).post(api::create))
        .route(
            "/api/v0/recipes/:recipe_id",
            get(api::get).put(api::update).delete(api::delete),
        )
        // serve static files from the `./static` directory
        .route("/static/*path", get(pages::serve_static))
        .with_state(state)
}
