use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
};
use minijinja::context;

use super::AppState;
use crate::errors::{WebError, WebResult};
use crate::models::StoredRecipe;
use crate::render::TEMPLATES;

pub async fn index(State(state): State<AppState>) -> WebResult<Html<String>> {
    let recipe_count = StoredRecipe::list_all(&state.db)?.len();
    Ok(Html(
        TEMPLATES
            .get_template("index.html.jinja")?
            .render(context! { recipe_count })?,
    ))
}

pub async fn health() -> &'static str {
    "OK"
}

pub async fn extract_page() -> WebResult<Html<String>> {
    Ok(Html(
        TEMPLATES
            .get_template("extract.html.jinja")?
            .render(context! {})?,
    ))
}

/// The full page, or only the list when HTMX is refreshing it.
pub async fn recipe_list(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> WebResult<Html<String>> {
    let recipes = StoredRecipe::list_all(&state.db)?;
    let template = if headers.contains_key("HX-Request") {
        "recipe-list.html.jinja"
    } else {
        "recipes.html.jinja"
    };
    Ok(Html(
        TEMPLATES
            .get_template(template)?
            .render(context! { recipes })?,
    ))
}

/// A saved recipe, or a full "not found" page with status 404.
pub async fn recipe_page(
    State(state): State<AppState>,
    Path(recipe_id): Path<i64>,
) -> WebResult<Response> {
    let Some(stored) = StoredRecipe::get_by_id(&state.db, recipe_id)? else {
        tracing::info!(recipe_id, "Recipe page requested for missing recipe");
        let page = TEMPLATES
            .get_template("recipe-not-found.html.jinja")?
            .render(context! {})?;
        return Ok((StatusCode::NOT_FOUND, Html(page)).into_response());
    };
    let page = TEMPLATES.get_template("recipe.html.jinja")?.render(context! {
        recipe => stored.recipe.as_draft(),
        recipe_id,
        markdown => stored.recipe.markdown(),
    })?;
    Ok(Html(page).into_response())
}

/// Serve static files from in memory using `include_dir!`
pub async fn serve_static(Path(path): Path<String>) -> WebResult<impl IntoResponse> {
    let dir = include_dir::include_dir!("$CARGO_MANIFEST_DIR/static");
    let bytes = dir.get_file(&path).ok_or(WebError::NotFound)?.contents();
    let header = (
        "Content-Type",
        match path.rsplit('.').next() {
            Some("css") => "text/css",
            Some("js") => "text/javascript",
            Some("svg") => "image/svg+xml",
            Some("png") => "image/png",
            _ => "application/octet-stream",
        },
    );
    Ok(([header], bytes))
}
