//! Page-level actions: extraction, AI modification, fetching and saving.
use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse, Response},
    Form,
};
use mealplan::services::ServiceError;
use mealplan::{
    diff_recipes, normalize, parse_recipe_draft, parse_recipe_form, FormFields, Recipe,
    RecipeDraft, ORIGINAL_PREFIX,
};
use mealplan_client::ingestion::check_url;
use minijinja::context;
use serde::Deserialize;

use super::{AppState, RECIPE_LIST_CHANGED};
use crate::errors::{WebError, WebResult};
use crate::models::StoredRecipe;
use crate::render;

/// Extract a recipe from pasted text and open it in the editor.
pub async fn extract_run(
    State(state): State<AppState>,
    Form(fields): Form<Vec<(String, String)>>,
) -> WebResult<Html<String>> {
    let form = FormFields::from(fields);
    let text = form.get("recipe_text").unwrap_or_default().trim();
    if text.is_empty() {
        return extract_error("No text content provided for extraction.");
    }

    let extracted = match state.generator.generate_recipe_from_text(text).await {
        Ok(extracted) => extracted,
        Err(err) => {
            tracing::error!("Recipe extraction failed: {}", err);
            return extract_error(
                "Recipe extraction failed. Please try again or check the input text.",
            );
        }
    };
    let recipe = match normalize_recipe(&extracted) {
        Ok(recipe) => recipe,
        Err(err) => {
            tracing::warn!("Extracted recipe is invalid: {}", err);
            return extract_error("Recipe data is invalid after extraction. Please check the input text.");
        }
    };
    if recipe.instructions.is_empty() {
        tracing::warn!("Extracted recipe {} has no instructions", recipe.name);
        return extract_error(
            "Recipe extraction resulted in missing instructions. \
             Please refine your input or try a different recipe text.",
        );
    }

    tracing::info!("Extracted recipe {}", recipe.name);
    let diff = diff_recipes(&recipe, &recipe);
    Ok(Html(render::edit_form(&recipe, &recipe, &diff, "", None)?))
}

fn extract_error(message: &str) -> WebResult<Html<String>> {
    Ok(Html(render::message("extract-error", "text-error", message)?))
}

/// Normalize and then validate what a generator produced.
fn normalize_recipe(draft: &RecipeDraft) -> anyhow::Result<Recipe> {
    Ok(Recipe::new(normalize(draft)?)?)
}

/// Ask the generator to rewrite the current recipe. The baseline stays as it was.
pub async fn modify(
    State(state): State<AppState>,
    Form(fields): Form<Vec<(String, String)>>,
) -> WebResult<Html<String>> {
    let form = FormFields::from(fields);
    let prompt = form.get("modification_prompt").unwrap_or_default().trim();

    let parsed = parse_recipe_form(&form, "")
        .and_then(|current| Ok((current, parse_recipe_form(&form, ORIGINAL_PREFIX)?)));
    let (current, original) = match parsed {
        Ok(parsed) => parsed,
        Err(err) => {
            tracing::warn!("Invalid recipe submitted for modification: {}", err);
            return rerender_with_error(&form, prompt, "Invalid recipe data. Please check the fields.");
        }
    };
    if prompt.is_empty() {
        return edit_form_with_error(&current, &original, prompt, "Please enter modification instructions.");
    }

    let modified = match state.generator.generate_modified_recipe(&current, prompt).await {
        Ok(modified) => modified,
        Err(err @ ServiceError::MissingConfiguration(_)) => {
            tracing::error!("Recipe modification is misconfigured: {}", err);
            return edit_form_with_error(
                &current,
                &original,
                prompt,
                "Service configuration error. Please try again later.",
            );
        }
        Err(err) => {
            tracing::error!("Recipe modification failed: {}", err);
            return edit_form_with_error(&current, &original, prompt, "Recipe modification failed. Please try again.");
        }
    };
    let modified = match normalize_recipe(&modified) {
        Ok(modified) => modified,
        Err(err) => {
            tracing::warn!("Modified recipe is invalid: {}", err);
            return edit_form_with_error(
                &current,
                &original,
                prompt,
                "Invalid recipe data after modification attempt.",
            );
        }
    };

    tracing::info!("Modified recipe {} with: {}", modified.name, prompt);
    let diff = diff_recipes(&original, &modified);
    Ok(Html(render::edit_form(&modified, &original, &diff, prompt, None)?))
}

fn edit_form_with_error(
    current: &RecipeDraft,
    original: &RecipeDraft,
    prompt: &str,
    message: &str,
) -> WebResult<Html<String>> {
    let diff = diff_recipes(original, current);
    Ok(Html(render::edit_form(current, original, &diff, prompt, Some(message))?))
}

/// Show the form exactly as submitted when it can't be parsed as recipes.
fn rerender_with_error(form: &FormFields, prompt: &str, message: &str) -> WebResult<Html<String>> {
    let current = parse_recipe_draft(form, "");
    let original = parse_recipe_draft(form, ORIGINAL_PREFIX);
    edit_form_with_error(&current, &original, prompt, message)
}

/// Fetch a recipe page and fill the text area with its text.
pub async fn fetch_text(
    State(state): State<AppState>,
    Form(fields): Form<Vec<(String, String)>>,
) -> WebResult<Html<String>> {
    let form = FormFields::from(fields);
    let existing_text = form.get("recipe_text").unwrap_or_default();
    let input_url = form.get("input_url").unwrap_or_default().trim();
    if input_url.is_empty() {
        return fetch_text_html(existing_text, Some("Please provide a Recipe URL to fetch."));
    }
    let url = match check_url(input_url) {
        Ok(url) => url,
        Err(err) => {
            tracing::warn!("Refusing to fetch {}: {}", input_url, err);
            return fetch_text_html(existing_text, Some(&err.user_message()));
        }
    };
    match state.fetcher.fetch_and_clean_text_from_url(url.as_str()).await {
        Ok(text) => fetch_text_html(&text, None),
        Err(err) => {
            tracing::error!("Fetching {} failed: {}", url, err);
            fetch_text_html(existing_text, Some(err.user_message()))
        }
    }
}

fn fetch_text_html(text: &str, error: Option<&str>) -> WebResult<Html<String>> {
    Ok(Html(render::render(
        "fetch-text.html.jinja",
        context! { text => text, error => error },
    )?))
}

/// Persist the recipe currently in the editor.
pub async fn save(
    State(state): State<AppState>,
    Form(fields): Form<Vec<(String, String)>>,
) -> WebResult<Response> {
    let form = FormFields::from(fields);
    let recipe = match parse_recipe_form(&form, "") {
        Ok(recipe) => recipe,
        Err(err) => {
            tracing::warn!("Refusing to save invalid recipe: {}", err);
            return save_status("text-error", "Invalid recipe data. Please check the fields.")
                .map(IntoResponse::into_response);
        }
    };
    match StoredRecipe::insert(&state.db, &recipe) {
        Ok(_) => Ok((
            [RECIPE_LIST_CHANGED],
            save_status("text-success", "Current Recipe Saved!")?,
        )
            .into_response()),
        Err(err) => {
            tracing::error!("Saving recipe {} failed: {:#}", recipe.name, err);
            save_status(
                "text-error",
                "An unexpected error occurred while saving the recipe.",
            )
            .map(IntoResponse::into_response)
        }
    }
}

fn save_status(class: &str, message: &str) -> WebResult<Html<String>> {
    Ok(Html(render::message("save-status-message", class, message)?))
}

#[derive(Deserialize)]
pub struct DeleteQuery {
    id: i64,
}

/// Delete a recipe from the list page.
pub async fn delete(
    State(state): State<AppState>,
    Query(query): Query<DeleteQuery>,
) -> WebResult<impl IntoResponse> {
    if !StoredRecipe::delete(&state.db, query.id)? {
        return Err(WebError::NotFound);
    }
    tracing::info!(recipe_id = query.id, "Deleted recipe");
    Ok(([RECIPE_LIST_CHANGED], Html(String::new())))
}
