use axum::{
    body::to_bytes,
    extract::{Query, State},
    response::IntoResponse,
    Form,
};
use mealplan::services::fake::{FakeFetcher, FakeGenerator};
use mealplan::services::{FetchError, ServiceError};
use mealplan::RecipeDraft;
use mealplan_server::{
    database::Database,
    models::StoredRecipe,
    routes::{actions, AppState},
};
use std::sync::Arc;

struct Harness {
    _dir: tempfile::TempDir,
    state: AppState,
    generator: Arc<FakeGenerator>,
    fetcher: Arc<FakeFetcher>,
}

async fn harness(generator: FakeGenerator, fetcher: FakeFetcher) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::connect(dir.path().join("recipes.db")).await.unwrap();
    let generator = Arc::new(generator);
    let fetcher = Arc::new(fetcher);
    Harness {
        _dir: dir,
        state: AppState {
            db,
            generator: generator.clone(),
            fetcher: fetcher.clone(),
        },
        generator,
        fetcher,
    }
}

fn form(pairs: &[(&str, &str)]) -> Form<Vec<(String, String)>> {
    Form(
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    )
}

fn birthday_cake() -> RecipeDraft {
    RecipeDraft {
        name: "  birthday cake recipe ".into(),
        ingredients: vec!["  2 cups   flour ".into(), "".into(), "1 cup sugar ,".into()],
        instructions: vec!["Step 1: Preheat oven to 350F".into(), "2. Bake (30 min".into()],
        makes_min: Some(12),
        makes_max: Some(12),
        makes_unit: Some("slices".into()),
        ..Default::default()
    }
}

fn edit_fields(extra: &[(&'static str, &'static str)]) -> Vec<(&'static str, &'static str)> {
    let mut pairs = vec![
        ("name", "Birthday Cake"),
        ("ingredients", "2 cups flour"),
        ("ingredients", "1 cup sugar,"),
        ("instructions", "Preheat oven to 350F."),
        ("original_name", "Birthday Cake"),
        ("original_ingredients", "2 cups flour"),
        ("original_ingredients", "1 cup sugar,"),
        ("original_instructions", "Preheat oven to 350F."),
    ];
    pairs.extend_from_slice(extra);
    pairs
}

#[tokio::test]
async fn extract_run_normalizes_and_opens_editor() {
    let h = harness(FakeGenerator::returning(birthday_cake()), FakeFetcher::default()).await;
    let html = actions::extract_run(State(h.state.clone()), form(&[("recipe_text", "cake stuff")]))
        .await
        .unwrap()
        .0;
    assert!(html.contains(r#"value="Birthday Cake""#));
    assert!(html.contains(r#"name="original_name" value="Birthday Cake""#));
    assert!(html.contains(r#"value="2 cups flour""#));
    assert!(html.contains(r#"value="Preheat oven to 350F.""#));
    assert!(html.contains(r#"value="Bake (30 min.""#));
    assert!(html.contains("Initial Extracted Recipe (Reference)"));
    assert!(!html.contains("<ins>"));
    assert_eq!(h.generator.request_count(), 1);
}

#[tokio::test]
async fn extract_run_reports_each_failure() {
    let h = harness(FakeGenerator::returning(birthday_cake()), FakeFetcher::default()).await;
    let html = actions::extract_run(State(h.state.clone()), form(&[("recipe_text", "   ")]))
        .await
        .unwrap()
        .0;
    assert!(html.contains("No text content provided for extraction."));
    assert_eq!(h.generator.request_count(), 0);

    let h = harness(
        FakeGenerator::failing(ServiceError::Extraction("boom".into())),
        FakeFetcher::default(),
    )
    .await;
    let html = actions::extract_run(State(h.state.clone()), form(&[("recipe_text", "x")]))
        .await
        .unwrap()
        .0;
    assert!(html.contains("Recipe extraction failed. Please try again or check the input text."));

    let mut no_steps = birthday_cake();
    no_steps.instructions = vec!["  ".into()];
    let h = harness(FakeGenerator::returning(no_steps), FakeFetcher::default()).await;
    let html = actions::extract_run(State(h.state.clone()), form(&[("recipe_text", "x")]))
        .await
        .unwrap()
        .0;
    assert!(html.contains("Recipe extraction resulted in missing instructions."));

    let mut no_ingredients = birthday_cake();
    no_ingredients.ingredients = vec![" ".into()];
    let h = harness(FakeGenerator::returning(no_ingredients), FakeFetcher::default()).await;
    let html = actions::extract_run(State(h.state.clone()), form(&[("recipe_text", "x")]))
        .await
        .unwrap()
        .0;
    assert!(html.contains("Recipe data is invalid after extraction. Please check the input text."));
}

#[tokio::test]
async fn modify_keeps_baseline_and_diffs() {
    let modified = RecipeDraft {
        name: "birthday cake".into(),
        ingredients: vec!["2 cups flour".into(), "1 cup honey".into()],
        instructions: vec!["Preheat oven to 350F".into()],
        ..Default::default()
    };
    let h = harness(FakeGenerator::returning(modified), FakeFetcher::default()).await;
    let html = actions::modify(
        State(h.state.clone()),
        form(&edit_fields(&[("modification_prompt", "use honey")])),
    )
    .await
    .unwrap()
    .0;
    assert!(html.contains(r#"name="ingredients" value="1 cup honey""#));
    assert!(html.contains(r#"name="original_ingredients" value="1 cup sugar,""#));
    assert!(html.contains("<del>- 1 cup sugar,</del>"));
    assert!(html.contains("<ins>- 1 cup honey</ins>"));
    assert!(html.contains(r#"value="use honey""#));
}

#[tokio::test]
async fn modify_error_messages() {
    let h = harness(FakeGenerator::default(), FakeFetcher::default()).await;
    let html = actions::modify(State(h.state.clone()), form(&edit_fields(&[])))
        .await
        .unwrap()
        .0;
    assert!(html.contains("Please enter modification instructions."));
    assert_eq!(h.generator.request_count(), 0);

    let html = actions::modify(
        State(h.state.clone()),
        form(&edit_fields(&[("name", ""), ("modification_prompt", "more salt")])),
    )
    .await
    .unwrap()
    .0;
    assert!(html.contains("Invalid recipe data. Please check the fields."));

    let html = actions::modify(
        State(h.state.clone()),
        form(&edit_fields(&[("modification_prompt", "more salt")])),
    )
    .await
    .unwrap()
    .0;
    assert!(html.contains("Recipe modification failed. Please try again."));

    let h = harness(
        FakeGenerator::failing(ServiceError::MissingConfiguration("prompt".into())),
        FakeFetcher::default(),
    )
    .await;
    let html = actions::modify(
        State(h.state.clone()),
        form(&edit_fields(&[("modification_prompt", "more salt")])),
    )
    .await
    .unwrap()
    .0;
    assert!(html.contains("Service configuration error. Please try again later."));

    let h = harness(
        FakeGenerator::returning(RecipeDraft {
            name: "Empty".into(),
            ..Default::default()
        }),
        FakeFetcher::default(),
    )
    .await;
    let html = actions::modify(
        State(h.state.clone()),
        form(&edit_fields(&[("modification_prompt", "remove everything")])),
    )
    .await
    .unwrap()
    .0;
    assert!(html.contains("Invalid recipe data after modification attempt."));
}

#[tokio::test]
async fn fetch_text_fills_text_area() {
    let h = harness(
        FakeGenerator::default(),
        FakeFetcher::new(Ok("Lemon Bars\n1 cup flour".into())),
    )
    .await;
    let html = actions::fetch_text(
        State(h.state.clone()),
        form(&[("input_url", "https://example.com/lemon-bars")]),
    )
    .await
    .unwrap()
    .0;
    assert!(html.contains("Lemon Bars\n1 cup flour</textarea>"));
    assert!(!html.contains("fetch-url-error"));
}

#[tokio::test]
async fn fetch_text_refuses_unsafe_urls_without_fetching() {
    let h = harness(FakeGenerator::default(), FakeFetcher::default()).await;
    for (url, message) in [
        ("", "Please provide a Recipe URL to fetch."),
        ("ftp://example.com/x", "Invalid URL: Only HTTP and HTTPS URLs are allowed"),
        ("http://127.0.0.1/", "Invalid URL: Loopback addresses are not allowed"),
        ("http://10.1.2.3/", "Invalid URL: Private IP addresses are not allowed"),
        ("http://metadata.google.internal/", "Invalid URL: Internal hostnames are not allowed"),
    ] {
        let html = actions::fetch_text(State(h.state.clone()), form(&[("input_url", url)]))
            .await
            .unwrap()
            .0;
        assert!(html.contains(message), "{url}: {html}");
    }
    assert_eq!(h.fetcher.request_count(), 0);
}

#[tokio::test]
async fn fetch_text_maps_fetch_errors() {
    let h = harness(
        FakeGenerator::default(),
        FakeFetcher::new(Err(FetchError::Status {
            status: 404,
            body: "Not Found".into(),
        })),
    )
    .await;
    let html = actions::fetch_text(
        State(h.state.clone()),
        form(&[("input_url", "https://example.com/gone"), ("recipe_text", "kept")]),
    )
    .await
    .unwrap()
    .0;
    assert!(html.contains("The recipe page was not found. Please check the URL and try again."));
    assert!(html.contains("kept</textarea>"));
}

#[tokio::test]
async fn save_persists_and_triggers_refresh() {
    let h = harness(FakeGenerator::default(), FakeFetcher::default()).await;
    let response = actions::save(
        State(h.state.clone()),
        form(&edit_fields(&[("ingredients", "  "), ("makes_min", "2")])),
    )
    .await
    .unwrap();
    assert_eq!(response.headers()["HX-Trigger"], "recipeListChanged");
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(String::from_utf8_lossy(&body).contains("Current Recipe Saved!"));

    let saved = StoredRecipe::list_all(&h.state.db).unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].recipe.ingredients, vec!["2 cups flour", "1 cup sugar,"]);
    assert_eq!(saved[0].recipe.makes_min, Some(2));
}

#[tokio::test]
async fn save_rejects_invalid_recipe() {
    let h = harness(FakeGenerator::default(), FakeFetcher::default()).await;
    let response = actions::save(
        State(h.state.clone()),
        form(&edit_fields(&[("makes_min", "5"), ("makes_max", "3")])),
    )
    .await
    .unwrap();
    assert!(response.headers().get("HX-Trigger").is_none());
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(String::from_utf8_lossy(&body).contains("Invalid recipe data. Please check the fields."));
    assert!(StoredRecipe::list_all(&h.state.db).unwrap().is_empty());
}

#[tokio::test]
async fn delete_removes_recipe_or_404s() {
    let h = harness(FakeGenerator::default(), FakeFetcher::default()).await;
    actions::save(State(h.state.clone()), form(&edit_fields(&[])))
        .await
        .unwrap();
    let id = StoredRecipe::list_all(&h.state.db).unwrap()[0].id;

    let response = actions::delete(
        State(h.state.clone()),
        Query(serde_json::from_value(serde_json::json!({ "id": id })).unwrap()),
    )
    .await
    .unwrap()
    .into_response();
    assert_eq!(response.status(), 200);
    assert_eq!(response.headers()["HX-Trigger"], "recipeListChanged");

    let again = actions::delete(
        State(h.state.clone()),
        Query(serde_json::from_value(serde_json::json!({ "id": id })).unwrap()),
    )
    .await;
    assert_eq!(again.into_response().status(), 404);
}
