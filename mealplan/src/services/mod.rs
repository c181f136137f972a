//! The outside collaborators: an LLM that produces recipes and a fetcher that
//! pulls page text off the web. Real implementations live in
//! `mealplan-client`; [`fake`] has stand-ins for tests.

use async_trait::async_trait;

use crate::basic_models::{Recipe, RecipeDraft};

pub mod fake;

#[derive(Debug, Clone, thiserror::Error)]
pub enum ServiceError {
    #[error("Recipe extraction failed: {0}")]
    Extraction(String),
    #[error("Recipe modification failed: {0}")]
    Modification(String),
    #[error("Service configuration missing: {0}")]
    MissingConfiguration(String),
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("HTTP status {status}")]
    Status { status: u16, body: String },
    #[error("Could not process page content: {0}")]
    Processing(String),
}

/// Phrases that show up on anti-bot interstitial pages.
const BOT_PROTECTION_MARKERS: [&str; 6] = [
    "perimeterx",
    "captcha",
    "verify you are a human",
    "automation tools",
    "cloudflare",
    "are you a robot",
];

impl FetchError {
    /// What to tell the person who asked for the fetch.
    pub fn user_message(&self) -> &'static str {
        match self {
            FetchError::Network(_) => "Error fetching URL. Please check the URL and your connection.",
            FetchError::Status { status, body } => status_message(*status, body),
            FetchError::Processing(_) => "Failed to process the content from the URL.",
        }
    }
}

fn status_message(status: u16, body: &str) -> &'static str {
    let body = body.to_lowercase();
    if BOT_PROTECTION_MARKERS.iter().any(|marker| body.contains(marker)) {
        return "This website uses security measures that block automated access. \
                Please copy and paste the recipe text below instead.";
    }
    match status {
        401 => "This website requires login to access recipes. \
                Please copy and paste the recipe text below instead.",
        403 => "This website doesn't allow automated access. \
                Please copy and paste the recipe text below instead.",
        404 => "The recipe page was not found. Please check the URL and try again.",
        429 => "This website is limiting requests. Please wait a moment and try again.",
        500..=u16::MAX => "The website is having server issues. Please try again later.",
        400..=499 => "This website doesn't allow our recipe fetcher. \
                      Please copy and paste the recipe text below instead.",
        _ => "Error fetching URL: The server returned an error.",
    }
}

#[async_trait]
pub trait RecipeGenerator: Send + Sync {
    /// Pull a structured recipe out of free text.
    async fn generate_recipe_from_text(&self, text: &str) -> Result<RecipeDraft, ServiceError>;

    /// Rewrite `current` following the user's instructions.
    async fn generate_modified_recipe(
        &self,
        current: &Recipe,
        instructions: &str,
    ) -> Result<RecipeDraft, ServiceError>;
}

#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Download `url` and reduce it to readable text. Callers check the URL
    /// for safety before handing it over.
    async fn fetch_and_clean_text_from_url(&self, url: &str) -> Result<String, FetchError>;
}
