//! Canned collaborators for tests.

use std::sync::Mutex;

use async_trait::async_trait;

use super::{FetchError, PageFetcher, RecipeGenerator, ServiceError};
use crate::basic_models::{Recipe, RecipeDraft};

/// Answers every request with a preset result and remembers what it was asked.
#[derive(Debug)]
pub struct FakeGenerator {
    extraction: Result<RecipeDraft, ServiceError>,
    modification: Result<RecipeDraft, ServiceError>,
    pub requests: Mutex<Vec<String>>,
}

impl FakeGenerator {
    pub fn new(
        extraction: Result<RecipeDraft, ServiceError>,
        modification: Result<RecipeDraft, ServiceError>,
    ) -> Self {
        Self {
            extraction,
            modification,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Extraction and modification both return `recipe`.
    pub fn returning(recipe: RecipeDraft) -> Self {
        Self::new(Ok(recipe.clone()), Ok(recipe))
    }

    /// Extraction and modification both fail with `err`.
    pub fn failing(err: ServiceError) -> Self {
        Self::new(Err(err.clone()), Err(err))
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or_default()
    }

    fn record(&self, request: String) {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }
    }
}

impl Default for FakeGenerator {
    fn default() -> Self {
        Self::failing(ServiceError::Extraction("no canned response".into()))
    }
}

#[async_trait]
impl RecipeGenerator for FakeGenerator {
    async fn generate_recipe_from_text(&self, text: &str) -> Result<RecipeDraft, ServiceError> {
        self.record(text.to_string());
        self.extraction.clone()
    }

    async fn generate_modified_recipe(
        &self,
        current: &Recipe,
        instructions: &str,
    ) -> Result<RecipeDraft, ServiceError> {
        self.record(format!("{}\n{instructions}", current.markdown()));
        self.modification.clone()
    }
}

#[derive(Debug)]
pub struct FakeFetcher {
    response: Result<String, FetchError>,
    pub requests: Mutex<Vec<String>>,
}

impl FakeFetcher {
    pub fn new(response: Result<String, FetchError>) -> Self {
        Self {
            response,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or_default()
    }
}

impl Default for FakeFetcher {
    fn default() -> Self {
        Self::new(Ok(String::new()))
    }
}

#[async_trait]
impl PageFetcher for FakeFetcher {
    async fn fetch_and_clean_text_from_url(&self, url: &str) -> Result<String, FetchError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(url.to_string());
        }
        self.response.clone()
    }
}
