use anyhow::{anyhow, Context, Result};
use async_openai::{
    config::OpenAIConfig, types::ChatCompletionRequestMessage,
    types::ChatCompletionRequestUserMessage, types::CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use mealplan::services::{RecipeGenerator, ServiceError};
use mealplan::{Recipe, RecipeDraft};
use std::path::PathBuf;
use tokio_retry::strategy::{jitter, ExponentialBackoff};
use tokio_retry::Retry;

use super::LlmSettings;

const EXTRACTION_PROMPT: &str = "recipe_extraction.md";
const MODIFICATION_PROMPT: &str = "recipe_modification.md";

/// Recipe generation backed by an OpenAI-compatible chat completions API.
pub struct OpenAiGenerator {
    client: async_openai::Client<OpenAIConfig>,
    model: String,
    prompt_dir: PathBuf,
}

impl OpenAiGenerator {
    pub fn new(api_key: &str, settings: &LlmSettings) -> Self {
        let config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(settings.api_base.trim_end_matches('/'));
        Self {
            client: async_openai::Client::with_config(config),
            model: settings.model.clone(),
            prompt_dir: settings.prompt_dir.clone(),
        }
    }

    /// Build a generator using the API key named in the settings.
    pub fn from_env(settings: &LlmSettings) -> Result<Self> {
        let api_key = dotenvy::var(&settings.api_key_env)
            .with_context(|| format!("Could not find {} in the environment.", settings.api_key_env))?;
        Ok(Self::new(&api_key, settings))
    }

    /// Calls the chat API once with a single user message.
    async fn call_llm(&self, prompt: &str) -> Result<String> {
        let req_args = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages([ChatCompletionRequestMessage::User(
                ChatCompletionRequestUserMessage {
                    content: prompt.into(),
                    name: None,
                },
            )])
            .build()?;
        let text = self
            .client
            .chat()
            .create(req_args)
            .await?
            .choices
            .first()
            .ok_or(anyhow!("No response from LLM"))?
            .clone()
            .message
            .content
            .ok_or(anyhow!("No response from LLM"))?;
        Ok(text)
    }

    /// Asks for a recipe and parses the answer, retrying transient failures.
    async fn request_recipe(&self, prompt: &str) -> Result<RecipeDraft> {
        let strategy = ExponentialBackoff::from_millis(250).map(jitter).take(2);
        Retry::spawn(strategy, || async {
            let reply = self.call_llm(prompt).await.inspect_err(|err| {
                tracing::warn!(model = %self.model, "LLM call failed: {err:#}");
            })?;
            tracing::debug!("LLM reply: {}", reply);
            parse_recipe_reply(&reply)
        })
        .await
    }

    async fn load_prompt(&self, file_name: &str) -> Result<String, ServiceError> {
        let path = self.prompt_dir.join(file_name);
        tracing::info!("Using prompt file {}", path.display());
        tokio::fs::read_to_string(&path).await.map_err(|err| {
            tracing::error!("Prompt file {} unreadable: {}", path.display(), err);
            ServiceError::MissingConfiguration(format!("prompt {}: {err}", path.display()))
        })
    }
}

#[async_trait]
impl RecipeGenerator for OpenAiGenerator {
    async fn generate_recipe_from_text(&self, text: &str) -> Result<RecipeDraft, ServiceError> {
        tracing::info!("Extracting recipe from {} characters of text", text.len());
        let template = self.load_prompt(EXTRACTION_PROMPT).await?;
        let prompt = fill_template(&template, &[("page_text", text)]);
        let recipe = self.request_recipe(&prompt).await.map_err(|err| {
            tracing::error!("Recipe extraction failed: {err:#}");
            ServiceError::Extraction(format!("{err:#}"))
        })?;
        tracing::info!("LLM extracted recipe: {}", recipe.name);
        Ok(recipe)
    }

    async fn generate_modified_recipe(
        &self,
        current: &Recipe,
        instructions: &str,
    ) -> Result<RecipeDraft, ServiceError> {
        tracing::info!("Modifying recipe {}: {}", current.name, instructions);
        let template = self.load_prompt(MODIFICATION_PROMPT).await?;
        let prompt = fill_template(
            &template,
            &[
                ("current_recipe_markdown", &current.markdown()),
                ("modification_prompt", instructions),
            ],
        );
        let recipe = self.request_recipe(&prompt).await.map_err(|err| {
            tracing::error!("Recipe modification failed: {err:#}");
            ServiceError::Modification(format!("{err:#}"))
        })?;
        tracing::info!("LLM modified recipe: {}", recipe.name);
        Ok(recipe)
    }
}

/// Substitute each `$name` placeholder with its value.
pub fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    values
        .iter()
        .fold(template.to_string(), |prompt, (name, value)| {
            prompt.replace(&format!("${name}"), value)
        })
}

/// Models like to wrap JSON in a fenced code block; look inside it if so.
pub fn parse_recipe_reply(reply: &str) -> Result<RecipeDraft> {
    let trimmed = reply.trim();
    let body = match trimmed.strip_prefix("```") {
        Some(fenced) => {
            let fenced = fenced.trim_start_matches(|c: char| c.is_ascii_alphanumeric());
            fenced.strip_suffix("```").unwrap_or(fenced).trim()
        }
        None => trimmed,
    };
    serde_json::from_str(body).context("LLM reply is not a recipe JSON object")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_template() {
        let template = "Recipe:\n$current_recipe_markdown\nChange: $modification_prompt";
        assert_eq!(
            fill_template(
                template,
                &[
                    ("current_recipe_markdown", "# Soup"),
                    ("modification_prompt", "more salt"),
                ]
            ),
            "Recipe:\n# Soup\nChange: more salt"
        );
        assert_eq!(fill_template("keep $other", &[("page_text", "x")]), "keep $other");
    }

    #[test]
    fn test_parse_plain_and_fenced_json() {
        let json = r#"{"name": "Toast", "ingredients": ["bread"], "instructions": ["Toast it"]}"#;
        let plain = parse_recipe_reply(json).unwrap();
        assert_eq!(plain.name, "Toast");

        let fenced = parse_recipe_reply(&format!("```json\n{json}\n```\n")).unwrap();
        assert_eq!(fenced, plain);

        let with_quantities = parse_recipe_reply(
            r#"{"name": "Buns", "ingredients": ["flour"], "makes_min": 12, "makes_unit": "buns"}"#,
        )
        .unwrap();
        assert_eq!(with_quantities.makes_min, Some(12));
        assert!(with_quantities.instructions.is_empty());
    }

    #[test]
    fn test_parse_rejects_prose() {
        assert!(parse_recipe_reply("Sorry, I can't help with that.").is_err());
    }

    #[tokio::test]
    async fn test_missing_prompt_is_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let settings = LlmSettings {
            prompt_dir: dir.path().to_path_buf(),
            ..Default::default()
        };
        let generator = OpenAiGenerator::new("test-key", &settings);
        let err = generator.generate_recipe_from_text("anything").await.unwrap_err();
        assert!(matches!(err, ServiceError::MissingConfiguration(_)));
    }
}
