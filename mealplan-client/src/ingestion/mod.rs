//! Real implementations of the collaborators in `mealplan::services`.
use serde::Deserialize;
use std::path::PathBuf;

pub mod fetch;
pub mod llm;
pub mod safety;

pub use fetch::WebFetcher;
pub use llm::OpenAiGenerator;
pub use safety::{check_url, UnsafeUrl};

/// Where and how to reach the language model.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub model: String,
    /// Any OpenAI-compatible chat completions endpoint.
    pub api_base: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    /// Directory holding `recipe_extraction.md` and `recipe_modification.md`.
    pub prompt_dir: PathBuf,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            model: "gemini-2.0-flash".into(),
            api_base: "https://generativelanguage.googleapis.com/v1beta/openai".into(),
            api_key_env: "GOOGLE_API_KEY".into(),
            prompt_dir: PathBuf::from("prompts"),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 15,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/124.0 Safari/537.36"
                .into(),
        }
    }
}
