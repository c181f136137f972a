use anyhow::{anyhow, ensure, Context, Result};
use clap::Parser;
use mealplan::normalize;
use mealplan::services::{PageFetcher, RecipeGenerator};
use mealplan::Recipe;
use mealplan_client::ingestion::{self, FetchSettings, LlmSettings};
use std::io::Read;
use std::path::PathBuf;

/// Extract a recipe from a web page or text and add it to the recipe box
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Args {
    /// Recipe page to fetch
    #[arg(long, conflicts_with = "file")]
    url: Option<String>,
    /// Text file holding the recipe. Reads stdin when neither this nor --url is given.
    #[arg(long)]
    file: Option<PathBuf>,
    /// URL of the server to upload to
    #[arg(long, default_value = "http://localhost:3000")]
    server: String,
    /// Dry run mode: don't actually upload the recipe
    #[arg(long)]
    dry: bool,
    /// Directory holding the LLM prompt templates
    #[arg(long, default_value = "prompts")]
    prompt_dir: PathBuf,
    /// LLM model name
    #[arg(long)]
    model: Option<String>,
    /// LLM API base URL
    #[arg(long)]
    llm_api_base: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let text = if let Some(url) = &args.url {
        let url = ingestion::check_url(url).map_err(|err| anyhow!(err.user_message()))?;
        let fetcher = ingestion::WebFetcher::new(&FetchSettings::default())?;
        fetcher
            .fetch_and_clean_text_from_url(url.as_str())
            .await
            .map_err(|err| anyhow!(err.user_message()))?
    } else if let Some(path) = &args.file {
        std::fs::read_to_string(path).with_context(|| format!("Reading {}", path.display()))?
    } else {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        buffer
    };
    ensure!(!text.trim().is_empty(), "No text content provided for extraction.");

    let mut settings = LlmSettings {
        prompt_dir: args.prompt_dir,
        ..Default::default()
    };
    if let Some(model) = args.model {
        settings.model = model;
    }
    if let Some(api_base) = args.llm_api_base {
        settings.api_base = api_base;
    }
    let generator = ingestion::OpenAiGenerator::from_env(&settings)?;

    let extracted = generator.generate_recipe_from_text(&text).await?;
    let recipe = Recipe::new(normalize(&extracted)?)?;
    println!("{}", recipe.markdown());

    if args.dry {
        println!("Dry run mode enabled, skipping upload");
        return Ok(());
    }
    let client = reqwest::Client::new();
    let resp = client
        .post(format!("{}/api/v0/recipes", args.server.trim_end_matches('/')))
        .json(&recipe)
        .send()
        .await?;
    ensure!(
        resp.status().is_success(),
        "Failed to upload recipe. Response: {:#?}",
        resp.text().await?,
    );
    tracing::info!("Recipe uploaded successfully");

    Ok(())
}
