use anyhow::{Context, Result};
use clap::Parser;
use mealplan_client::ingestion::{OpenAiGenerator, WebFetcher};
use mealplan_server::{
    config::Config,
    database::Database,
    routes::{self, AppState},
};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
struct Args {
    /// Path to the YAML configuration file
    #[clap(long, default_value = "config.yml")]
    config: String,

    /// The address and optionally port to bind to, overriding the config file
    #[clap(long)]
    address: Option<String>,

    /// Whether to use HTTPS / TLS
    #[clap(long)]
    tls: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    // Parse command line arguments
    let args = Args::parse();
    let config = Config::load_or_default(&args.config).context("Loading configuration")?;

    // initialize tracing
    let file_appender =
        tracing_appender::rolling::daily(&config.logging.directory, "access.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .json()
        .with_writer(non_blocking)
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // connect to the database
    let db = Database::connect(&config.database.path)
        .await
        .context("Connecting to database")?;
    // the collaborators that talk to the outside world
    let generator = OpenAiGenerator::from_env(&config.llm).context("Configuring LLM client")?;
    let fetcher = WebFetcher::new(&config.fetch).context("Building HTTP client")?;

    // build our application with its routes
    let app = routes::router(AppState {
        db,
        generator: Arc::new(generator),
        fetcher: Arc::new(fetcher),
    })
    .layer(
        tower_http::compression::CompressionLayer::new()
            .quality(tower_http::CompressionLevel::Fastest),
    )
    .layer(tower_http::trace::TraceLayer::new_for_http());

    let address = args.address.unwrap_or(config.server.address.clone());

    // In development, use HTTP. In production, use HTTPS.
    if args.tls || config.server.tls.is_some() {
        let tls = config
            .server
            .tls
            .as_ref()
            .context("TLS requested but no server.tls section in the configuration")?;
        rustls::crypto::ring::default_provider()
            .install_default()
            .map_err(|_| anyhow::anyhow!("Failed to install rustls crypto provider"))?;
        let tls_config =
            axum_server::tls_rustls::RustlsConfig::from_pem_file(&tls.cert_path, &tls.key_path)
                .await
                .context("Loading TLS certificate")?;

        let addr = address.parse()?;
        tracing::info!("Listening on {}", addr);
        axum_server::bind_rustls(addr, tls_config)
            .serve(app.into_make_service())
            .await
            .context("Starting TLS server")?;
    } else {
        let listener = tokio::net::TcpListener::bind(&address).await?;
        tracing::info!("Listening on {}", address);
        axum::serve(listener, app).await?;
    }
    Ok(())
}
