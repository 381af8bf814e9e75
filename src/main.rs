//! Roster sync
//!
//! Provisions roster members into a Slack workspace over SCIM, either from a CSV file
//! or from JSON batches posted to a small HTTP service.

mod api;
mod auth;
mod batch;
mod config;
mod directory;
mod errors;
mod ingest;
mod models;
mod pipeline;
mod reconciler;
mod validator;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use clap::{Parser, Subcommand};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::Config;
use directory::SlackDirectory;
use models::SyncVariant;
use reconciler::Reconciler;

/// Command-line interface.
#[derive(Parser, Debug)]
#[command(name = "roster-sync", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Import users from a CSV file
    Import {
        /// CSV file to import; prompts when omitted
        file: Option<PathBuf>,
    },
    /// Serve the JSON sync endpoint over HTTP
    Serve,
}

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub reconciler: Arc<Reconciler>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", failure_message(err.as_ref()));
            ExitCode::FAILURE
        }
    }
}

/// Terminal message for an error that ended the run.
fn failure_message(err: &dyn std::error::Error) -> String {
    format!("Error: {}", err)
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::debug!("Configuration: {:?}", config);

    let directory = Arc::new(SlackDirectory::from_config(&config)?);

    match cli.command {
        Command::Import { file } => {
            println!("Cajuns Baseball Slack User Importer Tool");

            let path = match file {
                Some(path) => path,
                None => {
                    batch::prompt_for_path(&mut std::io::stdin().lock(), &mut std::io::stdout())?
                }
            };

            let reconciler =
                Reconciler::new(directory, config.directory.clone(), SyncVariant::Batch);
            batch::import_file(&reconciler, &path).await?;
        }
        Command::Serve => {
            let reconciler =
                Reconciler::new(directory, config.directory.clone(), SyncVariant::Service);

            let state = AppState {
                reconciler: Arc::new(reconciler),
                config: Arc::new(config.clone()),
            };

            // Build router
            let app = create_router(state);

            // Start server
            let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
            tracing::info!("Server listening on {}", config.bind_addr);

            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // Clone the secret for the auth layer
    let secret = state.config.service_secret.clone();

    let sync_routes = Router::new()
        .route("/", post(api::sync_roster))
        .layer(middleware::from_fn(move |req, next| {
            auth::secret_auth_layer(secret.clone(), req, next)
        }));

    // Health check (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .merge(sync_routes)
        .merge(health_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    errors::codes::OK
}
