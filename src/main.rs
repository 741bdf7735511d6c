use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use chirpy::app::build_router;
use chirpy::config::Settings;
use chirpy::db::json_store::JsonStore;
use chirpy::state::AppState;

/// Chirpy micro-posting server.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Use a throwaway database that is wiped at startup.
    #[arg(long)]
    debug: bool,

    /// Address to listen on, overriding `BIND_ADDR`.
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chirpy=info,tower_http=info".into()),
        )
        .init();

    let cli = Cli::parse();

    let mut settings = Settings::from_env()?;
    if cli.debug {
        tracing::info!("Debug mode enabled");
        settings = settings.into_debug();
    }
    if let Some(bind) = cli.bind {
        settings.bind_addr = bind;
    }

    tracing::info!(?settings, "Starting Chirpy server...");

    let store = if cli.debug {
        JsonStore::open_fresh(&settings.database_path).await?
    } else {
        JsonStore::open(&settings.database_path).await?
    };
    let store = Arc::new(store);

    tracing::info!("Document store ready at {}", store.path().display());

    let app_state = AppState::new(store, &settings.jwt_secret, settings.polka_api_key.clone());
    let app = build_router(app_state, &settings.static_dir);

    let listener = tokio::net::TcpListener::bind(&settings.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", settings.bind_addr))?;

    tracing::info!("Listening on http://{}", settings.bind_addr);
    axum::serve(listener, app.into_make_service())
        .await
        .context("Server error")?;

    Ok(())
}
