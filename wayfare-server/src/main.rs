use std::sync::Arc;

use clap::Parser;
use tokio::sync::broadcast;
use tracing_subscriber::{fmt, EnvFilter};
use wayfare_core::WayfareConfig;

use wayfare_server::state::AppState;
use wayfare_server::{http, router, server, sweeper};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "wayfare.toml")]
    config: String,

    /// Check backends, print the result and exit.
    #[arg(long)]
    health: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is a dev convenience; production uses real env vars.
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let config = match WayfareConfig::load(&args.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config from {}: {}", args.config, e);
            std::process::exit(1);
        }
    };

    let default_level = config
        .service
        .log_level
        .parse()
        .unwrap_or(tracing::Level::INFO);
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(default_level.into()))
        .init();

    let state = match AppState::from_config(config).await {
        Ok(s) => Arc::new(s),
        Err(e) => {
            eprintln!("Failed to start assistant: {}", e);
            std::process::exit(1);
        }
    };

    if args.health {
        let resp = router::handle_request(wayfare_core::ipc::AssistantRequest::Health, &state).await;
        match (resp.data, resp.error) {
            (Some(data), _) => println!("✅ Wayfare healthy: {}", data),
            (None, e) => {
                println!("❌ Health check failed: {}", e.unwrap_or_default());
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    let (tx, _rx) = broadcast::channel(1);
    let shutdown_tx = tx.clone();

    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            return;
        }
        tracing::info!("Shutdown signal received");
        let _ = shutdown_tx.send(());
    });

    tokio::spawn(sweeper::run_session_sweeper(
        state.engine.sessions().clone(),
        state.config.sessions.clone(),
        tx.subscribe(),
    ));

    if state.config.http.enabled {
        let http_state = state.clone();
        let http_shutdown = tx.subscribe();
        tokio::spawn(async move {
            if let Err(e) = http::start_http_server(http_state, http_shutdown).await {
                tracing::error!("HTTP server error: {}", e);
            }
        });
    }

    let socket_path = state.config.service.socket_path.clone();
    server::run_unix_server(&socket_path, state, tx.subscribe()).await?;

    Ok(())
}
