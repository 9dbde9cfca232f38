//! ScamBait - Honeypot Session Engine
//!
//! Poses as a vulnerable human target, detects scam intent per message, and
//! harvests actionable intelligence before reporting it to a collector.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use scambait::agents::{PersonaAgent, SafetyGuard, StrategyAgent};
use scambait::api::{build_app, AppState};
use scambait::config::ScamBaitConfig;
use scambait::detector::{RuleScorer, ScamDetector};
use scambait::engine::{CallbackTrigger, HttpCallbackSink, Orchestrator};
use scambait::intel::IntelExtractor;
use scambait::model::GroqClient;
use scambait::session::SessionManager;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "scambait")]
#[command(version)]
#[command(about = "Honeypot session engine for scam detection and intelligence harvesting")]
struct Cli {
    /// Configuration file path (.yaml)
    #[arg(short, long, env = "SCAMBAIT_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the honeypot HTTP service
    Serve {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Show the effective configuration
    Config {
        /// Show default configuration
        #[arg(long)]
        default: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("scambait={},tower_http=debug", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match &cli.config {
        Some(path) => ScamBaitConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => ScamBaitConfig::default(),
    };

    match cli.command {
        Commands::Serve { host, port } => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            serve(config, &host, port).await
        }
        Commands::Config { default } => {
            let shown = if default {
                ScamBaitConfig::default()
            } else {
                config
            };
            println!("{}", serde_yaml::to_string(&shown)?);
            Ok(())
        }
    }
}

async fn serve(config: ScamBaitConfig, host: &str, port: u16) -> Result<()> {
    let model: Arc<dyn scambait::model::ModelClient> =
        Arc::new(GroqClient::new(&config.model).context("Failed to build model client")?);

    let detector = ScamDetector::new(
        model.clone(),
        RuleScorer::new().context("Failed to compile rule patterns")?,
        config.detection.confidence_threshold,
    );
    let extractor = IntelExtractor::new().context("Failed to compile extraction patterns")?;
    let strategy = StrategyAgent::new(
        config.engagement.target_artifact_kinds,
        config.engagement.max_turns,
    );
    let persona = PersonaAgent::new(model, config.engagement.history_window);
    let sink = HttpCallbackSink::new(&config.callback).context("Failed to build callback sink")?;
    let callback = CallbackTrigger::new(
        Box::new(sink),
        config.callback.max_retries,
        Duration::from_millis(config.callback.retry_backoff_ms),
    );

    let orchestrator = Orchestrator::new(
        Arc::new(SessionManager::new()),
        detector,
        extractor,
        strategy,
        persona,
        SafetyGuard::new(),
        callback,
        &config,
    );

    let app = build_app(AppState {
        orchestrator: Arc::new(orchestrator),
        api_key: config.server.api_key.clone(),
    });

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(addr = %addr, "scambait listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
