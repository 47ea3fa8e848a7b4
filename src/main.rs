use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;

use bizmart_intake::cli;
use bizmart_intake::config::{IntakeConfig, RunMode, ServerConfig};
use bizmart_intake::intake::{DialogueController, IntakeRouteState, intake_routes};
use bizmart_intake::launch::{LaunchConfig, MockOrchestrator};
use bizmart_intake::llm::{LlmConfig, create_rewriter};
use bizmart_intake::store::{InMemorySessionStore, SessionStore, spawn_idle_sweep};

const IDLE_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let server_config = ServerConfig::from_env().context("invalid server configuration")?;
    let intake_config = IntakeConfig::from_env();
    let llm_config = LlmConfig::from_env();

    eprintln!("🤖 BizMart intake v{}", env!("CARGO_PKG_VERSION"));
    eprintln!(
        "   Tone rewrite: {}",
        match (&llm_config, intake_config.rewrite_enabled) {
            (Some(config), true) => config.model.clone(),
            (None, true) => "disabled (no OPENROUTER_API_KEY)".to_string(),
            (_, false) => "disabled".to_string(),
        }
    );
    eprintln!("   Launch fee: {} USDC", intake_config.launch_fee_usdc);

    // ── Sessions ────────────────────────────────────────────────────────
    let store: Arc<dyn SessionStore> = InMemorySessionStore::new();
    let _sweep_handle = spawn_idle_sweep(
        Arc::clone(&store),
        intake_config.session_idle_timeout,
        IDLE_SWEEP_INTERVAL,
    );

    // ── Collaborators ───────────────────────────────────────────────────
    let rewriter = create_rewriter(llm_config);
    let launcher = Arc::new(MockOrchestrator::new(LaunchConfig::from_env()));

    let controller = Arc::new(DialogueController::new(
        store,
        rewriter,
        launcher,
        intake_config,
    ));

    match server_config.mode {
        RunMode::Cli => {
            eprintln!("   Mode: cli (type `quit` to exit)\n");
            cli::run(&controller).await?;
        }
        RunMode::Server => {
            let addr = server_config.bind_addr();
            eprintln!("   Chat API: http://{addr}/chat\n");
            let app = intake_routes(IntakeRouteState { controller }, &server_config.cors_origin);
            let listener = tokio::net::TcpListener::bind(&addr)
                .await
                .with_context(|| format!("failed to bind {addr}"))?;
            tracing::info!(addr = %addr, "Intake server started");
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await
                .context("server error")?;
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
