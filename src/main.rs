use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use axum::http::{Method, header};
use tower_http::cors::{Any, CorsLayer};
use tracing_appender::non_blocking::WorkerGuard;

use trip_planner::channels::{Channel, CliChannel};
use trip_planner::config::{PlannerConfig, SessionConfig};
use trip_planner::llm::{LlmConfig, create_provider};
use trip_planner::planner::{
    ConversationDriver, LlmTravelAssistant, TripRouteState, run_session, trip_routes,
};
use trip_planner::store::{Database, ItineraryStore, LibSqlBackend};

/// Install the tracing subscriber. With a log file configured, output goes
/// through a non-blocking appender whose guard must outlive the session.
fn setup_logging(config: &PlannerConfig) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let Some(path) = &config.log_file else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .init();
        return Ok(None);
    };

    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let file_name = path
        .file_name()
        .with_context(|| format!("Log file path {} has no file name", path.display()))?;
    fs::create_dir_all(dir).context("Failed to create log directory")?;

    let (writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false)
        .init();
    Ok(Some(guard))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = PlannerConfig::from_env().context("Failed to load configuration")?;
    let _log_guard = setup_logging(&config)?;

    eprintln!("🧭 Trip Planner v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Chat model: {}", config.chat_model);
    eprintln!("   Itinerary model: {}", config.itinerary_model);
    eprintln!("   Trip API: http://0.0.0.0:{}/api/trip", config.http_port);

    // ── LLM ──────────────────────────────────────────────────────────────
    let chat = create_provider(&LlmConfig {
        api_key: config.api_key.clone(),
        model: config.chat_model.clone(),
    })?;
    let itinerary = create_provider(&LlmConfig {
        api_key: config.api_key.clone(),
        model: config.itinerary_model.clone(),
    })?;
    let assistant = Arc::new(LlmTravelAssistant::new(chat, itinerary));

    // ── Database ─────────────────────────────────────────────────────────
    let db: Arc<dyn Database> = Arc::new(
        LibSqlBackend::new_local(&config.db_path)
            .await
            .with_context(|| {
                format!("Failed to open database at {}", config.db_path.display())
            })?,
    );
    eprintln!("   Database: {}", config.db_path.display());
    let store = ItineraryStore::new(db);

    let mut driver = ConversationDriver::new(
        assistant,
        store.clone(),
        SessionConfig::from(&config),
    );

    // ── REST ─────────────────────────────────────────────────────────────
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET])
        .allow_headers([header::ACCEPT, header::CONTENT_TYPE]);
    let app = trip_routes(TripRouteState {
        status: driver.subscribe(),
        store,
    })
    .layer(cors);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.http_port))
        .await
        .with_context(|| format!("Failed to bind port {}", config.http_port))?;
    let port = config.http_port;
    tokio::spawn(async move {
        tracing::info!(port, "Trip API server started");
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("Trip API server stopped: {}", e);
        }
    });

    // ── CLI session ──────────────────────────────────────────────────────
    eprintln!("   Tell me where you'd like to go. /help for commands, /quit to exit.\n");
    let cli = CliChannel::new();
    let stream = cli.start().await?;
    run_session(&mut driver, &cli, stream).await;
    cli.shutdown().await?;

    tracing::info!("Session ended");
    Ok(())
}
