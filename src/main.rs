//! Countdown Relay - A synchronized countdown timer server
//!
//! This is the main entry point for the countdown-relay application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use countdown_relay::{
    api::create_router,
    config::Config,
    control::gate::{AllowAll, ControlGate, SharedKey},
    state::AppState,
    tasks::broadcast_pulse_task,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("countdown_relay={},tower_http=info", config.log_level()))
        .init();

    info!("Starting countdown-relay server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, duration={}min, control gate={}",
          config.host, config.port, config.duration,
          if config.control_key.is_some() { "shared-key" } else { "allow-all" });

    // The control gate is injected here; the core never inspects
    // credentials beyond handing them to this predicate.
    let gate: Arc<dyn ControlGate> = match config.control_key.clone() {
        Some(key) => Arc::new(SharedKey::new(key)),
        None => Arc::new(AllowAll),
    };

    // Create application state
    let state = Arc::new(AppState::new(
        config.port,
        config.host.clone(),
        config.full_duration(),
        gate,
    ));

    // Start the broadcast pulse background task
    let pulse_state = Arc::clone(&state);
    tokio::spawn(async move {
        broadcast_pulse_task(pulse_state).await;
    });

    // Create HTTP router with all endpoints
    let app = create_router(state);

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  GET  /ws     - WebSocket time-sync subscription and control");
    info!("  GET  /timer  - Current timer state (polling fallback)");
    info!("  GET  /status - Server diagnostics");
    info!("  GET  /health - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    info!("Server shutdown complete");
    Ok(())
}
