//! Tomato Clock - A persistent pomodoro timer daemon
//!
//! This is the main entry point for the tomato-clock application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use tomato_clock::{
    api::create_router,
    config::Config,
    state::{AppState, Clock, SystemClock},
    storage::load_or_default,
    tasks::Ticker,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("tomato_clock={},tower_http=info", config.log_level()))
        .init();

    info!("Starting tomato-clock v{}", env!("CARGO_PKG_VERSION"));
    match config.state_path() {
        Some(path) => info!("State file: {}", path.display()),
        None => info!("State kept in memory only"),
    }

    // Restore the timer, or start fresh
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let store = config.store();
    let initial = load_or_default(store.as_ref(), clock.now_millis());

    let state = Arc::new(AppState::new(initial, store, config.notifier(), clock));

    // Start the ticker; it only ticks while the timer is running
    let ticker = Ticker::spawn(Arc::clone(&state));

    // Create HTTP router with all endpoints
    let app = create_router(state);

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /toggle       - Start or pause the timer");
    info!("  POST /reset        - Reset the current interval");
    info!("  POST /mode/:mode   - Switch to work, shortBreak or longBreak");
    info!("  PUT  /settings     - Update interval durations");
    info!("  GET  /state        - Current timer state");
    info!("  GET  /clock        - Rendered clock face");
    info!("  GET  /events       - State change stream");
    info!("  GET  /status       - Timer state and daemon status");
    info!("  GET  /health       - Health check");

    // Event streams never end on their own, so the server is dropped rather
    // than drained once a signal arrives
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

    ticker.shutdown().await;

    info!("Server shutdown complete");
    Ok(())
}
