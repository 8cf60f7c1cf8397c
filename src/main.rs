use collab_room::{app, AppError, AppState, Coordinator, ServerConfig};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), AppError> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "collab_room=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting collaboration room server");

    let config = ServerConfig::from_env()?;

    // Single owner of all room state for the lifetime of the process
    let (coordinator, _coordinator_task) = Coordinator::spawn();
    let app_state = AppState::new(coordinator);

    let listener = tokio::net::TcpListener::bind(config.socket_addr()).await?;
    info!(addr = %config.socket_addr(), "Server listening");

    axum::serve(listener, app(app_state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Received shutdown signal");
}
