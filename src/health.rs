use tracing::instrument;

pub const HEALTH_MESSAGE: &str = "Excalidraw collaboration server is up :)";

/// GET / - readiness check, carries no room state
#[instrument(name = "health")]
pub async fn health() -> &'static str {
    HEALTH_MESSAGE
}
