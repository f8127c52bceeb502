use tracing_subscriber::EnvFilter;

use crate::{config::Config, error, server};

use super::connect;

/// Starts the REST server and runs until it fails.
pub async fn serve(config: Config) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let crm = match connect(&config).await {
        Ok(crm) => crm,
        Err(e) => error!("Cannot create CRM client. Err: {}", e),
    };

    if config.crm_session_id.is_none() {
        tracing::warn!("CRM_SESSION_ID is not set, schedule requests fall back to API key auth");
    }

    if let Err(e) = server::start_api_server(&config.server_address, crm).await {
        error!("Server stopped. Err: {}", e);
    }
}
