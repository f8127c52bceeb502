use std::{net::SocketAddr, str::FromStr, sync::Arc};

use axum::{
    Extension, Router,
    routing::{get, post},
};
use tracing::info;

use crate::{Res, api, crm::CrmClient};

/// Full route table with CORS and the shared CRM client attached.
pub fn router(crm: Arc<CrmClient>) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route("/api/public/branch/list", post(api::branches_public))
        .route("/api/public/hall/list", post(api::halls_public))
        .route("/api/public/teacher/list", post(api::teachers_public))
        .route("/api/public/schedule/list", post(api::schedule_public))
        .route("/api/v1/branch", get(api::branches_v1))
        .route("/api/v1/hall", get(api::halls_v1))
        .route("/api/v1/teacher", get(api::teachers_v1))
        .route("/api/v1/schedule", get(api::schedule_v1))
        .route("/api/v1/auth/by-phone", post(api::by_phone))
        .layer(Extension(crm))
        .layer(api::cors_layer())
}

pub async fn start_api_server(address: &str, crm: Arc<CrmClient>) -> Res<()> {
    let addr = SocketAddr::from_str(address)
        .map_err(|e| format!("Failed to parse server address {address}: {e}"))?;

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, crm = crm.base_url(), "fitgate listening");

    axum::serve(listener, router(crm)).await?;
    Ok(())
}
