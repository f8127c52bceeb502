use std::sync::Arc;

use axum::{Extension, body::Bytes, response::Json};
use serde::Deserialize;
use serde_json::{Value, json};

use super::ApiError;
use crate::crm::{CrmClient, clients};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PhoneLookupRequest {
    #[serde(default)]
    pub phone: String,
}

/// Finds the active CRM client registered with a phone number.
pub async fn by_phone(
    Extension(crm): Extension<Arc<CrmClient>>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let request: PhoneLookupRequest = serde_json::from_slice(&body)
        .map_err(|e| ApiError::bad_request("Invalid request format", e))?;

    let phone = request.phone.trim();
    if phone.is_empty() {
        return Err(ApiError::bad_request(
            "Phone is required",
            "request body must contain a non-empty `phone`",
        ));
    }

    let client = clients::find_by_phone(&crm, phone)
        .await
        .map_err(ApiError::crm("Failed to look up client"))?;

    match client {
        Some(client) => Ok(Json(json!({
            "success": true,
            "client": client,
        }))),
        None => Err(ApiError::not_found(
            "Client not found",
            format!("no active client with phone {phone}"),
        )),
    }
}
