//! Branch, hall and teacher listings.

use std::sync::Arc;

use axum::{Extension, body::Bytes, extract::Query, response::Json};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::debug;

use super::{ApiError, DATA_KEY, ITEMS_KEY, envelope, is_blank};
use crate::{
    crm::{CrmClient, branches, halls, teachers},
    error::CrmResult,
    types::ListParams,
};

pub const BRANCH_LIMIT: u32 = 20;
pub const HALL_LIMIT: u32 = 50;
pub const TEACHER_LIMIT: u32 = 100;

/// Optional paging of the list routes. Every field may be omitted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ListRequest {
    pub limit: Option<u32>,
    pub page: Option<u32>,
    pub active_only: Option<bool>,
}

impl ListRequest {
    /// Reads a POST body. A missing or unreadable body means all defaults.
    pub fn from_body(body: &[u8]) -> Self {
        if is_blank(body) {
            return Self::default();
        }
        serde_json::from_slice(body).unwrap_or_else(|err| {
            debug!(%err, "unreadable list body, using defaults");
            Self::default()
        })
    }

    pub fn params(&self, default_limit: u32) -> ListParams {
        ListParams {
            limit: self.limit.filter(|l| *l > 0).unwrap_or(default_limit),
            page: self.page.filter(|p| *p > 0).unwrap_or(1),
            active_only: self.active_only.unwrap_or(true),
        }
    }
}

fn respond<T: Serialize>(
    key: &str,
    params: &ListParams,
    result: CrmResult<Vec<T>>,
    context: &'static str,
) -> Result<Json<Value>, ApiError> {
    let items = result.map_err(ApiError::crm(context))?;
    Ok(envelope(
        key,
        &items,
        json!({
            "limit": params.limit,
            "page": params.page,
            "active_only": params.active_only,
        }),
    ))
}

pub async fn branches_public(
    Extension(crm): Extension<Arc<CrmClient>>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let params = ListRequest::from_body(&body).params(BRANCH_LIMIT);
    let result = branches::list(&crm, &params).await;
    respond(ITEMS_KEY, &params, result, "Failed to fetch branches")
}

pub async fn branches_v1(
    Extension(crm): Extension<Arc<CrmClient>>,
    Query(request): Query<ListRequest>,
) -> Result<Json<Value>, ApiError> {
    let params = request.params(BRANCH_LIMIT);
    let result = branches::list(&crm, &params).await;
    respond(DATA_KEY, &params, result, "Failed to fetch branches")
}

pub async fn halls_public(
    Extension(crm): Extension<Arc<CrmClient>>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let params = ListRequest::from_body(&body).params(HALL_LIMIT);
    let result = halls::list(&crm, &params).await;
    respond(ITEMS_KEY, &params, result, "Failed to fetch halls")
}

pub async fn halls_v1(
    Extension(crm): Extension<Arc<CrmClient>>,
    Query(request): Query<ListRequest>,
) -> Result<Json<Value>, ApiError> {
    let params = request.params(HALL_LIMIT);
    let result = halls::list(&crm, &params).await;
    respond(DATA_KEY, &params, result, "Failed to fetch halls")
}

pub async fn teachers_public(
    Extension(crm): Extension<Arc<CrmClient>>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let params = ListRequest::from_body(&body).params(TEACHER_LIMIT);
    let result = teachers::list(&crm, &params).await;
    respond(ITEMS_KEY, &params, result, "Failed to fetch teachers")
}

pub async fn teachers_v1(
    Extension(crm): Extension<Arc<CrmClient>>,
    Query(request): Query<ListRequest>,
) -> Result<Json<Value>, ApiError> {
    let params = request.params(TEACHER_LIMIT);
    let result = teachers::list(&crm, &params).await;
    respond(DATA_KEY, &params, result, "Failed to fetch teachers")
}
