use std::sync::Arc;

use axum::{Extension, body::Bytes, extract::Query, response::Json};
use chrono::{Datelike, NaiveDate};
use serde::Deserialize;
use serde_json::{Value, json};

use super::{ApiError, DATA_KEY, ITEMS_KEY, envelope, is_blank};
use crate::{
    crm::{CrmClient, schedule},
    types::ScheduleParams,
    utils::{self, DATE_FORMAT},
};

pub const SCHEDULE_LIMIT: u32 = 1000;

/// Years a request date may carry. Chrono also parses signed years with more
/// than four digits.
const YEARS: std::ops::RangeInclusive<i32> = 1..=9999;

/// Schedule window request. Dates are `YYYY-MM-DD`; `date_from` defaults to
/// today and `date_to` to `date_from`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScheduleRequest {
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub branch_id: Option<i64>,
    pub limit: Option<u32>,
}

impl ScheduleRequest {
    /// # Errors
    ///
    /// [`ApiError::BadRequest`] for a date that is not `YYYY-MM-DD` or whose
    /// year lies outside `1..=9999`.
    pub fn params(&self) -> Result<ScheduleParams, ApiError> {
        let date_from = utils::parse_request_date(self.date_from.as_deref())
            .map_err(|e| ApiError::bad_request("Invalid date_from, expected YYYY-MM-DD", e))
            .and_then(|date| four_digit_year(date, "Invalid date_from, expected YYYY-MM-DD"))?;

        let date_to = match self.date_to.as_deref().map(str::trim) {
            Some(date) if !date.is_empty() => NaiveDate::parse_from_str(date, DATE_FORMAT)
                .map_err(|e| ApiError::bad_request("Invalid date_to, expected YYYY-MM-DD", e))
                .and_then(|date| four_digit_year(date, "Invalid date_to, expected YYYY-MM-DD"))?,
            _ => date_from,
        };

        Ok(ScheduleParams {
            date_from,
            date_to,
            branch_id: self.branch_id.unwrap_or_default(),
            limit: self.limit.filter(|l| *l > 0).unwrap_or(SCHEDULE_LIMIT),
        })
    }
}

fn four_digit_year(date: NaiveDate, summary: &'static str) -> Result<NaiveDate, ApiError> {
    if YEARS.contains(&date.year()) {
        Ok(date)
    } else {
        Err(ApiError::bad_request(
            summary,
            format!("year {} is out of range", date.year()),
        ))
    }
}

async fn respond(
    crm: &CrmClient,
    key: &str,
    request: &ScheduleRequest,
) -> Result<Json<Value>, ApiError> {
    let params = request.params()?;
    let items = schedule::list(crm, &params)
        .await
        .map_err(ApiError::crm("Failed to fetch schedule"))?;

    Ok(envelope(
        key,
        &items,
        json!({
            "date_from": utils::format_date(params.date_from),
            "date_to": utils::format_date(params.date_to),
            "branch_id": params.branch_id,
            "limit": params.limit,
        }),
    ))
}

pub async fn schedule_public(
    Extension(crm): Extension<Arc<CrmClient>>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let request = if is_blank(&body) {
        ScheduleRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| ApiError::bad_request("Invalid request format", e))?
    };
    respond(&crm, ITEMS_KEY, &request).await
}

pub async fn schedule_v1(
    Extension(crm): Extension<Arc<CrmClient>>,
    Query(request): Query<ScheduleRequest>,
) -> Result<Json<Value>, ApiError> {
    respond(&crm, DATA_KEY, &request).await
}
