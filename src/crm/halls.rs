use tracing::info;

use super::{
    AuthMode, CrmClient, CrmRecord,
    lenient::{Lenient, Record, text_or},
};
use crate::{
    error::CrmResult,
    types::{Hall, ListParams, ListQuery},
};

pub const ENDPOINT: &str = "hall/list";
pub const PLACEHOLDER_NAME: &str = "Hall";

const FIELDS: [&str; 6] = ["id", "name", "address", "phone", "capacity", "isActive"];

impl CrmRecord for Hall {
    const ALIASES: &'static [&'static str] = &["halls"];

    fn convert(record: &Record) -> Self {
        Hall {
            id: record.int("id").unwrap_or_default(),
            name: text_or(record.text("name"), PLACEHOLDER_NAME),
            address: text_or(record.text("address"), ""),
            phone: text_or(record.phone("phone"), ""),
            capacity: record.int("capacity").unwrap_or_default().max(0),
            is_active: record.flag("isActive").unwrap_or(true),
        }
    }

    fn id(&self) -> i64 {
        self.id
    }
}

/// Builds the CRM query, sorted by name. The activity filter is sent to the
/// CRM as a column filter.
pub fn query(params: &ListParams) -> ListQuery {
    let query = ListQuery::new(&FIELDS, params.limit, params.page).sort_by("name", "asc");
    if params.active_only {
        query.column("isActive", true)
    } else {
        query
    }
}

/// Normalizes a raw `hall/list` answer.
pub fn parse(body: &[u8]) -> CrmResult<Vec<Hall>> {
    super::parse(body)
}

/// Fetches halls from the CRM.
///
/// # Arguments
///
/// * `client` - Shared CRM client
/// * `params` - Page size, page number and the active-only flag
///
/// # Errors
///
/// Any [`CrmError`](crate::CrmError) of the transport or a body that is not
/// valid JSON. An envelope without a record list is an empty `Vec`.
pub async fn list(client: &CrmClient, params: &ListParams) -> CrmResult<Vec<Hall>> {
    let body = client
        .post(ENDPOINT, &query(params), AuthMode::ApiKey)
        .await?;
    let halls = parse(&body)?;

    info!(count = halls.len(), "fetched halls from CRM");
    Ok(halls)
}
