use tracing::info;

use super::{
    AuthMode, CrmClient, CrmRecord,
    lenient::{Lenient, Record, text_or},
};
use crate::{
    error::CrmResult,
    types::{Branch, ListParams, ListQuery},
};

pub const ENDPOINT: &str = "branch/list";
pub const PLACEHOLDER_NAME: &str = "Branch";

const FIELDS: [&str; 3] = ["id", "name", "phone"];

impl CrmRecord for Branch {
    const ALIASES: &'static [&'static str] = &["branches"];

    fn convert(record: &Record) -> Self {
        Branch {
            id: record.int("id").unwrap_or_default(),
            name: text_or(record.text("name"), PLACEHOLDER_NAME),
            address: text_or(record.text("address"), ""),
            phone: text_or(record.phone("phone"), ""),
            city: text_or(record.text("city"), ""),
            is_active: record.flag("isActive").unwrap_or(true),
        }
    }

    fn id(&self) -> i64 {
        self.id
    }
}

/// Builds the CRM query. The CRM rejects an activity filter on branches, so
/// `active_only` is applied after normalization instead.
pub fn query(params: &ListParams) -> ListQuery {
    ListQuery::new(&FIELDS, params.limit, params.page).sort_by("id", "asc")
}

/// Normalizes a raw `branch/list` answer. Inactive branches are kept here.
///
/// # Errors
///
/// [`CrmError::Parse`](crate::CrmError::Parse) when the body is not valid JSON.
pub fn parse(body: &[u8]) -> CrmResult<Vec<Branch>> {
    super::parse(body)
}

/// Fetches club branches from the CRM.
///
/// Branches come back sorted by ID. With `active_only` set, inactive branches
/// are dropped after normalization.
///
/// # Arguments
///
/// * `client` - Shared CRM client
/// * `params` - Page size, page number and the active-only flag
///
/// # Returns
///
/// Returns a `Result` containing:
/// - `Ok(Vec<Branch>)` - Normalized branches, possibly empty
/// - `Err(CrmError)` - Transport, timeout, remote or decoding failure
///
/// # Example
///
/// ```ignore
/// let branches = branches::list(&client, &ListParams::new(20)).await?;
/// ```
pub async fn list(client: &CrmClient, params: &ListParams) -> CrmResult<Vec<Branch>> {
    let body = client
        .post(ENDPOINT, &query(params), AuthMode::ApiKey)
        .await?;

    let mut branches = parse(&body)?;
    if params.active_only {
        branches.retain(|b| b.is_active);
    }

    info!(count = branches.len(), "fetched branches from CRM");
    Ok(branches)
}
