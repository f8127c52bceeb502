use tracing::info;

use super::{
    AuthMode, CrmClient, CrmRecord,
    lenient::{Lenient, Record, full_name, text_or},
};
use crate::{
    error::CrmResult,
    types::{ListParams, ListQuery, Teacher},
};

pub const ENDPOINT: &str = "teacher/list";
pub const PLACEHOLDER_NAME: &str = "Coach";

/// Teachers without a hall are attached to the first one.
pub const DEFAULT_HALL_ID: i64 = 1;

const FIELDS: [&str; 7] = [
    "id",
    "firstName",
    "lastName",
    "middleName",
    "phone",
    "email",
    "isActive",
];

impl CrmRecord for Teacher {
    const ALIASES: &'static [&'static str] = &["teachers"];

    fn convert(record: &Record) -> Self {
        // the CRM stores the first name under `name`, the request field list says `firstName`
        let first_name = text_or(record.first_text(&["name", "firstName"]), "");
        let last_name = text_or(record.text("lastName"), "");
        let middle_name = text_or(record.text("middleName"), "");

        Teacher {
            id: record.int("id").unwrap_or_default(),
            full_name: full_name(&last_name, &first_name, &middle_name, PLACEHOLDER_NAME),
            first_name,
            last_name,
            middle_name,
            hall_id: record
                .first_int(&["hallId", "hall_id"])
                .filter(|id| *id > 0)
                .unwrap_or(DEFAULT_HALL_ID),
            phone: text_or(record.phone("phone"), ""),
            email: text_or(record.text("email"), ""),
            is_active: record.flag("isActive").unwrap_or(true),
        }
    }

    fn id(&self) -> i64 {
        self.id
    }
}

/// Builds the CRM query, sorted by last name.
pub fn query(params: &ListParams) -> ListQuery {
    let query = ListQuery::new(&FIELDS, params.limit, params.page).sort_by("lastName", "asc");
    if params.active_only {
        query.column("isActive", true)
    } else {
        query
    }
}

pub fn parse(body: &[u8]) -> CrmResult<Vec<Teacher>> {
    super::parse(body)
}

/// Fetches coaches from the CRM.
///
/// Names are composed as `last first middle`. A coach without any name part
/// is called "Coach", and one without a hall is attached to hall
/// [`DEFAULT_HALL_ID`].
///
/// # Arguments
///
/// * `client` - Shared CRM client
/// * `params` - Page size, page number and the active-only flag
///
/// # Returns
///
/// Returns a `Result` containing:
/// - `Ok(Vec<Teacher>)` - Normalized coaches, possibly empty
/// - `Err(CrmError)` - Transport, timeout, remote or decoding failure
pub async fn list(client: &CrmClient, params: &ListParams) -> CrmResult<Vec<Teacher>> {
    let body = client
        .post(ENDPOINT, &query(params), AuthMode::ApiKey)
        .await?;
    let teachers = parse(&body)?;

    info!(
        count = teachers.len(),
        limit = params.limit,
        page = params.page,
        "fetched teachers from CRM"
    );
    Ok(teachers)
}
