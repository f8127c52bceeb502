use tracing::info;

use super::{
    AuthMode, CrmClient, CrmRecord,
    lenient::{Lenient, Record, full_name, text_or},
};
use crate::{
    error::CrmResult,
    types::{ClientLookup, ListQuery},
};

pub const ENDPOINT: &str = "client/list";
pub const PLACEHOLDER_NAME: &str = "Client";

const FIELDS: [&str; 6] = [
    "id",
    "firstName",
    "lastName",
    "middleName",
    "phone",
    "abonement",
];

impl CrmRecord for ClientLookup {
    const ALIASES: &'static [&'static str] = &["clients"];

    fn convert(record: &Record) -> Self {
        let first_name = text_or(record.first_text(&["firstName", "name"]), "");
        let last_name = text_or(record.text("lastName"), "");
        let middle_name = text_or(record.text("middleName"), "");

        ClientLookup {
            id: record.int("id").unwrap_or_default(),
            full_name: full_name(&last_name, &first_name, &middle_name, PLACEHOLDER_NAME),
            first_name,
            last_name,
            middle_name,
            phone: text_or(record.phone("phone"), ""),
        }
    }

    fn id(&self) -> i64 {
        self.id
    }
}

/// Newest active client with exactly this phone number.
pub fn query(phone: &str) -> ListQuery {
    ListQuery::new(&FIELDS, 1, 1)
        .sort_by("created", "desc")
        .column("phone", phone)
        .column("isActive", true)
}

/// First usable client of the envelope. A record without a phone of its own
/// gets the phone it was looked up by.
pub fn parse(body: &[u8], phone: &str) -> CrmResult<Option<ClientLookup>> {
    let client = super::parse::<ClientLookup>(body)?
        .into_iter()
        .next()
        .map(|mut client| {
            if client.phone.is_empty() {
                client.phone = phone.to_string();
            }
            client
        });
    Ok(client)
}

/// Looks up a club member by phone number.
///
/// # Arguments
///
/// * `client` - Shared CRM client
/// * `phone` - Phone number exactly as the CRM stores it
///
/// # Returns
///
/// Returns a `Result` containing:
/// - `Ok(Some(ClientLookup))` - The newest active client with that phone
/// - `Ok(None)` - No such client
/// - `Err(CrmError)` - Transport, timeout, remote or decoding failure
pub async fn find_by_phone(client: &CrmClient, phone: &str) -> CrmResult<Option<ClientLookup>> {
    let body = client
        .post(ENDPOINT, &query(phone), AuthMode::ApiKey)
        .await?;
    let found = parse(&body, phone)?;

    info!(found = found.is_some(), "looked up client by phone");
    Ok(found)
}
