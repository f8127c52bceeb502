use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde_json::Value;
use tracing::{debug, info};

use super::{
    AuthMode, CrmClient, CrmRecord, decode,
    lenient::{Lenient, Record, full_name, text_or},
    locate, weekday,
};
use crate::{
    error::CrmResult,
    types::{ScheduleFilters, ScheduleItem, ScheduleParams, ScheduleQuery, TimeRange},
    utils,
};

pub const ENDPOINT: &str = "schedule/list";

pub const PLACEHOLDER_NAME: &str = "Group class";
pub const PLACEHOLDER_COACH: &str = "Coach";
pub const PLACEHOLDER_ROOM: &str = "Main hall";

pub const DEFAULT_DURATION: i64 = 60;
pub const DEFAULT_PLACES: i64 = 10;

/// Days covered by one CRM schedule call, and so the widest window served.
pub const WINDOW_DAYS: u32 = 7;

const MAX_PLACES_FIELDS: [&str; 4] = ["placeCount", "places", "maxPlaces", "max_places"];
// later entries override earlier ones
const FREE_PLACES_FIELDS: [&str; 3] = ["freePlaces", "free_places", "availablePlaces"];

impl CrmRecord for ScheduleItem {
    const ALIASES: &'static [&'static str] = &["schedules"];

    fn convert(record: &Record) -> Self {
        let group = record.nested("group");
        let style = group.and_then(|g| g.nested("style"));
        let teacher = group.and_then(|g| g.nested("teacher1"));
        let hall = record.nested("hall");

        let begin = record.int("minutesBegin");
        let duration = begin
            .zip(record.int("minutesEnd"))
            .map(|(begin, end)| end - begin)
            .filter(|minutes| *minutes > 0)
            .unwrap_or(DEFAULT_DURATION);

        let style_name = text_or(style.and_then(|s| s.text("name")), "");
        let name = if style_name.is_empty() {
            text_or(record.first_text(&["name", "title"]), PLACEHOLDER_NAME)
        } else {
            style_name.clone()
        };

        let coach_name = match teacher {
            Some(t) => full_name(
                t.text("lastName").unwrap_or_default(),
                t.first_text(&["name", "firstName"]).unwrap_or_default(),
                t.text("middleName").unwrap_or_default(),
                PLACEHOLDER_COACH,
            ),
            None => PLACEHOLDER_COACH.to_string(),
        };

        let (max_places, free_places) = places(record, group);

        ScheduleItem {
            id: record.int("id").unwrap_or_default(),
            name,
            date: String::new(),
            time: utils::format_minutes(begin.unwrap_or_default()),
            duration,
            coach_id: teacher.and_then(|t| t.int("id")).unwrap_or_default(),
            coach_name,
            room_id: hall.and_then(|h| h.int("id")).unwrap_or_default(),
            room_name: text_or(hall.and_then(|h| h.text("name")), PLACEHOLDER_ROOM),
            max_places,
            free_places,
            style_id: style.and_then(|s| s.int("id")).unwrap_or_default(),
            style_name,
            is_active: record.flag("isActive").unwrap_or(true),
            hall_id: record
                .nested("branch")
                .and_then(|b| b.int("id"))
                .or_else(|| record.first_int(&["branchId", "branch_id"]))
                .unwrap_or_default(),
        }
    }

    fn id(&self) -> i64 {
        self.id
    }
}

/// `(max, free)` capacity of a class.
///
/// A reserved count wins over any explicit free count. Without either, the
/// class is considered empty. Free places always stay within `[0, max]`.
fn places(record: &Record, group: Option<&Record>) -> (i64, i64) {
    let max = group
        .and_then(|g| g.int("placeCount"))
        .or_else(|| record.first_int(&MAX_PLACES_FIELDS))
        .filter(|places| *places > 0)
        .unwrap_or(DEFAULT_PLACES);

    let free = match record.int("reservedPlaces") {
        Some(reserved) => Some(max - reserved),
        None => FREE_PLACES_FIELDS
            .iter()
            .filter_map(|key| record.int(key))
            .last(),
    };

    (max, free.unwrap_or(max).clamp(0, max))
}

/// Builds the CRM query for the week starting at `date_from` midnight UTC.
/// The range end saturates at the latest representable instant.
pub fn query(params: &ScheduleParams) -> ScheduleQuery {
    let from = params.date_from.and_time(NaiveTime::MIN).and_utc();
    let to = from
        .checked_add_signed(Duration::days(WINDOW_DAYS as i64))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);

    ScheduleQuery {
        range: TimeRange {
            from: from.timestamp(),
            to: to.timestamp(),
        },
        filters: ScheduleFilters {
            branch_id: vec![params.branch_id],
            groups: true,
            individuals: false,
            rents: false,
        },
        limit: params.limit,
        page: 1,
    }
}

/// Schedule items of the envelope that run on `date`, stamped with it.
pub fn reconcile(envelope: &Value, date: NaiveDate, branch_id: i64) -> Vec<ScheduleItem> {
    let stamp = utils::format_date(date);

    locate::records(envelope, ScheduleItem::ALIASES)
        .filter(|record| weekday::runs_on(record, date))
        .map(ScheduleItem::convert)
        .filter(ScheduleItem::keep)
        .map(|mut item| {
            item.date = stamp.clone();
            if item.hall_id == 0 {
                item.hall_id = branch_id;
            }
            item
        })
        .collect()
}

/// Reconciles every day of the window against one CRM answer, sorted by
/// date then time.
pub fn parse(body: &[u8], params: &ScheduleParams) -> CrmResult<Vec<ScheduleItem>> {
    let envelope = decode(body)?;
    let located = locate::locate(&envelope, ScheduleItem::ALIASES).len();

    let mut items: Vec<ScheduleItem> =
        utils::date_window(params.date_from, params.date_to, WINDOW_DAYS)
            .into_iter()
            .flat_map(|date| reconcile(&envelope, date, params.branch_id))
            .collect();
    utils::sort_schedule(&mut items);

    debug!(located, kept = items.len(), "reconciled schedule records");
    Ok(items)
}

/// Fetches the class schedule for a date window.
///
/// One CRM call covers the week from `date_from`. Every day of the requested
/// window is reconciled against that answer, so a class recurring on Mondays
/// shows up once per Monday in the window. The call authenticates with the
/// web session when one is set.
///
/// # Arguments
///
/// * `client` - Shared CRM client
/// * `params` - Window, branch filter and page size
///
/// # Returns
///
/// Returns a `Result` containing:
/// - `Ok(Vec<ScheduleItem>)` - Classes sorted by date then time
/// - `Err(CrmError)` - Transport, timeout, remote or decoding failure
///
/// # Example
///
/// ```ignore
/// let day = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
/// let classes = schedule::list(&client, &ScheduleParams::for_day(day, 1, 1000)).await?;
/// ```
pub async fn list(client: &CrmClient, params: &ScheduleParams) -> CrmResult<Vec<ScheduleItem>> {
    let body = client
        .post(ENDPOINT, &query(params), AuthMode::Session)
        .await?;
    let items = parse(&body, params)?;

    info!(
        count = items.len(),
        date_from = %params.date_from,
        date_to = %params.date_to,
        branch_id = params.branch_id,
        "fetched schedule from CRM"
    );
    Ok(items)
}
