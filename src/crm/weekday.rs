//! Day-of-week reconciliation for schedule records.
//!
//! CRM schedule records describe a recurring slot by weekday number, counted
//! 1 = Sunday … 7 = Saturday. Requests ask about a concrete date. A record runs
//! on that date when its weekday, shifted to 0 = Sunday … 6 = Saturday, equals
//! the date's weekday.

use chrono::{Datelike, NaiveDate};

use super::lenient::{Lenient, Record};

/// Field carrying the CRM weekday number.
pub const WEEKDAY_FIELD: &str = "day";

const SATURDAY: i64 = 6;

/// Weekday of `date` with Sunday = 0.
pub fn zero_based_weekday(date: NaiveDate) -> i64 {
    i64::from(date.weekday().num_days_from_sunday())
}

/// CRM weekday to Sunday = 0 numbering. A CRM `0` folds to Saturday.
/// Out-of-range values are kept as they are and match no date.
pub fn from_crm_weekday(crm_day: i64) -> i64 {
    let day = crm_day.saturating_sub(1);
    if day < 0 { SATURDAY } else { day }
}

/// Whether a raw schedule record runs on `date`. Records without a numeric
/// weekday always run.
pub fn runs_on(record: &Record, date: NaiveDate) -> bool {
    match record.int(WEEKDAY_FIELD) {
        Some(crm_day) => from_crm_weekday(crm_day) == zero_based_weekday(date),
        None => true,
    }
}
