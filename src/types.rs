use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tabled::Tabled;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub address: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub phone: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub city: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hall {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub capacity: i64,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teacher {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub middle_name: String,
    pub full_name: String,
    pub hall_id: i64,
    pub phone: String,
    pub email: String,
    pub is_active: bool,
}

/// One class occurrence on a concrete date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleItem {
    pub id: i64,
    pub name: String,
    /// `YYYY-MM-DD`, always the date the caller asked for.
    pub date: String,
    /// `HH:MM`
    pub time: String,
    /// Minutes.
    pub duration: i64,
    pub coach_id: i64,
    pub coach_name: String,
    pub room_id: i64,
    pub room_name: String,
    pub max_places: i64,
    pub free_places: i64,
    pub style_id: i64,
    pub style_name: String,
    pub is_active: bool,
    pub hall_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientLookup {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub middle_name: String,
    pub full_name: String,
    pub phone: String,
}

/// Pagination and filtering shared by the plain list resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListParams {
    pub limit: u32,
    pub page: u32,
    pub active_only: bool,
}

impl ListParams {
    pub fn new(limit: u32) -> Self {
        Self {
            limit,
            page: 1,
            active_only: true,
        }
    }
}

/// Schedule window. A single-day request has `date_from == date_to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleParams {
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub branch_id: i64,
    pub limit: u32,
}

impl ScheduleParams {
    pub fn for_day(date: NaiveDate, branch_id: i64, limit: u32) -> Self {
        Self {
            date_from: date,
            date_to: date,
            branch_id,
            limit,
        }
    }
}

/// Body of a CRM `*/list` call.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ListQuery {
    pub fields: Vec<&'static str>,
    pub limit: u32,
    pub page: u32,
    pub sort: BTreeMap<&'static str, &'static str>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub columns: BTreeMap<&'static str, Value>,
}

impl ListQuery {
    pub fn new(fields: &[&'static str], limit: u32, page: u32) -> Self {
        Self {
            fields: fields.to_vec(),
            limit,
            page,
            ..Default::default()
        }
    }

    pub fn sort_by(mut self, field: &'static str, direction: &'static str) -> Self {
        self.sort.insert(field, direction);
        self
    }

    pub fn column(mut self, name: &'static str, value: impl Into<Value>) -> Self {
        self.columns.insert(name, value.into());
        self
    }
}

/// Body of the CRM `schedule/list` call, which does not follow the `*/list` shape.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleQuery {
    pub range: TimeRange,
    pub filters: ScheduleFilters,
    pub limit: u32,
    pub page: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct TimeRange {
    pub from: i64,
    pub to: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScheduleFilters {
    pub branch_id: Vec<i64>,
    pub groups: bool,
    pub individuals: bool,
    pub rents: bool,
}

#[derive(Tabled)]
pub struct RecordTableRow {
    pub id: i64,
    pub name: String,
    pub details: String,
}

fn is_zero(value: &i64) -> bool {
    *value == 0
}
