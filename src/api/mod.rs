//! # API Module
//!
//! HTTP handlers of the fitgate REST surface. Every list handler calls one CRM
//! adapter and wraps the normalized records in the same envelope:
//!
//! ```text
//! {"success": true, "<key>": [...], "meta": {"total": n, ..., "timestamp": unix}}
//! ```
//!
//! The public mobile routes (`POST /api/public/*/list`) use the `items` key,
//! the versioned routes (`GET /api/v1/*`) use `data`. Failures are rendered by
//! [`ApiError`].
//!
//! Handlers receive the shared [`CrmClient`](crate::crm::CrmClient) through an
//! axum `Extension`. See [`crate::server::router`] for the route table.

mod clients;
mod cors;
mod error;
mod health;
mod lists;
mod schedule;

use axum::response::Json;
use chrono::Utc;
use serde::Serialize;
use serde_json::{Map, Value, json};

pub use clients::{PhoneLookupRequest, by_phone};
pub use cors::cors_layer;
pub use error::{ApiError, crm_status};
pub use health::health;
pub use lists::{
    BRANCH_LIMIT, HALL_LIMIT, ListRequest, TEACHER_LIMIT, branches_public, branches_v1,
    halls_public, halls_v1, teachers_public, teachers_v1,
};
pub use schedule::{SCHEDULE_LIMIT, ScheduleRequest, schedule_public, schedule_v1};

/// Envelope key of the public mobile routes.
pub const ITEMS_KEY: &str = "items";
/// Envelope key of the versioned routes.
pub const DATA_KEY: &str = "data";

/// Success envelope around a list of records. `total` and `timestamp` are
/// added to whatever `meta` already holds.
pub fn envelope<T: Serialize>(key: &str, items: &[T], meta: Value) -> Json<Value> {
    let mut meta = match meta {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    meta.insert("total".to_string(), json!(items.len()));
    meta.insert("timestamp".to_string(), json!(Utc::now().timestamp()));

    let mut body = Map::new();
    body.insert("success".to_string(), Value::Bool(true));
    body.insert(key.to_string(), json!(items));
    body.insert("meta".to_string(), Value::Object(meta));
    Json(Value::Object(body))
}

/// True for a missing or whitespace-only request body.
fn is_blank(body: &[u8]) -> bool {
    body.iter().all(u8::is_ascii_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_adds_total_and_timestamp() {
        let Json(body) = envelope(ITEMS_KEY, &["a", "b"], json!({"limit": 20}));

        assert_eq!(body["success"], true);
        assert_eq!(body["items"], json!(["a", "b"]));
        assert_eq!(body["meta"]["total"], 2);
        assert_eq!(body["meta"]["limit"], 20);
        assert!(body["meta"]["timestamp"].as_i64().unwrap() > 0);
    }

    #[test]
    fn blank_bodies() {
        assert!(is_blank(b""));
        assert!(is_blank(b" \n\t"));
        assert!(!is_blank(b"{}"));
    }
}
