//! # CRM Integration Module
//!
//! Everything that talks to the club CRM lives here: the HTTP transport, the
//! envelope locator, the lenient JSON reader and one adapter per resource.
//!
//! ```text
//! REST handlers (api)
//!          ↓
//! Resource adapters (branches, halls, teachers, schedule, clients)
//!     ├── Response locator (items / data / alias)
//!     ├── Lenient decode (typed reads with defaults)
//!     └── Weekday reconciler (schedule only)
//!          ↓
//! CRM transport (reqwest, Basic or session auth)
//!          ↓
//! CRM HTTP API
//! ```
//!
//! Each adapter exposes `list(client, params)` which builds the CRM request
//! body, sends it, and normalizes the answer, plus a pure `parse(body)` that
//! does the normalization alone. Conversion never fails: a record missing a
//! field gets its default, and only records without a positive ID are
//! dropped.

pub mod branches;
pub mod client;
pub mod clients;
pub mod halls;
pub mod lenient;
pub mod locate;
pub mod schedule;
pub mod teachers;
pub mod weekday;

pub use client::{AuthMode, CrmClient, CrmRequest};

use serde_json::Value;

use crate::error::CrmResult;
use lenient::Record;

/// A client-facing record built from one raw CRM record.
pub trait CrmRecord: Sized {
    /// Resource-specific envelope keys tried after `items` and `data`.
    const ALIASES: &'static [&'static str];

    /// Total conversion, defaults fill whatever is missing.
    fn convert(record: &Record) -> Self;

    fn id(&self) -> i64;

    fn keep(&self) -> bool {
        self.id() > 0
    }
}

pub fn decode(body: &[u8]) -> CrmResult<Value> {
    Ok(serde_json::from_slice(body)?)
}

/// Locates, converts and filters every record of an envelope.
pub fn normalize<R: CrmRecord>(envelope: &Value) -> Vec<R> {
    locate::records(envelope, R::ALIASES)
        .map(R::convert)
        .filter(R::keep)
        .collect()
}

pub fn parse<R: CrmRecord>(body: &[u8]) -> CrmResult<Vec<R>> {
    let envelope = decode(body)?;
    let records = normalize::<R>(&envelope);
    tracing::debug!(
        located = locate::locate(&envelope, R::ALIASES).len(),
        kept = records.len(),
        "normalized CRM records"
    );
    Ok(records)
}
