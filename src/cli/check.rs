use std::time::Duration;

use clap::ValueEnum;
use indicatif::{ProgressBar, ProgressStyle};
use tabled::Table;

use crate::{
    api::{BRANCH_LIMIT, HALL_LIMIT, SCHEDULE_LIMIT, TEACHER_LIMIT},
    config::Config,
    crm::{CrmClient, branches, halls, schedule, teachers},
    error,
    error::CrmResult,
    info, success,
    types::{ListParams, RecordTableRow, ScheduleParams},
    utils, warning,
};

use super::connect;

/// CRM resources the probe can fetch.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Resource {
    #[default]
    Branches,
    Halls,
    Teachers,
    Schedule,
}

impl Resource {
    fn label(self) -> &'static str {
        match self {
            Resource::Branches => "branches",
            Resource::Halls => "halls",
            Resource::Teachers => "teachers",
            Resource::Schedule => "schedule",
        }
    }
}

/// Fetches one resource from the CRM and prints it as a table.
pub async fn check(config: Config, resource: Resource, date: Option<String>, branch: i64) {
    let day = match utils::parse_request_date(date.as_deref()) {
        Ok(day) => day,
        Err(e) => error!("Invalid date, expected YYYY-MM-DD. Err: {}", e),
    };

    let crm = match connect(&config).await {
        Ok(crm) => crm,
        Err(e) => error!("Cannot create CRM client. Err: {}", e),
    };
    info!("Checking {} at {}", resource.label(), crm.base_url());

    let pb = ProgressBar::new_spinner();
    pb.set_message(format!("Fetching {}...", resource.label()));
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );

    let schedule_params = ScheduleParams::for_day(day, branch, SCHEDULE_LIMIT);
    let result = fetch_rows(&crm, resource, schedule_params).await;
    pb.finish_and_clear();

    match result {
        Ok(rows) if rows.is_empty() => {
            warning!("CRM answered, but returned no {}", resource.label())
        }
        Ok(rows) => {
            let count = rows.len();
            println!("{}", Table::new(rows));
            success!("Fetched {} {} from the CRM", count, resource.label());
        }
        Err(e) => error!("Failed to fetch {}. Err: {}", resource.label(), e),
    }
}

async fn fetch_rows(
    crm: &CrmClient,
    resource: Resource,
    schedule_params: ScheduleParams,
) -> CrmResult<Vec<RecordTableRow>> {
    let rows = match resource {
        Resource::Branches => branches::list(crm, &ListParams::new(BRANCH_LIMIT))
            .await?
            .into_iter()
            .map(|b| RecordTableRow {
                id: b.id,
                name: b.name,
                details: [b.city, b.address, b.phone]
                    .into_iter()
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
            .collect(),
        Resource::Halls => halls::list(crm, &ListParams::new(HALL_LIMIT))
            .await?
            .into_iter()
            .map(|h| RecordTableRow {
                id: h.id,
                name: h.name,
                details: h.address,
            })
            .collect(),
        Resource::Teachers => teachers::list(crm, &ListParams::new(TEACHER_LIMIT))
            .await?
            .into_iter()
            .map(|t| RecordTableRow {
                id: t.id,
                name: t.full_name,
                details: format!("hall {}", t.hall_id),
            })
            .collect(),
        Resource::Schedule => schedule::list(crm, &schedule_params)
            .await?
            .into_iter()
            .map(|s| RecordTableRow {
                id: s.id,
                name: s.name,
                details: format!(
                    "{} {} ({} min) {} / {} free of {}",
                    s.date, s.time, s.duration, s.coach_name, s.free_places, s.max_places
                ),
            })
            .collect(),
    };
    Ok(rows)
}
