//! # CLI Module
//!
//! Command-line operations of fitgate.
//!
//! - [`serve`] - Starts the REST server in front of the CRM
//! - [`check`] - Probes the CRM through one adapter and prints the normalized
//!   records as a table
//!
//! Both commands build the shared [`CrmClient`] through [`connect`], which
//! also seeds the schedule session token when one is configured. Console
//! feedback uses the crate's colored macros; fatal problems exit through
//! `error!`.
//!
//! ```bash
//! fitgate serve --addr 127.0.0.1:8080
//! fitgate check --resource schedule --date 2024-01-15 --branch 1
//! ```

mod check;
mod serve;

use std::sync::Arc;

use crate::{config::Config, crm::CrmClient, error::CrmResult};

pub use check::{Resource, check};
pub use serve::serve;

/// Builds the shared CRM client for a configuration.
///
/// # Errors
///
/// [`crate::CrmError::Config`] when the base URL or API key is unusable.
pub async fn connect(config: &Config) -> CrmResult<Arc<CrmClient>> {
    let client = CrmClient::new(&config.crm_base_url, &config.crm_api_key)?;
    if let Some(session) = &config.crm_session_id {
        client.set_session(session.clone()).await;
    }
    Ok(Arc::new(client))
}
