//! Fitness club backend-for-frontend.
//!
//! Fitgate sits between a mobile client and the club's CRM. It queries the CRM
//! HTTP API, normalizes the loosely typed records it returns and serves them as
//! stable JSON over a small REST surface.
//!
//! # Modules
//!
//! - `api` - HTTP handlers and response envelopes
//! - `cli` - Command-line operations (`serve`, `check`)
//! - `config` - Configuration management and environment variables
//! - `crm` - CRM transport, response locating and resource adapters
//! - `error` - CRM error taxonomy
//! - `server` - Router assembly and the HTTP listener
//! - `types` - Normalized records and request parameters
//! - `utils` - Date and formatting helpers
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use fitgate::{config::Config, crm::CrmClient, crm::branches, types::ListParams};
//!
//! #[tokio::main]
//! async fn main() -> fitgate::Res<()> {
//!     fitgate::config::load_env().await?;
//!     let config = Config::from_env()?;
//!     let client = Arc::new(CrmClient::new(&config.crm_base_url, &config.crm_api_key)?);
//!     let list = branches::list(&client, &ListParams::new(20)).await?;
//!     println!("{} branches", list.len());
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod crm;
pub mod error;
pub mod server;
pub mod types;
pub mod utils;

pub use error::{CrmError, CrmResult};

/// A convenient Result type alias for operations that may fail.
///
/// Used at the application edges (startup, CLI commands) where errors of
/// different kinds meet. Library code returns [`CrmResult`] instead.
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints an informational message with a blue bullet point.
///
/// # Example
///
/// ```ignore
/// info!("Listening on {}", addr);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Only for fatal errors in the command-line layer. The server and the CRM
/// adapters propagate errors instead.
///
/// # Example
///
/// ```ignore
/// error!("Missing required environment variable: {}", var_name);
/// // Program exits here
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
