//! Configuration management for fitgate.
//!
//! Values come from environment variables, which may be seeded from `.env`
//! files. The lookup order is:
//! 1. Environment variables already set (highest priority)
//! 2. `.env` in the working directory
//! 3. `.env` in the local data directory (`<data_local_dir>/fitgate/.env`)
//! 4. Application defaults (where applicable)
//!
//! The CRM base URL and API key have no default. Without them the server
//! refuses to start.

use std::{env, path::PathBuf};

use crate::error::{CrmError, CrmResult};

pub const DEFAULT_SERVER_ADDRESS: &str = "0.0.0.0:8080";

/// Loads environment variables from `.env` files.
///
/// Variables that are already set are never overwritten, so the working
/// directory `.env` takes precedence over the one in the data directory.
/// The data directory is created if it does not exist yet, which gives users
/// an obvious place to drop their configuration. Missing files are not an
/// error.
///
/// # Errors
///
/// Returns an error if the data directory cannot be created or if an existing
/// `.env` file cannot be parsed.
pub async fn load_env() -> Result<(), String> {
    load_dotenv(dotenv::dotenv())?;

    let path = data_env_path();
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    load_dotenv(dotenv::from_path(&path))
}

fn load_dotenv<T>(result: dotenv::Result<T>) -> Result<(), String> {
    match result {
        Ok(_) => Ok(()),
        Err(dotenv::Error::Io(_)) => Ok(()),
        Err(e) => Err(e.to_string()),
    }
}

pub fn data_env_path() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("fitgate/.env");
    path
}

/// Runtime settings of the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub crm_base_url: String,
    pub crm_api_key: String,
    /// Web-session token for the schedule endpoint.
    pub crm_session_id: Option<String>,
    pub server_address: String,
}

impl Config {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// [`CrmError::Config`] when `CRM_BASE_URL` or `CRM_API_KEY` is missing
    /// or blank.
    pub fn from_env() -> CrmResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`Config::from_env`] with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> CrmResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let crm_api_key = get("CRM_API_KEY").ok_or_else(|| {
            CrmError::Config(
                "CRM API key is required (set CRM_API_KEY in the environment or .env)".to_string(),
            )
        })?;
        let crm_base_url = get("CRM_BASE_URL").ok_or_else(|| {
            CrmError::Config(
                "CRM base URL is required (set CRM_BASE_URL in the environment or .env)"
                    .to_string(),
            )
        })?;

        Ok(Self {
            crm_base_url,
            crm_api_key,
            crm_session_id: get("CRM_SESSION_ID"),
            server_address: get("SERVER_ADDRESS")
                .unwrap_or_else(|| DEFAULT_SERVER_ADDRESS.to_string()),
        })
    }

    pub fn with_server_address(mut self, address: Option<String>) -> Self {
        if let Some(address) = address {
            self.server_address = address;
        }
        self
    }
}
