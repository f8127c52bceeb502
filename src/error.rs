//! Error taxonomy for everything that talks to the CRM.
//!
//! Only request-level failures are errors. Record-level problems (missing IDs,
//! mistyped fields) are normalized or filtered by the adapters and never
//! surface here.

use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CrmError {
    /// Required CRM credentials are missing or unusable. Fatal at startup.
    #[error("configuration error: {0}")]
    Config(String),

    /// The CRM could not be reached at all.
    #[error("failed to reach CRM: {0}")]
    Transport(#[source] reqwest::Error),

    /// The CRM did not answer within the request timeout.
    #[error("CRM request timed out after {0:?}")]
    Timeout(Duration),

    /// The CRM answered with a non-success status.
    #[error("CRM returned status {status}: {body}")]
    Remote { status: u16, body: String },

    /// The CRM answered 200 with something that is not JSON (HTML/XML error page).
    #[error("CRM returned a non-JSON body (content-type: {content_type}): {preview}")]
    MalformedResponse {
        content_type: String,
        preview: String,
    },

    /// The body looked like JSON but could not be decoded.
    #[error("failed to decode CRM response: {0}")]
    Parse(#[from] serde_json::Error),
}

impl CrmError {
    /// Maps a reqwest failure into the timeout or transport variant.
    pub fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            CrmError::Timeout(timeout)
        } else {
            CrmError::Transport(err)
        }
    }
}

pub type CrmResult<T> = Result<T, CrmError>;
