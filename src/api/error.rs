use std::fmt::Display;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::error::CrmError;

/// Everything a handler can fail with.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{context}: {source}")]
    Crm {
        context: &'static str,
        source: CrmError,
    },

    #[error("{summary}: {details}")]
    BadRequest {
        summary: &'static str,
        details: String,
    },

    #[error("{summary}: {details}")]
    NotFound {
        summary: &'static str,
        details: String,
    },
}

impl ApiError {
    /// Wraps a CRM failure with a short summary, for use with `map_err`.
    pub fn crm(context: &'static str) -> impl FnOnce(CrmError) -> Self {
        move |source| ApiError::Crm { context, source }
    }

    pub fn bad_request(summary: &'static str, details: impl Display) -> Self {
        ApiError::BadRequest {
            summary,
            details: details.to_string(),
        }
    }

    pub fn not_found(summary: &'static str, details: impl Display) -> Self {
        ApiError::NotFound {
            summary,
            details: details.to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Crm { source, .. } => crm_status(source),
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
        }
    }

    fn parts(&self) -> (&'static str, String) {
        match self {
            ApiError::Crm { context, source } => (*context, source.to_string()),
            ApiError::BadRequest { summary, details } | ApiError::NotFound { summary, details } => {
                (*summary, details.clone())
            }
        }
    }
}

/// HTTP status a CRM failure is reported with.
pub fn crm_status(err: &CrmError) -> StatusCode {
    match err {
        CrmError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        CrmError::Transport(_) => StatusCode::SERVICE_UNAVAILABLE,
        CrmError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        CrmError::Remote { .. } | CrmError::MalformedResponse { .. } | CrmError::Parse(_) => {
            StatusCode::BAD_GATEWAY
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (summary, details) = self.parts();

        if status.is_server_error() {
            error!(status = status.as_u16(), %details, "{summary}");
        } else {
            warn!(status = status.as_u16(), %details, "{summary}");
        }

        let body = Json(json!({
            "success": false,
            "error": summary,
            "details": details,
        }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn crm_failures_map_to_gateway_statuses() {
        assert_eq!(
            crm_status(&CrmError::Timeout(Duration::from_secs(15))),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            crm_status(&CrmError::Remote {
                status: 500,
                body: "boom".to_string()
            }),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            crm_status(&CrmError::Config("missing key".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn crm_error_keeps_summary_and_cause() {
        let err = ApiError::crm("Failed to fetch halls")(CrmError::Remote {
            status: 401,
            body: "denied".to_string(),
        });

        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        let (summary, details) = err.parts();
        assert_eq!(summary, "Failed to fetch halls");
        assert_eq!(details, "CRM returned status 401: denied");
    }

    #[test]
    fn client_errors() {
        assert_eq!(
            ApiError::bad_request("Invalid date_from", "bad").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::not_found("Client not found", "none").status(),
            StatusCode::NOT_FOUND
        );
    }
}
