use std::time::Duration;

use reqwest::{
    Client, Method, Url,
    header::{ACCEPT, CACHE_CONTROL, CONTENT_TYPE, ORIGIN, PRAGMA, REFERER, USER_AGENT},
};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, error, warn};

use crate::{
    error::{CrmError, CrmResult},
    utils,
};

/// Hard limit for a single CRM round-trip.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Maximum number of characters of a failing body kept in an error.
pub const PREVIEW_LIMIT: usize = 500;

const SESSION_QUERY_PARAM: &str = "PHPSESSID";
const BROWSER_ACCEPT: &str = "application/json, text/plain, */*";
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/143.0.0.0 Safari/537.36";

/// How a request authenticates against the CRM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    /// HTTP Basic with a blank username and the API key as password.
    #[default]
    ApiKey,
    /// Web-session token as a query parameter plus browser-like headers.
    /// The schedule endpoint only answers this way.
    Session,
}

/// A single call against the CRM, described as data.
#[derive(Debug, Clone)]
pub struct CrmRequest {
    pub method: Method,
    pub endpoint: String,
    pub body: Option<Value>,
    pub auth: AuthMode,
}

impl CrmRequest {
    pub fn post<B: Serialize>(endpoint: &str, body: &B) -> CrmResult<Self> {
        Ok(Self {
            method: Method::POST,
            endpoint: endpoint.to_string(),
            body: Some(serde_json::to_value(body)?),
            auth: AuthMode::ApiKey,
        })
    }

    pub fn get(endpoint: &str) -> Self {
        Self {
            method: Method::GET,
            endpoint: endpoint.to_string(),
            body: None,
            auth: AuthMode::ApiKey,
        }
    }

    pub fn with_auth(mut self, auth: AuthMode) -> Self {
        self.auth = auth;
        self
    }
}

/// The one HTTP client that talks to the CRM.
///
/// Built once by the composition root and shared as `Arc<CrmClient>`. The only
/// mutable part is the schedule session token, which sits behind a
/// reader/writer lock so concurrent requests read it in parallel.
#[derive(Debug)]
pub struct CrmClient {
    base_url: String,
    api_key: String,
    origin: String,
    timeout: Duration,
    http: Client,
    session: RwLock<Option<String>>,
}

impl CrmClient {
    pub fn new(base_url: &str, api_key: &str) -> CrmResult<Self> {
        Self::with_timeout(base_url, api_key, REQUEST_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, api_key: &str, timeout: Duration) -> CrmResult<Self> {
        if api_key.trim().is_empty() {
            return Err(CrmError::Config("CRM API key is required".to_string()));
        }
        if base_url.trim().is_empty() {
            return Err(CrmError::Config("CRM base URL is required".to_string()));
        }

        let base_url = normalize_base_url(base_url.trim());
        let origin = Url::parse(&base_url)
            .map_err(|e| CrmError::Config(format!("invalid CRM base URL {base_url}: {e}")))?
            .origin()
            .ascii_serialization();

        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(CrmError::Transport)?;

        Ok(Self {
            base_url,
            api_key: api_key.trim().to_string(),
            origin,
            timeout,
            http,
            session: RwLock::new(None),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    /// Sets the web-session token used by [`AuthMode::Session`] requests.
    pub async fn set_session(&self, session_id: impl Into<String>) {
        let session_id = session_id.into();
        let mut lock = self.session.write().await;
        *lock = Some(session_id).filter(|s| !s.is_empty());
        debug!(present = lock.is_some(), "CRM session token updated");
    }

    pub async fn session(&self) -> Option<String> {
        self.session.read().await.clone()
    }

    pub async fn post<B: Serialize>(
        &self,
        endpoint: &str,
        body: &B,
        auth: AuthMode,
    ) -> CrmResult<Vec<u8>> {
        self.send(CrmRequest::post(endpoint, body)?.with_auth(auth))
            .await
    }

    pub async fn get(&self, endpoint: &str) -> CrmResult<Vec<u8>> {
        self.send(CrmRequest::get(endpoint)).await
    }

    /// Executes one request and returns the raw body of a successful JSON answer.
    pub async fn send(&self, request: CrmRequest) -> CrmResult<Vec<u8>> {
        let url = self.endpoint_url(&request.endpoint);
        let mut builder = self.http.request(request.method.clone(), &url);

        let session = match request.auth {
            AuthMode::Session => {
                let session = self.session().await;
                if session.is_none() {
                    warn!(
                        endpoint = request.endpoint.as_str(),
                        "no CRM session token set, falling back to API key auth"
                    );
                }
                session
            }
            AuthMode::ApiKey => None,
        };

        builder = match &session {
            Some(session_id) => builder
                .query(&[(SESSION_QUERY_PARAM, session_id.as_str())])
                .header(ACCEPT, BROWSER_ACCEPT)
                .header(USER_AGENT, BROWSER_USER_AGENT)
                .header(REFERER, format!("{}/schedule", self.origin))
                .header(ORIGIN, self.origin.as_str())
                .header(CACHE_CONTROL, "no-cache")
                .header(PRAGMA, "no-cache"),
            None => builder
                .basic_auth("", Some(&self.api_key))
                .header(ACCEPT, "application/json"),
        };

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        debug!(
            method = %request.method,
            url = url.as_str(),
            session = session.is_some(),
            "sending CRM request"
        );

        let response = builder.send().await.map_err(|e| {
            error!(url = url.as_str(), error = %e, "CRM request failed");
            CrmError::from_reqwest(e, self.timeout)
        })?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body = response
            .bytes()
            .await
            .map_err(|e| CrmError::from_reqwest(e, self.timeout))?;

        debug!(status = status.as_u16(), bytes = body.len(), "CRM response received");

        if !status.is_success() {
            let body = utils::preview(&body, PREVIEW_LIMIT);
            error!(status = status.as_u16(), body = body.as_str(), "CRM returned an error status");
            return Err(CrmError::Remote {
                status: status.as_u16(),
                body,
            });
        }

        check_json_body(&content_type, &body)?;
        Ok(body.to_vec())
    }
}

/// Ensures the base URL ends with exactly one `/`.
pub fn normalize_base_url(base_url: &str) -> String {
    format!("{}/", base_url.trim_end_matches('/'))
}

/// Rejects bodies that are clearly not JSON before anyone tries to decode them.
/// The CRM serves HTML/XML error pages with a 200 status now and then.
pub fn check_json_body(content_type: &str, body: &[u8]) -> CrmResult<()> {
    match body.iter().find(|b| !b.is_ascii_whitespace()) {
        None | Some(b'{') | Some(b'[') => Ok(()),
        Some(_) => {
            let preview = utils::preview(body, PREVIEW_LIMIT);
            error!(
                content_type,
                preview = preview.as_str(),
                "CRM returned a non-JSON body"
            );
            Err(CrmError::MalformedResponse {
                content_type: content_type.to_string(),
                preview,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_with_exactly_one_separator() {
        let client = CrmClient::new("https://club.example.com/api/public", "key").unwrap();
        assert_eq!(
            client.endpoint_url("/branch/list"),
            "https://club.example.com/api/public/branch/list"
        );

        let client = CrmClient::new("https://club.example.com/api/public//", "key").unwrap();
        assert_eq!(
            client.endpoint_url("branch/list"),
            "https://club.example.com/api/public/branch/list"
        );
    }

    #[test]
    fn missing_credentials_are_config_errors() {
        assert!(matches!(
            CrmClient::new("https://club.example.com/", ""),
            Err(CrmError::Config(_))
        ));
        assert!(matches!(
            CrmClient::new("  ", "key"),
            Err(CrmError::Config(_))
        ));
        assert!(matches!(
            CrmClient::new("not a url", "key"),
            Err(CrmError::Config(_))
        ));
    }

    #[test]
    fn html_body_is_malformed() {
        let err = check_json_body("text/html", b"<html><body>502</body></html>").unwrap_err();
        match err {
            CrmError::MalformedResponse {
                content_type,
                preview,
            } => {
                assert_eq!(content_type, "text/html");
                assert!(preview.starts_with("<html>"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn json_bodies_pass_the_shape_check() {
        assert!(check_json_body("application/json", b"{\"items\":[]}").is_ok());
        assert!(check_json_body("application/json", b"  [1,2]").is_ok());
        assert!(check_json_body("application/json", b"").is_ok());
    }

    #[tokio::test]
    async fn empty_session_clears_the_token() {
        let client = CrmClient::new("https://club.example.com/", "key").unwrap();
        client.set_session("abc").await;
        assert_eq!(client.session().await.as_deref(), Some("abc"));
        client.set_session("").await;
        assert_eq!(client.session().await, None);
    }
}
