//! Authenticated client for a GitHub Enterprise Server instance.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::QueryError;
use crate::http::{
    HttpError, HttpHeaders, HttpMethod, HttpRequest, HttpResponse, HttpTransport,
    ReqwestTransport,
};

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = concat!("ghes-owners/", env!("CARGO_PKG_VERSION"));

/// Client for the REST (`/api/v3`) and GraphQL (`/api/graphql`) endpoints of
/// one instance.
///
/// The client holds no query state; every paginated call builds its own cursor.
#[derive(Clone)]
pub struct EnterpriseClient {
    transport: Arc<dyn HttpTransport>,
    host: String,
    token: String,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlErrorMessage>,
}

#[derive(Debug, Deserialize)]
struct GraphQlErrorMessage {
    message: String,
}

/// Strip any scheme and trailing slashes from a configured host.
pub fn normalize_host(host: &str) -> String {
    let host = host.trim();
    let host = host
        .strip_prefix("https://")
        .or_else(|| host.strip_prefix("http://"))
        .unwrap_or(host);
    host.trim_end_matches('/').to_string()
}

impl EnterpriseClient {
    /// Create a client backed by reqwest with the given request timeout.
    pub fn new(host: &str, token: &str, timeout: Duration) -> Result<Self, HttpError> {
        let transport = ReqwestTransport::with_timeout(timeout)?;
        Ok(Self::new_with_transport(host, token, Arc::new(transport)))
    }

    pub fn new_with_transport(host: &str, token: &str, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            host: normalize_host(host),
            token: token.to_string(),
        }
    }

    /// Get the normalized host name.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// URL of a REST v3 endpoint on this instance.
    pub fn rest_url(&self, path: &str) -> String {
        format!("https://{}/api/v3{}", self.host, path)
    }

    /// URL of the GraphQL endpoint on this instance.
    pub fn graphql_url(&self) -> String {
        format!("https://{}/api/graphql", self.host)
    }

    fn headers(&self) -> HttpHeaders {
        vec![
            ("Accept".to_string(), "application/json".to_string()),
            ("User-Agent".to_string(), USER_AGENT.to_string()),
            ("Authorization".to_string(), format!("bearer {}", self.token)),
        ]
    }

    /// Make an authenticated GET request against a REST v3 path.
    pub(crate) async fn get(&self, path: &str) -> Result<HttpResponse, HttpError> {
        let request = HttpRequest {
            method: HttpMethod::Get,
            url: self.rest_url(path),
            headers: self.headers(),
            body: Vec::new(),
        };
        self.transport.send(request).await
    }

    /// Run one GraphQL query and decode its `data` object.
    ///
    /// A non-empty `errors` array fails the call even when partial data is
    /// present.
    pub async fn graphql<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T, QueryError> {
        let body = serde_json::to_vec(&serde_json::json!({
            "query": query,
            "variables": variables,
        }))?;

        let mut headers = self.headers();
        headers.push(("Content-Type".to_string(), "application/json".to_string()));

        let request = HttpRequest {
            method: HttpMethod::Post,
            url: self.graphql_url(),
            headers,
            body,
        };

        let response = self.transport.send(request).await?;

        if !response.is_success() {
            let message = String::from_utf8_lossy(&response.body).to_string();
            return Err(QueryError::Api {
                status: response.status,
                message,
            });
        }

        let decoded: GraphQlResponse<T> = serde_json::from_slice(&response.body)?;
        if !decoded.errors.is_empty() {
            return Err(QueryError::GraphQl {
                messages: decoded.errors.into_iter().map(|e| e.message).collect(),
            });
        }

        decoded.data.ok_or(QueryError::MissingData)
    }
}
