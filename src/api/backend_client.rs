//! Copy-trading backend client: login, parent-order fetch, child-order report.

use std::future::Future;
use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use tracing::{debug, warn};

use crate::config::{LookbackHours, Secret, SymbolList};
use crate::error::{RelayError, Result};
use crate::models::{ChildOrder, FetchedOrder};

use super::types::*;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Bearer token issued by `/login` or `/register`.
#[derive(Debug, Clone)]
pub struct SessionToken(Secret);

impl SessionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(Secret::new(token))
    }

    pub fn expose(&self) -> &str {
        self.0.expose()
    }
}

/// Backend operations the relay depends on.
pub trait CopyTradingBackend {
    /// Exchange email and password for a session token.
    fn authenticate(
        &self,
        email: &str,
        password: &Secret,
    ) -> impl Future<Output = Result<SessionToken>> + Send;

    /// Parent orders for `symbols` filled within the last `hours`.
    fn fetch_orders(
        &self,
        token: &SessionToken,
        symbols: &SymbolList,
        hours: LookbackHours,
    ) -> impl Future<Output = Result<Vec<FetchedOrder>>> + Send;

    /// Record placed child orders; returns how many were new to the backend.
    fn report_placed_orders(
        &self,
        token: &SessionToken,
        orders: &[ChildOrder],
    ) -> impl Future<Output = Result<u64>> + Send;
}

/// Account creation, used by the `register` binary.
pub trait AccountRegistrar {
    fn register(
        &self,
        email: &str,
        password: &Secret,
    ) -> impl Future<Output = Result<SessionToken>> + Send;
}

/// HTTP client for the copy-trading backend.
pub struct BackendClient {
    client: Client,
    base_url: String,
}

impl BackendClient {
    /// Create a client for the backend at `base_url`.
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder().timeout(DEFAULT_TIMEOUT).build()?;
        Ok(Self::with_client(client, base_url))
    }

    /// Use a preconfigured HTTP client (for testing).
    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn request_token(&self, endpoint: &str, email: &str, password: &Secret) -> Result<SessionToken> {
        let url = format!("{}/{}", self.base_url, endpoint);
        debug!(url = %url, "Requesting access token");

        let response = self
            .client
            .post(&url)
            .json(&CredentialsRequest {
                email,
                password: password.expose(),
            })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        token_from_response(status, &body)
    }
}

impl CopyTradingBackend for BackendClient {
    async fn authenticate(&self, email: &str, password: &Secret) -> Result<SessionToken> {
        self.request_token("login", email, password).await
    }

    async fn fetch_orders(
        &self,
        token: &SessionToken,
        symbols: &SymbolList,
        hours: LookbackHours,
    ) -> Result<Vec<FetchedOrder>> {
        let url = format!(
            "{}/orders?symbols={}&hours_past={}",
            self.base_url,
            symbols.joined(),
            hours
        );
        debug!(url = %url, "Fetching orders");

        let response = self
            .client
            .get(&url)
            .bearer_auth(token.expose())
            .send()
            .await?;

        let orders: OrdersResponse = ensure_ok(response).await?.json().await?;
        Ok(orders.into_orders())
    }

    async fn report_placed_orders(&self, token: &SessionToken, orders: &[ChildOrder]) -> Result<u64> {
        let url = format!("{}/orders", self.base_url);
        debug!(url = %url, count = orders.len(), "Reporting placed orders");

        let response = self
            .client
            .post(&url)
            .bearer_auth(token.expose())
            .json(&ReportRequest { orders })
            .send()
            .await?;

        let report: ReportResponse = ensure_ok(response).await?.json().await?;
        Ok(report.recorded())
    }
}

impl AccountRegistrar for BackendClient {
    async fn register(&self, email: &str, password: &Secret) -> Result<SessionToken> {
        self.request_token("register", email, password).await
    }
}

/// Pass a 200 response through; turn anything else into a backend error.
async fn ensure_ok(response: Response) -> Result<Response> {
    let status = response.status();
    if status == StatusCode::OK {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    warn!(status = %status, "Backend request failed");
    Err(backend_error(&body))
}

/// `error` field of a failed backend response, or "unknown error".
pub fn backend_error(body: &str) -> RelayError {
    let message = serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .and_then(|e| e.error)
        .unwrap_or_else(|| "unknown error".to_string());
    RelayError::Backend(message)
}

/// Token from a `/login` or `/register` answer.
///
/// Only a 200 carrying a non-empty `access_token` counts as success.
pub fn token_from_response(status: StatusCode, body: &str) -> Result<SessionToken> {
    let parsed: TokenResponse = serde_json::from_str(body).unwrap_or_default();

    if status == StatusCode::OK {
        if let Some(token) = parsed.access_token.filter(|t| !t.is_empty()) {
            return Ok(SessionToken::new(token));
        }
    }

    let reason = parsed
        .error
        .unwrap_or_else(|| format!("no access token in response (status {})", status.as_u16()));
    Err(RelayError::Auth(reason))
}
