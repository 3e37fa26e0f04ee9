//! Request and response bodies of the copy-trading backend.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::models::{ChildOrder, FetchedOrder};

/// Body of `/login` and `/register`.
#[derive(Debug, Serialize)]
pub struct CredentialsRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Answer of `/login` and `/register`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Answer of `GET /orders`.
///
/// Entries are decoded one by one so a malformed order only costs itself.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrdersResponse {
    #[serde(default)]
    pub data: Vec<Value>,
}

impl OrdersResponse {
    /// Decodable orders, in backend order; the rest are logged and dropped.
    pub fn into_orders(self) -> Vec<FetchedOrder> {
        self.data
            .into_iter()
            .enumerate()
            .filter_map(|(index, raw)| {
                let id = raw.get("id").cloned().unwrap_or(Value::Null);
                serde_json::from_value::<FetchedOrder>(raw)
                    .map_err(|e| warn!(index, id = %id, error = %e, "Skipping malformed order"))
                    .ok()
            })
            .collect()
    }
}

/// Body of `POST /orders`.
#[derive(Debug, Serialize)]
pub struct ReportRequest<'a> {
    pub orders: &'a [ChildOrder],
}

/// Answer of `POST /orders`: how many orders the backend newly recorded.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportResponse {
    #[serde(default)]
    pub data: Value,
}

impl ReportResponse {
    pub fn recorded(&self) -> u64 {
        match &self.data {
            Value::Number(n) => n.as_u64().unwrap_or_default(),
            Value::String(s) => s.trim().parse().unwrap_or_default(),
            Value::Array(items) => items.len() as u64,
            _ => 0,
        }
    }
}

/// Error shape shared by every backend endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub error: Option<String>,
}
