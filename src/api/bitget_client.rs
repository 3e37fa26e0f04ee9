//! Bitget futures (mix v1) client for placing child orders.
//!
//! Private endpoints are authenticated with four headers:
//! - `ACCESS-KEY`: the API key
//! - `ACCESS-SIGN`: base64(HMAC-SHA256(secret, timestamp + method + path + body))
//! - `ACCESS-TIMESTAMP`: milliseconds since the epoch
//! - `ACCESS-PASSPHRASE`: the passphrase chosen when the key was created

use std::future::Future;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::Utc;
use hmac::{Hmac, Mac};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Method};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::Sha256;
use tracing::debug;

use crate::config::{exchange_symbol, ExchangeCredentials};
use crate::error::{RelayError, Result};
use crate::models::de::opt_string_or_number;
use crate::models::{FetchedOrder, OrderType};

/// Bitget REST base URL
pub const BITGET_URL: &str = "https://api.bitget.com";

/// Mix v1 place-order endpoint
pub const PLACE_ORDER_PATH: &str = "/api/mix/v1/order/placeOrder";

/// Anything that can submit a child order.
pub trait OrderPlacer {
    fn place_order(
        &self,
        request: &PlaceOrderRequest,
    ) -> impl Future<Output = Result<PlaceOrderResponse>> + Send;
}

impl<T: OrderPlacer> OrderPlacer for &T {
    fn place_order(
        &self,
        request: &PlaceOrderRequest,
    ) -> impl Future<Output = Result<PlaceOrderResponse>> + Send {
        (**self).place_order(request)
    }
}

/// Body of the place-order call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    /// Exchange symbol with margin-market suffix, e.g. `BTCUSDT_UMCBL`
    pub symbol: String,
    pub margin_coin: String,
    pub size: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    pub side: String,
    pub order_type: OrderType,
    pub client_oid: String,
}

impl PlaceOrderRequest {
    /// Market-order copy of `parent` tagged with `client_oid`.
    ///
    /// Fails when the parent's size is not a number.
    pub fn copy_of(parent: &FetchedOrder, client_oid: String) -> Result<Self> {
        Ok(Self {
            symbol: exchange_symbol(&parent.symbol),
            margin_coin: parent.margin_coin.clone(),
            size: parent.order_size()?,
            price: parent.copy_price(),
            side: parent.side.clone(),
            order_type: OrderType::Market,
            client_oid,
        })
    }
}

/// Envelope of every Bitget answer.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaceOrderResponse {
    /// `"00000"` on success; sometimes sent as a number
    #[serde(default)]
    pub code: Value,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub data: Option<PlaceOrderData>,
}

/// Identifiers of an accepted order.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderData {
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub order_id: Option<String>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub client_oid: Option<String>,
}

impl PlaceOrderResponse {
    /// Numeric value of `code`, if it has one.
    pub fn code_value(&self) -> Option<i64> {
        match &self.code {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// A code of zero means the exchange accepted the order.
    pub fn is_accepted(&self) -> bool {
        self.code_value() == Some(0)
    }
}

/// Signed Bitget REST client.
pub struct BitgetClient {
    http: Client,
    base_url: String,
    credentials: ExchangeCredentials,
}

impl BitgetClient {
    /// Create a client against the production API.
    pub fn new(credentials: ExchangeCredentials) -> Result<Self> {
        Self::with_base_url(credentials, BITGET_URL)
    }

    /// Create with custom base URL (for testing).
    pub fn with_base_url(credentials: ExchangeCredentials, base_url: &str) -> Result<Self> {
        let http = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Self::with_client(credentials, http, base_url)
    }

    fn with_client(credentials: ExchangeCredentials, http: Client, base_url: &str) -> Result<Self> {
        let credentials = ExchangeCredentials::new(
            credentials.api_key,
            credentials.api_secret,
            credentials.api_passphrase,
        )?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    /// base64(HMAC-SHA256(secret, timestamp + method + path + body))
    fn sign(&self, timestamp: &str, method: &Method, path: &str, body: &str) -> Result<String> {
        let payload = format!("{}{}{}{}", timestamp, method.as_str(), path, body);
        let mut mac = Hmac::<Sha256>::new_from_slice(self.credentials.api_secret.expose().as_bytes())
            .map_err(|e| RelayError::validation(format!("Invalid bitget api secret: {}", e)))?;
        mac.update(payload.as_bytes());
        Ok(BASE64.encode(mac.finalize().into_bytes()))
    }

    fn signed_headers(&self, method: &Method, path: &str, body: &str) -> Result<HeaderMap> {
        let timestamp = Utc::now().timestamp_millis().to_string();
        let signature = self.sign(&timestamp, method, path, body)?;

        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("access-key"),
            header_value(self.credentials.api_key.expose())?,
        );
        headers.insert(HeaderName::from_static("access-sign"), header_value(&signature)?);
        headers.insert(HeaderName::from_static("access-timestamp"), header_value(&timestamp)?);
        headers.insert(
            HeaderName::from_static("access-passphrase"),
            header_value(self.credentials.api_passphrase.expose())?,
        );
        headers.insert(HeaderName::from_static("locale"), HeaderValue::from_static("en-US"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        Ok(headers)
    }
}

impl OrderPlacer for BitgetClient {
    async fn place_order(&self, request: &PlaceOrderRequest) -> Result<PlaceOrderResponse> {
        let body = serde_json::to_string(request)
            .map_err(|e| RelayError::Exchange(format!("Failed to encode order: {}", e)))?;
        let headers = self.signed_headers(&Method::POST, PLACE_ORDER_PATH, &body)?;

        let url = format!("{}{}", self.base_url, PLACE_ORDER_PATH);
        debug!(url = %url, symbol = %request.symbol, client_oid = %request.client_oid, "Placing order");

        let resp = self.http.post(&url).headers(headers).body(body).send().await?;

        // Rejections come back as JSON with a non-zero code, often with a 4xx status.
        let status = resp.status();
        let text = resp.text().await?;
        serde_json::from_str(&text).map_err(|_| {
            RelayError::Exchange(format!("Unexpected exchange response: {} - {}", status, text))
        })
    }
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|_| RelayError::validation("Bitget credentials contain characters not allowed in headers."))
}
