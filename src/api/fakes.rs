//! In-memory backend and exchange used by unit tests.

use std::sync::Mutex;

use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

use crate::config::{LookbackHours, Secret, SymbolList};
use crate::error::{RelayError, Result};
use crate::models::{ChildOrder, FetchedOrder};

use super::{
    AccountRegistrar, CopyTradingBackend, OrderPlacer, PlaceOrderRequest, PlaceOrderResponse,
    SessionToken,
};

pub fn fetched_order(id: u64, symbol: &str) -> FetchedOrder {
    serde_json::from_value(json!({
        "id": id,
        "symbol": symbol,
        "marginCoin": "USDT",
        "size": "0.01",
        "side": "open_long",
        "orderType": "limit",
        "price": "100",
        "priceAvg": "100.5",
        "filledQty": "0.01",
        "fee": "-0.01",
        "state": "filled",
        "ctime": 1700000000000i64
    }))
    .unwrap()
}

#[derive(Default)]
pub struct FakeBackend {
    pub token: Option<String>,
    pub orders: Vec<FetchedOrder>,
    pub fetch_error: Option<String>,
    pub fetches: Mutex<Vec<(String, u32)>>,
    pub reports: Mutex<Vec<Vec<ChildOrder>>>,
    pub registrations: Mutex<Vec<String>>,
}

impl FakeBackend {
    pub fn with_orders(orders: Vec<FetchedOrder>) -> Self {
        Self {
            token: Some("token".to_string()),
            orders,
            ..Default::default()
        }
    }

    pub fn reported(&self) -> Vec<Vec<ChildOrder>> {
        self.reports.lock().unwrap().clone()
    }
}

impl CopyTradingBackend for FakeBackend {
    async fn authenticate(&self, _email: &str, _password: &Secret) -> Result<SessionToken> {
        self.token
            .as_deref()
            .map(SessionToken::new)
            .ok_or_else(|| RelayError::Auth("invalid credentials".to_string()))
    }

    async fn fetch_orders(
        &self,
        _token: &SessionToken,
        symbols: &SymbolList,
        hours: LookbackHours,
    ) -> Result<Vec<FetchedOrder>> {
        self.fetches.lock().unwrap().push((symbols.joined(), hours.get()));
        match &self.fetch_error {
            Some(e) => Err(RelayError::Backend(e.clone())),
            None => Ok(self.orders.clone()),
        }
    }

    async fn report_placed_orders(&self, _token: &SessionToken, orders: &[ChildOrder]) -> Result<u64> {
        self.reports.lock().unwrap().push(orders.to_vec());
        Ok(orders.len() as u64)
    }
}

impl AccountRegistrar for FakeBackend {
    async fn register(&self, email: &str, _password: &Secret) -> Result<SessionToken> {
        self.registrations.lock().unwrap().push(email.to_string());
        Ok(SessionToken::new("new-account-token"))
    }
}

/// Accepts every order except those for `reject_symbols` (non-zero code)
/// and `fail_symbols` (call error).
#[derive(Default)]
pub struct FakeExchange {
    pub reject_symbols: Vec<String>,
    pub fail_symbols: Vec<String>,
    pub omit_data: bool,
    pub requests: Mutex<Vec<PlaceOrderRequest>>,
}

impl FakeExchange {
    pub fn requests(&self) -> Vec<PlaceOrderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl OrderPlacer for FakeExchange {
    async fn place_order(&self, request: &PlaceOrderRequest) -> Result<PlaceOrderResponse> {
        let n = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request.clone());
            requests.len()
        };

        if self.fail_symbols.contains(&request.symbol) {
            return Err(RelayError::Exchange("connection reset".to_string()));
        }

        let body = if self.reject_symbols.contains(&request.symbol) {
            json!({"code": "40762", "msg": "The order amount exceeds the balance"})
        } else if self.omit_data {
            json!({"code": "00000", "msg": "success"})
        } else {
            json!({
                "code": "00000",
                "msg": "success",
                "data": {"orderId": format!("ex-{}", n), "clientOid": request.client_oid}
            })
        };
        Ok(serde_json::from_value(body).unwrap())
    }
}

/// Answer exactly one HTTP request with `status` and a JSON `body`.
///
/// Returns the base URL to call and a handle resolving to the raw request.
pub async fn serve_once(status: u16, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;
        let response = format!(
            "HTTP/1.1 {} Stub\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        request
    });

    (format!("http://{}", addr), handle)
}

async fn read_request(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
            let body_len = head
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + body_len {
                break;
            }
        }
    }

    String::from_utf8_lossy(&buf).into_owned()
}
