//! Relay runner: one pass of authenticate, fetch, place, report.

use tracing::info;

use crate::api::{CopyTradingBackend, OrderPlacer};
use crate::config::Config;
use crate::error::Result;
use crate::trading::{CopyEngine, PlacementReport};

/// How a relay pass ended without error.
#[derive(Debug)]
pub enum RunOutcome {
    /// The backend had nothing to copy; no exchange call was made.
    NoNewOrders,
    /// Orders were placed (or skipped) and the batch was reported.
    Completed(PlacementReport),
}

/// Runs a single relay pass against a backend.
pub struct Relay<'a, B> {
    config: &'a Config,
    backend: &'a B,
}

impl<'a, B> Relay<'a, B>
where
    B: CopyTradingBackend,
{
    pub fn new(config: &'a Config, backend: &'a B) -> Self {
        Self { config, backend }
    }

    /// Authenticate, fetch and, if there is anything to copy, place and report.
    ///
    /// `connect_exchange` is only called once the fetch came back non-empty.
    pub async fn run<E, F>(&self, connect_exchange: F) -> Result<RunOutcome>
    where
        E: OrderPlacer,
        F: FnOnce() -> Result<E>,
    {
        let token = self
            .backend
            .authenticate(&self.config.email, &self.config.password)
            .await?;
        info!("Authenticated, getting orders...");

        let orders = self
            .backend
            .fetch_orders(&token, &self.config.symbols, self.config.past_hours)
            .await?;

        if orders.is_empty() {
            return Ok(RunOutcome::NoNewOrders);
        }
        info!(count = orders.len(), "Received {} orders. Placing new orders...", orders.len());

        let exchange = connect_exchange()?;
        let report = CopyEngine::new(self.backend, &exchange)
            .place_child_orders(&token, &orders)
            .await?;

        Ok(RunOutcome::Completed(report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fakes::{fetched_order, FakeBackend, FakeExchange};
    use crate::config::{Field, PartialConfig};
    use crate::error::RelayError;

    fn config() -> Config {
        let partial = PartialConfig::new()
            .with(Field::Symbols, "BTCUSDT,ETHUSDT")
            .with(Field::Email, "me@example.com")
            .with(Field::Password, "pw")
            .with(Field::PastHours, "500");
        Config::from_partial(&partial).unwrap()
    }

    fn unreachable_exchange() -> Result<FakeExchange> {
        Err(RelayError::validation("No bitget api key or invalid api key has been provided."))
    }

    #[tokio::test]
    async fn test_empty_fetch_never_connects_exchange() {
        let config = config();
        let backend = FakeBackend::with_orders(vec![]);

        let outcome = Relay::new(&config, &backend).run(unreachable_exchange).await.unwrap();

        assert!(matches!(outcome, RunOutcome::NoNewOrders));
        assert!(backend.reported().is_empty());
    }

    #[tokio::test]
    async fn test_missing_credentials_fail_only_with_orders() {
        let config = config();
        let backend = FakeBackend::with_orders(vec![fetched_order(1, "BTCUSDT")]);

        let err = Relay::new(&config, &backend).run(unreachable_exchange).await.unwrap_err();

        assert!(matches!(err, RelayError::Validation(_)));
        assert!(backend.reported().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_uses_plain_symbols_and_clamped_hours() {
        let config = config();
        let backend = FakeBackend::with_orders(vec![]);

        Relay::new(&config, &backend).run(unreachable_exchange).await.unwrap();

        let fetches = backend.fetches.lock().unwrap().clone();
        assert_eq!(fetches, vec![("BTCUSDT,ETHUSDT".to_string(), 168)]);
    }

    #[tokio::test]
    async fn test_auth_failure_stops_run() {
        let config = config();
        let backend = FakeBackend::default();

        let err = Relay::new(&config, &backend).run(unreachable_exchange).await.unwrap_err();

        assert!(matches!(err, RelayError::Auth(_)));
        assert!(backend.fetches.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_backend_fetch_error() {
        let config = config();
        let backend = FakeBackend {
            fetch_error: Some("token expired".to_string()),
            ..FakeBackend::with_orders(vec![])
        };

        let err = Relay::new(&config, &backend).run(unreachable_exchange).await.unwrap_err();
        assert_eq!(err.to_string(), "token expired");
    }

    #[tokio::test]
    async fn test_one_order_end_to_end() {
        let config = config();
        let backend = FakeBackend::with_orders(vec![fetched_order(77, "ETHUSDT")]);
        let exchange = FakeExchange::default();

        let outcome = Relay::new(&config, &backend).run(|| Ok(&exchange)).await.unwrap();

        let RunOutcome::Completed(report) = outcome else {
            panic!("expected a completed run");
        };
        assert_eq!(report.child_orders.len(), 1);
        assert_eq!(report.recorded, 1);
        assert_eq!(exchange.requests()[0].symbol, "ETHUSDT_UMCBL");

        let reported = backend.reported();
        assert_eq!(reported.len(), 1);
        assert_eq!(reported[0][0].parent_order_id, "77");
    }
}
