//! Copy engine: replays parent orders on the exchange and reports the children.

use std::fmt;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::api::{CopyTradingBackend, OrderPlacer, PlaceOrderRequest, SessionToken};
use crate::error::{RelayError, Result};
use crate::models::{ChildOrder, FetchedOrder};

/// Outcome of one placement batch.
#[derive(Debug, Clone, Default)]
pub struct PlacementReport {
    /// Child orders the exchange accepted, in parent order
    pub child_orders: Vec<ChildOrder>,

    /// Parents that could not be placed
    pub skipped: usize,

    /// Orders the backend newly recorded
    pub recorded: u64,
}

impl fmt::Display for PlacementReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Placed {} new orders ({} accepted by the exchange, {} skipped)",
            self.recorded,
            self.child_orders.len(),
            self.skipped
        )
    }
}

/// Fresh client order id: a v4 UUID as 32 lowercase hex digits.
pub fn new_client_order_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Places one child order per parent and hands the batch to the backend.
pub struct CopyEngine<'a, B, E> {
    backend: &'a B,
    exchange: &'a E,
}

impl<'a, B, E> CopyEngine<'a, B, E>
where
    B: CopyTradingBackend,
    E: OrderPlacer,
{
    pub fn new(backend: &'a B, exchange: &'a E) -> Self {
        Self { backend, exchange }
    }

    /// Place every parent as a market order, then report the accepted ones.
    ///
    /// A parent that fails to place is logged and skipped. Only the final
    /// report can fail the batch.
    pub async fn place_child_orders(
        &self,
        token: &SessionToken,
        parents: &[FetchedOrder],
    ) -> Result<PlacementReport> {
        let mut child_orders = Vec::with_capacity(parents.len());
        let mut skipped = 0;

        for parent in parents {
            match self.place_one(parent).await {
                Ok(child) => {
                    info!(
                        parent_order_id = %child.parent_order_id,
                        order_id = %child.order_id,
                        symbol = %parent.symbol,
                        side = %parent.side,
                        size = %parent.size,
                        "Placed child order"
                    );
                    child_orders.push(child);
                }
                Err(e) => {
                    skipped += 1;
                    warn!(
                        parent_order_id = %parent.id,
                        symbol = %parent.symbol,
                        kind = e.kind(),
                        error = %e,
                        "Order not placed, skipping"
                    );
                }
            }
        }

        let recorded = self
            .backend
            .report_placed_orders(token, &child_orders)
            .await?;

        Ok(PlacementReport {
            child_orders,
            skipped,
            recorded,
        })
    }

    async fn place_one(&self, parent: &FetchedOrder) -> Result<ChildOrder> {
        let client_order_id = new_client_order_id();
        let request = PlaceOrderRequest::copy_of(parent, client_order_id.clone())?;
        debug!(parent_order_id = %parent.id, request = ?request, "Submitting copy");

        let response = self.exchange.place_order(&request).await?;
        if !response.is_accepted() {
            return Err(RelayError::Exchange(format!(
                "Something went wrong: code {} {}",
                response.code,
                response.msg.as_deref().unwrap_or_default()
            )));
        }

        let data = response.data.unwrap_or_default();
        let client_oid = data.client_oid.unwrap_or_else(|| {
            warn!(parent_order_id = %parent.id, "Failed to get client order id for the placed order");
            String::new()
        });
        let order_id = data.order_id.unwrap_or_else(|| {
            warn!(parent_order_id = %parent.id, "Failed to get order id for the placed order");
            String::new()
        });

        Ok(ChildOrder::from_parent(parent, client_order_id, order_id, client_oid))
    }
}
