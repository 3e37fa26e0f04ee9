//! Parent orders fetched from the backend and the child orders placed for them.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{RelayError, Result};

use super::de::{decimal_from_value, string_or_number};

/// Order type sent to the exchange. Copies are always market orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    Market,
}

/// A filled order recorded by the backend, read-only to the relay.
///
/// Numeric fields the relay only passes through keep their raw JSON so
/// the report echoes exactly what the backend sent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchedOrder {
    /// Backend identifier; numbers are kept in their decimal string form
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,

    /// Symbol as the backend stores it, e.g. `BTCUSDT`
    pub symbol: String,

    /// Collateral currency, e.g. `USDT`
    pub margin_coin: String,

    /// Order size as sent by the backend, string or number
    pub size: Value,

    /// Exchange side string, e.g. `open_long`
    pub side: String,

    #[serde(default)]
    pub order_type: Option<String>,

    #[serde(default)]
    pub price: Option<Value>,

    #[serde(default)]
    pub price_avg: Option<Value>,

    #[serde(default)]
    pub filled_qty: Option<Value>,

    #[serde(default)]
    pub fee: Option<Value>,

    #[serde(default)]
    pub state: Option<String>,

    #[serde(default)]
    pub time_in_force: Option<String>,

    #[serde(default)]
    pub total_profits: Option<Value>,

    #[serde(default)]
    pub pos_side: Option<String>,

    #[serde(default)]
    pub filled_amount: Option<Value>,

    /// Creation time in milliseconds
    #[serde(default)]
    pub ctime: Option<Value>,
}

impl FetchedOrder {
    /// Size to submit with the copy.
    pub fn order_size(&self) -> Result<Decimal> {
        decimal_from_value(&self.size).ok_or_else(|| {
            RelayError::validation(format!("Order {} has an invalid size {}.", self.id, self.size))
        })
    }

    /// Price to submit with the copy: the parent's average fill price if known.
    pub fn copy_price(&self) -> Option<Decimal> {
        self.price_avg
            .as_ref()
            .and_then(decimal_from_value)
            .or_else(|| self.price.as_ref().and_then(decimal_from_value))
    }
}

/// Record of a child order the exchange accepted, reported to the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildOrder {
    /// Locally generated client order id
    pub id: String,
    pub symbol: String,
    pub size: Value,
    pub side: String,
    /// Exchange-assigned order id, empty if the exchange omitted it
    pub order_id: String,
    /// Client order id echoed by the exchange, empty if omitted
    pub client_oid: String,
    pub filled_qty: Option<Value>,
    pub fee: Option<Value>,
    pub price: Option<Value>,
    pub price_avg: Option<Value>,
    pub state: Option<String>,
    pub time_in_force: Option<String>,
    pub total_profits: Option<Value>,
    pub pos_side: Option<String>,
    pub margin_coin: String,
    pub filled_amount: Option<Value>,
    pub ctime: Option<Value>,
    pub order_type: OrderType,
    /// Id of the fetched order this one copies
    pub parent_order_id: String,
}

impl ChildOrder {
    /// Combine the exchange's identifiers with the parent's economics.
    pub fn from_parent(
        parent: &FetchedOrder,
        client_order_id: String,
        order_id: String,
        client_oid: String,
    ) -> Self {
        Self {
            id: client_order_id,
            symbol: parent.symbol.clone(),
            size: parent.size.clone(),
            side: parent.side.clone(),
            order_id,
            client_oid,
            filled_qty: parent.filled_qty.clone(),
            fee: parent.fee.clone(),
            price: parent.price.clone(),
            price_avg: parent.price_avg.clone(),
            state: parent.state.clone(),
            time_in_force: parent.time_in_force.clone(),
            total_profits: parent.total_profits.clone(),
            pos_side: parent.pos_side.clone(),
            margin_coin: parent.margin_coin.clone(),
            filled_amount: parent.filled_amount.clone(),
            ctime: parent.ctime.clone(),
            order_type: OrderType::Market,
            parent_order_id: parent.id.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::Value;

    fn parent_json() -> Value {
        serde_json::json!({
            "id": 42,
            "symbol": "BTCUSDT",
            "marginCoin": "USDT",
            "size": "0.01",
            "side": "open_long",
            "orderType": "limit",
            "price": 64000.5,
            "priceAvg": "64010",
            "filledQty": "0.01",
            "fee": "-0.38",
            "state": "filled",
            "timeInForce": "normal",
            "totalProfits": 0,
            "posSide": "long",
            "filledAmount": "640.1",
            "ctime": 1700000000000i64,
            "unknownField": true
        })
    }

    #[test]
    fn test_parent_accepts_numbers_and_strings() {
        let order: FetchedOrder = serde_json::from_value(parent_json()).unwrap();
        assert_eq!(order.id, "42");
        assert_eq!(order.order_size().unwrap(), dec!(0.01));
        assert_eq!(order.price, Some(serde_json::json!(64000.5)));
        assert_eq!(order.ctime, Some(serde_json::json!(1700000000000i64)));
        assert_eq!(order.copy_price(), Some(dec!(64010)));
    }

    #[test]
    fn test_parent_optional_fields() {
        let order: FetchedOrder = serde_json::from_value(serde_json::json!({
            "id": "abc",
            "symbol": "ETHUSDT",
            "marginCoin": "USDT",
            "size": 1,
            "side": "close_short",
            "price": 3000,
            "ctime": null
        }))
        .unwrap();
        assert_eq!(order.fee, None);
        assert_eq!(order.ctime, None);
        assert_eq!(order.order_size().unwrap(), dec!(1));
        assert_eq!(order.copy_price(), Some(dec!(3000)));
    }

    #[test]
    fn test_odd_informational_fields_still_decode() {
        let mut raw = parent_json();
        raw["totalProfits"] = serde_json::json!("");
        raw["fee"] = serde_json::json!({"amount": "-0.38"});
        raw["priceAvg"] = serde_json::json!("n/a");

        let order: FetchedOrder = serde_json::from_value(raw).unwrap();

        assert_eq!(order.total_profits, Some(serde_json::json!("")));
        assert_eq!(order.copy_price(), Some(dec!(64000.5)));
    }

    #[test]
    fn test_unusable_size_is_an_order_error() {
        let mut raw = parent_json();
        raw["size"] = serde_json::json!("");

        let order: FetchedOrder = serde_json::from_value(raw).unwrap();
        assert!(matches!(order.order_size(), Err(RelayError::Validation(_))));
    }

    #[test]
    fn test_child_wire_format() {
        let parent: FetchedOrder = serde_json::from_value(parent_json()).unwrap();
        let child = ChildOrder::from_parent(&parent, "c1".into(), "ex1".into(), "c1".into());
        let json = serde_json::to_value(&child).unwrap();

        assert_eq!(json["parentOrderId"], "42");
        assert_eq!(json["orderType"], "market");
        assert_eq!(json["orderId"], "ex1");
        assert_eq!(json["clientOid"], "c1");
        assert_eq!(json["marginCoin"], "USDT");
        assert!(json.get("filledQty").is_some());
    }

    #[test]
    fn test_child_echoes_parent_values_unchanged() {
        let mut raw = parent_json();
        raw["size"] = serde_json::json!(0.01);
        raw["fee"] = serde_json::json!(-0.38);
        let parent: FetchedOrder = serde_json::from_value(raw).unwrap();

        let child = ChildOrder::from_parent(&parent, "c1".into(), "ex1".into(), "c1".into());
        let json = serde_json::to_value(&child).unwrap();

        assert_eq!(json["size"], serde_json::json!(0.01));
        assert_eq!(json["price"], serde_json::json!(64000.5));
        assert_eq!(json["priceAvg"], "64010");
        assert_eq!(json["fee"], serde_json::json!(-0.38));
        assert_eq!(json["totalProfits"], serde_json::json!(0));
        assert_eq!(json["ctime"], serde_json::json!(1700000000000i64));
    }
}
