//! HTTP clients for the copy-trading backend and the Bitget exchange.

mod backend_client;
mod bitget_client;
#[cfg(test)]
pub(crate) mod fakes;
mod types;

pub use backend_client::{
    backend_error, token_from_response, AccountRegistrar, BackendClient, CopyTradingBackend,
    SessionToken,
};
pub use bitget_client::{
    BitgetClient, OrderPlacer, PlaceOrderData, PlaceOrderRequest, PlaceOrderResponse, BITGET_URL,
    PLACE_ORDER_PATH,
};
pub use types::*;
