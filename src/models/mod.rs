//! Data models for parent and child orders.

pub(crate) mod de;
mod order;

pub use order::{ChildOrder, FetchedOrder, OrderType};
