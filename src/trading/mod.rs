//! Trading logic: replaying parent orders as child orders.

mod copy_engine;

pub use copy_engine::{new_client_order_id, CopyEngine, PlacementReport};
