//! Copy-trading relay.
//!
//! Fetches recently filled orders from the copy-trading backend, replays each
//! as a Bitget futures market order and reports the placed child orders back
//! so the backend does not hand them out again.

pub mod api;
pub mod bot;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod registration;
pub mod trading;

pub use error::{RelayError, Result};
