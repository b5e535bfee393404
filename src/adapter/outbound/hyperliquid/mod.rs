//! Hyperliquid market data adapter.
//!
//! Queries the `/info` endpoint with a `clearinghouseState` request and
//! maps the response onto [`AccountSnapshot`](crate::domain::AccountSnapshot).

mod client;
mod dto;

pub use client::HyperliquidClient;
pub use dto::{ClearinghouseRequest, ClearinghouseState};
