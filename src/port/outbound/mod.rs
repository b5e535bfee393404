//! Outbound ports (driven side): interfaces implemented by outbound adapters.
//!
//! These contracts describe infrastructure dependencies: the exchange's
//! account query, durable storage, and chat delivery.

pub mod exchange;
pub mod notifier;
pub mod store;
