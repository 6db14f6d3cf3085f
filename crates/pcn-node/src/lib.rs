//! The PCN network orchestrator.
//!
//! Ties together the identity registry, the channel ledger, the settlement
//! engine and the path finder behind a single [`PaymentNetwork`] handle.

pub mod error;
pub mod network;

pub use error::NetworkError;
pub use network::{BalanceRow, PaymentNetwork};
