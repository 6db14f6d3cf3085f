//! PCN Settlement Layer
//!
//! Executes multi-hop transfers across a path of channels with
//! all-or-nothing semantics:
//! - every channel on the path is locked in global key order
//! - every hop is validated against the locked balances
//! - only then are the deltas applied, through a reversible [`HopJournal`]
//!
//! The engine consumes paths; it never discovers them.

pub mod engine;
pub mod error;
pub mod journal;
pub mod stats;
pub mod types;

pub use engine::SettlementEngine;
pub use error::SettlementError;
pub use journal::HopJournal;
pub use stats::{SettlementStats, StatsSnapshot};
pub use types::{HopDelta, TransferId, TransferReceipt};
