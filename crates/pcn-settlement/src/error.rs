use pcn_core::{Amount, ChannelKey, UserId};
use pcn_ledger::LedgerError;

/// Settlement-layer errors.
///
/// `InsufficientCapacity` is a routine outcome under load. `SettlementFailure`
/// means a hop failed after validation passed; any applied hops have already
/// been rolled back when it is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettlementError {
    #[error("invalid path: {reason}")]
    InvalidPath { reason: String },

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("no channel between {0}")]
    NoChannel(ChannelKey),

    #[error("insufficient capacity at hop {hop_index} ({from} -> {to}): available {available}, required {required}")]
    InsufficientCapacity {
        hop_index: usize,
        from: UserId,
        to: UserId,
        available: Amount,
        required: Amount,
    },

    #[error("settlement failed at hop {hop_index}: {reason}")]
    SettlementFailure { hop_index: usize, reason: String },

    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

impl SettlementError {
    /// True for errors caused by the request itself rather than by balances
    /// or engine faults.
    pub fn is_rejected_request(&self) -> bool {
        matches!(
            self,
            Self::InvalidPath { .. } | Self::InvalidAmount(_) | Self::NoChannel(_)
        )
    }
}
