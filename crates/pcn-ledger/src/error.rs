use pcn_core::{Amount, ChannelKey, UserId};

/// Ledger-layer errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("unknown user: {0}")]
    UnknownUser(UserId),

    #[error("channel endpoints must differ: {0}")]
    SelfLoop(UserId),

    #[error("channel already exists: {0}")]
    DuplicateChannel(ChannelKey),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("no channel between {0}")]
    NoChannel(ChannelKey),

    #[error("insufficient capacity from {from} to {to}: available {available}, required {required}")]
    InsufficientCapacity {
        from: UserId,
        to: UserId,
        available: Amount,
        required: Amount,
    },

    #[error("{user} is not an endpoint of channel {key}")]
    NotAnEndpoint { user: UserId, key: ChannelKey },

    #[error("channel lock poisoned: {0}")]
    LockPoisoned(ChannelKey),

    #[error("channel {0} is not held by this lock set")]
    NotLocked(ChannelKey),

    #[error("invariant violation on {key}: {reason}")]
    InvariantViolation { key: ChannelKey, reason: String },
}
