use crate::types::UserId;

/// Core protocol errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("channel endpoints must differ: {0}")]
    SelfLoop(UserId),

    #[error("invalid path: {reason}")]
    InvalidPath { reason: String },

    #[error("arithmetic overflow: {0}")]
    Overflow(String),

    #[error("configuration error: {0}")]
    Config(String),
}
