use pcn_core::UserId;

/// Identity-layer errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    #[error("user already registered: {0}")]
    DuplicateUser(UserId),

    #[error("unknown user: {0}")]
    UnknownUser(UserId),
}
