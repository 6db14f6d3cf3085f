use pcn_core::UserId;

/// Errors that can occur within the routing layer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoutingError {
    #[error("no route found from {from} to {to}")]
    NoRoute { from: UserId, to: UserId },

    #[error("source and destination are the same user: {0}")]
    SamePeer(UserId),

    #[error("every route from {from} to {to} exceeds {max_hops} hops")]
    MaxHopsExceeded {
        from: UserId,
        to: UserId,
        max_hops: usize,
    },
}
