use chrono::{DateTime, Utc};
use pcn_core::{Amount, Hop, UserId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a settled transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransferId(pub Uuid);

impl TransferId {
    /// Create a new transfer ID (UUID v7, time-ordered).
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TransferId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TransferId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One applied balance movement: `amount` from `hop.from` to `hop.to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HopDelta {
    pub hop: Hop,
    pub amount: Amount,
}

impl HopDelta {
    /// The delta that undoes this one.
    pub fn inverse(&self) -> HopDelta {
        HopDelta {
            hop: self.hop.reversed(),
            amount: self.amount,
        }
    }
}

/// Proof that a transfer was applied in full.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferReceipt {
    pub id: TransferId,
    /// The users the transfer was routed through, payer first.
    pub path: Vec<UserId>,
    pub amount: Amount,
    /// Deltas in the order they were applied.
    pub hops: Vec<HopDelta>,
    pub settled_at: DateTime<Utc>,
}

impl TransferReceipt {
    pub fn sender(&self) -> Option<UserId> {
        self.path.first().copied()
    }

    pub fn receiver(&self) -> Option<UserId> {
        self.path.last().copied()
    }

    /// Net change of `user`'s combined channel position caused by this
    /// transfer. Relays come out at zero.
    pub fn net_change(&self, user: UserId) -> i128 {
        self.hops.iter().fold(0i128, |acc, delta| {
            let value = i128::try_from(delta.amount.value()).unwrap_or(i128::MAX);
            if delta.hop.to == user {
                acc.saturating_add(value)
            } else if delta.hop.from == user {
                acc.saturating_sub(value)
            } else {
                acc
            }
        })
    }
}
