use chrono::{DateTime, Utc};
use pcn_core::{Amount, ChannelKey, Hop, UserId};
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

/// A joint account between two users.
///
/// `balance_low + balance_high == capacity` holds after every operation;
/// both balances are unsigned, so neither can go negative.
#[derive(Debug, Clone)]
pub struct Channel {
    key: ChannelKey,
    capacity: Amount,
    balance_low: Amount,
    balance_high: Amount,
    opened_at: DateTime<Utc>,
    updates: u64,
}

impl Channel {
    /// Open a channel funded entirely by `funder`. The counterparty starts at
    /// zero and the capacity is fixed at `initial`.
    pub(crate) fn open(key: ChannelKey, funder: UserId, initial: Amount) -> Self {
        let (balance_low, balance_high) = if funder == key.low() {
            (initial, Amount::ZERO)
        } else {
            (Amount::ZERO, initial)
        };
        Self {
            key,
            capacity: initial,
            balance_low,
            balance_high,
            opened_at: Utc::now(),
            updates: 0,
        }
    }

    pub fn key(&self) -> ChannelKey {
        self.key
    }

    pub fn capacity(&self) -> Amount {
        self.capacity
    }

    /// Number of hop deltas applied since opening, rollbacks included.
    pub fn updates(&self) -> u64 {
        self.updates
    }

    /// Balance held on `user`'s side of the channel.
    pub fn balance_of(&self, user: UserId) -> Result<Amount, LedgerError> {
        if user == self.key.low() {
            Ok(self.balance_low)
        } else if user == self.key.high() {
            Ok(self.balance_high)
        } else {
            Err(LedgerError::NotAnEndpoint {
                user,
                key: self.key,
            })
        }
    }

    /// True iff `from` is an endpoint and holds at least `amount`.
    pub fn has_capacity(&self, from: UserId, amount: Amount) -> bool {
        self.balance_of(from)
            .map(|balance| balance >= amount)
            .unwrap_or(false)
    }

    /// Move `amount` from `hop.from`'s side to `hop.to`'s side.
    ///
    /// Only reachable through [`crate::LockedChannels`], so the caller
    /// always holds this channel's lock. On error nothing is modified.
    pub fn apply_hop_delta(&mut self, hop: Hop, amount: Amount) -> Result<(), LedgerError> {
        if self.key.counterparty(hop.from) != Some(hop.to) {
            let user = if self.key.contains(hop.from) { hop.to } else { hop.from };
            return Err(LedgerError::NotAnEndpoint {
                user,
                key: self.key,
            });
        }

        let available = self.balance_of(hop.from)?;
        let debited = available
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientCapacity {
                from: hop.from,
                to: hop.to,
                available,
                required: amount,
            })?;
        let credited = self
            .balance_of(hop.to)?
            .checked_add(amount)
            .ok_or_else(|| LedgerError::InvariantViolation {
                key: self.key,
                reason: "credit overflows balance".into(),
            })?;

        if hop.from == self.key.low() {
            self.balance_low = debited;
            self.balance_high = credited;
        } else {
            self.balance_high = debited;
            self.balance_low = credited;
        }
        self.updates += 1;
        Ok(())
    }

    /// Balances sum to capacity.
    pub fn is_consistent(&self) -> bool {
        self.balance_low.checked_add(self.balance_high) == Some(self.capacity)
    }

    pub fn snapshot(&self) -> ChannelSnapshot {
        ChannelSnapshot {
            key: self.key,
            capacity: self.capacity,
            balance_low: self.balance_low,
            balance_high: self.balance_high,
            opened_at: self.opened_at,
            updates: self.updates,
        }
    }
}

/// Read-only copy of a channel's state taken under its lock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelSnapshot {
    pub key: ChannelKey,
    pub capacity: Amount,
    pub balance_low: Amount,
    pub balance_high: Amount,
    pub opened_at: DateTime<Utc>,
    pub updates: u64,
}

impl ChannelSnapshot {
    /// Balance on `user`'s side, or `None` if `user` is not an endpoint.
    pub fn balance_of(&self, user: UserId) -> Option<Amount> {
        if user == self.key.low() {
            Some(self.balance_low)
        } else if user == self.key.high() {
            Some(self.balance_high)
        } else {
            None
        }
    }

    pub fn is_consistent(&self) -> bool {
        self.balance_low.checked_add(self.balance_high) == Some(self.capacity)
    }
}
