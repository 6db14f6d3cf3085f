use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;

/// Identifier of a registered network participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl UserId {
    /// Create a user identifier from its raw integer form.
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw integer form.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl From<u64> for UserId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "user:{}", self.0)
    }
}

/// Value in atomic units. Always non-negative.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Amount(pub u128);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    /// Create a new amount.
    pub fn new(value: u128) -> Self {
        Self(value)
    }

    /// Convert a signed value supplied by a caller, rejecting negatives.
    pub fn from_signed(value: i128) -> Result<Self, CoreError> {
        u128::try_from(value)
            .map(Self)
            .map_err(|_| CoreError::InvalidAmount(format!("{value} is negative")))
    }

    /// The raw value.
    pub fn value(&self) -> u128 {
        self.0
    }

    /// Check if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Amount)
    }

    pub fn checked_sub(self, other: Amount) -> Option<Amount> {
        self.0.checked_sub(other.0).map(Amount)
    }
}

impl From<u128> for Amount {
    fn from(value: u128) -> Self {
        Self(value)
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Self(u128::from(value))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Canonical identity of a channel: the unordered pair of its endpoints,
/// stored with `low < high`.
///
/// The derived `Ord` (by `low`, then `high`) is the global order in which
/// channel locks are taken, so two transfers touching the same channels can
/// never wait on each other in a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChannelKey {
    low: UserId,
    high: UserId,
}

impl ChannelKey {
    /// Build the key for the channel between `a` and `b`, in either order.
    pub fn new(a: UserId, b: UserId) -> Result<Self, CoreError> {
        match a.cmp(&b) {
            std::cmp::Ordering::Less => Ok(Self { low: a, high: b }),
            std::cmp::Ordering::Greater => Ok(Self { low: b, high: a }),
            std::cmp::Ordering::Equal => Err(CoreError::SelfLoop(a)),
        }
    }

    /// The endpoint with the smaller identifier.
    pub fn low(&self) -> UserId {
        self.low
    }

    /// The endpoint with the larger identifier.
    pub fn high(&self) -> UserId {
        self.high
    }

    /// Returns true if `user` is one of the two endpoints.
    pub fn contains(&self, user: UserId) -> bool {
        self.low == user || self.high == user
    }

    /// The endpoint opposite `user`, if `user` belongs to this channel.
    pub fn counterparty(&self, user: UserId) -> Option<UserId> {
        if user == self.low {
            Some(self.high)
        } else if user == self.high {
            Some(self.low)
        } else {
            None
        }
    }
}

impl fmt::Display for ChannelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}<->{}", self.low, self.high)
    }
}
