//! Fixtures shared by the cross-crate tests.

use pcn_core::{Amount, UserId};
use pcn_node::PaymentNetwork;

/// Shorthand for a list of user ids.
pub fn ids(raw: &[u64]) -> Vec<UserId> {
    raw.iter().copied().map(UserId).collect()
}

/// A network with users `User1..=UserN` and the given channels, each
/// `(funder, counterparty, initial)`.
pub fn network(users: u64, channels: &[(u64, u64, i128)]) -> PaymentNetwork {
    let network = PaymentNetwork::default();
    for id in 1..=users {
        if let Err(err) = network.register(UserId(id), format!("User{id}")) {
            panic!("fixture registration failed: {err}");
        }
    }
    for (a, b, initial) in channels {
        if let Err(err) = network.open_channel(UserId(*a), UserId(*b), *initial) {
            panic!("fixture channel {a}-{b} failed: {err}");
        }
    }
    tracing::debug!(users, channels = channels.len(), "fixture network built");
    network
}

/// Ring of `users` users, each funding the channel to its successor.
pub fn ring(users: u64, initial: i128) -> PaymentNetwork {
    let channels: Vec<(u64, u64, i128)> = (1..=users)
        .map(|id| (id, id % users + 1, initial))
        .collect();
    network(users, &channels)
}

/// Balance of `of` in the channel between `a` and `b`.
pub fn balance(network: &PaymentNetwork, a: u64, b: u64, of: u64) -> Amount {
    match network.channel(UserId(a), UserId(b)) {
        Ok(snapshot) => snapshot
            .balance_of(UserId(of))
            .unwrap_or_else(|| panic!("user:{of} is not on channel {a}-{b}")),
        Err(err) => panic!("no channel {a}-{b}: {err}"),
    }
}

/// Sum of every user's holdings across all of their channels.
pub fn holdings(network: &PaymentNetwork, user: u64) -> u128 {
    network
        .snapshot()
        .unwrap_or_default()
        .iter()
        .filter_map(|snapshot| snapshot.balance_of(UserId(user)))
        .map(|amount| amount.value())
        .sum()
}

/// Deterministic pseudo-random sequence for workload generation.
pub struct Lcg(u64);

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Self(seed)
    }

    /// Next value in `0..bound`.
    pub fn next_below(&mut self, bound: u64) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.0 >> 33) % bound
    }
}
