use pcn_core::{Amount, UserId};
use pcn_ledger::ChannelLedger;

/// Read-only view of the channel graph used by path search.
pub trait ChannelGraph {
    /// Users sharing a channel with `user`.
    fn neighbours(&self, user: UserId) -> Vec<UserId>;

    /// True iff `from` can currently push `amount` to `to` over their channel.
    fn has_capacity(&self, from: UserId, to: UserId, amount: Amount) -> bool;
}

impl ChannelGraph for ChannelLedger {
    fn neighbours(&self, user: UserId) -> Vec<UserId> {
        ChannelLedger::neighbours(self, user)
    }

    fn has_capacity(&self, from: UserId, to: UserId, amount: Amount) -> bool {
        ChannelLedger::has_capacity(self, from, to, amount)
    }
}
