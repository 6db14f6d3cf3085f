//! PCN Channel Ledger
//!
//! Stores the joint accounts (channels) between pairs of users:
//! - [`Channel`]: two balances whose sum is the capacity fixed at opening
//! - [`ChannelLedger`]: a concurrent channel store with one mutex per channel
//! - [`ChannelSet`] / [`LockedChannels`]: ordered, scoped exclusive access to
//!   a group of channels, the only route to mutating balances
//! - [`ChannelSnapshot`]: read-only copies for diagnostics

pub mod channel;
pub mod error;
pub mod ledger;
pub mod locks;

pub use channel::{Channel, ChannelSnapshot};
pub use error::LedgerError;
pub use ledger::ChannelLedger;
pub use locks::{ChannelSet, LockedChannels};
