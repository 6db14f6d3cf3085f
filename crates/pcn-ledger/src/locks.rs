use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use pcn_core::{Amount, ChannelKey, Hop};

use crate::channel::Channel;
use crate::error::LedgerError;

/// Shared handles to a group of channels, sorted by [`ChannelKey`].
///
/// Holding a `ChannelSet` does not block anyone; call [`ChannelSet::lock`]
/// to take every channel's mutex in ascending key order.
pub struct ChannelSet {
    handles: Vec<(ChannelKey, Arc<Mutex<Channel>>)>,
}

impl ChannelSet {
    pub(crate) fn new(mut handles: Vec<(ChannelKey, Arc<Mutex<Channel>>)>) -> Self {
        handles.sort_by_key(|(key, _)| *key);
        handles.dedup_by_key(|(key, _)| *key);
        Self { handles }
    }

    /// Keys in lock order.
    pub fn keys(&self) -> Vec<ChannelKey> {
        self.handles.iter().map(|(key, _)| *key).collect()
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Acquire every channel lock in the global key order.
    ///
    /// Blocks until all locks are held. The guards are released together
    /// when the returned [`LockedChannels`] is dropped.
    pub fn lock(&self) -> Result<LockedChannels<'_>, LedgerError> {
        let mut guards = BTreeMap::new();
        for (key, handle) in &self.handles {
            let guard = handle.lock().map_err(|_| LedgerError::LockPoisoned(*key))?;
            tracing::trace!(channel = %key, "channel lock acquired");
            guards.insert(*key, guard);
        }
        Ok(LockedChannels { guards })
    }
}

/// Exclusive access to a group of channels for the lifetime of the value.
pub struct LockedChannels<'a> {
    guards: BTreeMap<ChannelKey, MutexGuard<'a, Channel>>,
}

impl<'a> LockedChannels<'a> {
    pub fn get(&self, key: &ChannelKey) -> Option<&Channel> {
        self.guards.get(key).map(|guard| &**guard)
    }

    pub fn get_mut(&mut self, key: &ChannelKey) -> Option<&mut Channel> {
        self.guards.get_mut(key).map(|guard| &mut **guard)
    }

    /// The held channel traversed by `hop`.
    pub fn channel_for(&self, hop: &Hop) -> Result<&Channel, LedgerError> {
        let key = hop.key().map_err(|_| LedgerError::SelfLoop(hop.from))?;
        self.get(&key).ok_or(LedgerError::NotLocked(key))
    }

    pub fn channel_for_mut(&mut self, hop: &Hop) -> Result<&mut Channel, LedgerError> {
        let key = hop.key().map_err(|_| LedgerError::SelfLoop(hop.from))?;
        self.get_mut(&key).ok_or(LedgerError::NotLocked(key))
    }

    /// Apply one hop's delta to the held channel it traverses.
    pub fn apply_hop_delta(&mut self, hop: &Hop, amount: Amount) -> Result<(), LedgerError> {
        self.channel_for_mut(hop)?.apply_hop_delta(*hop, amount)
    }

    pub fn keys(&self) -> impl Iterator<Item = &ChannelKey> {
        self.guards.keys()
    }

    pub fn len(&self) -> usize {
        self.guards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.guards.is_empty()
    }
}
