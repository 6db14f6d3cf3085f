use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use pcn_core::{Amount, ChannelKey, UserId};
use pcn_identity::UserRegistry;

use crate::channel::{Channel, ChannelSnapshot};
use crate::error::LedgerError;
use crate::locks::ChannelSet;

/// Concurrent store of every channel in the network.
///
/// Each channel sits behind its own mutex, keyed by its canonical pair, so
/// transfers over disjoint channels never contend. Channels are never
/// removed, which keeps handles obtained through [`ChannelLedger::acquire`]
/// valid for as long as they are held.
pub struct ChannelLedger {
    registry: Arc<UserRegistry>,
    channels: DashMap<ChannelKey, Arc<Mutex<Channel>>>,
    /// user -> counterparties, maintained on open for path discovery.
    adjacency: DashMap<UserId, BTreeSet<UserId>>,
}

impl ChannelLedger {
    /// Create an empty ledger that checks endpoints against `registry`.
    pub fn new(registry: Arc<UserRegistry>) -> Self {
        Self {
            registry,
            channels: DashMap::new(),
            adjacency: DashMap::new(),
        }
    }

    pub fn registry(&self) -> &Arc<UserRegistry> {
        &self.registry
    }

    /// Open a channel between `user_a` and `user_b` funded by `user_a`.
    ///
    /// `balance(user_a) = initial`, `balance(user_b) = 0`, and the capacity
    /// is fixed at `initial` for the life of the channel.
    pub fn open_channel(
        &self,
        user_a: UserId,
        user_b: UserId,
        initial: Amount,
    ) -> Result<ChannelSnapshot, LedgerError> {
        let key = self.check_open(user_a, user_b)?;

        let snapshot = match self.channels.entry(key) {
            Entry::Occupied(_) => return Err(LedgerError::DuplicateChannel(key)),
            Entry::Vacant(slot) => {
                let channel = Channel::open(key, user_a, initial);
                let snapshot = channel.snapshot();
                slot.insert(Arc::new(Mutex::new(channel)));
                snapshot
            }
        };

        self.adjacency.entry(user_a).or_default().insert(user_b);
        self.adjacency.entry(user_b).or_default().insert(user_a);

        tracing::info!(
            channel = %key,
            funder = %user_a,
            capacity = %initial,
            "channel opened"
        );
        Ok(snapshot)
    }

    /// Run the endpoint checks of [`ChannelLedger::open_channel`] without
    /// opening anything: `UnknownUser`, then `SelfLoop`, then
    /// `DuplicateChannel`.
    pub fn check_open(&self, user_a: UserId, user_b: UserId) -> Result<ChannelKey, LedgerError> {
        for user in [user_a, user_b] {
            if !self.registry.exists(user) {
                return Err(LedgerError::UnknownUser(user));
            }
        }
        let key = channel_key(user_a, user_b)?;
        if self.channels.contains_key(&key) {
            return Err(LedgerError::DuplicateChannel(key));
        }
        Ok(key)
    }

    /// Current state of the channel between two users.
    pub fn get_channel(
        &self,
        user_a: UserId,
        user_b: UserId,
    ) -> Result<ChannelSnapshot, LedgerError> {
        let key = channel_key(user_a, user_b)?;
        let handle = self.handle(&key)?;
        let channel = handle.lock().map_err(|_| LedgerError::LockPoisoned(key))?;
        Ok(channel.snapshot())
    }

    /// True iff a channel exists between `from` and `to` and `from` holds at
    /// least `amount` on its side.
    pub fn has_capacity(&self, from: UserId, to: UserId, amount: Amount) -> bool {
        let Ok(key) = ChannelKey::new(from, to) else {
            return false;
        };
        let Ok(handle) = self.handle(&key) else {
            return false;
        };
        handle
            .lock()
            .map(|channel| channel.has_capacity(from, amount))
            .unwrap_or(false)
    }

    pub fn contains(&self, user_a: UserId, user_b: UserId) -> bool {
        ChannelKey::new(user_a, user_b)
            .map(|key| self.channels.contains_key(&key))
            .unwrap_or(false)
    }

    /// Collect handles for `keys` without locking them.
    ///
    /// Keys are checked in the order given, so the reported `NoChannel` is
    /// the first missing pair along a path.
    pub fn acquire(&self, keys: &[ChannelKey]) -> Result<ChannelSet, LedgerError> {
        let handles = keys
            .iter()
            .map(|key| self.handle(key).map(|handle| (*key, handle)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ChannelSet::new(handles))
    }

    /// Counterparties of `user`, ascending.
    pub fn neighbours(&self, user: UserId) -> Vec<UserId> {
        self.adjacency
            .get(&user)
            .map(|peers| peers.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Snapshots of every channel, sorted by key. Each snapshot is taken
    /// under its own channel's lock.
    pub fn snapshot(&self) -> Result<Vec<ChannelSnapshot>, LedgerError> {
        let mut handles: Vec<(ChannelKey, Arc<Mutex<Channel>>)> = self
            .channels
            .iter()
            .map(|entry| (*entry.key(), Arc::clone(entry.value())))
            .collect();
        handles.sort_by_key(|(key, _)| *key);

        handles
            .into_iter()
            .map(|(key, handle)| {
                handle
                    .lock()
                    .map(|channel| channel.snapshot())
                    .map_err(|_| LedgerError::LockPoisoned(key))
            })
            .collect()
    }

    /// Keys of channels whose balances do not sum to their capacity.
    pub fn verify_invariants(&self) -> Result<Vec<ChannelKey>, LedgerError> {
        let broken: Vec<ChannelKey> = self
            .snapshot()?
            .into_iter()
            .filter(|snapshot| !snapshot.is_consistent())
            .map(|snapshot| snapshot.key)
            .collect();
        if !broken.is_empty() {
            tracing::error!(count = broken.len(), "channel invariant violations detected");
        }
        Ok(broken)
    }

    /// Sum of all channel capacities.
    pub fn total_capacity(&self) -> Result<Amount, LedgerError> {
        self.snapshot()?
            .iter()
            .try_fold(Amount::ZERO, |acc, snapshot| {
                acc.checked_add(snapshot.capacity)
                    .ok_or_else(|| LedgerError::InvariantViolation {
                        key: snapshot.key,
                        reason: "total capacity overflows".into(),
                    })
            })
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    fn handle(&self, key: &ChannelKey) -> Result<Arc<Mutex<Channel>>, LedgerError> {
        self.channels
            .get(key)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or(LedgerError::NoChannel(*key))
    }
}

fn channel_key(user_a: UserId, user_b: UserId) -> Result<ChannelKey, LedgerError> {
    ChannelKey::new(user_a, user_b).map_err(|_| LedgerError::SelfLoop(user_a))
}
