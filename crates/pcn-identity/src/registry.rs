use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use pcn_core::UserId;
use serde::{Deserialize, Serialize};

use crate::error::IdentityError;

/// A registered network participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    /// Display name supplied at registration.
    pub name: String,
    pub registered_at: DateTime<Utc>,
}

/// Maps user identifiers to display names.
///
/// Uses an in-memory `DashMap`; concurrent registrations of the same id
/// resolve to exactly one winner.
pub struct UserRegistry {
    users: DashMap<UserId, UserRecord>,
}

impl UserRegistry {
    /// Create a new, empty registry.
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
        }
    }

    /// Register a user. Fails if the id is already taken; the existing
    /// record is left untouched.
    pub fn register(&self, id: UserId, name: impl Into<String>) -> Result<(), IdentityError> {
        match self.users.entry(id) {
            Entry::Occupied(_) => Err(IdentityError::DuplicateUser(id)),
            Entry::Vacant(slot) => {
                let record = UserRecord {
                    id,
                    name: name.into(),
                    registered_at: Utc::now(),
                };
                tracing::info!(user = %id, name = %record.name, "user registered");
                slot.insert(record);
                Ok(())
            }
        }
    }

    pub fn exists(&self, id: UserId) -> bool {
        self.users.contains_key(&id)
    }

    /// Look up the display name of a user.
    pub fn lookup(&self, id: UserId) -> Result<String, IdentityError> {
        self.users
            .get(&id)
            .map(|entry| entry.name.clone())
            .ok_or(IdentityError::UnknownUser(id))
    }

    /// Full record for a user, if registered.
    pub fn get(&self, id: UserId) -> Option<UserRecord> {
        self.users.get(&id).map(|entry| entry.clone())
    }

    /// Fail with `UnknownUser` unless `id` is registered.
    pub fn ensure_exists(&self, id: UserId) -> Result<(), IdentityError> {
        if self.exists(id) {
            Ok(())
        } else {
            Err(IdentityError::UnknownUser(id))
        }
    }

    pub fn count(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// All registered user ids, ascending.
    pub fn list_users(&self) -> Vec<UserId> {
        let mut ids: Vec<UserId> = self.users.iter().map(|entry| *entry.key()).collect();
        ids.sort();
        ids
    }
}

impl Default for UserRegistry {
    fn default() -> Self {
        Self::new()
    }
}
