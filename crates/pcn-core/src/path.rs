use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::error::CoreError;
use crate::types::{ChannelKey, UserId};

/// One directed traversal of a channel within a multi-hop transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Hop {
    /// The user whose side of the channel is debited.
    pub from: UserId,
    /// The user whose side of the channel is credited.
    pub to: UserId,
}

impl Hop {
    pub fn new(from: UserId, to: UserId) -> Self {
        Self { from, to }
    }

    /// The canonical key of the channel this hop traverses.
    pub fn key(&self) -> Result<ChannelKey, CoreError> {
        ChannelKey::new(self.from, self.to)
    }

    /// The same channel traversed in the opposite direction.
    pub fn reversed(&self) -> Hop {
        Hop {
            from: self.to,
            to: self.from,
        }
    }
}

impl fmt::Display for Hop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

/// An ordered route of at least two distinct users, from payer to payee.
///
/// Construction checks the shape of the route only. Whether a channel exists
/// between each consecutive pair is a question for the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Path {
    nodes: Vec<UserId>,
}

impl Path {
    /// Validate and wrap a sequence of users.
    pub fn new(nodes: Vec<UserId>) -> Result<Self, CoreError> {
        match nodes.as_slice() {
            [] => return Err(invalid("path is empty")),
            [_] => return Err(invalid("path needs at least two users")),
            [first, .., last] if first == last => {
                return Err(invalid(format!("self-payment from {first} to itself")));
            }
            _ => {}
        }

        let mut seen = HashSet::with_capacity(nodes.len());
        for node in &nodes {
            if !seen.insert(*node) {
                return Err(invalid(format!("{node} appears more than once")));
            }
        }

        Ok(Self { nodes })
    }

    /// Validate the path and additionally cap the number of hops.
    pub fn with_max_hops(nodes: Vec<UserId>, max_hops: usize) -> Result<Self, CoreError> {
        let path = Self::new(nodes)?;
        if path.hop_count() > max_hops {
            return Err(invalid(format!(
                "{} hops exceeds the limit of {max_hops}",
                path.hop_count()
            )));
        }
        Ok(path)
    }

    /// The users along the path, in order.
    pub fn nodes(&self) -> &[UserId] {
        &self.nodes
    }

    /// The paying user.
    pub fn source(&self) -> UserId {
        self.nodes[0]
    }

    /// The receiving user.
    pub fn destination(&self) -> UserId {
        self.nodes[self.nodes.len() - 1]
    }

    /// Users strictly between source and destination.
    pub fn relays(&self) -> &[UserId] {
        &self.nodes[1..self.nodes.len() - 1]
    }

    pub fn hop_count(&self) -> usize {
        self.nodes.len() - 1
    }

    /// The directed hops, in path order.
    pub fn hops(&self) -> impl Iterator<Item = Hop> + '_ {
        self.nodes.windows(2).map(|pair| Hop::new(pair[0], pair[1]))
    }

    /// Channel keys touched by this path, in path order.
    ///
    /// Nodes are distinct, so each channel appears at most once.
    pub fn channel_keys(&self) -> Result<Vec<ChannelKey>, CoreError> {
        self.hops().map(|hop| hop.key()).collect()
    }

    pub fn into_nodes(self) -> Vec<UserId> {
        self.nodes
    }
}

impl TryFrom<Vec<UserId>> for Path {
    type Error = CoreError;

    fn try_from(nodes: Vec<UserId>) -> Result<Self, Self::Error> {
        Self::new(nodes)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.nodes.iter().map(|n| n.0.to_string()).collect();
        write!(f, "[{}]", rendered.join(" -> "))
    }
}

fn invalid(reason: impl Into<String>) -> CoreError {
    CoreError::InvalidPath {
        reason: reason.into(),
    }
}
