use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::error::SettlementError;

/// Lock-free outcome counters for every transfer attempt.
#[derive(Debug, Default)]
pub struct SettlementStats {
    attempted: AtomicU64,
    succeeded: AtomicU64,
    insufficient_capacity: AtomicU64,
    rejected: AtomicU64,
    settlement_failures: AtomicU64,
    unrouted: AtomicU64,
}

/// Point-in-time copy of [`SettlementStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub attempted: u64,
    pub succeeded: u64,
    pub insufficient_capacity: u64,
    /// Invalid paths, invalid amounts, and missing channels.
    pub rejected: u64,
    pub settlement_failures: u64,
    /// Attempts for which the driver found no path at all.
    pub unrouted: u64,
}

impl StatsSnapshot {
    pub fn failed(&self) -> u64 {
        self.attempted.saturating_sub(self.succeeded)
    }

    /// Fraction of attempts that succeeded, `0.0` before the first attempt.
    pub fn success_ratio(&self) -> f64 {
        if self.attempted == 0 {
            return 0.0;
        }
        self.succeeded as f64 / self.attempted as f64
    }
}

impl SettlementStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&self) {
        self.attempted.fetch_add(1, Ordering::Relaxed);
        self.succeeded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self, error: &SettlementError) {
        self.attempted.fetch_add(1, Ordering::Relaxed);
        let counter = match error {
            SettlementError::InsufficientCapacity { .. } => &self.insufficient_capacity,
            SettlementError::SettlementFailure { .. } | SettlementError::Ledger(_) => {
                &self.settlement_failures
            }
            SettlementError::InvalidPath { .. }
            | SettlementError::InvalidAmount(_)
            | SettlementError::NoChannel(_) => &self.rejected,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Count an attempt that never reached the engine because no path existed.
    pub fn record_unrouted(&self) {
        self.attempted.fetch_add(1, Ordering::Relaxed);
        self.unrouted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            attempted: self.attempted.load(Ordering::Relaxed),
            succeeded: self.succeeded.load(Ordering::Relaxed),
            insufficient_capacity: self.insufficient_capacity.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            settlement_failures: self.settlement_failures.load(Ordering::Relaxed),
            unrouted: self.unrouted.load(Ordering::Relaxed),
        }
    }
}
