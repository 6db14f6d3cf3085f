use std::sync::Arc;

use chrono::Utc;
use pcn_core::{Amount, CoreError, EngineConfig, Hop, Path, UserId};
use pcn_ledger::{ChannelLedger, LedgerError, LockedChannels};

use crate::error::SettlementError;
use crate::journal::HopJournal;
use crate::stats::{SettlementStats, StatsSnapshot};
use crate::types::{TransferId, TransferReceipt};

/// Executes multi-hop transfers atomically against a [`ChannelLedger`].
///
/// A transfer locks every channel on its path in ascending key order, checks
/// every hop against the locked balances, and only then applies the deltas.
/// Transfers over disjoint channels run in parallel; transfers sharing a
/// channel are serialised at that channel.
pub struct SettlementEngine {
    ledger: Arc<ChannelLedger>,
    config: EngineConfig,
    stats: SettlementStats,
}

impl SettlementEngine {
    pub fn new(ledger: Arc<ChannelLedger>, config: EngineConfig) -> Self {
        Self {
            ledger,
            config,
            stats: SettlementStats::new(),
        }
    }

    pub fn ledger(&self) -> &Arc<ChannelLedger> {
        &self.ledger
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Count an attempt the caller could not route.
    pub fn record_unrouted(&self) {
        self.stats.record_unrouted();
    }

    /// Move `amount` from `path[0]` to the last user of `path`, through
    /// every channel in between, or change nothing.
    ///
    /// The outcome is terminal for this attempt; the engine never retries.
    pub fn transfer(
        &self,
        path: &[UserId],
        amount: Amount,
    ) -> Result<TransferReceipt, SettlementError> {
        let outcome = self.execute(path, amount);
        match &outcome {
            Ok(receipt) => {
                self.stats.record_success();
                tracing::info!(
                    transfer_id = %receipt.id,
                    hops = receipt.hops.len(),
                    amount = %amount,
                    "transfer settled"
                );
            }
            Err(err @ SettlementError::InsufficientCapacity { .. }) => {
                self.stats.record_failure(err);
                tracing::warn!(error = %err, "transfer rejected for capacity");
            }
            Err(err @ (SettlementError::SettlementFailure { .. } | SettlementError::Ledger(_))) => {
                self.stats.record_failure(err);
                tracing::error!(error = %err, "transfer failed during settlement");
            }
            Err(err) => {
                self.stats.record_failure(err);
                tracing::debug!(error = %err, "transfer request rejected");
            }
        }
        outcome
    }

    /// Count a transfer that was refused before it reached the engine, such
    /// as one whose amount could not be represented.
    pub fn record_rejected(&self, err: &SettlementError) {
        self.stats.record_failure(err);
        tracing::debug!(error = %err, "transfer request rejected");
    }

    fn execute(
        &self,
        nodes: &[UserId],
        amount: Amount,
    ) -> Result<TransferReceipt, SettlementError> {
        let path = match self.config.max_path_len {
            Some(max_hops) => Path::with_max_hops(nodes.to_vec(), max_hops),
            None => Path::new(nodes.to_vec()),
        }
        .map_err(path_error)?;
        if amount.is_zero() {
            return Err(SettlementError::InvalidAmount(
                "transfer amount must be positive".into(),
            ));
        }

        let hops: Vec<Hop> = path.hops().collect();
        let keys = path.channel_keys().map_err(path_error)?;
        let set = self.ledger.acquire(&keys).map_err(ledger_error)?;
        let mut locked = set.lock()?;
        tracing::debug!(path = %path, channels = locked.len(), "path channels locked");

        validate(&locked, &hops, amount)?;
        let journal = commit(&mut locked, &hops, amount)?;

        Ok(TransferReceipt {
            id: TransferId::new(),
            path: path.into_nodes(),
            amount,
            hops: journal.into_deltas(),
            settled_at: Utc::now(),
        })
    }
}

/// Check every hop against the locked balances. Reports the first hop, in
/// path order, that cannot carry `amount`.
fn validate(
    locked: &LockedChannels<'_>,
    hops: &[Hop],
    amount: Amount,
) -> Result<(), SettlementError> {
    for (hop_index, hop) in hops.iter().enumerate() {
        let channel = locked.channel_for(hop)?;
        let available = channel.balance_of(hop.from)?;
        if available < amount {
            return Err(SettlementError::InsufficientCapacity {
                hop_index,
                from: hop.from,
                to: hop.to,
                available,
                required: amount,
            });
        }
    }
    Ok(())
}

/// Apply every hop in order. If any hop is refused, revert the ones already
/// applied before reporting the failure.
fn commit(
    locked: &mut LockedChannels<'_>,
    hops: &[Hop],
    amount: Amount,
) -> Result<HopJournal, SettlementError> {
    let mut journal = HopJournal::new();
    for (hop_index, hop) in hops.iter().enumerate() {
        if let Err(err) = journal.apply(locked, *hop, amount) {
            tracing::error!(hop_index, hop = %hop, error = %err, "commit failed, rolling back");
            let reason = match journal.rollback(locked) {
                Ok(reverted) => format!("{err}; reverted {reverted} applied hop(s)"),
                Err(rollback_err) => format!(
                    "{err}; rollback stopped with {} hop(s) applied: {rollback_err}",
                    journal.len()
                ),
            };
            return Err(SettlementError::SettlementFailure { hop_index, reason });
        }
    }
    Ok(journal)
}

fn path_error(err: CoreError) -> SettlementError {
    match err {
        CoreError::InvalidPath { reason } => SettlementError::InvalidPath { reason },
        other => SettlementError::InvalidPath {
            reason: other.to_string(),
        },
    }
}

fn ledger_error(err: LedgerError) -> SettlementError {
    match err {
        LedgerError::NoChannel(key) => SettlementError::NoChannel(key),
        other => SettlementError::Ledger(other),
    }
}
