use pcn_core::{Amount, Hop};
use pcn_ledger::{LedgerError, LockedChannels};

use crate::types::HopDelta;

/// Reversible log of the hop deltas applied during one commit.
///
/// Rolling back replays the inverse of each entry in reverse order, which
/// restores every touched channel to its pre-commit balances.
#[derive(Debug, Default)]
pub struct HopJournal {
    applied: Vec<HopDelta>,
}

impl HopJournal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `amount` across `hop` and record it. Nothing is recorded when
    /// the ledger refuses the delta.
    pub fn apply(
        &mut self,
        locked: &mut LockedChannels<'_>,
        hop: Hop,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        locked.apply_hop_delta(&hop, amount)?;
        self.applied.push(HopDelta { hop, amount });
        Ok(())
    }

    /// Undo every recorded delta, newest first.
    ///
    /// Returns the number of deltas reverted. Stops at the first inverse the
    /// ledger refuses; entries not yet reverted stay in the journal.
    pub fn rollback(&mut self, locked: &mut LockedChannels<'_>) -> Result<usize, LedgerError> {
        let mut reverted = 0;
        while let Some(delta) = self.applied.last().copied() {
            let inverse = delta.inverse();
            locked.apply_hop_delta(&inverse.hop, inverse.amount)?;
            self.applied.pop();
            reverted += 1;
            tracing::debug!(hop = %delta.hop, amount = %delta.amount, "hop delta reverted");
        }
        Ok(reverted)
    }

    pub fn len(&self) -> usize {
        self.applied.len()
    }

    pub fn is_empty(&self) -> bool {
        self.applied.is_empty()
    }

    /// The applied deltas, in application order.
    pub fn into_deltas(self) -> Vec<HopDelta> {
        self.applied
    }
}
