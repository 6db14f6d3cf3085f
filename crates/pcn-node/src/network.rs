use std::sync::Arc;

use pcn_core::{Amount, EngineConfig, PcnConfig, UserId};
use pcn_identity::{UserRecord, UserRegistry};
use pcn_ledger::{ChannelLedger, ChannelSnapshot, LedgerError};
use pcn_routing::{PathFinder, PathFinderConfig};
use pcn_settlement::{SettlementEngine, SettlementError, StatsSnapshot, TransferReceipt};
use serde::Serialize;

use crate::error::NetworkError;

/// One line of the balance table: a channel with both endpoints named.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BalanceRow {
    pub low: UserId,
    pub low_name: String,
    pub balance_low: Amount,
    pub high: UserId,
    pub high_name: String,
    pub balance_high: Amount,
    pub capacity: Amount,
}

/// A complete in-process payment-channel network.
///
/// All methods take `&self`; share the network across threads with an `Arc`.
pub struct PaymentNetwork {
    registry: Arc<UserRegistry>,
    ledger: Arc<ChannelLedger>,
    engine: SettlementEngine,
    router: PathFinder,
}

impl PaymentNetwork {
    /// Create an empty network. The router never proposes paths longer than
    /// the engine accepts.
    pub fn new(engine: EngineConfig, capacity_aware: bool) -> Self {
        let registry = Arc::new(UserRegistry::new());
        let ledger = Arc::new(ChannelLedger::new(Arc::clone(&registry)));
        let router = PathFinder::new(PathFinderConfig {
            max_hops: engine.max_path_len,
            capacity_aware,
        });
        let engine = SettlementEngine::new(Arc::clone(&ledger), engine);
        tracing::info!(
            max_path_len = ?router.config().max_hops,
            capacity_aware,
            "payment network created"
        );
        Self {
            registry,
            ledger,
            engine,
            router,
        }
    }

    pub fn from_config(config: &PcnConfig) -> Self {
        Self::new(config.engine.clone(), false)
    }

    pub fn registry(&self) -> &Arc<UserRegistry> {
        &self.registry
    }

    pub fn ledger(&self) -> &Arc<ChannelLedger> {
        &self.ledger
    }

    pub fn register(&self, id: UserId, name: impl Into<String>) -> Result<(), NetworkError> {
        Ok(self.registry.register(id, name)?)
    }

    /// Open a channel funded by `user_a`.
    ///
    /// A negative `initial` is reported as `InvalidAmount`, but only after
    /// the endpoint checks have passed.
    pub fn open_channel(
        &self,
        user_a: UserId,
        user_b: UserId,
        initial: i128,
    ) -> Result<ChannelSnapshot, NetworkError> {
        let amount = match Amount::from_signed(initial) {
            Ok(amount) => amount,
            Err(err) => {
                self.ledger.check_open(user_a, user_b)?;
                return Err(LedgerError::InvalidAmount(err.to_string()).into());
            }
        };
        Ok(self.ledger.open_channel(user_a, user_b, amount)?)
    }

    /// Convert a signed transfer amount from outside the network. A negative
    /// value is counted as a rejected transfer attempt.
    pub fn settlement_amount(&self, raw: i128) -> Result<Amount, NetworkError> {
        Amount::from_signed(raw).map_err(|_| {
            let err = SettlementError::InvalidAmount(format!("transfer amount {raw} is negative"));
            self.engine.record_rejected(&err);
            NetworkError::Settlement(err)
        })
    }

    /// Settle `amount` along an explicit path.
    pub fn transfer(
        &self,
        path: &[UserId],
        amount: Amount,
    ) -> Result<TransferReceipt, NetworkError> {
        Ok(self.engine.transfer(path, amount)?)
    }

    /// Shortest path from `from` to `to` over the current channel graph.
    pub fn route(
        &self,
        from: UserId,
        to: UserId,
        amount: Amount,
    ) -> Result<Vec<UserId>, NetworkError> {
        Ok(self.router.find_path(self.ledger.as_ref(), from, to, amount)?)
    }

    /// Route, then transfer. A missing route still counts as a failed attempt.
    pub fn pay(
        &self,
        from: UserId,
        to: UserId,
        amount: Amount,
    ) -> Result<TransferReceipt, NetworkError> {
        let path = match self.route(from, to, amount) {
            Ok(path) => path,
            Err(err) => {
                self.engine.record_unrouted();
                tracing::warn!(from = %from, to = %to, error = %err, "no path found");
                return Err(err);
            }
        };
        self.transfer(&path, amount)
    }

    pub fn channel(&self, user_a: UserId, user_b: UserId) -> Result<ChannelSnapshot, NetworkError> {
        Ok(self.ledger.get_channel(user_a, user_b)?)
    }

    pub fn snapshot(&self) -> Result<Vec<ChannelSnapshot>, NetworkError> {
        Ok(self.ledger.snapshot()?)
    }

    /// Registered users, ascending by id.
    pub fn users(&self) -> Vec<UserRecord> {
        self.registry
            .list_users()
            .into_iter()
            .filter_map(|id| self.registry.get(id))
            .collect()
    }

    /// Every channel with both endpoint names, sorted by channel key.
    pub fn balances(&self) -> Result<Vec<BalanceRow>, NetworkError> {
        self.ledger
            .snapshot()?
            .into_iter()
            .map(|snapshot| -> Result<BalanceRow, NetworkError> {
                let (low, high) = (snapshot.key.low(), snapshot.key.high());
                Ok(BalanceRow {
                    low,
                    low_name: self.registry.lookup(low)?,
                    balance_low: snapshot.balance_low,
                    high,
                    high_name: self.registry.lookup(high)?,
                    balance_high: snapshot.balance_high,
                    capacity: snapshot.capacity,
                })
            })
            .collect()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.engine.stats()
    }
}

impl Default for PaymentNetwork {
    fn default() -> Self {
        Self::new(EngineConfig::default(), false)
    }
}
