use pcn_core::CoreError;
use pcn_identity::IdentityError;
use pcn_ledger::LedgerError;
use pcn_routing::RoutingError;
use pcn_settlement::SettlementError;

/// Any error surfaced by a [`crate::PaymentNetwork`] operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NetworkError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Settlement(#[from] SettlementError),

    #[error(transparent)]
    Routing(#[from] RoutingError),
}
