//! Integration test: ledger properties that must hold after any sequence of
//! operations, successful or not.

use pcn_core::{Amount, ChannelKey, UserId};
use pcn_identity::IdentityError;
use pcn_integration_tests::{balance, holdings, ids, network, ring, Lcg};
use pcn_ledger::LedgerError;
use pcn_node::NetworkError;
use pcn_settlement::{HopJournal, SettlementError};

#[test]
fn test_random_workload_conserves_capacity() {
    let network = ring(8, 20);
    let total = network.ledger().total_capacity().unwrap();
    let mut rng = Lcg::new(7);

    for _ in 0..300 {
        let from = UserId(rng.next_below(8) + 1);
        let mut to = UserId(rng.next_below(8) + 1);
        while to == from {
            to = UserId(rng.next_below(8) + 1);
        }
        let amount = Amount::from(rng.next_below(15) + 1);
        let _ = network.pay(from, to, amount);

        assert_eq!(network.ledger().total_capacity().unwrap(), total);
    }

    assert!(network.ledger().verify_invariants().unwrap().is_empty());
    let stats = network.stats();
    assert_eq!(stats.attempted, 300);
    assert!(stats.succeeded > 0);
}

#[test]
fn test_balances_never_exceed_capacity() {
    // Unsigned balances cannot go negative; each side is bounded by capacity.
    let network = network(3, &[(1, 2, 6), (2, 3, 6)]);
    for amount in [4, 4, 2, 7, 1] {
        let _ = network.transfer(&ids(&[1, 2, 3]), Amount(amount));
    }
    for snapshot in network.snapshot().unwrap() {
        assert!(snapshot.balance_low <= snapshot.capacity);
        assert!(snapshot.balance_high <= snapshot.capacity);
        assert!(snapshot.is_consistent());
    }
    assert_eq!(balance(&network, 1, 2, 1), Amount::ZERO);
}

#[test]
fn test_failed_transfer_is_atomic_across_hops() {
    // Enough on the first two hops, not on the third.
    let network = network(4, &[(1, 2, 10), (2, 3, 10), (3, 4, 2)]);
    let before = network.snapshot().unwrap();

    let err = network.transfer(&ids(&[1, 2, 3, 4]), Amount(5)).unwrap_err();
    match err {
        NetworkError::Settlement(SettlementError::InsufficientCapacity {
            hop_index,
            from,
            to,
            ..
        }) => {
            assert_eq!(hop_index, 2);
            assert_eq!((from, to), (UserId(3), UserId(4)));
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let after = network.snapshot().unwrap();
    for (b, a) in before.iter().zip(after.iter()) {
        assert_eq!(b.balance_low, a.balance_low);
        assert_eq!(b.balance_high, a.balance_high);
        assert_eq!(b.updates, a.updates);
    }
}

#[test]
fn test_relays_are_balance_neutral() {
    let network = network(5, &[(1, 2, 50), (2, 3, 50), (3, 4, 50), (4, 5, 50)]);
    let relays = [2, 3, 4];
    let before: Vec<u128> = relays.iter().map(|id| holdings(&network, *id)).collect();

    let receipt = network.transfer(&ids(&[1, 2, 3, 4, 5]), Amount(17)).unwrap();

    let after: Vec<u128> = relays.iter().map(|id| holdings(&network, *id)).collect();
    assert_eq!(before, after);
    for id in relays {
        assert_eq!(receipt.net_change(UserId(id)), 0);
    }
    assert_eq!(receipt.net_change(UserId(1)), -17);
    assert_eq!(receipt.net_change(UserId(5)), 17);
}

#[test]
fn test_forced_rollback_restores_every_channel() {
    let network = network(4, &[(1, 2, 10), (2, 3, 10), (3, 4, 1)]);
    let before = network.snapshot().unwrap();
    let hops: Vec<_> = pcn_core::Path::new(ids(&[1, 2, 3, 4]))
        .unwrap()
        .hops()
        .collect();
    let keys: Vec<ChannelKey> = hops.iter().map(|hop| hop.key().unwrap()).collect();

    {
        let set = network.ledger().acquire(&keys).unwrap();
        let mut locked = set.lock().unwrap();
        let mut journal = HopJournal::new();

        journal.apply(&mut locked, hops[0], Amount(5)).unwrap();
        journal.apply(&mut locked, hops[1], Amount(5)).unwrap();
        assert!(journal.apply(&mut locked, hops[2], Amount(5)).is_err());

        assert_eq!(journal.rollback(&mut locked).unwrap(), 2);
    }

    let after = network.snapshot().unwrap();
    for (b, a) in before.iter().zip(after.iter()) {
        assert_eq!(b.balance_low, a.balance_low);
        assert_eq!(b.balance_high, a.balance_high);
        assert!(a.is_consistent());
    }
}

#[test]
fn test_duplicate_registration_keeps_first_name() {
    let network = network(1, &[]);
    assert_eq!(
        network.register(UserId(1), "Impostor"),
        Err(NetworkError::Identity(IdentityError::DuplicateUser(UserId(1))))
    );
    assert_eq!(network.registry().lookup(UserId(1)).unwrap(), "User1");
}

#[test]
fn test_duplicate_channel_in_either_order() {
    let network = network(2, &[(1, 2, 10)]);
    network.transfer(&ids(&[1, 2]), Amount(3)).unwrap();

    let key = ChannelKey::new(UserId(1), UserId(2)).unwrap();
    for (a, b) in [(1, 2), (2, 1)] {
        assert_eq!(
            network.open_channel(UserId(a), UserId(b), 99),
            Err(NetworkError::Ledger(LedgerError::DuplicateChannel(key)))
        );
    }
    assert_eq!(balance(&network, 1, 2, 1), Amount(7));
    assert_eq!(balance(&network, 1, 2, 2), Amount(3));
}

#[test]
fn test_open_channel_error_order() {
    let network = network(2, &[]);
    assert_eq!(
        network.open_channel(UserId(1), UserId(3), 5),
        Err(NetworkError::Ledger(LedgerError::UnknownUser(UserId(3))))
    );
    assert_eq!(
        network.open_channel(UserId(2), UserId(2), 5),
        Err(NetworkError::Ledger(LedgerError::SelfLoop(UserId(2))))
    );
    assert!(matches!(
        network.open_channel(UserId(1), UserId(2), -1),
        Err(NetworkError::Ledger(LedgerError::InvalidAmount(_)))
    ));
    network.open_channel(UserId(1), UserId(2), 0).unwrap();
    assert_eq!(balance(&network, 1, 2, 1), Amount::ZERO);
}

#[test]
fn test_invalid_requests_rejected_before_any_mutation() {
    let network = network(3, &[(1, 2, 10), (2, 3, 10)]);
    let before = network.snapshot().unwrap();

    for path in [vec![], ids(&[1]), ids(&[1, 2, 1]), ids(&[1, 2, 3, 2])] {
        assert!(matches!(
            network.transfer(&path, Amount(1)),
            Err(NetworkError::Settlement(SettlementError::InvalidPath { .. }))
        ));
    }
    assert!(matches!(
        network.transfer(&ids(&[1, 2, 3]), Amount::ZERO),
        Err(NetworkError::Settlement(SettlementError::InvalidAmount(_)))
    ));

    assert_eq!(network.snapshot().unwrap(), before);
    assert_eq!(network.stats().rejected, 5);
}

#[test]
fn test_receipt_serializes() {
    let network = network(2, &[(1, 2, 10)]);
    let receipt = network.transfer(&ids(&[1, 2]), Amount(4)).unwrap();
    let json = serde_json::to_value(&receipt).unwrap();
    assert_eq!(json["amount"], 4);
    assert_eq!(json["path"], serde_json::json!([1, 2]));
}
