//! Integration test: the reference transfer scenarios, end to end through
//! the `PaymentNetwork` facade.

use std::sync::Arc;

use pcn_core::{Amount, ChannelKey, UserId};
use pcn_integration_tests::{balance, ids, network};
use pcn_node::{NetworkError, PaymentNetwork};
use pcn_settlement::SettlementError;

// =========================================================================
// Single channel
// =========================================================================

#[test]
fn test_direct_transfer_within_capacity() {
    let network = network(2, &[(1, 2, 10)]);
    assert_eq!(balance(&network, 1, 2, 1), Amount(10));
    assert_eq!(balance(&network, 1, 2, 2), Amount::ZERO);

    network.transfer(&ids(&[1, 2]), Amount(4)).expect("transfer should settle");

    assert_eq!(balance(&network, 1, 2, 1), Amount(6));
    assert_eq!(balance(&network, 1, 2, 2), Amount(4));
}

#[test]
fn test_direct_transfer_over_capacity_changes_nothing() {
    let network = network(2, &[(1, 2, 10)]);

    let err = network.transfer(&ids(&[1, 2]), Amount(20)).unwrap_err();
    assert!(matches!(
        err,
        NetworkError::Settlement(SettlementError::InsufficientCapacity { .. })
    ));

    assert_eq!(balance(&network, 1, 2, 1), Amount(10));
    assert_eq!(balance(&network, 1, 2, 2), Amount::ZERO);
}

// =========================================================================
// Multi-hop
// =========================================================================

#[test]
fn test_two_hop_transfer_relay_net_zero() {
    let network = network(3, &[(1, 2, 10), (2, 3, 5)]);

    let receipt = network
        .transfer(&ids(&[1, 2, 3]), Amount(5))
        .expect("transfer should settle");

    assert_eq!(balance(&network, 1, 2, 1), Amount(5));
    assert_eq!(balance(&network, 1, 2, 2), Amount(5));
    assert_eq!(balance(&network, 2, 3, 2), Amount::ZERO);
    assert_eq!(balance(&network, 2, 3, 3), Amount(5));
    assert_eq!(receipt.net_change(UserId(2)), 0);
    assert_eq!(receipt.hops.len(), 2);
}

#[test]
fn test_missing_channel_is_named() {
    let network = network(3, &[(1, 2, 10), (2, 3, 5)]);

    let err = network.transfer(&ids(&[1, 3]), Amount(1)).unwrap_err();
    assert_eq!(
        err,
        NetworkError::Settlement(SettlementError::NoChannel(
            ChannelKey::new(UserId(1), UserId(3)).unwrap()
        ))
    );
}

#[test]
fn test_twenty_one_hop_transfer_settles_by_default() {
    let channels: Vec<(u64, u64, i128)> = (1..22).map(|i| (i, i + 1, 10)).collect();
    let network = network(22, &channels);
    let path: Vec<u64> = (1..=22).collect();

    let receipt = network.transfer(&ids(&path), Amount(1)).unwrap();
    assert_eq!(receipt.hops.len(), 21);
    assert_eq!(balance(&network, 1, 2, 1), Amount(9));
    assert_eq!(balance(&network, 21, 22, 22), Amount(1));
    assert_eq!(network.stats().succeeded, 1);
}

// =========================================================================
// Contention on a shared channel
// =========================================================================

#[test]
fn test_concurrent_demand_over_shared_channel() {
    for _ in 0..50 {
        let network = Arc::new(network(4, &[(1, 2, 10), (4, 2, 10), (2, 3, 5)]));

        let handles: Vec<_> = [ids(&[1, 2, 3]), ids(&[4, 2, 3])]
            .into_iter()
            .map(|path| {
                let network = Arc::clone(&network);
                std::thread::spawn(move || network.transfer(&path, Amount(3)).is_ok())
            })
            .collect();
        let successes = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .filter(|ok| *ok)
            .count();

        assert_eq!(successes, 1, "combined demand 6 exceeds capacity 5");
        assert_eq!(balance(&network, 2, 3, 3), Amount(3));
        assert_eq!(balance(&network, 2, 3, 2), Amount(2));
        assert!(network.ledger().verify_invariants().unwrap().is_empty());
    }
}

#[test]
fn test_concurrent_demand_within_capacity_both_settle() {
    let network = Arc::new(network(4, &[(1, 2, 10), (4, 2, 10), (2, 3, 5)]));

    let handles: Vec<_> = [ids(&[1, 2, 3]), ids(&[4, 2, 3])]
        .into_iter()
        .map(|path| {
            let network = Arc::clone(&network);
            std::thread::spawn(move || network.transfer(&path, Amount(2)).is_ok())
        })
        .collect();
    for handle in handles {
        assert!(handle.join().unwrap());
    }

    assert_eq!(balance(&network, 2, 3, 3), Amount(4));
    assert_eq!(balance(&network, 2, 3, 2), Amount(1));
}

// =========================================================================
// Driver-side routing
// =========================================================================

#[test]
fn test_routed_payment_uses_shortest_path() {
    use pcn_routing::{PathFinder, PathFinderConfig, RoutingError};

    let network = network(4, &[(1, 2, 10), (2, 3, 10), (3, 4, 10), (1, 4, 10)]);
    let path = network.route(UserId(1), UserId(3), Amount(1)).unwrap();
    assert_eq!(path, ids(&[1, 2, 3]));

    let finder = PathFinder::new(PathFinderConfig {
        max_hops: Some(1),
        capacity_aware: true,
    });
    assert!(matches!(
        finder.find_path(network.ledger().as_ref(), UserId(1), UserId(3), Amount(1)),
        Err(RoutingError::MaxHopsExceeded { .. })
    ));

    network.pay(UserId(1), UserId(3), Amount(4)).unwrap();
    assert_eq!(balance(&network, 2, 3, 3), Amount(4));
    assert_eq!(network.stats().succeeded, 1);
}

#[test]
fn test_capped_router_reports_disconnected_target_as_no_route() {
    use pcn_core::EngineConfig;
    use pcn_routing::RoutingError;

    let config = EngineConfig {
        max_path_len: Some(20),
    };
    let network = PaymentNetwork::new(config, false);
    for id in (1..=22).chain([30, 31]) {
        network.register(UserId(id), format!("User{id}")).unwrap();
    }
    for i in 1..22 {
        network.open_channel(UserId(i), UserId(i + 1), 10).unwrap();
    }
    network.open_channel(UserId(30), UserId(31), 10).unwrap();

    assert!(matches!(
        network.route(UserId(1), UserId(30), Amount(1)),
        Err(NetworkError::Routing(RoutingError::NoRoute { .. }))
    ));
    assert!(matches!(
        network.route(UserId(1), UserId(22), Amount(1)),
        Err(NetworkError::Routing(RoutingError::MaxHopsExceeded { max_hops: 20, .. }))
    ));
}
