//! Integration test: many transfers in flight at once over overlapping and
//! disjoint paths.

use std::sync::Arc;
use std::time::Duration;

use pcn_core::{Amount, UserId};
use pcn_integration_tests::{balance, ids, network, ring, Lcg};

#[test]
fn test_opposing_lock_orders_do_not_deadlock() {
    // 1 -> 2 -> 3 and 3 -> 2 -> 1 take the same two channels in opposite
    // path order.
    let network = Arc::new(network(3, &[(1, 2, 1_000), (2, 3, 1_000)]));
    network.transfer(&ids(&[1, 2, 3]), Amount(500)).unwrap();

    let forward = {
        let network = Arc::clone(&network);
        std::thread::spawn(move || {
            (0..200)
                .filter(|_| network.transfer(&ids(&[1, 2, 3]), Amount(1)).is_ok())
                .count()
        })
    };
    let backward = {
        let network = Arc::clone(&network);
        std::thread::spawn(move || {
            (0..200)
                .filter(|_| network.transfer(&ids(&[3, 2, 1]), Amount(1)).is_ok())
                .count()
        })
    };

    let forward = forward.join().unwrap();
    let backward = backward.join().unwrap();
    assert_eq!(forward + backward, 400);
    assert!(network.ledger().verify_invariants().unwrap().is_empty());
    assert_eq!(balance(&network, 1, 2, 1), Amount(500));
}

#[test]
fn test_threaded_random_workload_keeps_invariants() {
    let network = Arc::new(ring(6, 30));
    let total = network.ledger().total_capacity().unwrap();

    let handles: Vec<_> = (0..8u64)
        .map(|seed| {
            let network = Arc::clone(&network);
            std::thread::spawn(move || {
                let mut rng = Lcg::new(seed);
                for _ in 0..100 {
                    let from = rng.next_below(6) + 1;
                    let to = (from + rng.next_below(5)) % 6 + 1;
                    let amount = Amount::from(rng.next_below(10) + 1);
                    let _ = network.pay(UserId(from), UserId(to), amount);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(network.ledger().total_capacity().unwrap(), total);
    assert!(network.ledger().verify_invariants().unwrap().is_empty());
    let stats = network.stats();
    assert_eq!(stats.attempted, 800);
    assert_eq!(stats.settlement_failures, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_blocking_tasks_over_shared_channel() {
    // Ten senders all relay through user 1 into channel (1, 12) of capacity 25.
    let mut channels: Vec<(u64, u64, i128)> = (2..=11).map(|id| (id, 1, 10)).collect();
    channels.push((1, 12, 25));
    let network = Arc::new(network(12, &channels));

    let handles: Vec<_> = (2..=11u64)
        .map(|sender| {
            let network = Arc::clone(&network);
            tokio::task::spawn_blocking(move || {
                network.transfer(&ids(&[sender, 1, 12]), Amount(5)).is_ok()
            })
        })
        .collect();

    let mut successes = 0;
    for handle in handles {
        if tokio::time::timeout(Duration::from_secs(10), handle)
            .await
            .expect("transfer should not hang")
            .unwrap()
        {
            successes += 1;
        }
    }

    assert_eq!(successes, 5);
    assert_eq!(balance(&network, 1, 12, 12), Amount(25));
    assert_eq!(balance(&network, 1, 12, 1), Amount::ZERO);
    assert!(network.ledger().verify_invariants().unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_disjoint_transfers_all_settle() {
    let channels: Vec<(u64, u64, i128)> = (0..20).map(|i| (2 * i + 1, 2 * i + 2, 5)).collect();
    let network = Arc::new(network(40, &channels));

    let handles: Vec<_> = (0..20u64)
        .map(|i| {
            let network = Arc::clone(&network);
            tokio::task::spawn_blocking(move || {
                network.transfer(&ids(&[2 * i + 1, 2 * i + 2]), Amount(5))
            })
        })
        .collect();
    for handle in handles {
        assert!(handle.await.unwrap().is_ok());
    }

    assert_eq!(network.stats().succeeded, 20);
}
