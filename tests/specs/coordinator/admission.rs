//! Admission rules: all-or-nothing board acquisition and fail-fast
//! lifecycle violations.

use ringboard_core::{BoardId, RingConfig, WorkerId, WorkerPhase};
use ringboard_engine::Coordinator;
use std::time::Duration;
use tokio::time::timeout;

fn ring(workers: usize) -> Coordinator {
    Coordinator::new(RingConfig::new(workers)).unwrap()
}

#[tokio::test]
async fn admitted_worker_holds_exactly_its_two_boards() {
    let coordinator = ring(5);

    coordinator.acquire(WorkerId(1)).await.unwrap();

    assert!(coordinator.is_occupied(BoardId(1)));
    assert!(coordinator.is_occupied(BoardId(2)));
    assert!(!coordinator.is_occupied(BoardId(0)));
    assert!(!coordinator.is_occupied(BoardId(3)));
    assert!(!coordinator.is_occupied(BoardId(4)));
}

#[tokio::test]
async fn waiting_worker_occupies_nothing() {
    let coordinator = ring(3);
    coordinator.acquire(WorkerId(0)).await.unwrap();

    // Worker 1 cannot get board 1; it must not sit on board 2 meanwhile
    let result = timeout(Duration::from_millis(50), coordinator.acquire(WorkerId(1))).await;
    assert!(result.is_err());
    assert!(!coordinator.is_occupied(BoardId(2)));
    assert_eq!(coordinator.phase(WorkerId(1)), Some(WorkerPhase::Planning));
}

#[tokio::test]
async fn repeated_cycles_round_trip_to_all_free() {
    let coordinator = ring(5);

    for _ in 0..20 {
        coordinator.acquire(WorkerId(3)).await.unwrap();
        coordinator.release(WorkerId(3)).unwrap();
    }

    assert!(coordinator.all_free());
    for worker in 0..5 {
        assert_eq!(
            coordinator.phase(WorkerId(worker)),
            Some(WorkerPhase::Planning)
        );
    }
}

#[tokio::test]
async fn lifecycle_violations_fail_fast_without_corruption() {
    let coordinator = ring(3);

    // Release before any acquire
    assert!(coordinator.release(WorkerId(0)).is_err());
    assert!(coordinator.all_free());

    // Double release after one acquire
    coordinator.acquire(WorkerId(0)).await.unwrap();
    coordinator.release(WorkerId(0)).unwrap();
    assert!(coordinator.release(WorkerId(0)).is_err());
    assert!(coordinator.all_free());

    // The ring still works afterwards
    coordinator.acquire(WorkerId(0)).await.unwrap();
    assert_eq!(coordinator.phase(WorkerId(0)), Some(WorkerPhase::Active));
}

#[tokio::test]
async fn release_admits_only_neighbors_with_both_boards_free() {
    let coordinator = ring(5);

    // Workers 1 and 3 hold boards 1..=4; worker 2 needs 2 and 3
    coordinator.acquire(WorkerId(1)).await.unwrap();
    coordinator.acquire(WorkerId(3)).await.unwrap();

    let blocked = {
        let coordinator = coordinator.clone();
        tokio::spawn(async move { coordinator.acquire(WorkerId(2)).await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(coordinator.phase(WorkerId(2)), Some(WorkerPhase::Waiting));

    // Board 3 is still held by worker 3, so releasing worker 1 is not enough
    coordinator.release(WorkerId(1)).unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(coordinator.phase(WorkerId(2)), Some(WorkerPhase::Waiting));

    // Releasing worker 3 completes the pair
    coordinator.release(WorkerId(3)).unwrap();
    timeout(Duration::from_secs(1), blocked)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert_eq!(coordinator.phase(WorkerId(2)), Some(WorkerPhase::Active));
}
