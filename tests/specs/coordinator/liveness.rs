//! Liveness: non-adjacent workers proceed concurrently, releases wake the
//! right waiters, and full crews run to completion without deadlock.

use ringboard_core::{RingConfig, WorkerId, WorkerPhase};
use ringboard_engine::{Coordinator, Crew, Workload};
use std::time::Duration;
use tokio::time::timeout;

#[tokio::test]
async fn non_adjacent_requests_are_both_admitted() {
    let coordinator = Coordinator::new(RingConfig::new(5)).unwrap();

    // Workers 0 and 2 share no board; neither may block the other
    let first = {
        let coordinator = coordinator.clone();
        tokio::spawn(async move { coordinator.acquire(WorkerId(0)).await })
    };
    let second = {
        let coordinator = coordinator.clone();
        tokio::spawn(async move { coordinator.acquire(WorkerId(2)).await })
    };

    timeout(Duration::from_secs(1), first)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    timeout(Duration::from_secs(1), second)
        .await
        .unwrap()
        .unwrap()
        .unwrap();

    assert_eq!(coordinator.phase(WorkerId(0)), Some(WorkerPhase::Active));
    assert_eq!(coordinator.phase(WorkerId(2)), Some(WorkerPhase::Active));
}

#[tokio::test]
async fn release_wakes_both_eligible_neighbors() {
    let coordinator = Coordinator::new(RingConfig::new(5)).unwrap();

    coordinator.acquire(WorkerId(1)).await.unwrap();

    let left = {
        let coordinator = coordinator.clone();
        tokio::spawn(async move { coordinator.acquire(WorkerId(0)).await })
    };
    let right = {
        let coordinator = coordinator.clone();
        tokio::spawn(async move { coordinator.acquire(WorkerId(2)).await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(coordinator.phase(WorkerId(0)), Some(WorkerPhase::Waiting));
    assert_eq!(coordinator.phase(WorkerId(2)), Some(WorkerPhase::Waiting));

    // One release frees boards 1 and 2; each neighbor's other board is free
    coordinator.release(WorkerId(1)).unwrap();

    timeout(Duration::from_secs(1), left)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    timeout(Duration::from_secs(1), right)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert_eq!(coordinator.phase(WorkerId(0)), Some(WorkerPhase::Active));
    assert_eq!(coordinator.phase(WorkerId(2)), Some(WorkerPhase::Active));
}

struct YieldingWorkload;

#[async_trait::async_trait]
impl Workload for YieldingWorkload {
    async fn plan(&self, _worker: WorkerId, _cycle: u32) {
        tokio::task::yield_now().await;
    }

    async fn work(&self, worker: WorkerId, cycle: u32) {
        // Vary hold times so interleavings differ between workers
        let micros = u64::from((worker.0 as u32 * 7 + cycle * 3) % 5) * 100;
        tokio::time::sleep(Duration::from_micros(micros)).await;
    }
}

#[tokio::test]
async fn full_crew_runs_to_completion_without_deadlock() {
    let coordinator = Coordinator::new(RingConfig::new(5)).unwrap();
    let crew = Crew::new(coordinator.clone(), YieldingWorkload, 20);

    timeout(Duration::from_secs(60), crew.run())
        .await
        .expect("crew deadlocked")
        .unwrap();

    assert!(coordinator.all_free());
    let stats = coordinator.stats();
    assert_eq!(stats.active_workers, 0);
    assert_eq!(stats.waiting_workers, 0);
}

#[tokio::test]
async fn every_worker_requesting_at_once_still_progresses() {
    let coordinator = Coordinator::new(RingConfig::new(5)).unwrap();

    // All five request simultaneously; each must eventually cycle through
    let mut handles = Vec::new();
    for worker in 0..5 {
        let coordinator = coordinator.clone();
        handles.push(tokio::spawn(async move {
            coordinator.acquire(WorkerId(worker)).await?;
            tokio::task::yield_now().await;
            coordinator.release(WorkerId(worker))
        }));
    }

    for handle in handles {
        timeout(Duration::from_secs(5), handle)
            .await
            .expect("a worker never completed its cycle")
            .unwrap()
            .unwrap();
    }
    assert!(coordinator.all_free());
}
