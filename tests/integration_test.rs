use rondo_rs::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::time::{Duration, Instant};

fn pool_of(n: usize) -> ThreadPool {
    let config = Config::builder().num_threads(n).build().unwrap();
    let mut pool = ThreadPool::new(&config).unwrap();
    pool.initialize().unwrap();
    pool
}

fn wait_until(deadline: Duration, mut condition: impl FnMut() -> bool) {
    let end = Instant::now() + deadline;
    while !condition() {
        assert!(Instant::now() < end, "condition not reached in time");
        std::thread::sleep(Duration::from_millis(1));
    }
}

/// Occupy every worker with a task parked on a barrier, so queue contents
/// can be inspected before any of them drain.
fn gate_workers(pool: &ThreadPool, workers: usize) -> Arc<Barrier> {
    let barrier = Arc::new(Barrier::new(workers + 1));
    let started = Arc::new(AtomicUsize::new(0));

    for _ in 0..workers {
        let barrier = barrier.clone();
        let started = started.clone();
        pool.queue_task(OnceTask::boxed(move || {
            started.fetch_add(1, Ordering::SeqCst);
            barrier.wait();
        }))
        .unwrap();
    }

    wait_until(Duration::from_secs(5), || {
        started.load(Ordering::SeqCst) == workers
    });
    barrier
}

#[test]
fn test_every_task_executes_exactly_once() {
    let mut pool = pool_of(4);

    let counters: Vec<Arc<AtomicUsize>> =
        (0..16).map(|_| Arc::new(AtomicUsize::new(0))).collect();

    for counter in &counters {
        let counter = counter.clone();
        pool.queue_task(OnceTask::boxed(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }))
        .unwrap();
    }

    wait_until(Duration::from_secs(5), || {
        counters.iter().all(|c| c.load(Ordering::SeqCst) >= 1)
    });

    // Settle, then confirm nothing ran twice.
    std::thread::sleep(Duration::from_millis(20));
    for counter in &counters {
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    pool.shutdown().unwrap();
}

#[test]
fn test_round_robin_fairness() {
    const WORKERS: usize = 4;
    const PER_QUEUE: usize = 3;

    let mut pool = pool_of(WORKERS);
    let gate = gate_workers(&pool, WORKERS);

    let done = Arc::new(AtomicUsize::new(0));
    for _ in 0..WORKERS * PER_QUEUE {
        let done = done.clone();
        pool.queue_task(OnceTask::boxed(move || {
            done.fetch_add(1, Ordering::SeqCst);
        }))
        .unwrap();
    }

    // Workers are still parked, so every queue must hold exactly its share.
    assert_eq!(pool.queue_depths(), vec![PER_QUEUE; WORKERS]);

    gate.wait();
    wait_until(Duration::from_secs(5), || {
        done.load(Ordering::SeqCst) == WORKERS * PER_QUEUE
    });

    pool.shutdown().unwrap();
}

#[test]
fn test_round_robin_placement_t1_through_t8() {
    const WORKERS: usize = 4;

    let config = Config::builder()
        .num_threads(WORKERS)
        .thread_name_prefix("placement")
        .build()
        .unwrap();
    let mut pool = ThreadPool::new(&config).unwrap();
    pool.initialize().unwrap();

    let gate = gate_workers(&pool, WORKERS);

    let records: Arc<parking_lot::Mutex<Vec<(usize, String)>>> =
        Arc::new(parking_lot::Mutex::new(Vec::new()));

    // Gating consumed one full rotation, so the cursor is back at zero and
    // T1 lands on queue 1 again.
    for tag in 1..=8 {
        let records = records.clone();
        pool.queue_task(OnceTask::boxed(move || {
            let worker = std::thread::current()
                .name()
                .unwrap_or("<unnamed>")
                .to_string();
            records.lock().push((tag, worker));
        }))
        .unwrap();
    }

    assert_eq!(pool.queue_depths(), vec![2; WORKERS]);

    gate.wait();
    wait_until(Duration::from_secs(5), || records.lock().len() == 8);

    let records = records.lock();
    let tags_on = |worker: usize| -> Vec<usize> {
        records
            .iter()
            .filter(|(_, name)| name == &format!("placement-{}", worker))
            .map(|(tag, _)| *tag)
            .collect()
    };

    assert_eq!(tags_on(1), vec![1, 5]);
    assert_eq!(tags_on(2), vec![2, 6]);
    assert_eq!(tags_on(3), vec![3, 7]);
    assert_eq!(tags_on(0), vec![4, 8]);
    drop(records);

    pool.shutdown().unwrap();
}

#[test]
fn test_recirculation_reaches_completion() {
    let mut pool = pool_of(2);

    let passes = Arc::new(AtomicUsize::new(0));
    let p = passes.clone();
    pool.queue_task(TaskFn::boxed(move || {
        p.fetch_add(1, Ordering::SeqCst) + 1 >= 3
    }))
    .unwrap();

    let deadline = Instant::now() + Duration::from_secs(5);
    while passes.load(Ordering::SeqCst) < 3 {
        assert!(Instant::now() < deadline, "task did not finish in time");
        pool.process_returns();
        std::thread::sleep(Duration::from_millis(1));
    }

    std::thread::sleep(Duration::from_millis(20));
    assert_eq!(passes.load(Ordering::SeqCst), 3);

    #[cfg(feature = "telemetry")]
    {
        let snapshot = pool.metrics().snapshot();
        assert_eq!(snapshot.tasks_recirculated, 2);
        assert_eq!(snapshot.tasks_completed, 1);
    }

    pool.shutdown().unwrap();
}

#[test]
fn test_panicking_task_is_recirculated_not_lost() {
    let mut pool = pool_of(2);

    let attempts = Arc::new(AtomicUsize::new(0));
    let a = attempts.clone();
    pool.queue_task(TaskFn::boxed(move || {
        if a.fetch_add(1, Ordering::SeqCst) == 0 {
            panic!("first pass fails");
        }
        true
    }))
    .unwrap();

    let deadline = Instant::now() + Duration::from_secs(5);
    while attempts.load(Ordering::SeqCst) < 2 {
        assert!(Instant::now() < deadline, "task was not retried in time");
        pool.process_returns();
        std::thread::sleep(Duration::from_millis(1));
    }

    #[cfg(feature = "telemetry")]
    wait_until(Duration::from_secs(5), || {
        pool.metrics().snapshot().tasks_panicked == 1
            && pool.metrics().snapshot().tasks_completed == 1
    });

    pool.shutdown().unwrap();
}

#[test]
fn test_shutdown_discards_queued_tasks() {
    const WORKERS: usize = 2;
    const PENDING: usize = 6;

    let mut pool = pool_of(WORKERS);

    // Keep both workers busy long enough that shutdown flips the flag
    // before their pass ends.
    let started = Arc::new(AtomicUsize::new(0));
    for _ in 0..WORKERS {
        let started = started.clone();
        pool.queue_task(OnceTask::boxed(move || {
            started.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(300));
        }))
        .unwrap();
    }
    wait_until(Duration::from_secs(5), || {
        started.load(Ordering::SeqCst) == WORKERS
    });

    let counters: Vec<Arc<AtomicUsize>> = (0..PENDING)
        .map(|_| Arc::new(AtomicUsize::new(0)))
        .collect();
    for counter in &counters {
        let counter = counter.clone();
        pool.queue_task(OnceTask::boxed(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }))
        .unwrap();
    }
    assert_eq!(pool.pending_tasks(), PENDING);

    pool.shutdown().unwrap();
    assert_eq!(pool.state(), PoolState::Terminated);
    assert!(pool.is_drained());

    // The queued tasks were dropped without a single execution.
    for counter in &counters {
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[cfg(feature = "telemetry")]
    assert_eq!(pool.metrics().snapshot().tasks_discarded, PENDING as u64);
}

#[test]
fn test_drop_tears_the_pool_down() {
    let pool = pool_of(2);
    let counter = Arc::new(AtomicUsize::new(0));
    let c = counter.clone();
    pool.queue_task(OnceTask::boxed(move || {
        c.fetch_add(1, Ordering::SeqCst);
    }))
    .unwrap();

    wait_until(Duration::from_secs(5), || {
        counter.load(Ordering::SeqCst) == 1
    });

    // Dropping without an explicit shutdown must join the workers rather
    // than leaking or hanging them.
    drop(pool);
}

#[test]
fn test_concurrent_producers_all_tasks_admitted() {
    const PRODUCERS: usize = 4;
    const PER_PRODUCER: usize = 250;

    let mut pool = pool_of(4);
    let done = Arc::new(AtomicUsize::new(0));

    std::thread::scope(|s| {
        for _ in 0..PRODUCERS {
            let pool = &pool;
            let done = done.clone();
            s.spawn(move || {
                for _ in 0..PER_PRODUCER {
                    let done = done.clone();
                    pool.queue_task(OnceTask::boxed(move || {
                        done.fetch_add(1, Ordering::SeqCst);
                    }))
                    .unwrap();
                }
            });
        }
    });

    wait_until(Duration::from_secs(10), || {
        done.load(Ordering::SeqCst) == PRODUCERS * PER_PRODUCER
    });

    pool.shutdown().unwrap();
}
