//! Integration tests for the resource pool
//!
//! Every concurrent scenario runs under both wake strategies.

#[cfg(test)]
mod tests {
    use poolgate_errors::PoolError;
    use poolgate_resources::*;
    use proptest::prelude::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{mpsc, Arc};
    use std::thread;
    use std::time::{Duration, Instant};

    const STRATEGIES: [WakeStrategy; 2] = [WakeStrategy::Condvar, WakeStrategy::Semaphore];

    fn pool(total: usize, categories: &[(&str, usize)], strategy: WakeStrategy) -> ResourcePool {
        let config = PoolConfig::new(total, categories.iter().copied()).unwrap();
        ResourcePool::new(config, strategy)
    }

    /// Spin until `waiters` clients are parked, or fail after a few seconds
    fn wait_for_waiters(pool: &ResourcePool, waiters: usize) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while pool.snapshot().waiters < waiters {
            assert!(Instant::now() < deadline, "clients never parked");
            thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn test_second_acquire_blocks_until_release() {
        for strategy in STRATEGIES {
            let pool = pool(1, &[("A", 1), ("B", 1)], strategy);
            let admitted = AtomicBool::new(false);

            pool.acquire("A").unwrap();
            thread::scope(|s| {
                let waiter = s.spawn(|| {
                    pool.acquire("A").unwrap();
                    admitted.store(true, Ordering::SeqCst);
                });

                wait_for_waiters(&pool, 1);
                thread::sleep(Duration::from_millis(20));
                assert!(!admitted.load(Ordering::SeqCst));

                pool.release("A").unwrap();
                waiter.join().unwrap();
            });

            assert!(admitted.load(Ordering::SeqCst));
            let snap = pool.snapshot();
            assert_eq!(snap.used_total, 1);
            assert_eq!(snap.waiters, 0);
            pool.release("A").unwrap();
            assert!(pool.snapshot().is_idle());
        }
    }

    #[test]
    fn test_category_contention_does_not_block_other_category() {
        for strategy in STRATEGIES {
            let pool = pool(2, &[("A", 1), ("B", 5)], strategy);
            let admitted_a = AtomicUsize::new(0);

            thread::scope(|s| {
                for _ in 0..2 {
                    s.spawn(|| {
                        pool.acquire("A").unwrap();
                        admitted_a.fetch_add(1, Ordering::SeqCst);
                    });
                }

                wait_for_waiters(&pool, 1);
                while admitted_a.load(Ordering::SeqCst) == 0 {
                    thread::yield_now();
                }
                assert_eq!(admitted_a.load(Ordering::SeqCst), 1);

                // one global unit left and B has room: admitted without waiting
                assert!(pool.try_acquire("B").unwrap());
                let snap = pool.snapshot();
                assert_eq!(snap.used_total, 2);
                assert_eq!(snap.usage("A").unwrap().used, 1);
                assert_eq!(snap.usage("B").unwrap().used, 1);

                // freeing B does not help the parked A client
                pool.release("B").unwrap();
                thread::sleep(Duration::from_millis(20));
                assert_eq!(admitted_a.load(Ordering::SeqCst), 1);

                pool.release("A").unwrap();
            });

            assert_eq!(admitted_a.load(Ordering::SeqCst), 2);
            pool.release("A").unwrap();
            assert!(pool.snapshot().is_idle());
        }
    }

    #[test]
    fn test_blocking_acquire_of_other_category_succeeds_immediately() {
        for strategy in STRATEGIES {
            let pool = pool(2, &[("A", 1), ("B", 5)], strategy);
            pool.acquire("A").unwrap();
            pool.acquire("B").unwrap();
            assert_eq!(pool.snapshot().used_total, 2);
        }
    }

    #[test]
    fn test_invalid_category_leaves_pool_untouched() {
        for strategy in STRATEGIES {
            let pool = pool(2, &[("A", 1), ("B", 1)], strategy);
            pool.acquire("A").unwrap();
            let before = pool.snapshot();

            assert_eq!(pool.acquire("Z"), Err(PoolError::invalid_category("Z")));
            assert_eq!(pool.release("Z"), Err(PoolError::invalid_category("Z")));

            assert_eq!(pool.snapshot(), before);
        }
    }

    #[test]
    fn test_invalid_category_on_saturated_pool_does_not_block() {
        let pool = pool(1, &[("A", 1)], WakeStrategy::Semaphore);
        pool.acquire("A").unwrap();
        assert!(pool.acquire("Z").is_err());
        assert_eq!(pool.snapshot().waiters, 0);
    }

    #[test]
    fn test_fifty_random_clients_complete_and_drain() {
        for strategy in STRATEGIES {
            let pool = Arc::new(pool(2, &[("A", 1), ("B", 2)], strategy));
            let in_use_a = Arc::new(AtomicUsize::new(0));
            let in_use_b = Arc::new(AtomicUsize::new(0));
            let in_use_total = Arc::new(AtomicUsize::new(0));
            let (done_tx, done_rx) = mpsc::channel();

            for _ in 0..50 {
                let pool = Arc::clone(&pool);
                let in_use_a = Arc::clone(&in_use_a);
                let in_use_b = Arc::clone(&in_use_b);
                let in_use_total = Arc::clone(&in_use_total);
                let done_tx = done_tx.clone();
                thread::spawn(move || {
                    let (category, counter, capacity) = if rand::random::<bool>() {
                        ("A", in_use_a, 1)
                    } else {
                        ("B", in_use_b, 2)
                    };
                    pool.acquire(category).unwrap();

                    // counted after admission, uncounted before release, so
                    // these never exceed what the pool really hands out
                    let held = counter.fetch_add(1, Ordering::SeqCst) + 1;
                    let total = in_use_total.fetch_add(1, Ordering::SeqCst) + 1;
                    assert!(held <= capacity, "{category} over capacity: {held}");
                    assert!(total <= 2, "pool over capacity: {total}");
                    assert!(pool.snapshot().check_invariants().is_empty());

                    thread::sleep(Duration::from_millis(rand::random_range(0..3)));

                    in_use_total.fetch_sub(1, Ordering::SeqCst);
                    counter.fetch_sub(1, Ordering::SeqCst);
                    pool.release(category).unwrap();
                    done_tx.send(()).unwrap();
                });
            }
            drop(done_tx);

            let deadline = Instant::now() + Duration::from_secs(30);
            for finished in 0..50 {
                let remaining = deadline.saturating_duration_since(Instant::now());
                assert!(
                    done_rx.recv_timeout(remaining).is_ok(),
                    "only {finished} of 50 clients finished with {strategy}"
                );
            }

            let snap = pool.snapshot();
            assert!(snap.is_idle(), "pool not drained: {snap:?}");
        }
    }

    #[test]
    fn test_permits_drain_under_contention() {
        for strategy in STRATEGIES {
            let pool = pool(3, &[("A", 2), ("B", 2), ("C", 1)], strategy);
            let categories = ["A", "B", "C"];

            thread::scope(|s| {
                for client in 0..30 {
                    let pool = &pool;
                    s.spawn(move || {
                        let _permit = pool.acquire_permit(categories[client % 3]).unwrap();
                        assert!(pool.snapshot().check_invariants().is_empty());
                        thread::yield_now();
                    });
                }
            });

            assert!(pool.snapshot().is_idle());
        }
    }

    #[derive(Debug, Clone)]
    enum Op {
        Acquire(usize),
        Release(usize),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0usize..3).prop_map(Op::Acquire),
            (0usize..3).prop_map(Op::Release),
        ]
    }

    proptest! {
        #[test]
        fn prop_counters_track_model(ops in proptest::collection::vec(op(), 0..64)) {
            let names = ["A", "B", "C"];
            let caps = [1usize, 2, 3];
            let total = 4;
            let pool = pool(total, &[("A", 1), ("B", 2), ("C", 3)], WakeStrategy::Semaphore);
            let mut held = [0usize; 3];

            for op in ops {
                match op {
                    Op::Acquire(c) => {
                        let expect = held.iter().sum::<usize>() < total && held[c] < caps[c];
                        prop_assert_eq!(pool.try_acquire(names[c]).unwrap(), expect);
                        if expect {
                            held[c] += 1;
                        }
                    }
                    Op::Release(c) if held[c] > 0 => {
                        pool.release(names[c]).unwrap();
                        held[c] -= 1;
                    }
                    Op::Release(_) => {}
                }

                let snap = pool.snapshot();
                prop_assert!(snap.check_invariants().is_empty());
                prop_assert_eq!(snap.used_total, held.iter().sum::<usize>());
                for (c, name) in names.iter().enumerate() {
                    prop_assert_eq!(snap.usage(name).unwrap().used, held[c]);
                }
            }
        }
    }
}
