//! Integration tests for the simulation driver

#[cfg(test)]
mod tests {
    use poolgate_driver::*;
    use poolgate_errors::{Error, PoolError};
    use poolgate_resources::{PoolConfig, ResourcePool, WakeStrategy};
    use std::time::Duration;

    fn pool(strategy: WakeStrategy) -> ResourcePool {
        let config = PoolConfig::new(2, [("A", 1), ("B", 2)]).unwrap();
        ResourcePool::new(config, strategy)
    }

    #[test]
    fn test_random_clients_all_complete_and_drain() {
        for strategy in [WakeStrategy::Condvar, WakeStrategy::Semaphore] {
            let pool = pool(strategy);
            let categories = pool.config().category_ids();
            let report = Simulation::new(&pool, 50)
                .with_selector(RandomSelector::new(categories, Some(7)).unwrap())
                .with_occupancy(
                    RandomOccupancy::new(Duration::ZERO, Duration::from_millis(3), Some(7))
                        .unwrap(),
                )
                .run()
                .unwrap();

            assert_eq!(report.outcomes.len(), 50);
            assert_eq!(report.strategy, strategy);
            assert!(report.peak_total <= 2);
            assert!(report.is_drained());
            assert_eq!(report.per_category().values().sum::<usize>(), 50);
        }
    }

    #[test]
    fn test_fixed_sequence_is_deterministic() {
        let pool = pool(WakeStrategy::Semaphore);
        let mut simulation = Simulation::new(&pool, 5)
            .with_selector(FixedSequence::new(["A", "A", "B"]).unwrap())
            .with_occupancy(FixedOccupancy(Duration::from_millis(1)));

        let plan = simulation.plan();
        let categories: Vec<&str> = plan.iter().map(|spec| spec.category.as_str()).collect();
        assert_eq!(categories, ["A", "A", "B", "A", "A"]);
        assert!(plan.iter().all(|spec| spec.hold == Duration::from_millis(1)));

        let report = simulation.run_plan(plan).unwrap();
        assert_eq!(report.per_category().get("A"), Some(&4));
        assert_eq!(report.per_category().get("B"), Some(&1));
        assert!(report.outcomes.iter().all(|outcome| outcome.held_ms == 1));
        assert!(report.is_drained());
    }

    #[test]
    fn test_default_simulation_round_robins_pool_categories() {
        let pool = pool(WakeStrategy::Condvar);
        let mut simulation = Simulation::new(&pool, 4);
        let plan = simulation.plan();
        let categories: Vec<&str> = plan.iter().map(|spec| spec.category.as_str()).collect();
        assert_eq!(categories, ["A", "B", "A", "B"]);
        assert!(plan.iter().all(|spec| spec.hold.is_zero()));
    }

    #[test]
    fn test_unknown_category_surfaces_pool_error() {
        let pool = pool(WakeStrategy::Condvar);
        let result = Simulation::new(&pool, 3)
            .with_selector(FixedSequence::new(["A", "Z"]).unwrap())
            .run();

        assert!(matches!(
            result,
            Err(Error::Pool(PoolError::InvalidCategory { ref category })) if category == "Z"
        ));
        assert!(pool.snapshot().is_idle());
    }

    #[test]
    fn test_report_serializes_to_json() {
        let pool = pool(WakeStrategy::Condvar);
        let report = Simulation::new(&pool, 2).run().unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["strategy"], "condvar");
        assert_eq!(json["outcomes"].as_array().unwrap().len(), 2);
        assert_eq!(json["final_snapshot"]["used_total"], 0);
    }
}
