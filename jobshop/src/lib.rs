pub mod encoding;
pub mod instance;
pub mod neighborhood;
pub mod schedule;
pub mod solvers;

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use crate::encoding::ResourceOrder;
    use crate::instance::{Instance, Operation};
    use crate::schedule;
    use crate::solvers::descent::DescentSolver;
    use crate::solvers::greedy::{GreedySolver, Priority};
    use crate::solvers::taboo::TabooSolver;
    use crate::solvers::{ExitCause, Solver};

    fn tiny_instance() -> Instance {
        // job 0: machine 0 for 3, machine 1 for 2
        // job 1: machine 1 for 2, machine 0 for 3
        Instance::from_reader(
            r"2
2
6
3 2
2 3
1 2
2 1"
                .as_bytes(),
        )
        .unwrap()
    }

    // Lawrence's la01 benchmark; 666 is its proven optimal makespan.
    fn big_instance() -> Instance {
        Instance::from_reader(
            r"10
5
666
21 53 95 55 34
21 52 16 26 71
39 98 42 31 12
77 55 79 66 77
83 34 64 19 37
54 43 79 92 62
69 77 87 87 93
38 60 41 24 83
17 49 25 44 98
77 79 43 75 96
2 1 5 4 3
1 4 5 3 2
4 5 2 3 1
2 1 5 3 4
1 4 3 2 5
2 3 5 1 4
4 5 2 3 1
3 1 2 4 5
4 2 5 1 3
5 4 3 2 1"
                .as_bytes(),
        )
        .unwrap()
    }

    /// Best feasible makespan over every complete encoding, by brute force.
    /// Only workable for the 2x2 fixture (four encodings).
    fn exhaustive_optimum(instance: &Instance) -> u32 {
        fn orderings(mut pool: Vec<Operation>) -> Vec<Vec<Operation>> {
            if pool.is_empty() {
                return vec![Vec::new()];
            }
            let mut result = Vec::new();
            for index in 0..pool.len() {
                let op = pool.remove(index);
                for mut rest in orderings(pool.clone()) {
                    rest.insert(0, op);
                    result.push(rest);
                }
                pool.insert(index, op);
            }
            result
        }

        let per_machine: Vec<Vec<Vec<Operation>>> = (0..instance.num_machines())
            .map(|machine| {
                orderings(
                    instance
                        .operations()
                        .filter(|op| instance.machine_of(*op) == machine)
                        .collect(),
                )
            })
            .collect();

        let mut assignments: Vec<Vec<Vec<Operation>>> = vec![Vec::new()];
        for machine_orderings in &per_machine {
            let mut extended = Vec::new();
            for assignment in &assignments {
                for ordering in machine_orderings {
                    let mut assignment: Vec<Vec<Operation>> = assignment.clone();
                    assignment.push(ordering.clone());
                    extended.push(assignment);
                }
            }
            assignments = extended;
        }

        assignments
            .iter()
            .filter_map(|sequences| {
                let mut order = ResourceOrder::new(instance);
                for (machine, seq) in sequences.iter().enumerate() {
                    for op in seq {
                        order.push(machine, *op);
                    }
                }
                schedule::simulate(instance, &order).ok()
            })
            .map(|sched| sched.makespan())
            .min()
            .expect("at least one encoding is feasible")
    }

    #[test]
    fn spt_reaches_the_exhaustive_optimum_on_the_tiny_instance() {
        let instance = tiny_instance();
        let optimum = exhaustive_optimum(&instance);

        let result = GreedySolver::new(Priority::SPT)
            .solve(&instance, Instant::now() + Duration::from_secs(5));
        assert!(result.order.is_valid(&instance));
        assert_eq!(optimum, result.schedule.makespan());
        assert_eq!(instance.optimal(), optimum);
    }

    #[test]
    fn descent_reaches_the_optimum_from_any_feasible_start() {
        let instance = tiny_instance();
        let optimum = exhaustive_optimum(&instance);

        let result =
            DescentSolver::default().solve(&instance, Instant::now() + Duration::from_secs(5));
        assert_eq!(ExitCause::Converged, result.exit);
        assert_eq!(optimum, result.schedule.makespan());
    }

    #[test]
    fn solvers_hold_the_encoding_invariant_on_a_real_instance() {
        let instance = big_instance();
        let deadline = Instant::now() + Duration::from_secs(10);

        let greedy = GreedySolver::new(Priority::EST_SPT).solve(&instance, deadline);
        let descent = DescentSolver::default().solve(&instance, deadline);
        let taboo = TabooSolver::new(500, 7).solve(&instance, deadline);

        for result in [&greedy, &descent, &taboo] {
            assert!(result.order.is_valid(&instance));
        }
        assert!(descent.schedule.makespan() <= greedy.schedule.makespan());
        assert!(taboo.schedule.makespan() <= greedy.schedule.makespan());
        // Nothing beats the recorded optimum.
        assert!(taboo.schedule.makespan() >= instance.optimal());
        assert!(descent.schedule.makespan() >= instance.optimal());
    }

    #[test]
    fn past_deadline_returns_timeout_for_every_solver() {
        let instance = big_instance();
        let deadline = Instant::now() - Duration::from_millis(1);
        let baseline = GreedySolver::new(Priority::EST_SPT)
            .solve(&instance, Instant::now() + Duration::from_secs(5))
            .schedule;

        let solvers: [&dyn Solver; 3] = [
            &GreedySolver::new(Priority::EST_SPT),
            &DescentSolver::default(),
            &TabooSolver::new(10_000, 7),
        ];
        for solver in solvers {
            let result = solver.solve(&instance, deadline);
            assert_eq!(ExitCause::Timeout, result.exit);
            assert!(result.schedule.makespan() <= baseline.makespan());
        }
    }
}
