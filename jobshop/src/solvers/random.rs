use std::time::Instant;

use rand::Rng;

use crate::encoding::ResourceOrder;
use crate::instance::{Instance, Operation};
use crate::schedule;
use crate::solvers::greedy::{self, Priority};
use crate::solvers::{ExitCause, Solver, SolverResult};

/// Random-restart baseline: repeatedly dispatches ready operations in
/// uniformly random order, keeping the best schedule until the deadline.
/// Seeds its incumbent with a greedy construction so it never reports worse
/// than the priority rule it starts from.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomSolver;

impl Solver for RandomSolver {
    fn solve(&self, instance: &Instance, deadline: Instant) -> SolverResult {
        let mut rng = rand::thread_rng();

        let mut best = greedy::construct(instance, Priority::EST_SPT);
        let mut best_schedule =
            schedule::simulate(instance, &best).expect("dispatch order respects job precedence");

        while Instant::now() <= deadline {
            let order = random_dispatch(instance, &mut rng);
            let sched = schedule::simulate(instance, &order)
                .expect("dispatch order respects job precedence");
            if sched.makespan() < best_schedule.makespan() {
                best = order;
                best_schedule = sched;
            }
        }

        SolverResult { order: best, schedule: best_schedule, exit: ExitCause::Timeout }
    }
}

/// One dispatch pass picking a uniformly random ready operation each round;
/// always yields an acyclic encoding.
fn random_dispatch<R: Rng>(instance: &Instance, rng: &mut R) -> ResourceOrder {
    let mut order = ResourceOrder::new(instance);
    let mut ready: Vec<Operation> =
        (0..instance.num_jobs()).map(|job| Operation::new(job, 0)).collect();

    while !ready.is_empty() {
        let op = ready.swap_remove(rng.gen_range(0..ready.len()));
        order.push(instance.machine_of(op), op);
        if op.step + 1 < instance.num_steps() {
            ready.push(Operation::new(op.job, op.step + 1));
        }
    }
    order
}
