use std::time::Instant;

use crate::encoding::ResourceOrder;
use crate::instance::Instance;
use crate::neighborhood;
use crate::schedule::{self, Schedule};
use crate::solvers::greedy::{self, Priority};
use crate::solvers::{ExitCause, Solver, SolverResult};

/// Steepest-descent local search over the block-swap neighborhood.
///
/// Every iteration evaluates the complete candidate set of the current
/// critical path and adopts the best strictly improving feasible candidate;
/// the search stops when no candidate improves the makespan.
#[derive(Debug, Clone, Copy)]
pub struct DescentSolver {
    priority: Priority,
}

impl DescentSolver {
    pub fn new(priority: Priority) -> Self {
        DescentSolver { priority }
    }
}

impl Default for DescentSolver {
    fn default() -> Self {
        DescentSolver::new(Priority::EST_SPT)
    }
}

impl Solver for DescentSolver {
    fn solve(&self, instance: &Instance, deadline: Instant) -> SolverResult {
        let mut current = greedy::construct(instance, self.priority);
        let mut current_schedule =
            schedule::simulate(instance, &current).expect("dispatch order respects job precedence");

        loop {
            if Instant::now() > deadline {
                return SolverResult {
                    order: current,
                    schedule: current_schedule,
                    exit: ExitCause::Timeout,
                };
            }

            match improving_step(instance, &current, &current_schedule) {
                Some((order, sched)) => {
                    current = order;
                    current_schedule = sched;
                }
                None => {
                    return SolverResult {
                        order: current,
                        schedule: current_schedule,
                        exit: ExitCause::Converged,
                    };
                }
            }
        }
    }
}

/// Evaluates every candidate swap against a private copy of the encoding
/// and returns the best strict improvement, if any. Cyclic candidates are
/// discarded.
fn improving_step(
    instance: &Instance,
    current: &ResourceOrder,
    current_schedule: &Schedule,
) -> Option<(ResourceOrder, Schedule)> {
    let mut best: Option<(ResourceOrder, Schedule)> = None;

    for swap in neighborhood::candidate_swaps(instance, current, current_schedule) {
        let mut candidate = current.clone();
        swap.apply_on(&mut candidate);

        let Ok(sched) = schedule::simulate(instance, &candidate) else {
            continue;
        };

        let bound = best
            .as_ref()
            .map_or(current_schedule.makespan(), |(_, best_sched)| best_sched.makespan());
        if sched.makespan() < bound {
            best = Some((candidate, sched));
        }
    }
    best
}
