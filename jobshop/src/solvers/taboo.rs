use std::time::Instant;

use hashbrown::HashMap;

use crate::encoding::{ResourceOrder, Swap};
use crate::instance::{Instance, Operation};
use crate::neighborhood;
use crate::schedule::{self, Schedule};
use crate::solvers::greedy::{self, Priority};
use crate::solvers::{ExitCause, Solver, SolverResult};

/// Recency memory: an ordered operation pair mapped to the iteration until
/// which re-playing that pair is forbidden. Sparse; one per run.
type TabuMemory = HashMap<(Operation, Operation), usize>;

fn is_forbidden(memory: &TabuMemory, iteration: usize, pair: (Operation, Operation)) -> bool {
    memory.get(&pair).is_some_and(|expiry| iteration < *expiry)
}

/// Tabu search over the block-swap neighborhood.
///
/// Accepts the best feasible non-forbidden candidate each iteration even
/// when it worsens the current solution; recently undone moves are forbidden
/// for `tenure` iterations, overridable when a forbidden move beats the best
/// makespan of the whole run (aspiration). The final answer is the running
/// best, not the last accepted solution.
///
/// Running out of admissible moves and exhausting `max_iterations` both end
/// the run as [`ExitCause::Converged`]; [`ExitCause::Timeout`] is reserved
/// for the wall-clock deadline.
#[derive(Debug, Clone, Copy)]
pub struct TabooSolver {
    priority: Priority,
    max_iterations: usize,
    tenure: usize,
}

impl TabooSolver {
    pub fn new(max_iterations: usize, tenure: usize) -> Self {
        TabooSolver { priority: Priority::EST_SPT, max_iterations, tenure }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }
}

impl Solver for TabooSolver {
    fn solve(&self, instance: &Instance, deadline: Instant) -> SolverResult {
        let mut current = greedy::construct(instance, self.priority);
        let mut current_schedule =
            schedule::simulate(instance, &current).expect("dispatch order respects job precedence");
        let mut best = current.clone();
        let mut best_schedule = current_schedule.clone();
        let mut memory = TabuMemory::new();

        for iteration in 0..self.max_iterations {
            if Instant::now() > deadline {
                return SolverResult {
                    order: best,
                    schedule: best_schedule,
                    exit: ExitCause::Timeout,
                };
            }

            let accepted = admissible_step(
                instance,
                &current,
                &current_schedule,
                &memory,
                iteration,
                best_schedule.makespan(),
            );
            let Some((swap, order, sched)) = accepted else {
                return SolverResult {
                    order: best,
                    schedule: best_schedule,
                    exit: ExitCause::Converged,
                };
            };

            // Undoing this move stays forbidden for `tenure` iterations.
            let (first, second) = swap.operations(&current);
            memory.insert((second, first), iteration + self.tenure);

            current = order;
            current_schedule = sched;
            if current_schedule.makespan() < best_schedule.makespan() {
                best = current.clone();
                best_schedule = current_schedule.clone();
            }
        }

        SolverResult { order: best, schedule: best_schedule, exit: ExitCause::Converged }
    }
}

/// Picks the move accepted at one iteration: the best feasible non-forbidden
/// candidate, or, when every candidate is forbidden, the best forbidden one
/// provided it strictly beats the best makespan of the whole run
/// (aspiration). `None` means the search is stuck.
fn admissible_step(
    instance: &Instance,
    current: &ResourceOrder,
    current_schedule: &Schedule,
    memory: &TabuMemory,
    iteration: usize,
    best_makespan: u32,
) -> Option<(Swap, ResourceOrder, Schedule)> {
    let mut allowed: Option<(Swap, ResourceOrder, Schedule)> = None;
    let mut forbidden: Option<(Swap, ResourceOrder, Schedule)> = None;

    for swap in neighborhood::candidate_swaps(instance, current, current_schedule) {
        let pair = swap.operations(current);
        let mut candidate = current.clone();
        swap.apply_on(&mut candidate);

        let Ok(sched) = schedule::simulate(instance, &candidate) else {
            continue;
        };

        let slot = if is_forbidden(memory, iteration, pair) {
            &mut forbidden
        } else {
            &mut allowed
        };
        if slot.as_ref().map_or(true, |(_, _, s)| sched.makespan() < s.makespan()) {
            *slot = Some((swap, candidate, sched));
        }
    }

    match allowed {
        Some(step) => Some(step),
        None => forbidden.filter(|(_, _, s)| s.makespan() < best_makespan),
    }
}
