pub mod descent;
pub mod greedy;
pub mod random;
pub mod taboo;

use std::time::Instant;

use crate::encoding::ResourceOrder;
use crate::instance::Instance;
use crate::schedule::Schedule;

/// Why a solver handed back its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCause {
    /// The search ran out of moves to try.
    Converged,
    /// The deadline elapsed; the result is the best found so far.
    Timeout,
}

/// Outcome of a solver run: the winning encoding, its schedule, and how the
/// run ended. Callers read the schedule; nothing here is mutated afterwards.
#[derive(Debug, Clone)]
pub struct SolverResult {
    pub order: ResourceOrder,
    pub schedule: Schedule,
    pub exit: ExitCause,
}

/// A solving strategy. The deadline is wall-clock; solvers check it once per
/// outer iteration, so a run can overshoot by at most one neighborhood
/// evaluation.
pub trait Solver {
    fn solve(&self, instance: &Instance, deadline: Instant) -> SolverResult;
}
