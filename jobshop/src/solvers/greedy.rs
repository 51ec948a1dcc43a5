use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use crate::encoding::ResourceOrder;
use crate::instance::{Instance, Operation};
use crate::schedule;
use crate::solvers::{ExitCause, Solver, SolverResult};

/// Selection key among ready operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseRule {
    /// Shortest processing time first.
    ShortestProcessing,
    /// Longest processing time first.
    LongestProcessing,
    /// Smallest total remaining work of the owning job first.
    ShortestRemaining,
    /// Largest total remaining work of the owning job first.
    LongestRemaining,
}

impl BaseRule {
    /// Selection score of a ready operation; the dispatcher keeps the
    /// highest score, first-encountered on ties.
    fn score(self, instance: &Instance, remaining: &[u32], op: Operation) -> i64 {
        match self {
            BaseRule::ShortestProcessing => -i64::from(instance.duration_of(op)),
            BaseRule::LongestProcessing => i64::from(instance.duration_of(op)),
            BaseRule::ShortestRemaining => -i64::from(remaining[op.job]),
            BaseRule::LongestRemaining => i64::from(remaining[op.job]),
        }
    }
}

/// A dispatch priority: a base rule, optionally gated to the ready
/// operations that can start earliest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Priority {
    pub base: BaseRule,
    pub est_gated: bool,
}

impl Priority {
    pub const SPT: Priority = Priority { base: BaseRule::ShortestProcessing, est_gated: false };
    pub const LPT: Priority = Priority { base: BaseRule::LongestProcessing, est_gated: false };
    pub const SRPT: Priority = Priority { base: BaseRule::ShortestRemaining, est_gated: false };
    pub const LRPT: Priority = Priority { base: BaseRule::LongestRemaining, est_gated: false };
    pub const EST_SPT: Priority = Priority { base: BaseRule::ShortestProcessing, est_gated: true };
    pub const EST_LPT: Priority = Priority { base: BaseRule::LongestProcessing, est_gated: true };
    pub const EST_SRPT: Priority = Priority { base: BaseRule::ShortestRemaining, est_gated: true };
    pub const EST_LRPT: Priority = Priority { base: BaseRule::LongestRemaining, est_gated: true };
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsePriorityError(String);

impl fmt::Display for ParsePriorityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown priority rule '{}'", self.0)
    }
}

impl std::error::Error for ParsePriorityError {}

impl FromStr for Priority {
    type Err = ParsePriorityError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.to_ascii_lowercase().as_str() {
            "spt" => Ok(Priority::SPT),
            "lpt" => Ok(Priority::LPT),
            "srpt" => Ok(Priority::SRPT),
            "lrpt" => Ok(Priority::LRPT),
            "est_spt" => Ok(Priority::EST_SPT),
            "est_lpt" => Ok(Priority::EST_LPT),
            "est_srpt" => Ok(Priority::EST_SRPT),
            "est_lrpt" => Ok(Priority::EST_LRPT),
            _ => Err(ParsePriorityError(name.to_owned())),
        }
    }
}

/// Builds an initial encoding by repeatedly dispatching one ready operation
/// according to the priority rule.
///
/// An operation becomes ready once its job predecessor has been placed.
/// Job-finish and machine-release times advance only when an operation is
/// actually placed, so earliest-start gating sees the true decided prefix.
pub fn construct(instance: &Instance, priority: Priority) -> ResourceOrder {
    let mut order = ResourceOrder::new(instance);

    let mut job_ready = vec![0u32; instance.num_jobs()];
    let mut machine_ready = vec![0u32; instance.num_machines()];
    let mut remaining: Vec<u32> = (0..instance.num_jobs())
        .map(|job| (0..instance.num_steps()).map(|step| instance.duration(job, step)).sum())
        .collect();
    let mut ready: Vec<Operation> =
        (0..instance.num_jobs()).map(|job| Operation::new(job, 0)).collect();

    while !ready.is_empty() {
        let chosen = select(instance, priority, &ready, &job_ready, &machine_ready, &remaining);
        // Plain remove keeps the ready list in first-encountered order,
        // which is the documented tie-break.
        let op = ready.remove(chosen);
        let machine = instance.machine_of(op);
        order.push(machine, op);

        let start = job_ready[op.job].max(machine_ready[machine]);
        let end = start + instance.duration_of(op);
        job_ready[op.job] = end;
        machine_ready[machine] = end;
        remaining[op.job] -= instance.duration_of(op);

        if op.step + 1 < instance.num_steps() {
            ready.push(Operation::new(op.job, op.step + 1));
        }
    }
    order
}

fn select(
    instance: &Instance,
    priority: Priority,
    ready: &[Operation],
    job_ready: &[u32],
    machine_ready: &[u32],
    remaining: &[u32],
) -> usize {
    let earliest_start =
        |op: Operation| job_ready[op.job].max(machine_ready[instance.machine_of(op)]);

    let gate = if priority.est_gated {
        ready.iter().map(|op| earliest_start(*op)).min().expect("ready set is non-empty")
    } else {
        u32::MAX
    };

    let mut best = None;
    for (index, op) in ready.iter().enumerate() {
        if priority.est_gated && earliest_start(*op) > gate {
            continue;
        }
        let score = priority.base.score(instance, remaining, *op);
        if best.map_or(true, |(_, best_score)| score > best_score) {
            best = Some((index, score));
        }
    }
    best.expect("ready set is non-empty").0
}

/// Priority-rule construction as a solver: one bounded dispatch pass, no
/// internal deadline checks.
#[derive(Debug, Clone, Copy)]
pub struct GreedySolver {
    priority: Priority,
}

impl GreedySolver {
    pub fn new(priority: Priority) -> Self {
        GreedySolver { priority }
    }
}

impl Solver for GreedySolver {
    fn solve(&self, instance: &Instance, deadline: Instant) -> SolverResult {
        let order = construct(instance, self.priority);
        let schedule =
            schedule::simulate(instance, &order).expect("dispatch order respects job precedence");
        let exit =
            if Instant::now() > deadline { ExitCause::Timeout } else { ExitCause::Converged };
        SolverResult { order, schedule, exit }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const ALL_PRIORITIES: [Priority; 8] = [
        Priority::SPT,
        Priority::LPT,
        Priority::SRPT,
        Priority::LRPT,
        Priority::EST_SPT,
        Priority::EST_LPT,
        Priority::EST_SRPT,
        Priority::EST_LRPT,
    ];

    fn instance() -> Instance {
        Instance::from_parts(
            vec![vec![3, 2, 2], vec![2, 1, 4], vec![4, 3, 3]],
            vec![vec![0, 1, 2], vec![0, 2, 1], vec![1, 2, 0]],
            12,
        )
    }

    #[test]
    fn construction_yields_valid_feasible_encodings() {
        let instance = instance();
        for priority in ALL_PRIORITIES {
            let order = construct(&instance, priority);
            assert!(order.is_valid(&instance), "{:?} broke the encoding invariant", priority);
            assert!(
                schedule::simulate(&instance, &order).is_ok(),
                "{:?} produced a cyclic encoding",
                priority
            );
        }
    }

    #[test]
    fn construction_is_deterministic() {
        let instance = instance();
        for priority in ALL_PRIORITIES {
            assert_eq!(construct(&instance, priority), construct(&instance, priority));
        }
    }

    #[test]
    fn spt_dispatches_shortest_ready_operation_first() {
        // job 0 starts with a 3 on machine 0, job 1 with a 2 on machine 1;
        // SPT must place (1,0) before (0,0) is even considered on its machine.
        let instance =
            Instance::from_parts(vec![vec![3, 2], vec![2, 3]], vec![vec![0, 1], vec![1, 0]], 6);
        let order = construct(&instance, Priority::SPT);
        assert_eq!(Operation::new(1, 0), order.machine(1)[0]);
    }

    #[test]
    fn est_gating_restricts_to_earliest_starters() {
        let instance = Instance::from_parts(
            vec![vec![1, 5], vec![4, 4]],
            vec![vec![0, 1], vec![1, 0]],
            0,
        );
        // First round: both first steps start at 0, LPT places (1,0).
        // Second round: (0,0) starts at 0 while (1,1) cannot start before 4,
        // so the gate forces (0,0) even though (1,1) is longer.
        // Last rounds: (0,1) and (1,1) both gate at 4, LPT picks (0,1).
        let order = construct(&instance, Priority::EST_LPT);
        assert!(order.is_valid(&instance));
        assert_eq!(Operation::new(0, 0), order.machine(0)[0]);
        assert_eq!(Operation::new(0, 1), order.machine(1)[1]);
    }

    #[test]
    fn expired_deadline_reports_timeout_with_constructed_schedule() {
        let instance = instance();
        let solver = GreedySolver::new(Priority::EST_SPT);
        let result = solver.solve(&instance, Instant::now() - Duration::from_millis(1));

        assert_eq!(ExitCause::Timeout, result.exit);
        assert!(result.order.is_valid(&instance));
    }
}
