use std::collections::VecDeque;
use std::fmt;

use crate::encoding::ResourceOrder;
use crate::instance::{Instance, Operation};

/// The encoding's combined precedence graph contains a cycle, so no start
/// times exist for it. A frequent, normal outcome while exploring swaps;
/// search simply discards the candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cyclic;

impl fmt::Display for Cyclic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "resource order induces a cyclic precedence graph")
    }
}

impl std::error::Error for Cyclic {}

/// Concrete start times derived from simulating one encoding snapshot.
/// Read-only once built; a changed encoding is re-simulated from scratch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    start_times: Vec<u32>,
    num_steps: usize,
    makespan: u32,
}

impl Schedule {
    pub fn start_time(&self, job: usize, step: usize) -> u32 {
        self.start_times[job * self.num_steps + step]
    }

    pub fn start_of(&self, op: Operation) -> u32 {
        self.start_time(op.job, op.step)
    }

    pub fn end_of(&self, instance: &Instance, op: Operation) -> u32 {
        self.start_of(op) + instance.duration_of(op)
    }

    pub fn makespan(&self) -> u32 {
        self.makespan
    }

    /// The chain of operations whose finish-to-start dependencies realize
    /// the makespan.
    ///
    /// Walks back from the operation that finishes last, stepping to
    /// whichever predecessor finishes exactly when the current operation
    /// starts. When both the job and the machine predecessor qualify, the
    /// job predecessor wins, which makes the extracted path unique.
    pub fn critical_path(&self, instance: &Instance, order: &ResourceOrder) -> Vec<Operation> {
        let mut current = Operation::new(0, 0);
        let mut latest = 0;
        for op in instance.operations() {
            let end = self.end_of(instance, op);
            if end > latest {
                latest = end;
                current = op;
            }
        }

        let mut path = vec![current];
        loop {
            let start = self.start_of(current);
            let job_pred = current
                .job_predecessor()
                .filter(|pred| self.end_of(instance, *pred) == start);
            let machine_pred = || {
                let machine = instance.machine_of(current);
                let position = order.position_of(machine, current)?;
                let pred = *order.machine(machine).get(position.checked_sub(1)?)?;
                (self.end_of(instance, pred) == start).then_some(pred)
            };

            match job_pred.or_else(machine_pred) {
                Some(pred) => {
                    path.push(pred);
                    current = pred;
                }
                None => break,
            }
        }
        path.reverse();
        path
    }

    /// Renders the schedule per machine, operations in start-time order.
    pub fn pretty_print(&self, instance: &Instance) -> String {
        let mut out = String::new();
        for machine in 0..instance.num_machines() {
            let mut ops: Vec<Operation> = instance
                .operations()
                .filter(|op| instance.machine_of(*op) == machine)
                .collect();
            ops.sort_by_key(|op| self.start_of(*op));

            out.push_str(&format!("machine {:>2}:", machine));
            for op in ops {
                out.push_str(&format!(
                    " {}[{}..{}]",
                    op,
                    self.start_of(op),
                    self.end_of(instance, op)
                ));
            }
            out.push('\n');
        }
        out.push_str(&format!("makespan: {}\n", self.makespan));
        out
    }
}

/// Computes start times for an encoding, or reports it cyclic.
///
/// The disjunctive graph stays implicit: job edges link consecutive steps of
/// a job, machine edges link consecutive positions of each machine sequence.
/// A forward pass over a ready queue fills the start-time table; if the
/// queue drains before every operation is placed, the graph has a cycle.
pub fn simulate(instance: &Instance, order: &ResourceOrder) -> Result<Schedule, Cyclic> {
    let num_steps = instance.num_steps();
    let total = instance.num_operations();
    let index = |op: Operation| op.job * num_steps + op.step;

    let mut machine_pred: Vec<Option<Operation>> = vec![None; total];
    let mut machine_succ: Vec<Option<Operation>> = vec![None; total];
    for seq in order.machines() {
        for pair in seq.windows(2) {
            machine_pred[index(pair[1])] = Some(pair[0]);
            machine_succ[index(pair[0])] = Some(pair[1]);
        }
    }

    let mut pending: Vec<u8> = instance
        .operations()
        .map(|op| u8::from(op.step > 0) + u8::from(machine_pred[index(op)].is_some()))
        .collect();
    let mut queue: VecDeque<Operation> =
        instance.operations().filter(|op| pending[index(*op)] == 0).collect();

    let mut start_times = vec![0u32; total];
    let mut placed = 0usize;
    let mut makespan = 0u32;

    while let Some(op) = queue.pop_front() {
        let job_ready = op
            .job_predecessor()
            .map(|pred| start_times[index(pred)] + instance.duration_of(pred))
            .unwrap_or(0);
        let machine_ready = machine_pred[index(op)]
            .map(|pred| start_times[index(pred)] + instance.duration_of(pred))
            .unwrap_or(0);

        let start = job_ready.max(machine_ready);
        start_times[index(op)] = start;
        makespan = makespan.max(start + instance.duration_of(op));
        placed += 1;

        let job_succ = (op.step + 1 < num_steps).then(|| Operation::new(op.job, op.step + 1));
        for succ in job_succ.into_iter().chain(machine_succ[index(op)]) {
            pending[index(succ)] -= 1;
            if pending[index(succ)] == 0 {
                queue.push_back(succ);
            }
        }
    }

    if placed < total {
        return Err(Cyclic);
    }
    Ok(Schedule { start_times, num_steps, makespan })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_instance() -> Instance {
        // job 0: machine 0 for 3, then machine 1 for 2
        // job 1: machine 1 for 2, then machine 0 for 3
        Instance::from_parts(vec![vec![3, 2], vec![2, 3]], vec![vec![0, 1], vec![1, 0]], 6)
    }

    fn order_from(instance: &Instance, sequences: &[&[(usize, usize)]]) -> ResourceOrder {
        let mut order = ResourceOrder::new(instance);
        for (machine, seq) in sequences.iter().enumerate() {
            for (job, step) in seq.iter() {
                order.push(machine, Operation::new(*job, *step));
            }
        }
        order
    }

    #[test]
    fn computes_start_times_and_makespan() {
        let instance = tiny_instance();
        let order = order_from(&instance, &[&[(0, 0), (1, 1)], &[(1, 0), (0, 1)]]);

        let schedule = simulate(&instance, &order).unwrap();
        assert_eq!(0, schedule.start_time(0, 0));
        assert_eq!(3, schedule.start_time(0, 1));
        assert_eq!(0, schedule.start_time(1, 0));
        assert_eq!(3, schedule.start_time(1, 1));
        assert_eq!(6, schedule.makespan());
    }

    #[test]
    fn simulation_is_deterministic() {
        let instance = tiny_instance();
        let order = order_from(&instance, &[&[(0, 0), (1, 1)], &[(0, 1), (1, 0)]]);

        let first = simulate(&instance, &order).unwrap();
        let second = simulate(&instance, &order).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn detects_cyclic_encoding() {
        let instance = tiny_instance();
        // (1,1) before (0,0) on machine 0 and (0,1) before (1,0) on
        // machine 1 makes each job wait on the other.
        let order = order_from(&instance, &[&[(1, 1), (0, 0)], &[(0, 1), (1, 0)]]);

        assert_eq!(Err(Cyclic), simulate(&instance, &order));
    }

    #[test]
    fn critical_path_spans_makespan() {
        let instance = tiny_instance();
        let order = order_from(&instance, &[&[(0, 0), (1, 1)], &[(0, 1), (1, 0)]]);
        let schedule = simulate(&instance, &order).unwrap();

        let path = schedule.critical_path(&instance, &order);
        assert!(!path.is_empty());

        // Last element finishes at the makespan.
        let last = *path.last().unwrap();
        assert_eq!(schedule.makespan(), schedule.end_of(&instance, last));

        // First element has no tight predecessor.
        let first = path[0];
        let start = schedule.start_of(first);
        if let Some(pred) = first.job_predecessor() {
            assert_ne!(schedule.end_of(&instance, pred), start);
        }
        let machine = instance.machine_of(first);
        let position = order.position_of(machine, first).unwrap();
        if position > 0 {
            let pred = order.machine(machine)[position - 1];
            assert_ne!(schedule.end_of(&instance, pred), start);
        }

        // Consecutive path operations chain tightly.
        for pair in path.windows(2) {
            assert_eq!(schedule.end_of(&instance, pair[0]), schedule.start_of(pair[1]));
        }
    }

    #[test]
    fn critical_path_follows_tight_machine_predecessor() {
        let instance = tiny_instance();
        let order = order_from(&instance, &[&[(0, 0), (1, 1)], &[(1, 0), (0, 1)]]);
        let schedule = simulate(&instance, &order).unwrap();

        // (1,1) starts at 3; its job predecessor (1,0) finishes at 2 while
        // its machine predecessor (0,0) finishes at 3, so the path ending at
        // (1,1) runs through machine 0.
        let path = schedule.critical_path(&instance, &order);
        assert_eq!(vec![Operation::new(0, 0), Operation::new(1, 1)], path);
    }

    #[test]
    fn critical_path_prefers_job_predecessor_on_ties() {
        // Equal durations make both predecessors of (0,1) finish at 2.
        let instance =
            Instance::from_parts(vec![vec![2, 2], vec![2, 2]], vec![vec![0, 1], vec![1, 0]], 4);
        let order = order_from(&instance, &[&[(0, 0), (1, 1)], &[(1, 0), (0, 1)]]);
        let schedule = simulate(&instance, &order).unwrap();

        let path = schedule.critical_path(&instance, &order);
        assert_eq!(vec![Operation::new(0, 0), Operation::new(0, 1)], path);
    }
}
