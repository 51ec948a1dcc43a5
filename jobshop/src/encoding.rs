use itertools::Itertools;

use crate::instance::{Instance, Operation};

/// Resource-order encoding of a candidate solution: for every machine, the
/// order in which it processes its operations.
///
/// A complete encoding partitions the full operation set over the machine
/// sequences, each sequence holding exactly the operations placed on that
/// machine. Search moves never mutate a shared encoding; callers clone
/// before applying a [`Swap`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceOrder {
    sequences: Vec<Vec<Operation>>,
}

impl ResourceOrder {
    /// An empty encoding with one sequence per machine.
    pub fn new(instance: &Instance) -> Self {
        ResourceOrder {
            sequences: (0..instance.num_machines())
                .map(|_| Vec::with_capacity(instance.num_jobs()))
                .collect(),
        }
    }

    /// Appends an operation at the end of a machine's sequence.
    pub fn push(&mut self, machine: usize, op: Operation) {
        self.sequences[machine].push(op);
    }

    pub fn machine(&self, machine: usize) -> &[Operation] {
        &self.sequences[machine]
    }

    pub fn machines(&self) -> impl Iterator<Item = &[Operation]> {
        self.sequences.iter().map(|seq| seq.as_slice())
    }

    pub fn num_machines(&self) -> usize {
        self.sequences.len()
    }

    pub fn position_of(&self, machine: usize, op: Operation) -> Option<usize> {
        self.sequences[machine].iter().position(|other| *other == op)
    }

    /// Checks the permutation-partition invariant: every sequence holds
    /// exactly the operations assigned to its machine, each exactly once.
    pub fn is_valid(&self, instance: &Instance) -> bool {
        self.sequences.len() == instance.num_machines()
            && self.sequences.iter().enumerate().all(|(machine, seq)| {
                seq.len() == instance.num_jobs()
                    && seq.iter().all(|op| instance.machine_of(*op) == machine)
                    && seq.iter().all_unique()
            })
    }

    pub(crate) fn swap(&mut self, machine: usize, t1: usize, t2: usize) {
        self.sequences[machine].swap(t1, t2);
    }
}

/// Exchange of two positions within one machine's sequence.
///
/// Consider the encoding
///
/// ```text
/// machine 0 : (0,1) (1,2) (2,2)
/// machine 1 : (0,2) (2,1) (1,1)
/// ```
///
/// The swap `{ machine: 1, t1: 0, t2: 1 }` exchanges `(0,2)` and `(2,1)`.
/// A swap is its own inverse: applying it twice restores the encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Swap {
    pub machine: usize,
    pub t1: usize,
    pub t2: usize,
}

impl Swap {
    pub fn new(machine: usize, t1: usize, t2: usize) -> Self {
        Swap { machine, t1, t2 }
    }

    /// Applies the swap in place. The encoding must be exclusively owned by
    /// the caller (clone-before-mutate).
    pub fn apply_on(&self, order: &mut ResourceOrder) {
        order.swap(self.machine, self.t1, self.t2);
    }

    /// The operations currently sitting at the swap's two positions.
    pub fn operations(&self, order: &ResourceOrder) -> (Operation, Operation) {
        let seq = order.machine(self.machine);
        (seq[self.t1], seq[self.t2])
    }
}
