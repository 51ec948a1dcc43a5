use hashbrown::HashMap;
use itertools::Itertools;

use crate::encoding::{ResourceOrder, Swap};
use crate::instance::{Instance, Operation};
use crate::schedule::Schedule;

/// A maximal run of critical-path operations sharing one machine, at
/// consecutive positions `first..=last` of that machine's sequence.
///
/// Consider the encoding
///
/// ```text
/// machine 0 : (0,1) (1,2) (2,2)
/// machine 1 : (0,2) (2,1) (1,1)
/// ```
///
/// The block `{ machine: 1, first: 0, last: 1 }` covers `(0,2) (2,1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    pub machine: usize,
    pub first: usize,
    pub last: usize,
}

/// Splits a critical path into its blocks, in traversal order.
///
/// Runs of a single operation are not blocks; only runs spanning two or
/// more positions can yield improving swaps.
pub fn blocks_of_critical_path(
    instance: &Instance,
    order: &ResourceOrder,
    path: &[Operation],
) -> Vec<Block> {
    let mut positions: HashMap<Operation, usize> =
        HashMap::with_capacity(instance.num_operations());
    for seq in order.machines() {
        for (position, op) in seq.iter().enumerate() {
            positions.insert(*op, position);
        }
    }

    let runs = path.iter().chunk_by(|op| instance.machine_of(**op));
    let mut blocks = Vec::new();
    for (machine, run) in &runs {
        // Consecutive critical-path operations on one machine sit at
        // consecutive sequence positions.
        let run: Vec<usize> = run.map(|op| positions[op]).collect();
        let (first, last) = (run[0], run[run.len() - 1]);
        if last > first {
            blocks.push(Block { machine, first, last });
        }
    }
    blocks
}

/// The restricted Nowicki–Smutnicki moves of a block: the single swap of a
/// 2-block, or the first and last adjacent pairs of a longer block. Interior
/// adjacent pairs are deliberately skipped.
pub fn neighbors(block: &Block) -> Vec<Swap> {
    if block.last - block.first == 1 {
        vec![Swap::new(block.machine, block.first, block.last)]
    } else {
        vec![
            Swap::new(block.machine, block.first, block.first + 1),
            Swap::new(block.machine, block.last - 1, block.last),
        ]
    }
}

/// All candidate swaps reachable from a schedule's critical path.
pub fn candidate_swaps(
    instance: &Instance,
    order: &ResourceOrder,
    schedule: &Schedule,
) -> Vec<Swap> {
    let path = schedule.critical_path(instance, order);
    blocks_of_critical_path(instance, order, &path)
        .iter()
        .flat_map(neighbors)
        .collect()
}
