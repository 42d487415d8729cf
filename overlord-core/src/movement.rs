//! Reachability under movement budgets and terrain costs

use crate::board::{movement_cost, Board};
use crate::hex::Hex;
use crate::units::Unit;
use rustc_hash::FxHashSet;
use std::collections::VecDeque;

/// Hexes `unit` can reach from `origin` this activation.
///
/// Breadth-first expansion where each frontier node carries its remaining
/// movement points. A hex is recorded the first time it is discovered.
/// Occupied hexes are never entered or passed through. The origin is never
/// part of the result.
pub fn reachable(board: &Board, origin: Hex, unit: &Unit) -> FxHashSet<Hex> {
    let mut reached = FxHashSet::default();
    let budget = unit.unit_type.movement();
    if budget == 0 {
        return reached;
    }

    let mut visited = FxHashSet::default();
    visited.insert(origin);
    let mut frontier = VecDeque::new();
    frontier.push_back((origin, budget));

    while let Some((hex, remaining)) = frontier.pop_front() {
        for next in hex.neighbors() {
            if visited.contains(&next) {
                continue;
            }
            let Some(cell) = board.cell(next) else {
                continue;
            };
            if cell.unit.is_some() {
                continue;
            }
            let Some(cost) = movement_cost(cell.terrain, unit.unit_type) else {
                continue;
            };
            if cost > remaining {
                continue;
            }

            visited.insert(next);
            reached.insert(next);

            let left = remaining - cost;
            if left > 0 {
                frontier.push_back((next, left));
            }
        }
    }

    reached
}

/// Legacy reachability: every empty hex within the movement budget by
/// straight distance, ignoring terrain.
pub fn reachable_basic(board: &Board, origin: Hex, unit: &Unit) -> FxHashSet<Hex> {
    let budget = unit.unit_type.movement() as u32;
    if budget == 0 {
        return FxHashSet::default();
    }

    board
        .cells()
        .filter(|cell| cell.unit.is_none())
        .map(|cell| cell.hex)
        .filter(|&hex| {
            let dist = origin.distance_to(hex);
            dist > 0 && dist <= budget
        })
        .collect()
}
