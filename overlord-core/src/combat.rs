//! Dice combat
//!
//! The attacker rolls one die per point of strength. Each die at or above
//! the defender's hit threshold scores a hit, then defensive terrain cancels
//! hits. A defender reduced to zero strength is removed from the board.

use crate::board::{Board, Terrain};
use crate::error::BoardError;
use crate::hex::Hex;
use crate::rng::RandomSource;
use crate::units::Unit;
use serde::Serialize;

/// Dice thrown for one attack and the hits they scored
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AttackRoll {
    pub dice: Vec<u8>,
    pub hits: u8,
}

/// Roll an attack without touching the board
pub fn roll_attack<S: RandomSource + ?Sized>(
    attacker: &Unit,
    defender: &Unit,
    defender_terrain: Terrain,
    source: &mut S,
) -> AttackRoll {
    let threshold = defender.unit_type.hit_threshold();
    let dice: Vec<u8> = (0..attacker.strength).map(|_| source.roll_d6()).collect();
    let raw_hits = dice.iter().filter(|&&roll| roll >= threshold).count() as u8;
    let hits = raw_hits.saturating_sub(defender_terrain.defense_bonus());
    AttackRoll { dice, hits }
}

/// Outcome of a resolved attack
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CombatReport {
    pub attacker: Unit,
    /// Defender as it stood before the attack
    pub defender: Unit,
    pub target: Hex,
    pub roll: AttackRoll,
    pub remaining_strength: u8,
    pub destroyed: bool,
}

impl CombatReport {
    pub fn summary(&self) -> String {
        let dice: Vec<String> = self.roll.dice.iter().map(|d| d.to_string()).collect();
        format!(
            "{} {} attacks {} {}: rolled [{}] = {} hits",
            self.attacker.side,
            self.attacker.unit_type,
            self.defender.side,
            self.defender.unit_type,
            dice.join(","),
            self.roll.hits
        )
    }

    pub fn destruction_notice(&self) -> Option<String> {
        self.destroyed.then(|| {
            format!(
                "{} {} destroyed!",
                self.defender.side, self.defender.unit_type
            )
        })
    }
}

/// Resolve an attack from `from` against `to` and apply the damage.
///
/// Range, sight and ownership are the caller's concern; this only needs a
/// unit on both hexes.
pub fn resolve<S: RandomSource + ?Sized>(
    board: &mut Board,
    from: Hex,
    to: Hex,
    source: &mut S,
) -> Result<CombatReport, BoardError> {
    let attacker = *board.unit_at(from).ok_or(BoardError::Empty(from))?;
    let defender = *board.unit_at(to).ok_or(BoardError::Empty(to))?;
    let terrain = board.terrain_at(to).ok_or(BoardError::OffBoard(to))?;

    let roll = roll_attack(&attacker, &defender, terrain, source);
    let remaining_strength = defender.strength.saturating_sub(roll.hits);
    let destroyed = remaining_strength == 0;

    if destroyed {
        board.remove_unit(to);
    } else if let Some(unit) = board.unit_at_mut(to) {
        unit.strength = remaining_strength;
    }

    tracing::debug!(
        from = %from,
        to = %to,
        dice = ?roll.dice,
        hits = roll.hits,
        destroyed,
        "attack resolved"
    );

    Ok(CombatReport {
        attacker,
        defender,
        target: to,
        roll,
        remaining_strength,
        destroyed,
    })
}
