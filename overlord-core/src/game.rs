//! Turn engine: phases, activation budget, turn handover and scoring

use crate::board::Board;
use crate::cards::{draw_hand, is_legal_activation, CommandCard};
use crate::combat::{self, CombatReport};
use crate::error::{ActionError, ActionResult, BoardError};
use crate::hex::Hex;
use crate::movement::{reachable, reachable_basic};
use crate::rng::RandomSource;
use crate::scenario::Scenario;
use crate::units::{Side, Unit};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Combat log entries kept, newest first
pub const COMBAT_LOG_CAP: usize = 20;

// ============================================================================
// CORE TYPES
// ============================================================================

/// Turn phase
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    SelectCard,
    PlayUnits,
}

/// Movement and sight rules in force for a session
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RulesVariant {
    /// Terrain movement costs and line of sight
    #[default]
    Standard,
    /// Straight-distance movement, attacks ignore sight
    Basic,
}

/// Victory points per side
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scores {
    pub allies: u32,
    pub axis: u32,
}

impl Scores {
    pub fn get(&self, side: Side) -> u32 {
        match side {
            Side::Allies => self.allies,
            Side::Axis => self.axis,
        }
    }

    fn award(&mut self, side: Side) {
        match side {
            Side::Allies => self.allies += 1,
            Side::Axis => self.axis += 1,
        }
    }
}

// ============================================================================
// GAME STATE
// ============================================================================

/// Authoritative state of one match
#[derive(Clone, Debug)]
pub struct GameState {
    board: Board,
    /// Indexed by `Side as usize`
    hands: [Vec<CommandCard>; 2],
    current_player: Side,
    phase: Phase,
    units_to_activate: u8,
    scores: Scores,
    combat_log: VecDeque<String>,
    selected_card: Option<CommandCard>,
    scenario_name: String,
    victory_points: u32,
    rules: RulesVariant,
    turn: u32,
}

impl GameState {
    // ========================================================================
    // CONSTRUCTION
    // ========================================================================

    /// Set up a match from a scenario. Allies draw first, then axis.
    pub fn new<S: RandomSource + ?Sized>(
        scenario: &Scenario,
        rules: RulesVariant,
        source: &mut S,
    ) -> Result<Self, BoardError> {
        let board = scenario.build_board(source)?;
        let allies = draw_hand(source);
        let axis = draw_hand(source);

        Ok(Self {
            board,
            hands: [allies, axis],
            current_player: scenario.first_mover,
            phase: Phase::SelectCard,
            units_to_activate: 0,
            scores: Scores::default(),
            combat_log: VecDeque::with_capacity(COMBAT_LOG_CAP),
            selected_card: None,
            scenario_name: scenario.name.clone(),
            victory_points: scenario.victory_points,
            rules,
            turn: 1,
        })
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn current_player(&self) -> Side {
        self.current_player
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn units_to_activate(&self) -> u8 {
        self.units_to_activate
    }

    pub fn scores(&self) -> Scores {
        self.scores
    }

    /// Log lines, newest first
    pub fn combat_log(&self) -> impl Iterator<Item = &str> + '_ {
        self.combat_log.iter().map(String::as_str)
    }

    pub fn hand(&self, side: Side) -> &[CommandCard] {
        &self.hands[side as usize]
    }

    pub fn selected_card(&self) -> Option<&CommandCard> {
        self.selected_card.as_ref()
    }

    pub fn scenario_name(&self) -> &str {
        &self.scenario_name
    }

    pub fn victory_points(&self) -> u32 {
        self.victory_points
    }

    pub fn rules(&self) -> RulesVariant {
        self.rules
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    /// First side to reach the victory threshold, allies checked first
    pub fn winner(&self) -> Option<Side> {
        [Side::Allies, Side::Axis]
            .into_iter()
            .find(|&side| self.scores.get(side) >= self.victory_points)
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    /// Hexes the unit at `from` may move to under the active rules.
    ///
    /// Empty when the unit has already moved. Ignores whose turn it is.
    pub fn move_targets(&self, from: Hex) -> FxHashSet<Hex> {
        match self.board.unit_at(from) {
            Some(unit) if !unit.has_moved => self.reachable_from(from, unit),
            _ => FxHashSet::default(),
        }
    }

    /// Enemy hexes the unit at `from` may attack under the active rules
    pub fn attack_targets(&self, from: Hex) -> Vec<Hex> {
        let Some(unit) = self.board.unit_at(from) else {
            return Vec::new();
        };
        if unit.has_attacked {
            return Vec::new();
        }

        self.board
            .units_of(unit.side.opponent())
            .map(|(hex, _)| hex)
            .filter(|&to| self.in_range_and_sight(from, to, unit))
            .collect()
    }

    fn reachable_from(&self, from: Hex, unit: &Unit) -> FxHashSet<Hex> {
        match self.rules {
            RulesVariant::Standard => reachable(&self.board, from, unit),
            RulesVariant::Basic => reachable_basic(&self.board, from, unit),
        }
    }

    fn in_range_and_sight(&self, from: Hex, to: Hex, unit: &Unit) -> bool {
        let dist = from.distance_to(to);
        if dist == 0 || dist > unit.unit_type.attack_range() as u32 {
            return false;
        }
        match self.rules {
            RulesVariant::Standard => self.board.has_line_of_sight(from, to),
            RulesVariant::Basic => true,
        }
    }

    // ========================================================================
    // VALIDATION
    // ========================================================================

    fn ensure_turn(&self, side: Side) -> ActionResult<()> {
        if side != self.current_player {
            return Err(ActionError::OutOfTurn);
        }
        Ok(())
    }

    /// Common checks before a board action; returns the selected card
    fn ensure_activation(&self, side: Side) -> ActionResult<&CommandCard> {
        self.ensure_turn(side)?;
        if self.phase != Phase::PlayUnits {
            return Err(ActionError::phase("play a card first"));
        }
        if self.units_to_activate == 0 {
            return Err(ActionError::phase("no activations remaining"));
        }
        self.selected_card
            .as_ref()
            .ok_or_else(|| ActionError::phase("no card selected"))
    }

    /// The acting unit at `from`, checked for ownership and section
    fn own_unit(&self, side: Side, from: Hex, card: &CommandCard) -> ActionResult<Unit> {
        let cell = self
            .board
            .cell(from)
            .ok_or(BoardError::OffBoard(from))?;
        let unit = cell.unit.ok_or(BoardError::Empty(from))?;
        if unit.side != side {
            return Err(ActionError::target(format!("unit at {} is not yours", from)));
        }
        if !unit.is_activated() && !is_legal_activation(card, cell.section) {
            return Err(ActionError::target(format!(
                "{} cannot activate units in the {} section",
                card.name, cell.section
            )));
        }
        Ok(unit)
    }

    fn log(&mut self, line: String) {
        self.combat_log.push_front(line);
        self.combat_log.truncate(COMBAT_LOG_CAP);
    }

    // ========================================================================
    // ACTIONS
    // ========================================================================

    /// Commit a card from the current player's hand
    pub fn play_card(&mut self, side: Side, index: usize) -> ActionResult<()> {
        self.ensure_turn(side)?;
        if self.phase != Phase::SelectCard {
            return Err(ActionError::phase("a card was already played this turn"));
        }
        let card = self.hands[side as usize]
            .get(index)
            .cloned()
            .ok_or_else(|| ActionError::target(format!("no card at index {}", index)))?;

        self.units_to_activate = card.activation_count;
        self.phase = Phase::PlayUnits;
        self.log(format!("{} played: {}", side, card.name));
        tracing::debug!(%side, card = %card.name, "card played");
        self.selected_card = Some(card);
        Ok(())
    }

    /// Move one of the current player's units
    pub fn move_unit(&mut self, side: Side, from: Hex, to: Hex) -> ActionResult<()> {
        let card = self.ensure_activation(side)?;
        let unit = self.own_unit(side, from, card)?;
        if unit.has_moved {
            return Err(ActionError::target(format!("unit at {} has already moved", from)));
        }
        if !self.reachable_from(from, &unit).contains(&to) {
            return Err(ActionError::target(format!("{} is not reachable from {}", to, from)));
        }

        self.board.move_unit(from, to)?;
        if let Some(moved) = self.board.unit_at_mut(to) {
            moved.has_moved = true;
        }
        self.units_to_activate -= 1;
        self.log(format!("{} moved unit to {}", side, to));
        tracing::debug!(%side, %from, %to, "unit moved");
        Ok(())
    }

    /// Attack an enemy unit and apply the result
    pub fn attack<S: RandomSource + ?Sized>(
        &mut self,
        side: Side,
        from: Hex,
        to: Hex,
        source: &mut S,
    ) -> ActionResult<CombatReport> {
        let card = self.ensure_activation(side)?;
        let unit = self.own_unit(side, from, card)?;
        if unit.has_attacked {
            return Err(ActionError::target(format!("unit at {} has already attacked", from)));
        }
        match self.board.unit_at(to) {
            Some(target) if target.side != side => {}
            Some(_) => return Err(ActionError::target(format!("unit at {} is friendly", to))),
            None => return Err(ActionError::target(format!("no enemy at {}", to))),
        }
        let dist = from.distance_to(to);
        if dist > unit.unit_type.attack_range() as u32 {
            return Err(ActionError::target(format!(
                "{} is out of range for {}",
                to, unit.unit_type
            )));
        }
        if self.rules == RulesVariant::Standard && !self.board.has_line_of_sight(from, to) {
            return Err(ActionError::target(format!("no line of sight to {}", to)));
        }

        let report = combat::resolve(&mut self.board, from, to, source)?;
        if let Some(attacker) = self.board.unit_at_mut(from) {
            attacker.has_attacked = true;
        }
        self.units_to_activate -= 1;

        self.log(report.summary());
        if let Some(notice) = report.destruction_notice() {
            self.scores.award(side);
            self.log(notice);
        }
        Ok(report)
    }

    /// Hand the turn to the opponent, refilling the ending side's hand
    pub fn end_turn<S: RandomSource + ?Sized>(
        &mut self,
        side: Side,
        source: &mut S,
    ) -> ActionResult<()> {
        self.ensure_turn(side)?;

        self.board.refresh_units();
        self.hands[side as usize] = draw_hand(source);
        self.current_player = side.opponent();
        self.phase = Phase::SelectCard;
        self.units_to_activate = 0;
        self.selected_card = None;
        self.turn += 1;
        self.log(format!("{} ended turn", side));
        tracing::debug!(%side, turn = self.turn, "turn ended");
        Ok(())
    }
}
