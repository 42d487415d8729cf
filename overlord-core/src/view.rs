//! Per-viewer snapshot of a game
//!
//! The opponent's hand is reduced to a count; everything else on the board is
//! public.

use crate::board::{Cell, Section, Terrain};
use crate::cards::CommandCard;
use crate::game::{GameState, Phase, RulesVariant, Scores};
use crate::units::{Side, Unit};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellView {
    pub q: i8,
    pub r: i8,
    pub section: Section,
    pub terrain: Terrain,
    pub unit: Option<Unit>,
}

impl From<&Cell> for CellView {
    fn from(cell: &Cell) -> Self {
        Self {
            q: cell.hex.q,
            r: cell.hex.r,
            section: cell.section,
            terrain: cell.terrain,
            unit: cell.unit,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientView {
    /// Row-major
    pub board: Vec<CellView>,
    pub current_player: Side,
    pub phase: Phase,
    pub cards_in_hand: Vec<CommandCard>,
    pub units_to_activate: u8,
    pub scores: Scores,
    /// Newest first
    pub combat_log: Vec<String>,
    pub scenario_name: String,
    pub victory_points: u32,
    pub selected_card: Option<CommandCard>,
    pub player_side: Side,
    pub opponent_card_count: usize,
    pub winner: Option<Side>,
    pub turn: u32,
    pub rules: RulesVariant,
}

impl GameState {
    /// Snapshot as seen by `side`
    pub fn view_for(&self, side: Side) -> ClientView {
        ClientView {
            board: self.board().cells().map(CellView::from).collect(),
            current_player: self.current_player(),
            phase: self.phase(),
            cards_in_hand: self.hand(side).to_vec(),
            units_to_activate: self.units_to_activate(),
            scores: self.scores(),
            combat_log: self.combat_log().map(str::to_string).collect(),
            scenario_name: self.scenario_name().to_string(),
            victory_points: self.victory_points(),
            selected_card: self.selected_card().cloned(),
            player_side: side,
            opponent_card_count: self.hand(side.opponent()).len(),
            winner: self.winner(),
            turn: self.turn(),
            rules: self.rules(),
        }
    }
}
