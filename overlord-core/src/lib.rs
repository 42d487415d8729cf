//! OVERLORD Core - Rules engine for a two-player hex wargame
//!
//! This crate provides the authoritative game logic:
//! - Hex geometry (odd-r offset coordinates, cube distance, line drawing)
//! - Board terrain, sections and line of sight
//! - Movement reachability and dice combat
//! - Command cards and the turn/phase engine
//! - Scenario catalog and per-viewer snapshots

pub mod hex;
pub mod units;
pub mod error;
pub mod board;
pub mod rng;
pub mod movement;
pub mod combat;
pub mod cards;
pub mod scenario;
pub mod game;
pub mod view;

// Re-exports for convenient access
pub use hex::{distance, line_between, Cube, Hex};
pub use units::{Side, Unit, UnitType, UNIT_PROFILES};
pub use error::{ActionError, ActionResult, BoardError};
pub use board::{movement_cost, Board, Section, Terrain, BOARD_COLUMNS, BOARD_ROWS};
pub use rng::{RandomSource, RngSource, ScriptedSource};
pub use movement::{reachable, reachable_basic};
pub use combat::{roll_attack, AttackRoll, CombatReport};
pub use cards::{draw_hand, is_legal_activation, CardSection, CommandCard, CARD_CATALOG, HAND_SIZE};
pub use scenario::{Scenario, ScenarioCatalog, ScenarioSummary, DEFAULT_SCENARIO};
pub use game::{GameState, Phase, RulesVariant, Scores, COMBAT_LOG_CAP};
pub use view::{CellView, ClientView};
