//! Battlefield: terrain, sections and unit occupancy

use crate::error::BoardError;
use crate::hex::{line_between, Hex};
use crate::units::{Side, Unit, UnitType};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Board width in columns
pub const BOARD_COLUMNS: i8 = 13;

/// Board height in rows
pub const BOARD_ROWS: i8 = 9;

// ============================================================================
// TERRAIN
// ============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Terrain {
    #[default]
    Grass,
    Forest,
    Town,
    Hill,
    Water,
    Beach,
    Hedge,
}

impl Terrain {
    /// Terrain that procedural maps scatter over grass
    pub const SCATTER: [Terrain; 5] = [
        Terrain::Forest,
        Terrain::Hill,
        Terrain::Town,
        Terrain::Beach,
        Terrain::Hedge,
    ];

    pub fn blocks_line_of_sight(self) -> bool {
        matches!(self, Terrain::Forest | Terrain::Town | Terrain::Hill)
    }

    /// Hits cancelled when defending in this terrain
    pub fn defense_bonus(self) -> u8 {
        match self {
            Terrain::Forest | Terrain::Town => 1,
            _ => 0,
        }
    }

    pub fn is_passable(self) -> bool {
        self != Terrain::Water
    }
}

/// Movement points needed to enter `terrain`. `None` means impassable.
pub fn movement_cost(terrain: Terrain, unit_type: UnitType) -> Option<u8> {
    match (terrain, unit_type) {
        (Terrain::Water, _) => None,
        (Terrain::Forest | Terrain::Town | Terrain::Hill, UnitType::Armor) => Some(2),
        _ => Some(1),
    }
}

// ============================================================================
// SECTIONS
// ============================================================================

/// Fixed board region used by command cards
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Left,
    Center,
    Right,
}

impl Section {
    /// Section of a column: q < 4 left, 4..9 center, 9+ right
    pub fn of_column(q: i8) -> Self {
        if q < 4 {
            Section::Left
        } else if q < 9 {
            Section::Center
        } else {
            Section::Right
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Section::Left => "left",
            Section::Center => "center",
            Section::Right => "right",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// BOARD
// ============================================================================

/// One hex of the battlefield
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cell {
    pub hex: Hex,
    pub section: Section,
    pub terrain: Terrain,
    pub unit: Option<Unit>,
}

/// Authoritative terrain and occupancy map (13 x 9)
#[derive(Clone, Debug)]
pub struct Board {
    cells: FxHashMap<Hex, Cell>,
}

impl Board {
    /// All-grass board with no units
    pub fn new() -> Self {
        let cells = Self::all_hexes()
            .map(|hex| {
                let cell = Cell {
                    hex,
                    section: Section::of_column(hex.q),
                    terrain: Terrain::Grass,
                    unit: None,
                };
                (hex, cell)
            })
            .collect();
        Self { cells }
    }

    /// Every board coordinate, row by row
    pub fn all_hexes() -> impl Iterator<Item = Hex> {
        (0..BOARD_ROWS).flat_map(|r| (0..BOARD_COLUMNS).map(move |q| Hex::new(q, r)))
    }

    pub fn contains(&self, hex: Hex) -> bool {
        self.cells.contains_key(&hex)
    }

    pub fn cell(&self, hex: Hex) -> Option<&Cell> {
        self.cells.get(&hex)
    }

    /// Cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = &Cell> + '_ {
        Self::all_hexes().filter_map(move |hex| self.cells.get(&hex))
    }

    pub fn terrain_at(&self, hex: Hex) -> Option<Terrain> {
        self.cells.get(&hex).map(|c| c.terrain)
    }

    pub fn section_at(&self, hex: Hex) -> Option<Section> {
        self.cells.get(&hex).map(|c| c.section)
    }

    pub fn unit_at(&self, hex: Hex) -> Option<&Unit> {
        self.cells.get(&hex).and_then(|c| c.unit.as_ref())
    }

    pub fn unit_at_mut(&mut self, hex: Hex) -> Option<&mut Unit> {
        self.cells.get_mut(&hex).and_then(|c| c.unit.as_mut())
    }

    pub fn is_occupied(&self, hex: Hex) -> bool {
        self.unit_at(hex).is_some()
    }

    pub fn set_terrain(&mut self, hex: Hex, terrain: Terrain) -> Result<(), BoardError> {
        let cell = self.cells.get_mut(&hex).ok_or(BoardError::OffBoard(hex))?;
        cell.terrain = terrain;
        Ok(())
    }

    /// Place a unit; fails if the hex is off-board or occupied
    pub fn place_unit(&mut self, hex: Hex, unit: Unit) -> Result<(), BoardError> {
        let cell = self.cells.get_mut(&hex).ok_or(BoardError::OffBoard(hex))?;
        if cell.unit.is_some() {
            return Err(BoardError::Occupied(hex));
        }
        cell.unit = Some(unit);
        Ok(())
    }

    pub fn remove_unit(&mut self, hex: Hex) -> Option<Unit> {
        self.cells.get_mut(&hex).and_then(|c| c.unit.take())
    }

    /// Relocate a unit; fails if `from` is empty or `to` is occupied
    pub fn move_unit(&mut self, from: Hex, to: Hex) -> Result<(), BoardError> {
        if !self.contains(to) {
            return Err(BoardError::OffBoard(to));
        }
        if self.is_occupied(to) {
            return Err(BoardError::Occupied(to));
        }
        let unit = self.remove_unit(from).ok_or(BoardError::Empty(from))?;
        self.place_unit(to, unit)
    }

    /// Units in row-major order
    pub fn units(&self) -> impl Iterator<Item = (Hex, &Unit)> + '_ {
        self.cells()
            .filter_map(|c| c.unit.as_ref().map(|unit| (c.hex, unit)))
    }

    pub fn units_of(&self, side: Side) -> impl Iterator<Item = (Hex, &Unit)> + '_ {
        self.units().filter(move |(_, unit)| unit.side == side)
    }

    /// Clear every unit's activation flags
    pub fn refresh_units(&mut self) {
        for unit in self.cells.values_mut().filter_map(|c| c.unit.as_mut()) {
            unit.refresh();
        }
    }

    /// True when no intermediate hex on the line has blocking terrain or a unit.
    ///
    /// Endpoints never block. Intermediate points that fall off the board are
    /// ignored.
    pub fn has_line_of_sight(&self, from: Hex, to: Hex) -> bool {
        let line = line_between(from, to);
        let len = line.len();
        line.enumerate()
            .filter(|&(i, _)| i > 0 && i + 1 < len)
            .filter_map(|(_, hex)| self.cells.get(&hex))
            .all(|cell| !cell.terrain.blocks_line_of_sight() && cell.unit.is_none())
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}
