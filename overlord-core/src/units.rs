//! Sides, unit types and the unit profile table

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the two competing factions
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Allies = 0,
    Axis = 1,
}

impl Side {
    pub fn opponent(self) -> Self {
        match self {
            Side::Allies => Side::Axis,
            Side::Axis => Side::Allies,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Side::Allies => "allies",
            Side::Axis => "axis",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unit type
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitType {
    Infantry,
    Armor,
    Artillery,
}

/// Static rules for a unit type
#[derive(Clone, Debug)]
pub struct UnitProfile {
    pub name: &'static str,
    /// Movement points per activation
    pub movement: u8,
    /// Maximum attack distance in hexes
    pub attack_range: u8,
    /// Minimum die roll that scores a hit against this type
    pub hit_threshold: u8,
}

impl UnitProfile {
    const fn new(name: &'static str, movement: u8, attack_range: u8, hit_threshold: u8) -> Self {
        Self {
            name,
            movement,
            attack_range,
            hit_threshold,
        }
    }
}

/// Profiles indexed by `UnitType as usize`
pub static UNIT_PROFILES: [UnitProfile; 3] = [
    UnitProfile::new("infantry", 1, 1, 4),
    UnitProfile::new("armor", 3, 3, 5),
    // Artillery never moves; it only fires
    UnitProfile::new("artillery", 0, 5, 5),
];

impl UnitType {
    pub const ALL: [UnitType; 3] = [UnitType::Infantry, UnitType::Armor, UnitType::Artillery];

    pub fn profile(self) -> &'static UnitProfile {
        &UNIT_PROFILES[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.profile().name
    }

    pub fn movement(self) -> u8 {
        self.profile().movement
    }

    pub fn attack_range(self) -> u8 {
        self.profile().attack_range
    }

    pub fn hit_threshold(self) -> u8 {
        self.profile().hit_threshold
    }
}

impl fmt::Display for UnitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A unit on the board
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Unit {
    #[serde(rename = "type")]
    pub unit_type: UnitType,
    pub side: Side,
    /// Remaining figures; the unit is removed when this reaches zero
    pub strength: u8,
    pub has_moved: bool,
    #[serde(default)]
    pub has_attacked: bool,
}

impl Unit {
    pub fn new(unit_type: UnitType, side: Side, strength: u8) -> Self {
        Self {
            unit_type,
            side,
            strength,
            has_moved: false,
            has_attacked: false,
        }
    }

    /// True once the unit has moved or fired this turn
    pub fn is_activated(&self) -> bool {
        self.has_moved || self.has_attacked
    }

    /// Reset per-turn activation flags
    pub fn refresh(&mut self) {
        self.has_moved = false;
        self.has_attacked = false;
    }
}
