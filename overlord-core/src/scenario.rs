//! Scenarios - battlefield templates selected at match creation

use crate::board::{Board, Terrain};
use crate::error::BoardError;
use crate::hex::Hex;
use crate::rng::RandomSource;
use crate::units::{Side, Unit, UnitType};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

/// Scenario used when a match request names none
pub const DEFAULT_SCENARIO: &str = "pegasus-bridge";

/// Chance that a procedural cell gets non-grass terrain
const SCATTER_CHANCE: f64 = 0.4;

/// Starting position of one unit
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub pos: Hex,
    #[serde(rename = "type")]
    pub unit_type: UnitType,
    pub strength: u8,
}

impl Placement {
    pub const fn new(pos: Hex, unit_type: UnitType, strength: u8) -> Self {
        Self {
            pos,
            unit_type,
            strength,
        }
    }
}

/// Immutable battlefield template
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Scatter procedural terrain before applying the overlay
    #[serde(default)]
    pub random_terrain: bool,
    #[serde(default)]
    pub terrain: BTreeMap<Hex, Terrain>,
    pub allies: Vec<Placement>,
    pub axis: Vec<Placement>,
    pub victory_points: u32,
    #[serde(default = "default_first_mover")]
    pub first_mover: Side,
}

fn default_first_mover() -> Side {
    Side::Allies
}

/// Public scenario listing entry
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioSummary {
    pub id: String,
    pub name: String,
    pub description: String,
    pub victory_points: u32,
}

impl Scenario {
    /// Build the starting board.
    ///
    /// Procedural terrain draws from `source`; fixed layouts ignore it.
    pub fn build_board<S: RandomSource + ?Sized>(
        &self,
        source: &mut S,
    ) -> Result<Board, BoardError> {
        let mut board = Board::new();

        if self.random_terrain {
            for hex in Board::all_hexes() {
                if source.unit() < SCATTER_CHANCE {
                    let terrain = Terrain::SCATTER[source.index(Terrain::SCATTER.len())];
                    board.set_terrain(hex, terrain)?;
                }
            }
        }

        for (&hex, &terrain) in &self.terrain {
            board.set_terrain(hex, terrain)?;
        }

        for (side, placements) in [(Side::Allies, &self.allies), (Side::Axis, &self.axis)] {
            for p in placements {
                board.place_unit(p.pos, Unit::new(p.unit_type, side, p.strength))?;
            }
        }

        Ok(board)
    }

    /// Check placements and thresholds without building a board
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.victory_points == 0 {
            anyhow::bail!("scenario {}: victory points must be positive", self.id);
        }

        let grid = Board::new();
        for &hex in self.terrain.keys() {
            if !grid.contains(hex) {
                anyhow::bail!("scenario {}: terrain at {} is off the board", self.id, hex);
            }
        }

        let mut seen = HashSet::new();
        for p in self.allies.iter().chain(&self.axis) {
            if !grid.contains(p.pos) {
                anyhow::bail!("scenario {}: unit at {} is off the board", self.id, p.pos);
            }
            if p.strength == 0 {
                anyhow::bail!("scenario {}: unit at {} has no strength", self.id, p.pos);
            }
            if !seen.insert(p.pos) {
                anyhow::bail!("scenario {}: two units placed at {}", self.id, p.pos);
            }
        }

        Ok(())
    }

    pub fn summary(&self) -> ScenarioSummary {
        ScenarioSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            victory_points: self.victory_points,
        }
    }

    /// Load from JSON file (handles both flat and nested `board` formats)
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let fallback_id = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unnamed")
            .to_string();

        let scenario = Self::from_json(&content, &fallback_id)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Parse JSON, using `fallback_id` when the document carries no id
    pub fn from_json(content: &str, fallback_id: &str) -> anyhow::Result<Self> {
        let value: serde_json::Value = serde_json::from_str(content)?;

        // Flat format unless the document carries a `board` field
        if value.get("board").is_none() {
            return Ok(serde_json::from_value(value)?);
        }

        // Nested format:
        // { name, description, board: { terrain, allies, axis } | "random", victoryPoints }
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum NestedBoard {
            Random(String),
            Fixed {
                #[serde(default)]
                terrain: BTreeMap<Hex, Terrain>,
                allies: Vec<Placement>,
                axis: Vec<Placement>,
            },
        }

        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Nested {
            id: Option<String>,
            name: String,
            description: String,
            board: NestedBoard,
            victory_points: u32,
        }

        let nested: Nested = serde_json::from_value(value)?;
        let id = nested.id.unwrap_or_else(|| fallback_id.to_string());
        let mut scenario = Scenario {
            id,
            name: nested.name,
            description: nested.description,
            random_terrain: false,
            terrain: BTreeMap::new(),
            allies: Vec::new(),
            axis: Vec::new(),
            victory_points: nested.victory_points,
            first_mover: Side::Allies,
        };

        match nested.board {
            NestedBoard::Random(kind) if kind == "random" => {
                let template = Self::random();
                scenario.random_terrain = true;
                scenario.allies = template.allies;
                scenario.axis = template.axis;
            }
            NestedBoard::Random(kind) => anyhow::bail!("unknown board kind: {}", kind),
            NestedBoard::Fixed { terrain, allies, axis } => {
                scenario.terrain = terrain;
                scenario.allies = allies;
                scenario.axis = axis;
            }
        }

        Ok(scenario)
    }

    /// Save to JSON file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    // ========================================================================
    // BUILT-IN SCENARIOS
    // ========================================================================

    fn terrain_map(entries: &[(Hex, Terrain)]) -> BTreeMap<Hex, Terrain> {
        entries.iter().copied().collect()
    }

    /// D-Day, British airborne assault on the Orne bridges
    pub fn pegasus_bridge() -> Self {
        use Terrain::*;
        use UnitType::*;
        Self {
            id: "pegasus-bridge".to_string(),
            name: "Pegasus Bridge".to_string(),
            description: "D-Day, June 6, 1944 - British airborne assault".to_string(),
            random_terrain: false,
            terrain: Self::terrain_map(&[
                (Hex::new(6, 4), Water),
                (Hex::new(6, 5), Water),
                (Hex::new(6, 6), Water),
                (Hex::new(7, 4), Beach),
                (Hex::new(7, 5), Beach),
                (Hex::new(7, 6), Beach),
                (Hex::new(4, 3), Town),
                (Hex::new(9, 5), Town),
                (Hex::new(2, 2), Forest),
                (Hex::new(3, 3), Forest),
                (Hex::new(10, 6), Forest),
            ]),
            allies: vec![
                Placement::new(Hex::new(2, 2), Infantry, 4),
                Placement::new(Hex::new(3, 2), Infantry, 4),
                Placement::new(Hex::new(4, 3), Infantry, 3),
                Placement::new(Hex::new(1, 4), Armor, 3),
            ],
            axis: vec![
                Placement::new(Hex::new(10, 6), Infantry, 4),
                Placement::new(Hex::new(9, 5), Infantry, 3),
                Placement::new(Hex::new(8, 6), Artillery, 2),
                Placement::new(Hex::new(11, 5), Infantry, 4),
            ],
            victory_points: 6,
            first_mover: Side::Allies,
        }
    }

    /// D-Day, American beach landing
    pub fn omaha_beach() -> Self {
        use Terrain::*;
        use UnitType::*;
        Self {
            id: "omaha-beach".to_string(),
            name: "Omaha Beach".to_string(),
            description: "D-Day, June 6, 1944 - American beach assault".to_string(),
            random_terrain: false,
            terrain: Self::terrain_map(&[
                (Hex::new(0, 0), Water),
                (Hex::new(0, 1), Water),
                (Hex::new(0, 2), Water),
                (Hex::new(0, 3), Water),
                (Hex::new(1, 0), Water),
                (Hex::new(1, 1), Water),
                (Hex::new(1, 2), Water),
                (Hex::new(1, 3), Water),
                (Hex::new(2, 0), Beach),
                (Hex::new(2, 1), Beach),
                (Hex::new(2, 2), Beach),
                (Hex::new(2, 3), Beach),
                (Hex::new(3, 0), Beach),
                (Hex::new(3, 1), Beach),
                (Hex::new(3, 2), Beach),
                (Hex::new(3, 3), Beach),
                (Hex::new(8, 4), Hill),
                (Hex::new(9, 4), Hill),
                (Hex::new(10, 5), Hill),
                (Hex::new(11, 6), Town),
                (Hex::new(11, 7), Town),
            ]),
            allies: vec![
                Placement::new(Hex::new(2, 1), Infantry, 4),
                Placement::new(Hex::new(2, 2), Infantry, 4),
                Placement::new(Hex::new(3, 1), Infantry, 3),
                Placement::new(Hex::new(3, 3), Infantry, 4),
                Placement::new(Hex::new(2, 4), Infantry, 3),
            ],
            axis: vec![
                Placement::new(Hex::new(10, 5), Infantry, 4),
                Placement::new(Hex::new(9, 4), Infantry, 3),
                Placement::new(Hex::new(11, 6), Artillery, 2),
                Placement::new(Hex::new(8, 5), Infantry, 3),
            ],
            victory_points: 6,
            first_mover: Side::Allies,
        }
    }

    /// Normandy bocage fighting
    pub fn hedgerow_hell() -> Self {
        use Terrain::*;
        use UnitType::*;
        Self {
            id: "hedgerow-hell".to_string(),
            name: "Hedgerow Hell".to_string(),
            description: "Normandy, June 1944 - Fighting in the bocage".to_string(),
            random_terrain: false,
            terrain: Self::terrain_map(&[
                (Hex::new(2, 2), Hedge),
                (Hex::new(2, 3), Hedge),
                (Hex::new(2, 4), Hedge),
                (Hex::new(5, 3), Hedge),
                (Hex::new(5, 4), Hedge),
                (Hex::new(5, 5), Hedge),
                (Hex::new(8, 4), Hedge),
                (Hex::new(8, 5), Hedge),
                (Hex::new(8, 6), Hedge),
                (Hex::new(3, 3), Forest),
                (Hex::new(4, 2), Forest),
                (Hex::new(9, 5), Forest),
                (Hex::new(10, 6), Forest),
                (Hex::new(6, 4), Town),
            ]),
            allies: vec![
                Placement::new(Hex::new(1, 2), Infantry, 4),
                Placement::new(Hex::new(2, 1), Infantry, 4),
                Placement::new(Hex::new(3, 2), Armor, 3),
                Placement::new(Hex::new(4, 3), Infantry, 3),
            ],
            axis: vec![
                Placement::new(Hex::new(11, 6), Infantry, 4),
                Placement::new(Hex::new(10, 5), Infantry, 4),
                Placement::new(Hex::new(9, 6), Armor, 3),
                Placement::new(Hex::new(8, 5), Artillery, 2),
            ],
            victory_points: 5,
            first_mover: Side::Allies,
        }
    }

    /// Procedural terrain with a fixed order of battle
    pub fn random() -> Self {
        use UnitType::*;
        Self {
            id: "random".to_string(),
            name: "Random Encounter".to_string(),
            description: "Randomly generated battlefield".to_string(),
            random_terrain: true,
            terrain: BTreeMap::new(),
            allies: vec![
                Placement::new(Hex::new(2, 2), Infantry, 4),
                Placement::new(Hex::new(3, 2), Armor, 3),
                Placement::new(Hex::new(4, 3), Artillery, 2),
                Placement::new(Hex::new(1, 4), Infantry, 4),
            ],
            axis: vec![
                Placement::new(Hex::new(10, 6), Infantry, 4),
                Placement::new(Hex::new(9, 5), Armor, 3),
                Placement::new(Hex::new(8, 6), Artillery, 2),
                Placement::new(Hex::new(11, 5), Infantry, 4),
            ],
            victory_points: 5,
            first_mover: Side::Allies,
        }
    }

    pub fn builtin() -> Vec<Self> {
        vec![
            Self::pegasus_bridge(),
            Self::omaha_beach(),
            Self::hedgerow_hell(),
            Self::random(),
        ]
    }
}

// ============================================================================
// CATALOG
// ============================================================================

/// Ordered set of scenarios available for matchmaking
#[derive(Clone, Debug)]
pub struct ScenarioCatalog {
    scenarios: Vec<Scenario>,
}

impl ScenarioCatalog {
    pub fn new(scenarios: Vec<Scenario>) -> Self {
        Self { scenarios }
    }

    /// Add or replace a scenario by id
    pub fn insert(&mut self, scenario: Scenario) {
        match self.scenarios.iter_mut().find(|s| s.id == scenario.id) {
            Some(existing) => *existing = scenario,
            None => self.scenarios.push(scenario),
        }
    }

    /// Load every `*.json` scenario in `dir` on top of the current entries
    pub fn load_dir(&mut self, dir: &Path) -> anyhow::Result<usize> {
        let mut paths: Vec<_> = std::fs::read_dir(dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().and_then(|s| s.to_str()) == Some("json"))
            .collect();
        paths.sort();

        for path in &paths {
            let scenario = Scenario::load(path)
                .map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e))?;
            self.insert(scenario);
        }

        Ok(paths.len())
    }

    pub fn get(&self, id: &str) -> Option<&Scenario> {
        self.scenarios.iter().find(|s| s.id == id)
    }

    pub fn summaries(&self) -> Vec<ScenarioSummary> {
        self.scenarios.iter().map(Scenario::summary).collect()
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }
}

impl Default for ScenarioCatalog {
    fn default() -> Self {
        Self::new(Scenario::builtin())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::RngSource;

    #[test]
    fn test_builtins_are_valid() {
        for scenario in Scenario::builtin() {
            scenario.validate().unwrap();
            let board = scenario
                .build_board(&mut RngSource::seeded(1))
                .unwrap();
            let allies = board.units_of(Side::Allies).count();
            let axis = board.units_of(Side::Axis).count();
            assert_eq!(allies, scenario.allies.len(), "{}", scenario.id);
            assert_eq!(axis, scenario.axis.len(), "{}", scenario.id);
        }
    }

    #[test]
    fn test_pegasus_layout() {
        let board = Scenario::pegasus_bridge()
            .build_board(&mut RngSource::seeded(1))
            .unwrap();
        assert_eq!(board.terrain_at(Hex::new(6, 4)), Some(Terrain::Water));
        assert_eq!(board.terrain_at(Hex::new(4, 3)), Some(Terrain::Town));
        let unit = board.unit_at(Hex::new(8, 6)).unwrap();
        assert_eq!(unit.unit_type, UnitType::Artillery);
        assert_eq!(unit.side, Side::Axis);
        assert_eq!(unit.strength, 2);
    }

    #[test]
    fn test_random_terrain_is_seeded() {
        let scenario = Scenario::random();
        let a = scenario.build_board(&mut RngSource::seeded(5)).unwrap();
        let b = scenario.build_board(&mut RngSource::seeded(5)).unwrap();
        let terrain_a: Vec<_> = a.cells().map(|c| c.terrain).collect();
        let terrain_b: Vec<_> = b.cells().map(|c| c.terrain).collect();
        assert_eq!(terrain_a, terrain_b);
        assert!(terrain_a.iter().all(|t| *t != Terrain::Water));
        assert!(terrain_a.iter().any(|t| *t != Terrain::Grass));
    }

    #[test]
    fn test_catalog_lookup() {
        let catalog = ScenarioCatalog::default();
        assert_eq!(catalog.len(), 4);
        assert!(catalog.get(DEFAULT_SCENARIO).is_some());
        assert!(catalog.get("stalingrad").is_none());
        let ids: Vec<_> = catalog.summaries().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["pegasus-bridge", "omaha-beach", "hedgerow-hell", "random"]);
    }

    #[test]
    fn test_flat_json_roundtrip() {
        let scenario = Scenario::hedgerow_hell();
        let json = serde_json::to_string(&scenario).unwrap();
        assert!(json.contains("\"6,4\":\"town\""));
        let back = Scenario::from_json(&json, "ignored").unwrap();
        assert_eq!(back, scenario);
    }

    #[test]
    fn test_nested_json() {
        let json = r#"{
            "name": "Crossroads",
            "description": "Small skirmish",
            "board": {
                "terrain": { "6,4": "town" },
                "allies": [{ "pos": "2,2", "type": "infantry", "strength": 4 }],
                "axis": [{ "pos": "10,6", "type": "armor", "strength": 3 }]
            },
            "victoryPoints": 2
        }"#;
        let scenario = Scenario::from_json(json, "crossroads").unwrap();
        assert_eq!(scenario.id, "crossroads");
        assert_eq!(scenario.victory_points, 2);
        assert_eq!(scenario.terrain.get(&Hex::new(6, 4)), Some(&Terrain::Town));
        assert_eq!(scenario.axis[0].unit_type, UnitType::Armor);
        scenario.validate().unwrap();
    }

    #[test]
    fn test_nested_random_json() {
        let json =
            r#"{ "name": "Chaos", "description": "x", "board": "random", "victoryPoints": 3 }"#;
        let scenario = Scenario::from_json(json, "chaos").unwrap();
        assert!(scenario.random_terrain);
        assert_eq!(scenario.allies.len(), 4);
    }

    #[test]
    fn test_flat_json_error_is_reported() {
        let mut value = serde_json::to_value(Scenario::omaha_beach()).unwrap();
        value.as_object_mut().unwrap().remove("victoryPoints");
        let err = Scenario::from_json(&value.to_string(), "omaha").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("victoryPoints"), "{}", message);
        assert!(!message.contains("board"), "{}", message);
    }

    #[test]
    fn test_nested_json_error_is_reported() {
        let json = r#"{ "name": "Chaos", "description": "x", "board": "random" }"#;
        let err = Scenario::from_json(json, "chaos").unwrap_err();
        assert!(err.to_string().contains("victoryPoints"), "{}", err);
    }

    #[test]
    fn test_validate_rejects_overlap() {
        let mut scenario = Scenario::pegasus_bridge();
        scenario.axis.push(Placement::new(Hex::new(2, 2), UnitType::Armor, 3));
        assert!(scenario.validate().is_err());

        let mut scenario = Scenario::pegasus_bridge();
        scenario.allies.push(Placement::new(Hex::new(30, 2), UnitType::Armor, 3));
        assert!(scenario.validate().is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = std::env::temp_dir().join(format!("overlord-scenarios-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let mut custom = Scenario::omaha_beach();
        custom.id = "omaha-night".to_string();
        custom.victory_points = 4;
        custom.save(&dir.join("omaha-night.json")).unwrap();

        let mut catalog = ScenarioCatalog::default();
        let loaded = catalog.load_dir(&dir).unwrap();
        assert_eq!(loaded, 1);
        assert_eq!(catalog.len(), 5);
        assert_eq!(catalog.get("omaha-night").map(|s| s.victory_points), Some(4));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
