//! Hex geometry with "odd-r" offset coordinates
//!
//! Odd rows are shoved right by half a hex. Distance and line drawing
//! go through cube coordinates.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Offset hex coordinates (column q, row r)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Hex {
    pub q: i8,
    pub r: i8,
}

/// Cube coordinates, x + y + z == 0
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Cube {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

/// Neighbor offsets (dq, dr) for even rows.
/// Index: 0=E, 1=NE, 2=NW, 3=W, 4=SW, 5=SE
pub const EVEN_ROW_OFFSETS: [(i8, i8); 6] = [
    (1, 0),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, 1),
];

/// Neighbor offsets (dq, dr) for odd rows, mirrored from the even table
pub const ODD_ROW_OFFSETS: [(i8, i8); 6] = [
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, 0),
    (0, 1),
    (1, 1),
];

impl Hex {
    pub const fn new(q: i8, r: i8) -> Self {
        Self { q, r }
    }

    /// Convert to cube coordinates
    pub fn to_cube(self) -> Cube {
        let q = self.q as i32;
        let r = self.r as i32;
        let x = q - (r - (r & 1)) / 2;
        let z = r;
        Cube { x, y: -x - z, z }
    }

    /// Distance between two hexes
    pub fn distance_to(self, other: Hex) -> u32 {
        self.to_cube().distance_to(other.to_cube())
    }

    /// Get neighbor in direction (0-5)
    pub fn neighbor(self, direction: u8) -> Hex {
        let table = if self.r & 1 == 1 {
            &ODD_ROW_OFFSETS
        } else {
            &EVEN_ROW_OFFSETS
        };
        let (dq, dr) = table[direction as usize % 6];
        Hex::new(self.q + dq, self.r + dr)
    }

    /// All six neighbors, unbounded
    pub fn neighbors(self) -> [Hex; 6] {
        [0u8, 1, 2, 3, 4, 5].map(|dir| self.neighbor(dir))
    }

    /// Straight line from `self` to `other`, both endpoints included
    pub fn line_to(self, other: Hex) -> HexLine {
        HexLine::new(self, other)
    }
}

impl Cube {
    /// Convert back to odd-r offset coordinates
    pub fn to_offset(self) -> Hex {
        let q = self.x + (self.z - (self.z & 1)) / 2;
        Hex::new(q as i8, self.z as i8)
    }

    pub fn distance_to(self, other: Cube) -> u32 {
        ((self.x - other.x).unsigned_abs()
            + (self.y - other.y).unsigned_abs()
            + (self.z - other.z).unsigned_abs())
            / 2
    }

    /// Round fractional cube coordinates to the nearest hex.
    ///
    /// The component with the largest rounding residual is recomputed from
    /// the other two so the result stays on the x + y + z == 0 plane.
    pub fn round(x: f64, y: f64, z: f64) -> Cube {
        let mut rx = round_half_up(x);
        let mut ry = round_half_up(y);
        let mut rz = round_half_up(z);

        let x_diff = (rx - x).abs();
        let y_diff = (ry - y).abs();
        let z_diff = (rz - z).abs();

        if x_diff > y_diff && x_diff > z_diff {
            rx = -ry - rz;
        } else if y_diff > z_diff {
            ry = -rx - rz;
        } else {
            rz = -rx - ry;
        }

        Cube {
            x: rx as i32,
            y: ry as i32,
            z: rz as i32,
        }
    }
}

fn round_half_up(v: f64) -> f64 {
    (v + 0.5).floor()
}

/// Distance between two hexes
pub fn distance(a: Hex, b: Hex) -> u32 {
    a.distance_to(b)
}

/// Line between two hexes (see [`HexLine`])
pub fn line_between(a: Hex, b: Hex) -> HexLine {
    HexLine::new(a, b)
}

// ============================================================================
// LINE INTERPOLATION
// ============================================================================

/// Hexes on the straight line between two endpoints.
///
/// Yields exactly `distance + 1` hexes. Clone the iterator to walk the line
/// again from the start.
#[derive(Clone, Debug)]
pub struct HexLine {
    from: Cube,
    to: Cube,
    steps: u32,
    index: u32,
}

impl HexLine {
    fn new(from: Hex, to: Hex) -> Self {
        let from = from.to_cube();
        let to = to.to_cube();
        Self {
            from,
            to,
            steps: from.distance_to(to),
            index: 0,
        }
    }

    fn point(&self, i: u32) -> Hex {
        if self.steps == 0 {
            return self.from.to_offset();
        }
        let t = i as f64 / self.steps as f64;
        let lerp = |a: i32, b: i32| a as f64 * (1.0 - t) + b as f64 * t;
        Cube::round(
            lerp(self.from.x, self.to.x),
            lerp(self.from.y, self.to.y),
            lerp(self.from.z, self.to.z),
        )
        .to_offset()
    }
}

impl Iterator for HexLine {
    type Item = Hex;

    fn next(&mut self) -> Option<Hex> {
        if self.index > self.steps {
            return None;
        }
        let hex = self.point(self.index);
        self.index += 1;
        Some(hex)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.steps + 1).saturating_sub(self.index) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for HexLine {}

// ============================================================================
// STRING FORM
// ============================================================================

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid hex coordinate {0:?}, expected \"q,r\"")]
pub struct ParseHexError(pub String);

impl fmt::Display for Hex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.q, self.r)
    }
}

impl FromStr for Hex {
    type Err = ParseHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseHexError(s.to_string());
        let (q, r) = s.split_once(',').ok_or_else(err)?;
        let q = q.trim().parse().map_err(|_| err())?;
        let r = r.trim().parse().map_err(|_| err())?;
        Ok(Hex::new(q, r))
    }
}

impl TryFrom<String> for Hex {
    type Error = ParseHexError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Hex> for String {
    fn from(hex: Hex) -> String {
        hex.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cube_roundtrip() {
        for q in 0..13 {
            for r in 0..9 {
                let hex = Hex::new(q, r);
                assert_eq!(hex.to_cube().to_offset(), hex);
            }
        }
    }

    #[test]
    fn test_distance() {
        assert_eq!(distance(Hex::new(0, 0), Hex::new(0, 0)), 0);
        assert_eq!(distance(Hex::new(0, 0), Hex::new(3, 0)), 3);
        assert_eq!(distance(Hex::new(2, 2), Hex::new(2, 4)), 2);
        // (2,1) on an odd row touches (2,0) and (3,0)
        assert_eq!(distance(Hex::new(2, 1), Hex::new(3, 0)), 1);
        assert_eq!(distance(Hex::new(2, 1), Hex::new(1, 0)), 2);
    }

    #[test]
    fn test_neighbors_are_adjacent() {
        for hex in [Hex::new(4, 4), Hex::new(4, 3), Hex::new(0, 0), Hex::new(12, 8)] {
            for n in hex.neighbors() {
                assert_eq!(hex.distance_to(n), 1, "{} -> {}", hex, n);
            }
        }
    }

    #[test]
    fn test_row_parity_mirrors_offsets() {
        let even: Vec<_> = Hex::new(5, 2).neighbors().to_vec();
        let odd: Vec<_> = Hex::new(5, 3).neighbors().to_vec();
        assert!(even.contains(&Hex::new(4, 1)));
        assert!(!odd.contains(&Hex::new(4, 2)));
        assert!(odd.contains(&Hex::new(6, 2)));
    }

    #[test]
    fn test_line_endpoints() {
        let a = Hex::new(1, 1);
        let b = Hex::new(7, 5);
        let line: Vec<_> = line_between(a, b).collect();
        assert_eq!(line.len(), distance(a, b) as usize + 1);
        assert_eq!(line.first(), Some(&a));
        assert_eq!(line.last(), Some(&b));
    }

    #[test]
    fn test_line_to_self() {
        let a = Hex::new(6, 4);
        let line: Vec<_> = a.line_to(a).collect();
        assert_eq!(line, vec![a]);
    }

    #[test]
    fn test_line_is_restartable() {
        let line = line_between(Hex::new(0, 0), Hex::new(5, 3));
        assert_eq!(line.len(), 8);
        let first: Vec<_> = line.clone().collect();
        let second: Vec<_> = line.collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_string_form() {
        let hex: Hex = "10,6".parse().unwrap();
        assert_eq!(hex, Hex::new(10, 6));
        assert_eq!(hex.to_string(), "10,6");
        assert!("10".parse::<Hex>().is_err());
        assert!("a,b".parse::<Hex>().is_err());

        let json = serde_json::to_string(&Hex::new(3, 2)).unwrap();
        assert_eq!(json, "\"3,2\"");
        let back: Hex = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Hex::new(3, 2));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn hex() -> impl Strategy<Value = Hex> {
            (-20i8..20, -20i8..20).prop_map(|(q, r)| Hex::new(q, r))
        }

        proptest! {
            #[test]
            fn distance_is_symmetric(a in hex(), b in hex()) {
                prop_assert_eq!(distance(a, b), distance(b, a));
            }

            #[test]
            fn distance_to_self_is_zero(a in hex()) {
                prop_assert_eq!(distance(a, a), 0);
            }

            #[test]
            fn line_has_distance_plus_one_points(a in hex(), b in hex()) {
                let line: Vec<Hex> = line_between(a, b).collect();
                prop_assert_eq!(line.len(), distance(a, b) as usize + 1);
                prop_assert_eq!(line[0], a);
                prop_assert_eq!(*line.last().unwrap(), b);
            }

            #[test]
            fn cube_roundtrip(a in hex()) {
                prop_assert_eq!(a.to_cube().to_offset(), a);
            }
        }
    }
}
