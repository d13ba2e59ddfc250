//! Hex coordinate system using axial coordinates (q, r).
//!
//! Tiles are addressed by `HexCoord`. Vertices and routes are not addressed by
//! coordinates at all: the board generator turns each cell's six corner points
//! into shared graph vertices by matching positions within [`CORNER_EPSILON`].

use serde::{Deserialize, Serialize};

/// Two corner points closer than this are the same vertex.
pub const CORNER_EPSILON: f64 = 1e-3;

/// A point in board space (pointy-top hexes of unit size).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// True when both axes are within [`CORNER_EPSILON`].
    pub fn close_to(&self, other: &Point) -> bool {
        (self.x - other.x).abs() < CORNER_EPSILON && (self.y - other.y).abs() < CORNER_EPSILON
    }
}

/// Direction from a hex to one of its six neighbours
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HexDirection {
    East,
    NorthEast,
    NorthWest,
    West,
    SouthWest,
    SouthEast,
}

impl HexDirection {
    /// All directions, counter-clockwise starting from East
    pub const ALL: [HexDirection; 6] = [
        HexDirection::East,
        HexDirection::NorthEast,
        HexDirection::NorthWest,
        HexDirection::West,
        HexDirection::SouthWest,
        HexDirection::SouthEast,
    ];

    const fn offset(self) -> (i32, i32) {
        match self {
            HexDirection::East => (1, 0),
            HexDirection::NorthEast => (1, -1),
            HexDirection::NorthWest => (0, -1),
            HexDirection::West => (-1, 0),
            HexDirection::SouthWest => (-1, 1),
            HexDirection::SouthEast => (0, 1),
        }
    }
}

/// Axial coordinate for hex grid.
///
/// In axial coordinates:
/// - `q` increases going east (right)
/// - `r` increases going southeast
/// - The third coordinate `s` (not stored) satisfies: q + r + s = 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct HexCoord {
    /// Column (increases going east)
    pub q: i32,
    /// Row (increases going southeast)
    pub r: i32,
}

impl HexCoord {
    /// Create a new hex coordinate
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// The implicit third coordinate (s = -q - r)
    pub const fn s(&self) -> i32 {
        -self.q - self.r
    }

    /// Convert "odd-r" offset coordinates (column, row) to axial.
    pub const fn from_offset(col: i32, row: i32) -> Self {
        Self::new(col - (row - (row & 1)) / 2, row)
    }

    /// Inverse of [`HexCoord::from_offset`]
    pub const fn to_offset(&self) -> (i32, i32) {
        (self.q + (self.r - (self.r & 1)) / 2, self.r)
    }

    /// The six neighbouring hexes in [`HexDirection::ALL`] order
    pub fn neighbors(&self) -> [HexCoord; 6] {
        HexDirection::ALL.map(|dir| self.neighbor(dir))
    }

    /// Get the neighbor in a specific direction
    pub fn neighbor(&self, direction: HexDirection) -> HexCoord {
        let (dq, dr) = direction.offset();
        HexCoord::new(self.q + dq, self.r + dr)
    }

    /// Distance to another hex (in hex steps)
    pub fn distance_to(&self, other: &HexCoord) -> u32 {
        let dq = (self.q - other.q).abs();
        let dr = (self.r - other.r).abs();
        let ds = (self.s() - other.s()).abs();
        ((dq + dr + ds) / 2) as u32
    }

    /// All hexes at exactly `radius` steps, walked in ring order.
    pub fn ring(&self, radius: u32) -> Vec<HexCoord> {
        if radius == 0 {
            return vec![*self];
        }
        let (dq, dr) = HexDirection::SouthWest.offset();
        let mut hex = HexCoord::new(self.q + dq * radius as i32, self.r + dr * radius as i32);
        let mut ring = Vec::with_capacity(6 * radius as usize);
        for dir in HexDirection::ALL {
            for _ in 0..radius {
                ring.push(hex);
                hex = hex.neighbor(dir);
            }
        }
        ring
    }

    /// Center of the hex in board space
    pub fn center(&self) -> Point {
        let x = 3.0_f64.sqrt() * (self.q as f64 + self.r as f64 / 2.0);
        let y = 1.5 * self.r as f64;
        Point::new(x, y)
    }

    /// The six corner points, consecutive corners joined by a side.
    pub fn corners(&self) -> [Point; 6] {
        let c = self.center();
        std::array::from_fn(|i| {
            let angle = (60.0 * i as f64 - 30.0).to_radians();
            Point::new(c.x + angle.cos(), c.y + angle.sin())
        })
    }
}
