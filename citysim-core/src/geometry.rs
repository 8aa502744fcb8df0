//! Small value types shared by the overlay and empire layers.
//!
//! Tile coordinates ([`TilePos`], [`Size`]) address the local city map.
//! Empire coordinates ([`Point`], [`PointF`]) address the world map where
//! cities sit and merchants travel.

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Div, Sub};

/// Integer position on the empire map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: Point) -> f32 {
        PointF::from(*self).distance_to(PointF::from(other))
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Div<i32> for Point {
    type Output = Point;

    fn div(self, rhs: i32) -> Point {
        Point::new(self.x / rhs, self.y / rhs)
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Fractional position on the empire map.
///
/// Merchants move by a fixed fraction of their remaining distance each
/// update; integer positions would stall once that fraction truncates to 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PointF {
    pub x: f32,
    pub y: f32,
}

impl PointF {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: PointF) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Nearest integer point.
    pub fn round(&self) -> Point {
        Point::new(self.x.round() as i32, self.y.round() as i32)
    }
}

impl From<Point> for PointF {
    fn from(p: Point) -> Self {
        PointF::new(p.x as f32, p.y as f32)
    }
}

impl Add for PointF {
    type Output = PointF;

    fn add(self, rhs: PointF) -> PointF {
        PointF::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for PointF {
    fn add_assign(&mut self, rhs: PointF) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for PointF {
    type Output = PointF;

    fn sub(self, rhs: PointF) -> PointF {
        PointF::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Div<f32> for PointF {
    type Output = PointF;

    fn div(self, rhs: f32) -> PointF {
        PointF::new(self.x / rhs, self.y / rhs)
    }
}

/// Tile coordinate on the city map. `i` is the column, `j` the row.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct TilePos {
    pub i: i32,
    pub j: i32,
}

impl TilePos {
    pub const fn new(i: i32, j: i32) -> Self {
        Self { i, j }
    }

    /// Offset this position by `(di, dj)`.
    pub const fn offset(&self, di: i32, dj: i32) -> Self {
        Self::new(self.i + di, self.j + dj)
    }
}

impl std::fmt::Display for TilePos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.i, self.j)
    }
}

/// Footprint size in tiles. Never smaller than 1x1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    width: u32,
    height: u32,
}

impl Size {
    /// Create a size, clamping each side to at least one tile.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    /// Square footprint (1 = 1x1, 2 = 2x2, ...).
    pub fn square(side: u32) -> Self {
        Self::new(side, side)
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of tiles covered.
    pub fn area(&self) -> u32 {
        self.width * self.height
    }
}

impl Default for Size {
    fn default() -> Self {
        Self::square(1)
    }
}
