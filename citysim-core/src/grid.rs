//! Tile grid collaborator.
//!
//! The core never owns map storage beyond what [`TileGrid`] exposes: terrain
//! queries, occupancy marking and the desirability field. [`Tilemap`] is a
//! flat row-major implementation used by the runner and by tests.

use crate::arena::OverlayId;
use crate::geometry::{Size, TilePos};
use serde::{Deserialize, Serialize};

/// Map services consumed by overlays.
pub trait TileGrid {
    fn contains(&self, pos: TilePos) -> bool;

    /// Free, dry land with no overlay on it.
    fn is_buildable(&self, pos: TilePos) -> bool;

    fn is_road(&self, pos: TilePos) -> bool;

    /// Overlay whose footprint covers this tile.
    fn occupant(&self, pos: TilePos) -> Option<OverlayId>;

    fn set_occupant(&mut self, pos: TilePos, occupant: Option<OverlayId>);

    fn desirability(&self, pos: TilePos) -> i32;

    /// Add `delta` to a tile's desirability. Out-of-map tiles are ignored.
    fn add_desirability(&mut self, pos: TilePos, delta: i32);

    /// Tiles covered by a footprint whose master tile is `pos`, clipped to the map.
    fn area(&self, pos: TilePos, size: Size) -> Vec<TilePos> {
        let mut tiles = Vec::with_capacity(size.area() as usize);
        for dj in 0..size.height() as i32 {
            for di in 0..size.width() as i32 {
                let tile = pos.offset(di, dj);
                if self.contains(tile) {
                    tiles.push(tile);
                }
            }
        }
        tiles
    }

    /// Perimeter tiles at Chebyshev distance `distance` around a footprint,
    /// corners excluded, clipped to the map.
    ///
    /// `distance == 0` yields nothing; the footprint itself is [`TileGrid::area`].
    fn ring(&self, pos: TilePos, size: Size, distance: u32) -> Vec<TilePos> {
        if distance == 0 {
            return Vec::new();
        }
        let d = distance as i32;
        let left = pos.i - d;
        let right = pos.i + size.width() as i32 - 1 + d;
        let top = pos.j - d;
        let bottom = pos.j + size.height() as i32 - 1 + d;

        let mut tiles = Vec::new();
        for i in (left + 1)..right {
            tiles.push(TilePos::new(i, top));
            tiles.push(TilePos::new(i, bottom));
        }
        for j in (top + 1)..bottom {
            tiles.push(TilePos::new(left, j));
            tiles.push(TilePos::new(right, j));
        }
        tiles.retain(|t| self.contains(*t));
        tiles
    }
}

/// Per-tile terrain and bookkeeping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub road: bool,
    pub water: bool,
    /// Rocks, trees, or anything else that blocks construction.
    pub blocked: bool,
    pub desirability: i32,
    #[serde(skip)]
    pub occupant: Option<OverlayId>,
}

/// Longest side a [`Tilemap`] accepts, in tiles.
pub const MAX_MAP_SIDE: u32 = 4096;

/// Row-major tile storage.
#[derive(Debug, Clone)]
pub struct Tilemap {
    tiles: Vec<Tile>,
    width: u32,
    height: u32,
}

impl Tilemap {
    /// Sides longer than [`MAX_MAP_SIDE`] are clamped.
    pub fn new(width: u32, height: u32) -> Self {
        if width > MAX_MAP_SIDE || height > MAX_MAP_SIDE {
            log::warn!(
                "Map {}x{} exceeds {} tiles per side, clamping",
                width,
                height,
                MAX_MAP_SIDE
            );
        }
        let width = width.min(MAX_MAP_SIDE);
        let height = height.min(MAX_MAP_SIDE);
        Self {
            tiles: vec![Tile::default(); width as usize * height as usize],
            width,
            height,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn index(&self, pos: TilePos) -> Option<usize> {
        if pos.i < 0 || pos.j < 0 || pos.i >= self.width as i32 || pos.j >= self.height as i32 {
            return None;
        }
        Some(pos.j as usize * self.width as usize + pos.i as usize)
    }

    pub fn tile(&self, pos: TilePos) -> Option<&Tile> {
        self.index(pos).map(|idx| &self.tiles[idx])
    }

    pub fn tile_mut(&mut self, pos: TilePos) -> Option<&mut Tile> {
        self.index(pos).map(move |idx| &mut self.tiles[idx])
    }

    pub fn set_road(&mut self, pos: TilePos, road: bool) {
        if let Some(tile) = self.tile_mut(pos) {
            tile.road = road;
        }
    }

    pub fn set_water(&mut self, pos: TilePos, water: bool) {
        if let Some(tile) = self.tile_mut(pos) {
            tile.water = water;
        }
    }

    pub fn set_blocked(&mut self, pos: TilePos, blocked: bool) {
        if let Some(tile) = self.tile_mut(pos) {
            tile.blocked = blocked;
        }
    }

    /// Copy of the whole desirability field, row-major.
    pub fn desirability_field(&self) -> Vec<i32> {
        self.tiles.iter().map(|t| t.desirability).collect()
    }
}

impl TileGrid for Tilemap {
    fn contains(&self, pos: TilePos) -> bool {
        self.index(pos).is_some()
    }

    fn is_buildable(&self, pos: TilePos) -> bool {
        self.tile(pos)
            .is_some_and(|t| !t.road && !t.water && !t.blocked && t.occupant.is_none())
    }

    fn is_road(&self, pos: TilePos) -> bool {
        self.tile(pos).is_some_and(|t| t.road)
    }

    fn occupant(&self, pos: TilePos) -> Option<OverlayId> {
        self.tile(pos).and_then(|t| t.occupant)
    }

    fn set_occupant(&mut self, pos: TilePos, occupant: Option<OverlayId>) {
        if let Some(tile) = self.tile_mut(pos) {
            tile.occupant = occupant;
        }
    }

    fn desirability(&self, pos: TilePos) -> i32 {
        self.tile(pos).map_or(0, |t| t.desirability)
    }

    fn add_desirability(&mut self, pos: TilePos, delta: i32) {
        if let Some(tile) = self.tile_mut(pos) {
            tile.desirability += delta;
        }
    }
}
