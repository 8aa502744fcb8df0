//! Spatial overlays and constructions.
//!
//! An [`Overlay`] is anything occupying one or more tiles: it owns the
//! footprint, the visual-state handle and the lifecycle state machine
//! (`Placing -> Active -> Deleted`). A [`Construction`] adds buildability
//! rules, the cached list of adjacent road tiles, and the desirability
//! influence it radiates while standing.
//!
//! Desirability is applied on build and reverted on destroy/burn/collapse
//! through the same routine with the sign flipped, so the two are exact
//! inverses on the integer field.

use crate::arena::OverlayId;
use crate::catalog::{policy, BuildingClass, BuildingPolicy, BuildingType, Desirability};
use crate::geometry::{Size, TilePos};
use crate::grid::TileGrid;
use crate::persist::{self, Persist, PersistError, VariantMap};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lifecycle of an overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayState {
    /// Created but not yet bound to the map.
    Placing,
    /// On the map and simulated every tick.
    Active,
    /// Retired; dropped from the simulation at the next sweep. Never reset.
    Deleted,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OverlayError {
    #[error("{kind} at {pos} is already built")]
    AlreadyBuilt { kind: BuildingType, pos: TilePos },
    #[error("{0} has been deleted")]
    Deleted(BuildingType),
    #[error("cannot build {kind} at {pos}")]
    CannotBuild { kind: BuildingType, pos: TilePos },
    #[error("overlay {0} not found")]
    NotFound(OverlayId),
}

/// Opaque visual state: rendering lives elsewhere, the core only tracks names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Picture {
    pub name: String,
    pub foreground: Vec<String>,
    pub frame: u32,
}

impl Picture {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            foreground: Vec::new(),
            frame: 0,
        }
    }

    /// Advance the animation, wrapping after `frames` pictures.
    pub fn advance(&mut self, frames: u32) {
        if frames > 0 {
            self.frame = (self.frame + 1) % frames;
        }
    }
}

/// What an overlay leaves behind when it is retired by disaster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ruin {
    Burning,
    Collapsed,
}

/// Footprint left by a burned or collapsed overlay, for the owner to fill with ruins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuinSite {
    pub ruin: Ruin,
    pub pos: TilePos,
    pub size: Size,
}

/// Base of every map object.
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    kind: BuildingType,
    size: Size,
    pos: Option<TilePos>,
    name: String,
    picture: Picture,
    state: OverlayState,
}

impl Overlay {
    pub fn new(kind: BuildingType, size: Size) -> Self {
        Self {
            kind,
            size,
            pos: None,
            name: kind.name().to_string(),
            picture: Picture::new(kind.name()),
            state: OverlayState::Placing,
        }
    }

    pub fn kind(&self) -> BuildingType {
        self.kind
    }

    pub fn set_kind(&mut self, kind: BuildingType) {
        self.kind = kind;
    }

    pub fn class(&self) -> BuildingClass {
        self.kind.class()
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn set_size(&mut self, size: Size) {
        self.size = size;
    }

    /// Master tile (top-left of the footprint), once built.
    pub fn tile_pos(&self) -> Option<TilePos> {
        self.pos
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn picture(&self) -> &Picture {
        &self.picture
    }

    pub fn picture_mut(&mut self) -> &mut Picture {
        &mut self.picture
    }

    pub fn foreground_pictures(&self) -> &[String] {
        &self.picture.foreground
    }

    pub fn state(&self) -> OverlayState {
        self.state
    }

    pub fn is_deleted(&self) -> bool {
        self.state == OverlayState::Deleted
    }

    pub fn is_active(&self) -> bool {
        self.state == OverlayState::Active
    }

    pub fn is_walkable(&self) -> bool {
        policy(self.kind).walkable
    }

    /// Mark for removal without touching the map.
    pub fn delete_later(&mut self) {
        self.state = OverlayState::Deleted;
    }

    /// Tiles covered by the footprint, or nothing before build.
    pub fn footprint(&self, grid: &dyn TileGrid) -> Vec<TilePos> {
        match self.pos {
            Some(pos) => grid.area(pos, self.size),
            None => Vec::new(),
        }
    }

    /// Bind the master tile and mark the footprint as occupied by `id`.
    pub fn build(
        &mut self,
        grid: &mut dyn TileGrid,
        pos: TilePos,
        id: OverlayId,
    ) -> Result<(), OverlayError> {
        match self.state {
            OverlayState::Placing => {}
            OverlayState::Active => {
                return Err(OverlayError::AlreadyBuilt {
                    kind: self.kind,
                    pos,
                })
            }
            OverlayState::Deleted => return Err(OverlayError::Deleted(self.kind)),
        }
        self.pos = Some(pos);
        for tile in grid.area(pos, self.size) {
            grid.set_occupant(tile, Some(id));
        }
        self.state = OverlayState::Active;
        Ok(())
    }

    /// Release every tile this overlay still occupies and mark it deleted.
    pub fn destroy(&mut self, grid: &mut dyn TileGrid) {
        if let Some(pos) = self.pos {
            let mine = grid.occupant(pos);
            for tile in grid.area(pos, self.size) {
                if grid.occupant(tile) == mine {
                    grid.set_occupant(tile, None);
                }
            }
        }
        self.state = OverlayState::Deleted;
    }
}

impl Persist for Overlay {
    fn save(&self, stream: &mut VariantMap) -> Result<(), PersistError> {
        persist::put(stream, "type", &self.kind)?;
        persist::put(stream, "size", &[self.size.width(), self.size.height()])?;
        persist::put(stream, "pos", &self.pos)?;
        persist::put(stream, "name", &self.name)?;
        persist::put(stream, "picture", &self.picture)?;
        persist::put(stream, "state", &self.state)?;
        Ok(())
    }

    fn load(&mut self, stream: &VariantMap) -> Result<(), PersistError> {
        let [width, height]: [u32; 2] = persist::get(stream, "size")?;
        self.kind = persist::get(stream, "type")?;
        self.size = Size::new(width, height);
        self.pos = persist::get(stream, "pos")?;
        self.name = persist::get_or(stream, "name", self.kind.name().to_string())?;
        self.picture = persist::get_or(stream, "picture", Picture::new(self.kind.name()))?;
        self.state = persist::get(stream, "state")?;
        Ok(())
    }
}

/// Sign of a desirability update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DesirabilityUpdate {
    Positive,
    Negative,
}

impl DesirabilityUpdate {
    fn sign(self) -> i32 {
        match self {
            DesirabilityUpdate::Positive => 1,
            DesirabilityUpdate::Negative => -1,
        }
    }
}

/// An overlay with buildability rules, road access and desirability influence.
#[derive(Debug, Clone, PartialEq)]
pub struct Construction {
    overlay: Overlay,
    access_roads: Vec<TilePos>,
    influence_applied: bool,
}

impl Construction {
    pub fn new(kind: BuildingType) -> Self {
        let p = policy(kind);
        Self {
            overlay: Overlay::new(kind, Size::new(p.width, p.height)),
            access_roads: Vec::new(),
            influence_applied: false,
        }
    }

    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    pub fn overlay_mut(&mut self) -> &mut Overlay {
        &mut self.overlay
    }

    fn policy(&self) -> &'static BuildingPolicy {
        policy(self.overlay.kind)
    }

    pub fn is_need_road_access(&self) -> bool {
        self.policy().needs_road_access
    }

    pub fn max_distance_to_road(&self) -> u32 {
        self.policy().max_distance_to_road
    }

    pub fn desirability(&self) -> Desirability {
        self.policy().desirability
    }

    pub fn desirability_influence(&self) -> i32 {
        self.desirability().influence
    }

    pub fn desirability_range(&self) -> u32 {
        self.desirability().range
    }

    pub fn desirability_step(&self) -> i32 {
        self.desirability().step
    }

    /// Whether the influence is currently applied to the map.
    pub fn is_influence_applied(&self) -> bool {
        self.influence_applied
    }

    /// Road tiles adjacent to the footprint, as of the last computation.
    pub fn access_roads(&self) -> &[TilePos] {
        &self.access_roads
    }

    /// Pure placement check: every footprint tile is buildable and, when the
    /// kind needs one, a road lies within the allowed distance.
    pub fn can_build(&self, grid: &dyn TileGrid, pos: TilePos) -> bool {
        let size = self.overlay.size;
        let area = grid.area(pos, size);
        if area.len() != size.area() as usize || !area.iter().all(|t| grid.is_buildable(*t)) {
            return false;
        }
        if !self.is_need_road_access() {
            return true;
        }
        (1..=self.max_distance_to_road())
            .any(|d| grid.ring(pos, size, d).iter().any(|t| grid.is_road(*t)))
    }

    /// Validate, bind to the map, cache access roads and radiate desirability.
    pub fn build(
        &mut self,
        grid: &mut dyn TileGrid,
        pos: TilePos,
        id: OverlayId,
    ) -> Result<(), OverlayError> {
        if self.overlay.is_deleted() {
            return Err(OverlayError::Deleted(self.overlay.kind));
        }
        if self.overlay.is_active() {
            return Err(OverlayError::AlreadyBuilt {
                kind: self.overlay.kind,
                pos,
            });
        }
        if !self.can_build(grid, pos) {
            return Err(OverlayError::CannotBuild {
                kind: self.overlay.kind,
                pos,
            });
        }
        self.overlay.build(grid, pos, id)?;
        self.compute_access_roads(grid);
        self.update_desirability_influence(grid, DesirabilityUpdate::Positive);
        Ok(())
    }

    /// Replace the cached road list with the roads in the ring around the footprint.
    pub fn compute_access_roads(&mut self, grid: &dyn TileGrid) {
        self.access_roads = match self.overlay.pos {
            Some(pos) => grid
                .ring(pos, self.overlay.size, 1)
                .into_iter()
                .filter(|t| grid.is_road(*t))
                .collect(),
            None => Vec::new(),
        };
    }

    /// Remove from the map, reverting desirability. Idempotent.
    pub fn destroy(&mut self, grid: &mut dyn TileGrid) {
        if self.overlay.is_deleted() && !self.influence_applied {
            return;
        }
        if self.influence_applied {
            self.update_desirability_influence(grid, DesirabilityUpdate::Negative);
        }
        self.access_roads.clear();
        self.overlay.destroy(grid);
    }

    /// Destroy by fire. Returns the site to cover with burning ruins.
    pub fn burn(&mut self, grid: &mut dyn TileGrid) -> Option<RuinSite> {
        self.retire(grid, Ruin::Burning)
    }

    /// Destroy by structural failure. Returns the site to cover with rubble.
    pub fn collapse(&mut self, grid: &mut dyn TileGrid) -> Option<RuinSite> {
        self.retire(grid, Ruin::Collapsed)
    }

    fn retire(&mut self, grid: &mut dyn TileGrid, ruin: Ruin) -> Option<RuinSite> {
        if !self.overlay.is_active() {
            return None;
        }
        let pos = self.overlay.pos?;
        self.destroy(grid);
        Some(RuinSite {
            ruin,
            pos,
            size: self.overlay.size,
        })
    }

    /// Apply (`Positive`) or revert (`Negative`) the desirability influence.
    ///
    /// Applying twice in the same direction is ignored so the field can never
    /// drift away from its pre-build values.
    pub fn update_desirability_influence(
        &mut self,
        grid: &mut dyn TileGrid,
        update: DesirabilityUpdate,
    ) {
        let wanted = update == DesirabilityUpdate::Positive;
        if self.influence_applied == wanted {
            return;
        }
        let Some(pos) = self.overlay.pos else {
            return;
        };
        let dsrbl = self.desirability();
        let mul = update.sign();
        let size = self.overlay.size;

        for tile in grid.area(pos, size) {
            grid.add_desirability(tile, mul * dsrbl.influence);
        }
        let mut current = mul * dsrbl.influence;
        for range in 1..=dsrbl.range {
            for tile in grid.ring(pos, size, range) {
                grid.add_desirability(tile, current);
            }
            current += mul * dsrbl.step;
        }
        self.influence_applied = wanted;
    }
}

impl Persist for Construction {
    fn save(&self, stream: &mut VariantMap) -> Result<(), PersistError> {
        self.overlay.save(stream)?;
        persist::put(stream, "influenceApplied", &self.influence_applied)?;
        Ok(())
    }

    fn load(&mut self, stream: &VariantMap) -> Result<(), PersistError> {
        self.overlay.load(stream)?;
        self.influence_applied = persist::get_or(stream, "influenceApplied", false)?;
        // Road cache is derived from the map; the owner recomputes it after load.
        self.access_roads.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Arena;
    use crate::grid::Tilemap;

    fn handle() -> OverlayId {
        Arena::new().insert(())
    }

    fn map_with_road_row(width: u32, height: u32, row: i32) -> Tilemap {
        let mut map = Tilemap::new(width, height);
        for i in 0..width as i32 {
            map.set_road(TilePos::new(i, row), true);
        }
        map
    }

    #[test]
    fn test_can_build_requires_road() {
        let map = Tilemap::new(10, 10);
        let prefecture = Construction::new(BuildingType::Prefecture);
        assert!(!prefecture.can_build(&map, TilePos::new(3, 3)));

        let map = map_with_road_row(10, 10, 4);
        assert!(prefecture.can_build(&map, TilePos::new(3, 3)));
        // Footprint on the road itself
        assert!(!prefecture.can_build(&map, TilePos::new(3, 4)));
    }

    #[test]
    fn test_statue_builds_without_road() {
        let map = Tilemap::new(10, 10);
        let statue = Construction::new(BuildingType::SmallStatue);
        assert!(statue.can_build(&map, TilePos::new(5, 5)));
    }

    #[test]
    fn test_can_build_rejects_footprint_off_map() {
        let map = Tilemap::new(10, 10);
        let statue = Construction::new(BuildingType::BigStatue);
        assert!(!statue.can_build(&map, TilePos::new(8, 8)));
        assert!(statue.can_build(&map, TilePos::new(7, 7)));
    }

    #[test]
    fn test_can_build_rejects_occupied() {
        let mut map = Tilemap::new(10, 10);
        let mut statue = Construction::new(BuildingType::MediumStatue);
        statue.build(&mut map, TilePos::new(2, 2), handle()).unwrap();

        let other = Construction::new(BuildingType::SmallStatue);
        assert!(!other.can_build(&map, TilePos::new(3, 3)));
        assert!(other.can_build(&map, TilePos::new(4, 4)));
    }

    #[test]
    fn test_wheat_farm_reaches_road_two_tiles_away() {
        let map = map_with_road_row(10, 10, 6);
        let farm = Construction::new(BuildingType::WheatFarm);
        // Footprint rows 2..=4, road row 6 is at distance 2
        assert!(farm.can_build(&map, TilePos::new(2, 2)));
        let post = Construction::new(BuildingType::EngineerPost);
        assert!(!post.can_build(&map, TilePos::new(2, 4)));
    }

    #[test]
    fn test_build_marks_occupancy_and_access_roads() {
        let mut map = map_with_road_row(10, 10, 5);
        let id = handle();
        let mut theater = Construction::new(BuildingType::Theater);
        theater.build(&mut map, TilePos::new(2, 3), id).unwrap();

        assert_eq!(theater.overlay().state(), OverlayState::Active);
        assert_eq!(theater.overlay().tile_pos(), Some(TilePos::new(2, 3)));
        for tile in map.area(TilePos::new(2, 3), Size::square(2)) {
            assert_eq!(map.occupant(tile), Some(id));
        }
        assert_eq!(
            theater.access_roads(),
            &[TilePos::new(2, 5), TilePos::new(3, 5)]
        );
    }

    #[test]
    fn test_build_twice_fails() {
        let mut map = Tilemap::new(10, 10);
        let mut statue = Construction::new(BuildingType::SmallStatue);
        statue.build(&mut map, TilePos::new(1, 1), handle()).unwrap();
        let err = statue
            .build(&mut map, TilePos::new(5, 5), handle())
            .unwrap_err();
        assert!(matches!(err, OverlayError::AlreadyBuilt { .. }));
    }

    #[test]
    fn test_compute_access_roads_replaces_cache() {
        let mut map = map_with_road_row(10, 10, 5);
        let mut post = Construction::new(BuildingType::EngineerPost);
        post.build(&mut map, TilePos::new(4, 4), handle()).unwrap();
        assert_eq!(post.access_roads(), &[TilePos::new(4, 5)]);

        map.set_road(TilePos::new(4, 5), false);
        map.set_road(TilePos::new(3, 4), true);
        post.compute_access_roads(&map);
        assert_eq!(post.access_roads(), &[TilePos::new(3, 4)]);
    }

    #[test]
    fn test_build_then_destroy_restores_desirability() {
        let mut map = Tilemap::new(20, 20);
        let before = map.desirability_field();
        let mut statue = Construction::new(BuildingType::BigStatue);
        statue.build(&mut map, TilePos::new(8, 8), handle()).unwrap();
        assert_eq!(map.desirability(TilePos::new(8, 8)), 14);
        assert_eq!(map.desirability(TilePos::new(9, 7)), 14);
        assert_eq!(map.desirability(TilePos::new(9, 6)), 12);
        assert_ne!(map.desirability_field(), before);

        statue.destroy(&mut map);
        assert_eq!(map.desirability_field(), before);
        assert!(statue.overlay().is_deleted());
        assert_eq!(map.occupant(TilePos::new(8, 8)), None);
    }

    #[test]
    fn test_destroy_is_idempotent() {
        let mut map = Tilemap::new(10, 10);
        let before = map.desirability_field();
        let mut statue = Construction::new(BuildingType::SmallStatue);
        statue.build(&mut map, TilePos::new(4, 4), handle()).unwrap();
        statue.destroy(&mut map);
        statue.destroy(&mut map);
        assert_eq!(map.desirability_field(), before);
    }

    #[test]
    fn test_burn_reports_ruin_site() {
        let mut map = map_with_road_row(10, 10, 0);
        let before = map.desirability_field();
        let mut prefecture = Construction::new(BuildingType::Prefecture);
        prefecture
            .build(&mut map, TilePos::new(2, 1), handle())
            .unwrap();

        let site = prefecture.burn(&mut map).unwrap();
        assert_eq!(site.ruin, Ruin::Burning);
        assert_eq!(site.pos, TilePos::new(2, 1));
        assert_eq!(map.desirability_field(), before);
        assert!(prefecture.burn(&mut map).is_none());
    }

    #[test]
    fn test_walkable_and_retyping() {
        let mut overlay = Overlay::new(BuildingType::TriumphalArch, Size::square(3));
        assert!(overlay.is_walkable());
        assert!(overlay.foreground_pictures().is_empty());
        overlay
            .picture_mut()
            .foreground
            .push("arch_banner".to_string());
        assert_eq!(overlay.foreground_pictures(), &["arch_banner".to_string()]);

        overlay.set_kind(BuildingType::Prefecture);
        assert!(!overlay.is_walkable());
        assert_eq!(overlay.class(), BuildingClass::Security);
    }

    #[test]
    fn test_delete_later_is_monotonic() {
        let mut overlay = Overlay::new(BuildingType::Senate, Size::square(5));
        overlay.delete_later();
        assert!(overlay.is_deleted());
        let mut map = Tilemap::new(10, 10);
        let err = overlay.build(&mut map, TilePos::new(0, 0), handle());
        assert_eq!(err, Err(OverlayError::Deleted(BuildingType::Senate)));
        assert!(overlay.is_deleted());
    }

    #[test]
    fn test_overlay_save_load_roundtrip() {
        let mut map = Tilemap::new(10, 10);
        let mut statue = Construction::new(BuildingType::MediumStatue);
        statue.overlay_mut().set_name("Jupiter");
        statue.build(&mut map, TilePos::new(3, 3), handle()).unwrap();

        let mut stream = VariantMap::new();
        statue.save(&mut stream).unwrap();

        let mut restored = Construction::new(BuildingType::SmallStatue);
        restored.load(&stream).unwrap();
        assert_eq!(restored.overlay(), statue.overlay());
        assert!(restored.is_influence_applied());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn any_kind() -> impl Strategy<Value = BuildingType> {
            proptest::sample::select(BuildingType::ALL.to_vec())
        }

        proptest! {
            /// Property: build followed by destroy leaves the desirability field untouched.
            #[test]
            fn build_destroy_is_inverse(
                kind in any_kind(),
                i in 0..30i32,
                j in 0..30i32,
                road_row in 0..30i32,
            ) {
                let mut map = Tilemap::new(30, 30);
                for col in 0..30 {
                    map.set_road(TilePos::new(col, road_row), true);
                }
                let before = map.desirability_field();
                let mut construction = Construction::new(kind);
                if construction.build(&mut map, TilePos::new(i, j), Arena::new().insert(())).is_ok() {
                    construction.destroy(&mut map);
                }
                prop_assert_eq!(map.desirability_field(), before);
            }

            /// Property: burning is as exact an inverse as destroying.
            #[test]
            fn build_burn_is_inverse(side in 1..6u32, i in 0..20i32, j in 0..20i32) {
                let mut map = Tilemap::new(20, 20);
                let before = map.desirability_field();
                let mut construction = Construction::new(BuildingType::BigStatue);
                construction.overlay_mut().set_size(Size::square(side));
                if construction.build(&mut map, TilePos::new(i, j), Arena::new().insert(())).is_ok() {
                    prop_assert!(construction.burn(&mut map).is_some());
                }
                prop_assert_eq!(map.desirability_field(), before);
            }
        }
    }
}
