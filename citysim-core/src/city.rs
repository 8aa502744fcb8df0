//! Local city map and the buildings standing on it.
//!
//! [`City`] owns the tile grid and an arena of [`Building`]s. Buildings are
//! addressed by [`OverlayId`] (a versioned slot key), so a handle kept
//! across a removal resolves to `None` rather than to a newer building.
//!
//! Per tick, buildings are advanced in slot order, then disasters are applied
//! over a snapshot of handles, then deleted buildings are swept. Nothing is
//! removed from the arena while it is being walked.

use crate::arena::{Arena, OverlayId};
use crate::building::{Building, ServiceTarget, TraineeTarget};
use crate::catalog::{BuildingType, ServiceType, TraineeType};
use crate::config::SimConfig;
use crate::geometry::{Size, TilePos};
use crate::grid::{TileGrid, Tilemap};
use crate::overlay::{Construction, OverlayError, Ruin, RuinSite};
use tracing::instrument;

/// Something that happened to a building.
#[derive(Debug, Clone, PartialEq)]
pub enum CityEvent {
    Built {
        id: OverlayId,
        kind: BuildingType,
        pos: TilePos,
    },
    Destroyed {
        id: OverlayId,
        kind: BuildingType,
    },
    Burned {
        id: OverlayId,
        kind: BuildingType,
        site: RuinSite,
    },
    Collapsed {
        id: OverlayId,
        kind: BuildingType,
        site: RuinSite,
    },
    /// Dropped from the simulation by the sweep.
    Removed {
        id: OverlayId,
        kind: BuildingType,
    },
}

#[derive(Debug)]
pub struct City {
    map: Tilemap,
    buildings: Arena<Building>,
    config: SimConfig,
    ruins: Vec<RuinSite>,
    pending: Vec<CityEvent>,
}

impl City {
    pub fn new(map: Tilemap, config: &SimConfig) -> Self {
        Self {
            map,
            buildings: Arena::new(),
            config: config.clone(),
            ruins: Vec::new(),
            pending: Vec::new(),
        }
    }

    pub fn map(&self) -> &Tilemap {
        &self.map
    }

    /// Lay or lift a road and refresh the access roads of adjacent buildings.
    pub fn set_road(&mut self, pos: TilePos, road: bool) {
        self.map.set_road(pos, road);
        self.recompute_access_roads_near(pos);
    }

    pub fn set_blocked(&mut self, pos: TilePos, blocked: bool) {
        self.map.set_blocked(pos, blocked);
    }

    pub fn can_build(&self, kind: BuildingType, pos: TilePos) -> bool {
        Construction::new(kind).can_build(&self.map, pos)
    }

    /// Place a new building of `kind` with its master tile at `pos`.
    pub fn build(&mut self, kind: BuildingType, pos: TilePos) -> Result<OverlayId, OverlayError> {
        if !self.can_build(kind, pos) {
            log::debug!("Cannot build {} at {}", kind, pos);
            return Err(OverlayError::CannotBuild { kind, pos });
        }
        let id = self.buildings.insert(Building::new(kind));
        let Some(building) = self.buildings.get_mut(id) else {
            return Err(OverlayError::NotFound(id));
        };
        if let Err(err) = building.build(&mut self.map, pos, id) {
            building.delete_later();
            self.buildings.delete_later(id);
            return Err(err);
        }
        log::info!("Built {} at {} as {}", kind, pos, id);
        self.pending.push(CityEvent::Built { id, kind, pos });
        Ok(id)
    }

    /// Tear a building down now: tiles are released and desirability reverted.
    /// The entry itself is dropped at the next sweep.
    pub fn destroy(&mut self, id: OverlayId) -> Result<(), OverlayError> {
        let building = self
            .buildings
            .get_mut(id)
            .ok_or(OverlayError::NotFound(id))?;
        if building.is_deleted() {
            return Err(OverlayError::Deleted(building.kind()));
        }
        let kind = building.kind();
        building.destroy(&mut self.map);
        self.buildings.delete_later(id);
        self.pending.push(CityEvent::Destroyed { id, kind });
        Ok(())
    }

    /// Mark for removal without touching the map; the sweep tears it down.
    pub fn delete_later(&mut self, id: OverlayId) -> bool {
        match self.buildings.get_mut(id) {
            Some(building) => {
                building.delete_later();
                self.buildings.delete_later(id)
            }
            None => {
                log::debug!("delete_later on unknown overlay {}", id);
                false
            }
        }
    }

    pub fn overlay(&self, id: OverlayId) -> Option<&Building> {
        self.buildings.get(id)
    }

    pub fn overlay_mut(&mut self, id: OverlayId) -> Option<&mut Building> {
        self.buildings.get_mut(id)
    }

    /// Building whose footprint covers `pos`.
    pub fn overlay_at(&self, pos: TilePos) -> Option<OverlayId> {
        self.map
            .occupant(pos)
            .filter(|id| self.buildings.contains(*id))
    }

    pub fn buildings(&self) -> impl Iterator<Item = (OverlayId, &Building)> + '_ {
        self.buildings.iter()
    }

    pub fn active_count(&self) -> usize {
        self.buildings.iter().filter(|(_, b)| b.is_active()).count()
    }

    /// Ruins left by fires and collapses, oldest first.
    pub fn ruins(&self) -> &[RuinSite] {
        &self.ruins
    }

    /// Refresh cached access roads of every building orthogonally next to `pos`.
    pub fn recompute_access_roads_near(&mut self, pos: TilePos) {
        let mut neighbours: Vec<OverlayId> = self
            .map
            .ring(pos, Size::square(1), 1)
            .into_iter()
            .filter_map(|tile| self.map.occupant(tile))
            .collect();
        neighbours.sort();
        neighbours.dedup();

        for id in neighbours {
            if let Some(building) = self.buildings.get_mut(id) {
                building.construction_mut().compute_access_roads(&self.map);
            }
        }
    }

    /// Candidate with the highest positive score for `service`.
    pub fn best_service_target(
        &self,
        service: ServiceType,
        candidates: &[OverlayId],
    ) -> Option<OverlayId> {
        candidates
            .iter()
            .filter_map(|id| Some((*id, self.buildings.get(*id)?.evaluate_service(service))))
            .filter(|(_, score)| *score > 0.0)
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id)
    }

    /// Building with the highest positive score for `trainee`.
    pub fn best_trainee_target(&self, trainee: TraineeType) -> Option<OverlayId> {
        self.buildings
            .iter()
            .map(|(id, b)| (id, b.evaluate_trainee(trainee)))
            .filter(|(_, score)| *score > 0)
            .max_by_key(|(_, score)| *score)
            .map(|(id, _)| id)
    }

    /// Advance one tick and return everything that happened since the last call.
    #[instrument(skip_all, name = "city")]
    pub fn time_step(&mut self, time: u64) -> Vec<CityEvent> {
        let mut events = std::mem::take(&mut self.pending);

        {
            let _span = tracing::info_span!("buildings", count = self.buildings.len()).entered();
            for (_, building) in self.buildings.iter_mut() {
                building.time_step(time);
            }
        }

        for id in self.buildings.handles() {
            let Some(building) = self.buildings.get_mut(id) else {
                continue;
            };
            if building.is_deleted() {
                self.buildings.delete_later(id);
                continue;
            }
            let kind = building.kind();
            let outcome = if building.fire_level() >= self.config.fire_threshold {
                building.burn(&mut self.map)
            } else if building.damage_level() >= self.config.collapse_threshold {
                building.collapse(&mut self.map)
            } else {
                None
            };
            let Some(site) = outcome else {
                continue;
            };
            self.buildings.delete_later(id);
            self.ruins.push(site);
            match site.ruin {
                Ruin::Burning => {
                    log::info!("{} {} burned down at {}", kind, id, site.pos);
                    events.push(CityEvent::Burned { id, kind, site });
                }
                Ruin::Collapsed => {
                    log::info!("{} {} collapsed at {}", kind, id, site.pos);
                    events.push(CityEvent::Collapsed { id, kind, site });
                }
            }
        }

        if self.config.is_sweep_tick(time) {
            events.extend(self.sweep());
        }
        events
    }

    /// Drop deleted buildings, finishing teardown for any marked with
    /// `delete_later` that still stand on the map.
    pub fn sweep(&mut self) -> Vec<CityEvent> {
        let removed = self.buildings.sweep();
        if !removed.is_empty() {
            log::trace!("Swept {} overlays", removed.len());
        }
        removed
            .into_iter()
            .map(|(id, mut building)| {
                building.destroy(&mut self.map);
                CityEvent::Removed {
                    id,
                    kind: building.kind(),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::CityBuilder;

    #[test]
    fn test_build_and_lookup() {
        let mut city = CityBuilder::new(20, 20).with_road_row(5).build();
        let id = city.build(BuildingType::Prefecture, TilePos::new(3, 4)).unwrap();

        assert_eq!(city.overlay_at(TilePos::new(3, 4)), Some(id));
        assert_eq!(city.overlay(id).unwrap().kind(), BuildingType::Prefecture);
        assert!(city.build(BuildingType::Prefecture, TilePos::new(3, 4)).is_err());
        assert_eq!(city.active_count(), 1);

        let events = city.time_step(1);
        assert!(events.contains(&CityEvent::Built {
            id,
            kind: BuildingType::Prefecture,
            pos: TilePos::new(3, 4)
        }));
    }

    #[test]
    fn test_build_without_road_fails() {
        let mut city = CityBuilder::new(20, 20).build();
        let err = city.build(BuildingType::Market, TilePos::new(3, 3)).unwrap_err();
        assert!(matches!(err, OverlayError::CannotBuild { .. }));
        assert_eq!(city.buildings().count(), 0);
    }

    #[test]
    fn test_destroy_restores_map() {
        let mut city = CityBuilder::new(20, 20).build();
        let before = city.map().desirability_field();
        let id = city.build(BuildingType::BigStatue, TilePos::new(8, 8)).unwrap();
        city.destroy(id).unwrap();

        assert_eq!(city.map().desirability_field(), before);
        assert_eq!(city.overlay_at(TilePos::new(8, 8)), None);
        // Entry stays resolvable until the sweep
        assert!(city.overlay(id).unwrap().is_deleted());
        city.time_step(1);
        assert!(city.overlay(id).is_none());
    }

    #[test]
    fn test_delete_later_tears_down_on_sweep() {
        let mut city = CityBuilder::new(20, 20).build();
        let before = city.map().desirability_field();
        let id = city.build(BuildingType::MediumStatue, TilePos::new(4, 4)).unwrap();
        assert!(city.delete_later(id));
        assert_ne!(city.map().desirability_field(), before);

        let events = city.sweep();
        assert_eq!(
            events,
            vec![CityEvent::Removed {
                id,
                kind: BuildingType::MediumStatue
            }]
        );
        assert_eq!(city.map().desirability_field(), before);
        assert!(city.can_build(BuildingType::MediumStatue, TilePos::new(4, 4)));
    }

    #[test]
    fn test_stale_handle_after_reuse() {
        let mut city = CityBuilder::new(20, 20).build();
        let old = city.build(BuildingType::SmallStatue, TilePos::new(1, 1)).unwrap();
        city.destroy(old).unwrap();
        city.sweep();
        let new = city.build(BuildingType::SmallStatue, TilePos::new(1, 1)).unwrap();
        assert_ne!(old, new);
        assert!(city.overlay(old).is_none());
        assert!(city.overlay(new).is_some());
    }

    #[test]
    fn test_building_burns_at_threshold() {
        let mut city = CityBuilder::new(20, 20).with_road_row(0).build();
        let id = city.build(BuildingType::Prefecture, TilePos::new(2, 1)).unwrap();

        let mut burned = None;
        for time in 1..=100 {
            for event in city.time_step(time) {
                if let CityEvent::Burned { site, .. } = event {
                    burned = Some((time, site));
                }
            }
        }
        let (time, site) = burned.unwrap();
        assert_eq!(time, 100);
        assert_eq!(site.pos, TilePos::new(2, 1));
        assert_eq!(city.ruins().len(), 1);
        assert!(city.overlay(id).is_none());
    }

    #[test]
    fn test_building_collapses_when_fire_is_watched() {
        let config = SimConfig {
            collapse_threshold: 10.0,
            ..SimConfig::default()
        };
        let mut city = CityBuilder::new(20, 20)
            .with_road_row(0)
            .with_config(config)
            .build();
        let id = city.build(BuildingType::Temple, TilePos::new(2, 1)).unwrap();

        let mut collapsed = false;
        for time in 1..=10 {
            if let Some(b) = city.overlay_mut(id) {
                b.apply_service(ServiceType::Prefect);
            }
            collapsed |= city
                .time_step(time)
                .iter()
                .any(|e| matches!(e, CityEvent::Collapsed { .. }));
        }
        assert!(collapsed);
        assert_eq!(city.ruins()[0].ruin, Ruin::Collapsed);
    }

    #[test]
    fn test_statues_never_burn() {
        let mut city = CityBuilder::new(20, 20).build();
        let id = city.build(BuildingType::SmallStatue, TilePos::new(5, 5)).unwrap();
        for time in 1..=500 {
            city.time_step(time);
        }
        assert!(city.overlay(id).unwrap().is_active());
    }

    #[test]
    fn test_road_change_refreshes_access() {
        let mut city = CityBuilder::new(20, 20).with_road_row(5).build();
        let id = city.build(BuildingType::EngineerPost, TilePos::new(4, 4)).unwrap();
        assert_eq!(city.overlay(id).unwrap().construction().access_roads().len(), 1);

        city.set_road(TilePos::new(5, 4), true);
        assert_eq!(city.overlay(id).unwrap().construction().access_roads().len(), 2);
        city.set_road(TilePos::new(4, 5), false);
        assert_eq!(
            city.overlay(id).unwrap().construction().access_roads(),
            &[TilePos::new(5, 4)]
        );
    }

    #[test]
    fn test_best_service_target() {
        let mut city = CityBuilder::new(30, 30).with_road_row(0).build();
        let a = city.build(BuildingType::Prefecture, TilePos::new(1, 1)).unwrap();
        let b = city.build(BuildingType::Market, TilePos::new(4, 1)).unwrap();
        let c = city.build(BuildingType::SmallStatue, TilePos::new(10, 10)).unwrap();

        city.overlay_mut(a).unwrap().set_fire_level(20.0);
        city.overlay_mut(b).unwrap().set_fire_level(60.0);

        let candidates = [a, b, c];
        assert_eq!(city.best_service_target(ServiceType::Prefect, &candidates), Some(b));

        city.overlay_mut(b).unwrap().reserve_service(ServiceType::Prefect);
        assert_eq!(city.best_service_target(ServiceType::Prefect, &candidates), Some(a));
        assert_eq!(city.best_service_target(ServiceType::Engineer, &candidates), None);
    }

    #[test]
    fn test_best_trainee_target() {
        let mut city = CityBuilder::new(40, 40).with_road_row(0).build();
        let theater = city.build(BuildingType::Theater, TilePos::new(1, 1)).unwrap();
        let amph = city.build(BuildingType::Amphitheater, TilePos::new(4, 1)).unwrap();

        city.overlay_mut(theater).unwrap().apply_trainee(TraineeType::Actor);
        assert_eq!(city.best_trainee_target(TraineeType::Actor), Some(amph));
        assert_eq!(city.best_trainee_target(TraineeType::Gladiator), Some(amph));
        assert_eq!(city.best_trainee_target(TraineeType::Charioteer), None);
    }
}
