//! Buildings: decay counters and the service/trainee reservation protocols.
//!
//! A walker dispatcher (outside this crate) ranks candidates with
//! `evaluate_*`, commits with `reserve_*`, and on arrival calls `apply_*`.
//! It must always finish with `cancel_*`, whether or not the delivery
//! happened, so a kind can never stay reserved forever.

use crate::arena::OverlayId;
use crate::catalog::{policy, BuildingPolicy, BuildingType, ServiceType, TickBehavior, TraineeType};
use crate::geometry::TilePos;
use crate::goods::{GoodStock, GoodStore, GoodType, SimpleGoodStore};
use crate::grid::TileGrid;
use crate::overlay::{Construction, Overlay, OverlayError, RuinSite};
use crate::persist::{self, Persist, PersistError, VariantMap};
use std::collections::{BTreeMap, BTreeSet};

/// Target of service walkers (water, fire watch, repair, entertainment...).
pub trait ServiceTarget {
    /// Desire for a delivery of `service`. Scores `<= 0` mean "do not dispatch".
    fn evaluate_service(&self, service: ServiceType) -> f32;

    /// Mark a delivery as en route. Reserving an already reserved kind is a no-op.
    fn reserve_service(&mut self, service: ServiceType);

    /// Clear a reservation. Safe to call any number of times.
    fn cancel_service(&mut self, service: ServiceType);

    /// Perform the effect of a delivered service.
    fn apply_service(&mut self, service: ServiceType);

    fn is_service_reserved(&self, service: ServiceType) -> bool;
}

/// Target of trainee walkers (actors, gladiators, tamers, charioteers).
pub trait TraineeTarget {
    fn evaluate_trainee(&self, trainee: TraineeType) -> i32;

    fn reserve_trainee(&mut self, trainee: TraineeType);

    fn cancel_trainee(&mut self, trainee: TraineeType);

    fn apply_trainee(&mut self, trainee: TraineeType);

    fn trainee_level(&self, trainee: TraineeType) -> i32;
}

/// A construction with decay, staffing and optional storage.
#[derive(Debug, Clone, PartialEq)]
pub struct Building {
    construction: Construction,
    damage_level: f32,
    fire_level: f32,
    damage_increment: f32,
    fire_increment: f32,
    reserved_services: BTreeSet<ServiceType>,
    trainees: BTreeMap<TraineeType, i32>,
    reserved_trainees: BTreeSet<TraineeType>,
    store: Option<SimpleGoodStore>,
}

impl Building {
    pub fn new(kind: BuildingType) -> Self {
        let p = policy(kind);
        let store = p.storage.map(|s| {
            let mut store = SimpleGoodStore::with_max_qty(s.capacity);
            if s.food_only {
                for good in GoodType::ALL {
                    if !good.is_food() {
                        store.set_capacity(good, 0);
                    }
                }
            }
            store
        });
        Self {
            construction: Construction::new(kind),
            damage_level: 0.0,
            fire_level: 0.0,
            damage_increment: p.damage_increment,
            fire_increment: p.fire_increment,
            reserved_services: BTreeSet::new(),
            trainees: p.trainees.iter().map(|t| (*t, 0)).collect(),
            reserved_trainees: BTreeSet::new(),
            store,
        }
    }

    pub fn kind(&self) -> BuildingType {
        self.construction.overlay().kind()
    }

    fn policy(&self) -> &'static BuildingPolicy {
        policy(self.kind())
    }

    pub fn construction(&self) -> &Construction {
        &self.construction
    }

    pub fn construction_mut(&mut self) -> &mut Construction {
        &mut self.construction
    }

    pub fn overlay(&self) -> &Overlay {
        self.construction.overlay()
    }

    pub fn tile_pos(&self) -> Option<TilePos> {
        self.overlay().tile_pos()
    }

    pub fn is_deleted(&self) -> bool {
        self.overlay().is_deleted()
    }

    pub fn is_active(&self) -> bool {
        self.overlay().is_active()
    }

    pub fn build(
        &mut self,
        grid: &mut dyn TileGrid,
        pos: TilePos,
        id: OverlayId,
    ) -> Result<(), OverlayError> {
        self.construction.build(grid, pos, id)
    }

    pub fn destroy(&mut self, grid: &mut dyn TileGrid) {
        self.construction.destroy(grid);
    }

    pub fn delete_later(&mut self) {
        self.construction.overlay_mut().delete_later();
    }

    pub fn burn(&mut self, grid: &mut dyn TileGrid) -> Option<RuinSite> {
        self.construction.burn(grid)
    }

    pub fn collapse(&mut self, grid: &mut dyn TileGrid) -> Option<RuinSite> {
        self.construction.collapse(grid)
    }

    pub fn damage_level(&self) -> f32 {
        self.damage_level
    }

    pub fn set_damage_level(&mut self, level: f32) {
        self.damage_level = level;
    }

    pub fn fire_level(&self) -> f32 {
        self.fire_level
    }

    pub fn set_fire_level(&mut self, level: f32) {
        self.fire_level = level;
    }

    pub fn damage_increment(&self) -> f32 {
        self.damage_increment
    }

    pub fn fire_increment(&self) -> f32 {
        self.fire_increment
    }

    /// Kinds of trainee this building employs.
    pub fn employed_trainees(&self) -> &'static [TraineeType] {
        self.policy().trainees
    }

    pub fn reserved_services(&self) -> impl Iterator<Item = ServiceType> + '_ {
        self.reserved_services.iter().copied()
    }

    pub fn is_trainee_reserved(&self, trainee: TraineeType) -> bool {
        self.reserved_trainees.contains(&trainee)
    }

    pub fn store(&self) -> Option<&SimpleGoodStore> {
        self.store.as_ref()
    }

    /// Accumulate decay for one tick. Thresholds are acted on by the owner.
    pub fn time_step(&mut self, _time: u64) {
        if !self.is_active() {
            return;
        }
        self.damage_level += self.damage_increment;
        self.fire_level += self.fire_increment;

        if let TickBehavior::Animated { frames } = self.policy().tick {
            self.construction
                .overlay_mut()
                .picture_mut()
                .advance(frames);
        }
    }

    /// Move goods into this building's storage, if it has any.
    ///
    /// Returns the quantity accepted; `stock` is debited by the same amount.
    pub fn store_goods(&mut self, stock: &mut GoodStock, amount: Option<u32>) -> u32 {
        let kind = self.kind();
        match self.store.as_mut() {
            Some(store) => {
                let stored = store.store(stock, amount);
                if stored == 0 && !stock.is_empty() {
                    log::debug!("{} has no room for {}", kind, stock.kind);
                }
                stored
            }
            None => {
                log::warn!("{} should not store goods", kind);
                0
            }
        }
    }
}

impl ServiceTarget for Building {
    fn evaluate_service(&self, service: ServiceType) -> f32 {
        if !self.is_active() || self.reserved_services.contains(&service) {
            return 0.0;
        }
        match service {
            ServiceType::Engineer => self.damage_level,
            ServiceType::Prefect => self.fire_level,
            _ => 0.0,
        }
    }

    fn reserve_service(&mut self, service: ServiceType) {
        if self.is_active() {
            self.reserved_services.insert(service);
        }
    }

    fn cancel_service(&mut self, service: ServiceType) {
        self.reserved_services.remove(&service);
    }

    fn apply_service(&mut self, service: ServiceType) {
        self.reserved_services.remove(&service);
        if !self.is_active() {
            return;
        }
        match service {
            ServiceType::Engineer => self.damage_level = 0.0,
            ServiceType::Prefect => self.fire_level = 0.0,
            _ => {}
        }
    }

    fn is_service_reserved(&self, service: ServiceType) -> bool {
        self.reserved_services.contains(&service)
    }
}

impl TraineeTarget for Building {
    fn evaluate_trainee(&self, trainee: TraineeType) -> i32 {
        if !self.is_active() || self.reserved_trainees.contains(&trainee) {
            return 0;
        }
        match self.trainees.get(&trainee) {
            Some(level) => 101 - level,
            None => 0,
        }
    }

    fn reserve_trainee(&mut self, trainee: TraineeType) {
        if self.is_active() {
            self.reserved_trainees.insert(trainee);
        }
    }

    fn cancel_trainee(&mut self, trainee: TraineeType) {
        self.reserved_trainees.remove(&trainee);
    }

    fn apply_trainee(&mut self, trainee: TraineeType) {
        self.reserved_trainees.remove(&trainee);
        if !self.is_active() {
            return;
        }
        let capacity = self.policy().trainee_capacity;
        let Some(level) = self.trainees.get_mut(&trainee) else {
            log::debug!("{} does not employ {:?}", self.kind(), trainee);
            return;
        };
        *level += 100;
        if let Some(capacity) = capacity {
            *level = (*level).min(capacity);
        }
    }

    fn trainee_level(&self, trainee: TraineeType) -> i32 {
        self.trainees.get(&trainee).copied().unwrap_or(0)
    }
}

impl Persist for Building {
    fn save(&self, stream: &mut VariantMap) -> Result<(), PersistError> {
        self.construction.save(stream)?;
        persist::put(stream, "damageLevel", &self.damage_level)?;
        persist::put(stream, "fireLevel", &self.fire_level)?;
        persist::put(stream, "damageIncrement", &self.damage_increment)?;
        persist::put(stream, "fireIncrement", &self.fire_increment)?;
        persist::put(stream, "reservedServices", &self.reserved_services)?;
        persist::put(stream, "traineeMap", &self.trainees)?;
        persist::put(stream, "reservedTrainees", &self.reserved_trainees)?;
        persist::put(stream, "goodStore", &self.store)?;
        Ok(())
    }

    fn load(&mut self, stream: &VariantMap) -> Result<(), PersistError> {
        self.construction.load(stream)?;
        let p = self.policy();
        self.damage_level = persist::get(stream, "damageLevel")?;
        self.fire_level = persist::get(stream, "fireLevel")?;
        self.damage_increment = persist::get_or(stream, "damageIncrement", p.damage_increment)?;
        self.fire_increment = persist::get_or(stream, "fireIncrement", p.fire_increment)?;
        self.reserved_services = persist::get_or(stream, "reservedServices", BTreeSet::new())?;
        self.trainees = persist::get_or(stream, "traineeMap", BTreeMap::new())?;
        self.reserved_trainees = persist::get_or(stream, "reservedTrainees", BTreeSet::new())?;
        self.store = persist::get_or(stream, "goodStore", None)?;
        Ok(())
    }
}
