//! # City Simulation Core
//!
//! Tile-map city builder simulation: buildings placed on a grid, their
//! desirability influence, decay and disasters, plus the empire-level trade
//! network of merchants travelling between cities.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌─────────────┐
//! │    City     │     │    Empire    │     │  Observers  │
//! │ (tile map,  │     │ (cities,     │     │ (event log) │
//! │  buildings) │     │  routes)     │     │             │
//! └──────┬──────┘     └──────┬───────┘     └──────▲──────┘
//!        │                   │                    │
//!        └─────────┬─────────┘                    │
//!           ┌──────▼──────┐                ┌──────┴──────┐
//!           │ Simulation  │───────────────▶│  Snapshot   │
//!           │   (step)    │                │ (per tick)  │
//!           └─────────────┘                └─────────────┘
//! ```
//!
//! ## Key Types
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`Overlay`] | Anything occupying tiles: footprint, picture, lifecycle |
//! | [`Construction`] | Overlay with road access and desirability influence |
//! | [`Building`] | Construction with damage, fire, services and trainees |
//! | [`City`] | Tile map plus an arena of buildings |
//! | [`Empire`] | Cities of the world map and the trade routes between them |
//! | [`Simulation`] | Drives city and empire one tick at a time |
//!
//! Building kinds differ only through the [`catalog`] policy table.

pub mod arena;
pub mod building;
pub mod catalog;
pub mod city;
pub mod config;
pub mod empire;
pub mod geometry;
pub mod goods;
pub mod grid;
pub mod metrics;
pub mod observer;
pub mod overlay;
pub mod persist;
pub mod profiling;
pub mod signal;
pub mod simulation;
pub mod testing;
pub mod view;

pub use arena::{Arena, OverlayId};
pub use building::{Building, ServiceTarget, TraineeTarget};
pub use catalog::{BuildingClass, BuildingType, ServiceType, TraineeType};
pub use city::{City, CityEvent};
pub use config::SimConfig;
pub use empire::{
    CityId, Empire, EmpireCity, EmpireMerchant, EmpireTradeRoute, EmpireTrading, MerchantArrival,
    MerchantId, RouteId,
};
pub use geometry::{Point, PointF, Size, TilePos};
pub use goods::{GoodStock, GoodStore, GoodType, SimpleGoodStore};
pub use grid::{TileGrid, Tilemap, MAX_MAP_SIDE};
pub use metrics::SimMetrics;
pub use observer::{EventLogObserver, GameEvent, ObserverRegistry, SimObserver, Snapshot};
pub use overlay::{Construction, Overlay, OverlayError, OverlayState};
pub use persist::{Persist, PersistError, VariantMap};
pub use signal::Signal;
pub use simulation::{Simulation, TickSummary};
pub use view::{OverlayView, OverlayViewSelector};
