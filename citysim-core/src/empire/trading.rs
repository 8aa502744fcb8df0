//! Trade route registry.
//!
//! Routes are keyed by their unordered pair of city names. Trading runs on a
//! coarse clock: route updates only happen on ticks where
//! `time % update_interval == update_phase`.
//!
//! Arrivals are collected while the routes are walked and only published
//! afterwards, both on [`EmpireTrading::on_merchant_arrived`] and into a
//! queue drained with [`EmpireTrading::drain_arrivals`]. Listeners get a
//! shared reference; code that wants to reverse or retire the merchant reads
//! the queue and uses [`EmpireTrading::route_mut`].

use super::merchant::MerchantId;
use super::route::{EmpireTradeRoute, RouteKey};
use super::{CityId, CityRegistry, RouteId};
use crate::config::SimConfig;
use crate::geometry::PointF;
use crate::goods::SimpleGoodStore;
use crate::signal::Signal;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Trade clock and merchant motion settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TradeConfig {
    pub update_interval: u64,
    pub update_phase: u64,
    pub travel_steps: f32,
    pub arrival_distance: f32,
}

impl TradeConfig {
    pub fn is_update_tick(&self, time: u64) -> bool {
        self.update_interval > 0 && time % self.update_interval == self.update_phase
    }
}

impl Default for TradeConfig {
    fn default() -> Self {
        Self::from(&SimConfig::default())
    }
}

impl From<&SimConfig> for TradeConfig {
    fn from(config: &SimConfig) -> Self {
        Self {
            update_interval: config.trade_update_interval,
            update_phase: config.trade_update_phase,
            travel_steps: config.merchant_travel_steps,
            arrival_distance: config.merchant_arrival_distance,
        }
    }
}

/// A merchant came within arrival distance of its destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MerchantArrival {
    pub tick: u64,
    pub route: RouteId,
    pub merchant: MerchantId,
    /// City the merchant reached.
    pub city: CityId,
    pub location: PointF,
}

/// Outcome of a trade tick.
#[derive(Debug, Clone, Default)]
pub struct TradeUpdate {
    pub routes: usize,
    pub spawned: usize,
    pub retired: usize,
    pub arrivals: Vec<MerchantArrival>,
}

#[derive(Debug)]
pub struct EmpireTrading {
    config: TradeConfig,
    routes: Vec<EmpireTradeRoute>,
    index: FxHashMap<RouteKey, RouteId>,
    arrivals: Vec<MerchantArrival>,
    on_merchant_arrived: Signal<MerchantArrival>,
}

impl Default for EmpireTrading {
    fn default() -> Self {
        Self::new(TradeConfig::default())
    }
}

impl EmpireTrading {
    pub fn new(config: TradeConfig) -> Self {
        Self {
            config,
            routes: Vec::new(),
            index: FxHashMap::default(),
            arrivals: Vec::new(),
            on_merchant_arrived: Signal::new(),
        }
    }

    pub fn config(&self) -> &TradeConfig {
        &self.config
    }

    /// Drop every route, merchant and queued arrival. Listeners stay connected.
    pub fn clear_routes(&mut self) {
        self.routes.clear();
        self.index.clear();
        self.arrivals.clear();
    }

    /// Register a route between two named cities.
    ///
    /// Creating a route that already exists (in either direction) returns
    /// the existing one. Unknown city names yield `None`.
    pub fn create_route(
        &mut self,
        begin: &str,
        end: &str,
        cities: &CityRegistry,
    ) -> Option<RouteId> {
        let key = RouteKey::new(begin, end);
        if let Some(id) = self.index.get(&key) {
            log::debug!("Trade route exist [{} to {}]", begin, end);
            return Some(*id);
        }

        let (Some(begin_id), Some(end_id)) = (cities.find(begin), cities.find(end)) else {
            log::warn!("Trade route city not found [{} to {}]", begin, end);
            return None;
        };

        let id = RouteId(self.routes.len() as u32);
        self.routes.push(EmpireTradeRoute::new(id, begin_id, end_id));
        self.index.insert(key, id);
        log::info!("Opened trade route {} [{} to {}]", id, begin, end);
        Some(id)
    }

    /// Route between two named cities, in either direction.
    pub fn get_route(&self, begin: &str, end: &str) -> Option<&EmpireTradeRoute> {
        match self.index.get(&RouteKey::new(begin, end)) {
            Some(id) => self.route(*id),
            None => {
                log::debug!("Trade route no exist [{} to {}]", begin, end);
                None
            }
        }
    }

    pub fn route(&self, id: RouteId) -> Option<&EmpireTradeRoute> {
        self.route_at(id.0 as usize)
    }

    pub fn route_mut(&mut self, id: RouteId) -> Option<&mut EmpireTradeRoute> {
        self.routes.get_mut(id.0 as usize)
    }

    /// Route at `index` in creation order.
    pub fn route_at(&self, index: usize) -> Option<&EmpireTradeRoute> {
        let route = self.routes.get(index);
        if route.is_none() {
            log::debug!(
                "No trade route at index {} ({} registered)",
                index,
                self.routes.len()
            );
        }
        route
    }

    pub fn routes(&self) -> &[EmpireTradeRoute] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn merchants_in_transit(&self) -> usize {
        self.routes
            .iter()
            .flat_map(|r| r.merchants())
            .filter(|m| !m.is_retired())
            .count()
    }

    /// Dispatch a merchant carrying a copy of `goods` along an existing route.
    ///
    /// Returns `None` without side effects when no route joins the two cities.
    pub fn send_merchant(
        &mut self,
        begin: &str,
        end: &str,
        goods: &SimpleGoodStore,
        cities: &CityRegistry,
    ) -> Option<MerchantId> {
        let Some(id) = self.index.get(&RouteKey::new(begin, end)).copied() else {
            log::debug!("Trade route no exist [{} to {}]", begin, end);
            return None;
        };
        let start = cities.find(begin)?;
        let route = self.routes.get_mut(id.0 as usize)?;
        Some(route.add_merchant(start, goods.clone(), cities))
    }

    /// Advance every route on trade ticks. Returns `None` on other ticks.
    #[instrument(skip_all, name = "trading")]
    pub fn update(&mut self, time: u64, cities: &CityRegistry) -> Option<TradeUpdate> {
        if !self.config.is_update_tick(time) {
            return None;
        }

        let mut report = TradeUpdate {
            routes: self.routes.len(),
            ..Default::default()
        };
        {
            let _span = tracing::info_span!("routes", count = self.routes.len()).entered();
            for route in &mut self.routes {
                let update = route.update(time, cities, &self.config);
                report.spawned += usize::from(update.spawned.is_some());
                report.retired += update.retired;
                report.arrivals.extend(update.arrivals);
            }
        }

        for arrival in &report.arrivals {
            log::debug!(
                "{} on route {} arrived at {}",
                arrival.merchant,
                arrival.route,
                arrival.city
            );
            self.on_merchant_arrived.emit(arrival);
        }
        self.arrivals.extend(report.arrivals.iter().cloned());
        Some(report)
    }

    /// Hook fired once per merchant arrival.
    pub fn on_merchant_arrived(&mut self) -> &mut Signal<MerchantArrival> {
        &mut self.on_merchant_arrived
    }

    /// Take every arrival queued since the last drain.
    pub fn drain_arrivals(&mut self) -> Vec<MerchantArrival> {
        std::mem::take(&mut self.arrivals)
    }
}
