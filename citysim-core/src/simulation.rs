//! Tick driver tying the city map, the empire and the observers together.
//!
//! One call to [`Simulation::step`]:
//!
//! ```text
//! time += 1
//!   ├── City::time_step      (buildings, disasters, sweep)
//!   ├── Empire::update       (routes and merchants on trade ticks)
//!   ├── drain arrivals       (queued merchant arrivals → events)
//!   └── ObserverRegistry     (Snapshot of this tick)
//! ```

use crate::city::City;
use crate::config::SimConfig;
use crate::empire::Empire;
use crate::metrics::SimMetrics;
use crate::observer::{GameEvent, ObserverRegistry, SimObserver, Snapshot};
use crate::profiling::{self, Phase};
use serde::Serialize;
use std::time::Instant;
use tracing::instrument;

/// Counters describing the world after a tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TickSummary {
    pub tick: u64,
    pub active_buildings: usize,
    pub routes: usize,
    pub merchants_in_transit: usize,
    /// Merchant arrivals during this tick
    pub arrivals: usize,
    /// Events of any kind during this tick
    pub events: usize,
}

#[derive(Debug)]
pub struct Simulation {
    city: City,
    empire: Empire,
    config: SimConfig,
    observers: ObserverRegistry,
    metrics: SimMetrics,
    time: u64,
}

impl Simulation {
    pub fn new(city: City, empire: Empire, config: SimConfig) -> Self {
        Self {
            city,
            empire,
            config,
            observers: ObserverRegistry::new(),
            metrics: SimMetrics::default(),
            time: 0,
        }
    }

    pub fn city(&self) -> &City {
        &self.city
    }

    pub fn city_mut(&mut self) -> &mut City {
        &mut self.city
    }

    pub fn empire(&self) -> &Empire {
        &self.empire
    }

    pub fn empire_mut(&mut self) -> &mut Empire {
        &mut self.empire
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn metrics(&self) -> &SimMetrics {
        &self.metrics
    }

    /// Ticks run so far.
    pub fn time(&self) -> u64 {
        self.time
    }

    pub fn register_observer(&mut self, observer: Box<dyn SimObserver>) {
        self.observers.register(observer);
    }

    /// Advance the world by one tick.
    #[instrument(skip_all, name = "tick")]
    pub fn step(&mut self) -> TickSummary {
        let tick_start = Instant::now();
        self.time += 1;
        let time = self.time;

        let start = Instant::now();
        let city_events = self.city.time_step(time);
        self.metrics.city_time += start.elapsed();
        profiling::mark(Phase::City);
        if self.config.is_sweep_tick(time) {
            profiling::mark(Phase::Sweep);
        }

        let mut events: Vec<GameEvent> = city_events
            .iter()
            .map(|e| GameEvent::from_city_event(time, e))
            .collect();

        let start = Instant::now();
        if let Some(update) = self.empire.update(time) {
            self.metrics.trade_updates += 1;
            events.push(GameEvent::from_trade_update(time, &update));
            profiling::mark(Phase::Trade);
        }
        let arrivals = self.empire.trading_mut().drain_arrivals();
        self.metrics.trade_time += start.elapsed();
        self.metrics.arrivals += arrivals.len() as u64;
        events.extend(
            arrivals
                .iter()
                .map(|a| GameEvent::from_arrival(a, &self.empire)),
        );

        let summary = TickSummary {
            tick: time,
            active_buildings: self.city.active_count(),
            routes: self.empire.trading().len(),
            merchants_in_transit: self.empire.trading().merchants_in_transit(),
            arrivals: arrivals.len(),
            events: events.len(),
        };

        if !self.observers.is_empty() {
            let start = Instant::now();
            self.observers
                .notify(&Snapshot::new(time, events, summary.clone()));
            self.metrics.observer_time += start.elapsed();
        }

        self.metrics.total_ticks += 1;
        self.metrics.total_time += tick_start.elapsed();
        summary
    }

    /// Run `ticks` steps and return the summary of the last one.
    pub fn run(&mut self, ticks: u64) -> TickSummary {
        let mut last = TickSummary {
            tick: self.time,
            ..Default::default()
        };
        for _ in 0..ticks {
            last = self.step();
        }
        log::info!(
            "Ran {} ticks ({:.3} ms/tick)",
            ticks,
            self.metrics.tick_avg_ms()
        );
        last
    }

    /// Flush observers. Also happens on drop.
    pub fn shutdown(&self) {
        self.observers.shutdown();
    }
}
