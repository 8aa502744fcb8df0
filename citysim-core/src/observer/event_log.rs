//! Event log observer for recording simulation events as JSONL.
//!
//! Writes one JSON object per event to any `Write` destination (stdout,
//! file, pipe).
//!
//! # Current Events
//!
//! - `building_built` - A building was placed
//! - `building_destroyed` - A building was torn down
//! - `building_burned` - A building burned down and left ruins
//! - `building_collapsed` - A building collapsed and left rubble
//! - `building_removed` - A deleted building was swept from the city
//! - `trade_updated` - A trade tick ran over every route
//! - `merchant_arrived` - A merchant reached the end of its leg

use super::{ObserverConfig, ObserverError, SimObserver, Snapshot};
use crate::catalog::BuildingType;
use crate::city::CityEvent;
use crate::empire::{Empire, MerchantArrival, TradeUpdate};
use crate::geometry::TilePos;
use serde::{Deserialize, Serialize};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;

/// Events emitted by the simulation driver.
///
/// Uses serde's tag format for clean JSONL output:
/// ```json
/// {"type":"building_burned","tick":100,"id":"#1v1","kind":"prefecture",...}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    BuildingBuilt {
        tick: u64,
        id: String,
        kind: BuildingType,
        pos: TilePos,
    },
    BuildingDestroyed {
        tick: u64,
        id: String,
        kind: BuildingType,
    },
    BuildingBurned {
        tick: u64,
        id: String,
        kind: BuildingType,
        pos: TilePos,
        width: u32,
        height: u32,
    },
    BuildingCollapsed {
        tick: u64,
        id: String,
        kind: BuildingType,
        pos: TilePos,
        width: u32,
        height: u32,
    },
    BuildingRemoved {
        tick: u64,
        id: String,
        kind: BuildingType,
    },
    TradeUpdated {
        tick: u64,
        routes: usize,
        /// Merchants spawned on empty routes
        spawned: usize,
        retired: usize,
    },
    MerchantArrived {
        tick: u64,
        route: u32,
        merchant: u32,
        /// Name of the city reached
        city: String,
        x: f32,
        y: f32,
    },
}

impl GameEvent {
    pub fn from_city_event(tick: u64, event: &CityEvent) -> Self {
        match event {
            CityEvent::Built { id, kind, pos } => GameEvent::BuildingBuilt {
                tick,
                id: id.to_string(),
                kind: *kind,
                pos: *pos,
            },
            CityEvent::Destroyed { id, kind } => GameEvent::BuildingDestroyed {
                tick,
                id: id.to_string(),
                kind: *kind,
            },
            CityEvent::Burned { id, kind, site } => GameEvent::BuildingBurned {
                tick,
                id: id.to_string(),
                kind: *kind,
                pos: site.pos,
                width: site.size.width(),
                height: site.size.height(),
            },
            CityEvent::Collapsed { id, kind, site } => GameEvent::BuildingCollapsed {
                tick,
                id: id.to_string(),
                kind: *kind,
                pos: site.pos,
                width: site.size.width(),
                height: site.size.height(),
            },
            CityEvent::Removed { id, kind } => GameEvent::BuildingRemoved {
                tick,
                id: id.to_string(),
                kind: *kind,
            },
        }
    }

    pub fn from_trade_update(tick: u64, update: &TradeUpdate) -> Self {
        GameEvent::TradeUpdated {
            tick,
            routes: update.routes,
            spawned: update.spawned,
            retired: update.retired,
        }
    }

    /// Arrival event with the destination resolved to its city name.
    pub fn from_arrival(arrival: &MerchantArrival, empire: &Empire) -> Self {
        let city = empire
            .city(arrival.city)
            .map(|c| c.name().to_string())
            .unwrap_or_else(|| arrival.city.to_string());
        GameEvent::MerchantArrived {
            tick: arrival.tick,
            route: arrival.route.0,
            merchant: arrival.merchant.0,
            city,
            x: arrival.location.x,
            y: arrival.location.y,
        }
    }

    pub fn tick(&self) -> u64 {
        match self {
            GameEvent::BuildingBuilt { tick, .. }
            | GameEvent::BuildingDestroyed { tick, .. }
            | GameEvent::BuildingBurned { tick, .. }
            | GameEvent::BuildingCollapsed { tick, .. }
            | GameEvent::BuildingRemoved { tick, .. }
            | GameEvent::TradeUpdated { tick, .. }
            | GameEvent::MerchantArrived { tick, .. } => *tick,
        }
    }
}

/// Observer that writes each tick's events as JSONL.
///
/// # Example
///
/// ```ignore
/// // Log to stdout (for piping to jq, etc.)
/// let observer = EventLogObserver::stdout();
///
/// // Log to file
/// let observer = EventLogObserver::file("events.jsonl")?;
/// ```
pub struct EventLogObserver {
    /// Destination for JSONL output
    writer: Mutex<Box<dyn Write + Send>>,
    config: ObserverConfig,
}

impl EventLogObserver {
    /// Create observer writing to stdout.
    ///
    /// Uses buffered I/O to reduce syscall overhead during high-frequency logging.
    pub fn stdout() -> Self {
        Self::new(Box::new(BufWriter::new(std::io::stdout())))
    }

    /// Create observer writing to a file.
    pub fn file(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file = std::fs::File::create(path)?;
        Ok(Self::new(Box::new(BufWriter::new(file))))
    }

    /// Create observer with a custom writer.
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(writer),
            // Events only exist on the tick they happen
            config: ObserverConfig { frequency: 1 },
        }
    }

    fn write_event(&self, writer: &mut dyn Write, event: &GameEvent) -> Result<(), ObserverError> {
        serde_json::to_writer(&mut *writer, event)?;
        writeln!(writer)?;
        Ok(())
    }
}

impl SimObserver for EventLogObserver {
    fn on_tick(&self, snapshot: &Snapshot) -> Result<(), ObserverError> {
        if snapshot.events.is_empty() {
            return Ok(());
        }
        let mut writer = self.writer.lock().map_err(|_| {
            ObserverError::Unavailable("EventLogObserver writer lock poisoned".into())
        })?;
        for event in snapshot.events.iter() {
            self.write_event(&mut *writer, event)?;
        }
        writer.flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "EventLogObserver"
    }

    fn config(&self) -> ObserverConfig {
        self.config.clone()
    }

    fn on_shutdown(&self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Arena;
    use crate::empire::{CityId, MerchantId, RouteId};
    use crate::geometry::{PointF, Size};
    use crate::overlay::{Ruin, RuinSite};
    use crate::simulation::TickSummary;
    use crate::testing::EmpireBuilder;
    use std::io::Cursor;
    use std::sync::Arc;

    fn capture_output() -> Arc<Mutex<Cursor<Vec<u8>>>> {
        Arc::new(Mutex::new(Cursor::new(Vec::new())))
    }

    fn lines(output: &Arc<Mutex<Cursor<Vec<u8>>>>) -> Vec<serde_json::Value> {
        let bytes = output.lock().unwrap().get_ref().clone();
        String::from_utf8(bytes)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn test_burned_event_jsonl() {
        let output = capture_output();
        let observer = EventLogObserver::new(Box::new(OutputCapture(output.clone())));

        let id = Arena::new().insert(());
        let event = CityEvent::Burned {
            id,
            kind: BuildingType::Prefecture,
            site: RuinSite {
                ruin: Ruin::Burning,
                pos: TilePos::new(2, 1),
                size: Size::square(1),
            },
        };
        let snapshot = Snapshot::new(
            100,
            vec![GameEvent::from_city_event(100, &event)],
            TickSummary::default(),
        );
        observer.on_tick(&snapshot).unwrap();

        let lines = lines(&output);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["type"], "building_burned");
        assert_eq!(lines[0]["tick"], 100);
        assert_eq!(lines[0]["kind"], "prefecture");
        assert_eq!(lines[0]["pos"]["i"], 2);
    }

    #[test]
    fn test_arrival_names_city() {
        let empire = EmpireBuilder::new()
            .with_city("Roma", 0, 0)
            .with_city("Capua", 60, 0)
            .build();
        let arrival = MerchantArrival {
            tick: 45,
            route: RouteId(0),
            merchant: MerchantId(2),
            city: CityId(1),
            location: PointF::new(57.0, 0.0),
        };
        let event = GameEvent::from_arrival(&arrival, &empire);
        assert_eq!(event.tick(), 45);
        match event {
            GameEvent::MerchantArrived { city, merchant, .. } => {
                assert_eq!(city, "Capua");
                assert_eq!(merchant, 2);
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_empty_tick_writes_nothing() {
        let output = capture_output();
        let observer = EventLogObserver::new(Box::new(OutputCapture(output.clone())));
        observer
            .on_tick(&Snapshot::new(3, Vec::new(), TickSummary::default()))
            .unwrap();
        assert!(lines(&output).is_empty());
    }

    #[test]
    fn test_event_roundtrips_through_json() {
        let event = GameEvent::TradeUpdated {
            tick: 23,
            routes: 2,
            spawned: 1,
            retired: 0,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.starts_with(r#"{"type":"trade_updated""#));
        let back: GameEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }

    /// Helper struct to capture output through Arc<Mutex<Cursor>>
    struct OutputCapture(Arc<Mutex<Cursor<Vec<u8>>>>);

    impl Write for OutputCapture {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().write(buf)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            self.0.lock().unwrap().flush()
        }
    }
}
