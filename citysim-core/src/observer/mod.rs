//! Observer pattern for simulation inspection.
//!
//! Observers receive an immutable [`Snapshot`] after each tick: the tick
//! number, the events that tick produced and a summary of the world. They
//! cannot reach back into the simulation.
//!
//! # Architecture
//!
//! ```text
//! SimObserver trait
//!        │
//!        └── EventLogObserver (JSONL events)
//! ```
//!
//! # Example
//!
//! ```ignore
//! let mut registry = ObserverRegistry::new();
//! registry.register(Box::new(EventLogObserver::stdout()));
//!
//! // In simulation loop, after the tick:
//! registry.notify(&Snapshot::new(tick, events, summary));
//! ```

pub mod event_log;

pub use event_log::{EventLogObserver, GameEvent};

use crate::simulation::TickSummary;
use std::sync::Arc;
use thiserror::Error;

/// Immutable view of one tick, shared between observers.
#[derive(Clone, Debug)]
pub struct Snapshot {
    /// Monotonic tick counter
    pub tick: u64,
    /// Events produced during this tick
    pub events: Arc<[GameEvent]>,
    pub summary: TickSummary,
}

impl Snapshot {
    pub fn new(tick: u64, events: Vec<GameEvent>, summary: TickSummary) -> Self {
        Self {
            tick,
            events: events.into(),
            summary,
        }
    }
}

/// Errors that can occur during observation.
#[derive(Error, Debug)]
pub enum ObserverError {
    /// I/O error (e.g., writing to a file)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization error (e.g., JSON output)
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    /// Writer lock poisoned by a panicking thread
    #[error("Observer writer unavailable: {0}")]
    Unavailable(String),
}

/// Configuration for observer notification frequency.
#[derive(Clone, Debug)]
pub struct ObserverConfig {
    /// Notify every N ticks (1 = every tick)
    pub frequency: u32,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self { frequency: 1 }
    }
}

/// Trait for simulation observers.
///
/// Errors returned from `on_tick` are logged but do not block simulation.
pub trait SimObserver: Send + Sync {
    /// Called after each tick (or as configured by frequency).
    fn on_tick(&self, snapshot: &Snapshot) -> Result<(), ObserverError>;

    /// Human-readable name for logging/debugging.
    fn name(&self) -> &str;

    /// Observer-specific configuration.
    fn config(&self) -> ObserverConfig {
        ObserverConfig::default()
    }

    /// Called when simulation ends or observer is unregistered.
    fn on_shutdown(&self) {}
}

/// Registry for managing multiple observers.
pub struct ObserverRegistry {
    observers: Vec<Box<dyn SimObserver>>,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self { observers: vec![] }
    }

    pub fn register(&mut self, observer: Box<dyn SimObserver>) {
        log::info!("Registered observer: {}", observer.name());
        self.observers.push(observer);
    }

    /// Notify every observer whose frequency divides the tick.
    ///
    /// Errors are logged but do not propagate.
    pub fn notify(&self, snapshot: &Snapshot) {
        for observer in &self.observers {
            let config = observer.config();
            if !snapshot.tick.is_multiple_of(config.frequency as u64) {
                continue;
            }
            if let Err(e) = observer.on_tick(snapshot) {
                log::warn!("Observer '{}' error: {}", observer.name(), e);
            }
        }
    }

    pub fn shutdown(&self) {
        for observer in &self.observers {
            observer.on_shutdown();
        }
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl Default for ObserverRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ObserverRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.observers.iter().map(|o| o.name()))
            .finish()
    }
}

impl Drop for ObserverRegistry {
    fn drop(&mut self) {
        // Flush buffered writers
        self.shutdown();
    }
}
