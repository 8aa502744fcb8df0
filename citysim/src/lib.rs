//! Headless scenario runner for `citysim-core`.

pub mod scenario;

pub use scenario::{load_scenario, Scenario};
