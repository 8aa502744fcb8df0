use serde::{Deserialize, Serialize};

/// Simulation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Trade routes update on ticks where `time % trade_update_interval == trade_update_phase`.
    pub trade_update_interval: u64,
    pub trade_update_phase: u64,
    /// Each merchant update covers `1 / merchant_travel_steps` of the remaining distance.
    pub merchant_travel_steps: f32,
    /// A merchant closer than this to its destination has arrived.
    pub merchant_arrival_distance: f32,
    /// Damage level at which a building collapses.
    pub collapse_threshold: f32,
    /// Fire level at which a building burns down.
    pub fire_threshold: f32,
    /// Sweep deleted overlays every N ticks (0 = never).
    pub sweep_frequency: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            trade_update_interval: 22,
            trade_update_phase: 1,
            merchant_travel_steps: 30.0,
            merchant_arrival_distance: 5.0,
            collapse_threshold: 100.0,
            fire_threshold: 100.0,
            sweep_frequency: 1,
        }
    }
}

impl SimConfig {
    pub fn is_sweep_tick(&self, time: u64) -> bool {
        self.sweep_frequency > 0 && time.is_multiple_of(self.sweep_frequency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SimConfig::default();
        assert_eq!(config.trade_update_interval, 22);
        assert_eq!(config.merchant_arrival_distance, 5.0);
        assert_eq!(config.merchant_travel_steps, 30.0);
        assert!(config.is_sweep_tick(7));
    }

    #[test]
    fn test_partial_override() {
        let config: SimConfig = serde_json::from_str(r#"{"fire_threshold": 50.0}"#).unwrap();
        assert_eq!(config.fire_threshold, 50.0);
        assert_eq!(config.collapse_threshold, 100.0);
    }

    #[test]
    fn test_zero_sweep_frequency_disables() {
        let config = SimConfig {
            sweep_frequency: 0,
            ..SimConfig::default()
        };
        assert!(!config.is_sweep_tick(0));
    }
}
