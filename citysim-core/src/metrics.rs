use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Accumulated timing metrics for simulation performance.
#[derive(Default, Clone, Debug, Serialize, Deserialize)]
pub struct SimMetrics {
    pub total_ticks: u64,
    pub total_time: Duration,
    /// Building decay, disasters and sweeps.
    pub city_time: Duration,
    /// Route and merchant updates.
    pub trade_time: Duration,
    /// Time spent in observers (event log, etc.)
    pub observer_time: Duration,
    pub trade_updates: u64,
    pub arrivals: u64,
}

impl SimMetrics {
    pub fn tick_avg_ms(&self) -> f64 {
        if self.total_ticks == 0 {
            0.0
        } else {
            self.total_time.as_secs_f64() * 1000.0 / self.total_ticks as f64
        }
    }

    pub fn ticks_per_second(&self) -> f64 {
        if self.total_time.as_secs_f64() == 0.0 {
            0.0
        } else {
            self.total_ticks as f64 / self.total_time.as_secs_f64()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_metrics() {
        let metrics = SimMetrics::default();
        assert_eq!(metrics.tick_avg_ms(), 0.0);
        assert_eq!(metrics.ticks_per_second(), 0.0);
    }

    #[test]
    fn test_tick_average() {
        let metrics = SimMetrics {
            total_ticks: 4,
            total_time: Duration::from_millis(10),
            ..Default::default()
        };
        assert!((metrics.tick_avg_ms() - 2.5).abs() < 1e-9);
        assert!((metrics.ticks_per_second() - 400.0).abs() < 1e-6);
    }
}
