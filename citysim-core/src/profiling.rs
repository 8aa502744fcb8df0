//! Tracy hooks for the tick loop.
//!
//! Built with the `tracy` feature, `#[instrument]` spans go to a Tracy layer
//! and each [`Phase`] gets its own secondary frame track. Without the feature
//! everything here compiles to nothing.

use thiserror::Error;

/// Lowest span level captured by Tracy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TraceLevel {
    #[default]
    Info,
    Debug,
    /// Per-building spans; expensive on large maps
    Trace,
}

#[derive(Debug, Error)]
#[error("unknown trace level '{0}' (expected info, debug or trace)")]
pub struct TraceLevelError(String);

impl std::str::FromStr for TraceLevel {
    type Err = TraceLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "info" => Ok(TraceLevel::Info),
            "debug" => Ok(TraceLevel::Debug),
            "trace" => Ok(TraceLevel::Trace),
            _ => Err(TraceLevelError(s.to_string())),
        }
    }
}

/// Part of a tick that gets its own Tracy frame track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Buildings stepped and disasters applied; every tick
    City,
    /// Deleted buildings dropped from the arena
    Sweep,
    /// Routes and merchants advanced
    Trade,
}

/// Install the Tracy subscriber. A second call only logs a warning.
#[cfg(feature = "tracy")]
pub fn init_tracy(level: TraceLevel) {
    use tracing_subscriber::filter::LevelFilter;
    use tracing_subscriber::prelude::*;

    let filter = match level {
        TraceLevel::Info => LevelFilter::INFO,
        TraceLevel::Debug => LevelFilter::DEBUG,
        TraceLevel::Trace => LevelFilter::TRACE,
    };
    let installed = tracing_subscriber::registry()
        .with(tracing_tracy::TracyLayer::default())
        .with(filter)
        .try_init();
    if let Err(err) = installed {
        log::warn!("Tracy subscriber not installed: {}", err);
    }
}

#[cfg(not(feature = "tracy"))]
pub fn init_tracy(_level: TraceLevel) {}

/// Close the current frame of `phase`'s track.
#[cfg(feature = "tracy")]
#[inline]
pub fn mark(phase: Phase) {
    match phase {
        Phase::City => tracy_client::secondary_frame_mark!("city"),
        Phase::Sweep => tracy_client::secondary_frame_mark!("sweep"),
        Phase::Trade => tracy_client::secondary_frame_mark!("trade"),
    }
}

#[cfg(not(feature = "tracy"))]
#[inline]
pub fn mark(_phase: Phase) {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_level_parse() {
        assert_eq!("DEBUG".parse::<TraceLevel>().unwrap(), TraceLevel::Debug);
        assert_eq!("trace".parse::<TraceLevel>().unwrap(), TraceLevel::Trace);
        let err = "verbose".parse::<TraceLevel>().unwrap_err();
        assert!(err.to_string().contains("verbose"));
    }

    #[test]
    fn test_mark_without_subscriber() {
        init_tracy(TraceLevel::Info);
        mark(Phase::City);
        mark(Phase::Sweep);
        mark(Phase::Trade);
    }
}
