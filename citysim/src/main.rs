use anyhow::{Context, Result};
use citysim::load_scenario;
use citysim_core::profiling::{self, TraceLevel};
use citysim_core::EventLogObserver;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the scenario JSON file
    #[arg(long)]
    scenario: PathBuf,

    /// Number of ticks to run
    #[arg(short, long, default_value_t = 100)]
    ticks: u64,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Write simulation events as JSONL to this file ("-" for stdout)
    #[arg(long)]
    event_log: Option<PathBuf>,

    /// Tracy capture level (info, debug, trace); ignored without the `tracy` feature
    #[arg(long, default_value = "info")]
    trace_level: TraceLevel,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = std::str::FromStr::from_str(&args.log_level).unwrap_or(log::LevelFilter::Info);
    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .init();

    profiling::init_tracy(args.trace_level);

    log::info!("Starting citysim...");

    let scenario = load_scenario(&args.scenario)?;
    let mut sim = scenario.build()?;

    if let Some(path) = &args.event_log {
        let observer = if path.as_os_str() == "-" {
            EventLogObserver::stdout()
        } else {
            EventLogObserver::file(path)
                .with_context(|| format!("Failed to create event log {}", path.display()))?
        };
        sim.register_observer(Box::new(observer));
    }

    let summary = sim.run(args.ticks);
    sim.shutdown();

    let metrics = sim.metrics();
    log::info!(
        "Simulation finished: {} ticks, {:.0} ticks/s",
        metrics.total_ticks,
        metrics.ticks_per_second()
    );

    println!("Ticks:                {}", summary.tick);
    println!("Active buildings:     {}", summary.active_buildings);
    println!("Trade routes:         {}", summary.routes);
    println!("Merchants in transit: {}", summary.merchants_in_transit);
    println!("Merchant arrivals:    {}", metrics.arrivals);

    Ok(())
}
