//! A simulator wrapper

use std::path::Path;

use log::info;

use crate::counters::Counters;
use crate::error::SimulatorResult;
use crate::policy::SimulationPolicy;
use crate::simulator;
use crate::trace::TraceReader;

/// Run simulation on the given trace file
/// and return the final counters
pub fn run(trace_path: impl AsRef<Path>, policy: SimulationPolicy) -> SimulatorResult<Counters> {
    // Configuration errors surface before the trace is touched
    policy.validate()?;
    let reader = TraceReader::open(trace_path)?;

    info!(
        "Simulating '{}' with {} BTB entries",
        reader.path().display(),
        policy.btb_size
    );

    simulator::run_events(reader, policy)
}
