//! BTB size sweeps
//!
//! Each size is an independent run over the same events. Runs share nothing
//! but the read-only event slice, so they are spread over scoped threads.

use std::io;
use std::thread;

use log::{info, warn};

use crate::counters::Counters;
use crate::error::{ConfigError, SimulatorError, SimulatorResult};
use crate::policy::SimulationPolicy;
use crate::simulator;
use crate::trace::BranchEvent;

pub const DEFAULT_BTB_SIZES: [usize; 13] =
    [1, 2, 4, 8, 16, 32, 64, 128, 256, 512, 1024, 2048, 5000];

/// Outcome of one run in a sweep
#[derive(Debug)]
pub struct SweepPoint {
    pub btb_size: usize,
    pub result: SimulatorResult<Counters>,
}

impl SweepPoint {
    pub fn counters(&self) -> Option<&Counters> {
        self.result.as_ref().ok()
    }
}

fn run_point(events: &[BranchEvent], btb_size: usize, base: SimulationPolicy) -> SweepPoint {
    let policy = SimulationPolicy { btb_size, ..base };
    let result = simulator::run_events(events.iter().copied().map(Ok), policy);
    SweepPoint { btb_size, result }
}

/// Run `events` once per BTB size, at most `jobs` runs at a time.
/// Points come back in the order of `sizes`.
pub fn run_sweep(
    events: &[BranchEvent],
    sizes: &[usize],
    base: SimulationPolicy,
    jobs: usize,
) -> SimulatorResult<Vec<SweepPoint>> {
    if sizes.is_empty() {
        return Err(ConfigError::EmptySweep.into());
    }

    let mut points = Vec::with_capacity(sizes.len());
    for chunk in sizes.chunks(jobs.max(1)) {
        thread::scope(|s| {
            let handles: Vec<_> = chunk
                .iter()
                .map(|&btb_size| s.spawn(move || run_point(events, btb_size, base)))
                .collect();
            for handle in handles {
                match handle.join() {
                    Ok(point) => points.push(point),
                    Err(panic) => std::panic::resume_unwind(panic),
                }
            }
        });
    }

    Ok(points)
}

/// Write one CSV row per successful point.
///
/// Failed points are reported and left out of the table.
/// Returns the number of rows written.
pub fn write_csv<W: io::Write>(
    writer: &mut csv::Writer<W>,
    points: &[SweepPoint],
) -> SimulatorResult<usize> {
    writer.write_record([
        "BTB size",
        "Total",
        "BTB hits",
        "BTB misses",
        "Mispredicted BTB hits",
        "BTB hit rate",
        "Static accuracy",
        "Dynamic accuracy",
        "Improvement",
        "Overhead",
    ])?;

    let mut rows = 0;
    for point in points {
        let c = match &point.result {
            Ok(c) => c,
            Err(e) => {
                warn!("No result for BTB size {}: {}", point.btb_size, e);
                continue;
            }
        };

        info!(
            "BTB size {}: overhead {:.4}, hit rate {:.2}%",
            point.btb_size,
            c.overhead(),
            c.btb_hit_rate()
        );

        writer.write_record([
            point.btb_size.to_string(),
            c.total_instructions.to_string(),
            c.btb_hits.to_string(),
            c.btb_misses.to_string(),
            c.mispredicted_btb_hits.to_string(),
            format!("{:.2}", c.btb_hit_rate()),
            format!("{:.2}", c.static_accuracy()),
            format!("{:.2}", c.dynamic_accuracy()),
            format!("{:.2}", c.improvement()),
            format!("{:.4}", c.overhead()),
        ])?;
        rows += 1;
    }
    writer.flush()?;

    if rows == 0 {
        return Err(SimulatorError::NoResults);
    }
    Ok(rows)
}
