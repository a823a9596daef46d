use std::process;
use std::thread;

use btb_lib::error::SimulatorResult;
use btb_lib::flags::{self, SweepArgs};
use btb_lib::sweep;
use btb_lib::trace;
use clap::Parser;
use log::info;

fn main() {
    let args = SweepArgs::parse();
    flags::init_logger(args.verbose);

    if let Err(e) = run_eval(&args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run_eval(args: &SweepArgs) -> SimulatorResult<()> {
    // Sizes are validated per run; an invalid one only loses its own row
    let base = args.predictor.policy(1, args.verbose)?;

    let events = trace::fetch_events(&args.trace_file)?;
    info!(
        "Loaded {} branch records from '{}'",
        events.len(),
        args.trace_file.display()
    );

    let jobs = args.jobs.unwrap_or_else(|| {
        thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    });
    let points = sweep::run_sweep(&events, &args.sizes, base, jobs)?;

    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let mut writer = csv::Writer::from_path(&args.output)?;
    let rows = sweep::write_csv(&mut writer, &points)?;

    eprintln!(
        "Wrote {} of {} BTB sizes to '{}'",
        rows,
        points.len(),
        args.output.display()
    );
    Ok(())
}
