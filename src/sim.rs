use std::process;

use btb_lib::error::SimulatorResult;
use btb_lib::flags::{self, SimArgs};
use btb_lib::policy::parse_btb_size;
use btb_lib::report::{self, ReportFormat};
use btb_lib::run_wrapper;
use clap::Parser;

fn main() {
    let args = SimArgs::parse();
    flags::init_logger(args.verbose);

    match run_sim(&args) {
        // Nothing reaches stdout unless the whole trace was simulated
        Ok(output) => print!("{}", output),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn run_sim(args: &SimArgs) -> SimulatorResult<String> {
    let btb_size = parse_btb_size(&args.btb_size)?;
    let policy = args.predictor.policy(btb_size, args.verbose)?;

    let counters = run_wrapper::run(&args.trace_file, policy)?;

    let mut output = String::new();
    if args.format == ReportFormat::Text {
        output.push_str(&report::render_header(&args.trace_file, &policy));
    }
    output.push_str(&report::render(&counters, args.format));
    Ok(output)
}
