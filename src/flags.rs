use std::path::PathBuf;
use std::str::FromStr;

use clap::{Args, Parser};

use crate::error::ConfigError;
use crate::policy::SimulationPolicy;
use crate::predictor::{CounterState, PredictorVariant, StaticScheme};
use crate::report::ReportFormat;
use crate::sweep::DEFAULT_BTB_SIZES;

/// Branch target buffer and direction prediction simulator.
#[derive(Parser, Debug)]
#[command(name = "sim", version)]
pub struct SimArgs {
    /// Path to the branch trace file.
    pub trace_file: PathBuf,

    /// Number of BTB entries (positive integer).
    #[arg(allow_negative_numbers = true)]
    pub btb_size: String,

    #[command(flatten)]
    pub predictor: PredictorArgs,

    /// Report layout.
    /// text: labelled statistics (default)
    /// kv: one key=value pair per line
    #[arg(short, long, default_value = "text")]
    pub format: ReportFormat,

    /// Prints every simulated branch to stderr.
    #[arg(short, long)]
    pub verbose: bool,
}

/// Runs the simulator over a list of BTB sizes and writes a CSV table.
#[derive(Parser, Debug)]
#[command(name = "sweep", version)]
pub struct SweepArgs {
    /// Path to the branch trace file.
    pub trace_file: PathBuf,

    /// Comma-separated BTB sizes to simulate.
    #[arg(long, value_delimiter = ',', default_values_t = DEFAULT_BTB_SIZES)]
    pub sizes: Vec<usize>,

    /// Path of the CSV table to write.
    #[arg(short, long, default_value = "eval/btb_sweep.csv")]
    pub output: PathBuf,

    /// Maximum number of runs in flight; defaults to the available parallelism.
    #[arg(short, long)]
    pub jobs: Option<usize>,

    #[command(flatten)]
    pub predictor: PredictorArgs,

    /// Enables debug logging.
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Args, Debug)]
pub struct PredictorArgs {
    /// Predictor charged with BTB-hit mispredictions.
    /// two-bit: two-bit saturating counters (default)
    /// static: the static scheme
    #[arg(short = 'p', long = "predictor", default_value = "two-bit")]
    pub variant: VariantArg,

    /// Static prediction scheme.
    /// btfn: backward taken, forward not taken (default)
    /// taken: always taken
    /// not-taken: always not taken
    #[arg(short, long, default_value = "btfn")]
    pub static_scheme: SchemeArg,

    /// Initial two-bit counter state, 0 (strongly not taken) to 3 (strongly taken).
    #[arg(long, default_value_t = 2)]
    pub initial_state: u8,
}

impl PredictorArgs {
    /// Build a policy for `btb_size` entries from these arguments
    pub fn policy(&self, btb_size: usize, verbose: bool) -> Result<SimulationPolicy, ConfigError> {
        let policy = SimulationPolicy {
            btb_size,
            variant: self.variant.into(),
            static_scheme: self.static_scheme.into(),
            initial_state: CounterState::try_from(self.initial_state)?,
            verbose,
        };
        policy.validate()?;
        Ok(policy)
    }
}

#[derive(Clone, Copy, Debug)]
pub enum VariantArg {
    Static,
    TwoBit,
}

impl FromStr for VariantArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "static" => Ok(VariantArg::Static),
            "two-bit" | "twobit" => Ok(VariantArg::TwoBit),
            _ => Err(format!(
                "Invalid predictor: '{}'. Expected 'static' or 'two-bit'.",
                s
            )),
        }
    }
}

impl From<VariantArg> for PredictorVariant {
    fn from(val: VariantArg) -> Self {
        match val {
            VariantArg::Static => PredictorVariant::Static,
            VariantArg::TwoBit => PredictorVariant::TwoBit,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub enum SchemeArg {
    BackwardTaken,
    AlwaysTaken,
    AlwaysNotTaken,
}

impl FromStr for SchemeArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "btfn" => Ok(SchemeArg::BackwardTaken),
            "taken" => Ok(SchemeArg::AlwaysTaken),
            "not-taken" => Ok(SchemeArg::AlwaysNotTaken),
            _ => Err(format!(
                "Invalid static scheme: '{}'. Expected 'btfn', 'taken' or 'not-taken'.",
                s
            )),
        }
    }
}

impl From<SchemeArg> for StaticScheme {
    fn from(val: SchemeArg) -> Self {
        match val {
            SchemeArg::BackwardTaken => StaticScheme::BackwardTaken,
            SchemeArg::AlwaysTaken => StaticScheme::AlwaysTaken,
            SchemeArg::AlwaysNotTaken => StaticScheme::AlwaysNotTaken,
        }
    }
}

/// Route `log` output to stderr; `RUST_LOG` overrides the default level
pub fn init_logger(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .init();
}
