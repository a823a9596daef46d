use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the simulator
#[derive(Error, Debug)]
pub enum SimulatorError {
    #[error("Invalid configuration: {0}")]
    ConfigError(#[from] ConfigError),

    #[error("Trace error: {0}")]
    TraceError(#[from] TraceError),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("No BTB size produced a result")]
    NoResults,
}

/// Errors raised before a run touches any counter
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("BTB size must be a positive integer, got {0}")]
    NonPositiveBtbSize(i64),

    #[error(
        "BTB size {0} exceeds the {max} distinct 32-bit branch addresses",
        max = crate::policy::MAX_BTB_SIZE
    )]
    BtbSizeTooLarge(u64),

    #[error("BTB size '{0}' is not an integer")]
    InvalidBtbSize(String),

    #[error("Failed to open trace file '{0}': {1}")]
    TraceUnreadable(PathBuf, #[source] std::io::Error),

    #[error("Initial counter state must be within 0..=3, got {0}")]
    InvalidCounterState(u8),

    #[error("No BTB sizes to sweep")]
    EmptySweep,
}

/// Errors raised while pulling records out of a trace file
#[derive(Error, Debug)]
pub enum TraceError {
    #[error("Malformed record in '{path}' at line {line}: {kind}")]
    ParseError {
        path: PathBuf,
        line: usize,
        kind: ParseErrorKind,
    },

    #[error("Failed to read '{0}' at line {1}: {2}")]
    ReadError(PathBuf, usize, #[source] std::io::Error),
}

/// Specific kinds of malformed trace records
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseErrorKind {
    #[error("Unknown record kind '{0}': expected 'B' or 'R'")]
    UnknownRecordKind(String),

    #[error("Missing field: {0}")]
    MissingField(&'static str),

    #[error("Expected keyword '{expected}', found '{found}'")]
    UnexpectedToken {
        expected: &'static str,
        found: String,
    },

    #[error("Invalid hexadecimal address '{0}'")]
    InvalidAddress(String),

    #[error("Invalid direction '{0}': expected 'F' or 'B'")]
    InvalidDirection(String),

    #[error("Invalid outcome '{0}': expected 'taken' or 'not taken'")]
    InvalidOutcome(String),
}

/// Type alias for Result with SimulatorError
pub type SimulatorResult<T> = Result<T, SimulatorError>;
