//! Simulation configuration

use crate::error::ConfigError;
use crate::predictor::{CounterState, PredictorVariant, StaticScheme};

/// Branch addresses are 32 bits wide, so no run can use more entries
pub const MAX_BTB_SIZE: u64 = 1 << 32;

/// Simulation policy
#[derive(Clone, Copy, Debug)]
pub struct SimulationPolicy {
    /// Number of BTB entries, also the size of the counter table
    pub btb_size: usize,
    /// Predictor whose mispredictions are charged to BTB hits
    pub variant: PredictorVariant,
    pub static_scheme: StaticScheme,
    /// State every two-bit counter starts in
    pub initial_state: CounterState,
    pub verbose: bool,
}

impl Default for SimulationPolicy {
    fn default() -> Self {
        Self {
            btb_size: 1024,
            variant: PredictorVariant::default(),
            static_scheme: StaticScheme::default(),
            initial_state: CounterState::default(),
            verbose: false,
        }
    }
}

impl SimulationPolicy {
    pub fn make(btb_size: usize) -> Result<Self, ConfigError> {
        let policy = Self {
            btb_size,
            ..Self::default()
        };
        policy.validate()?;
        Ok(policy)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.btb_size == 0 {
            return Err(ConfigError::NonPositiveBtbSize(0));
        }
        if self.btb_size as u64 > MAX_BTB_SIZE {
            return Err(ConfigError::BtbSizeTooLarge(self.btb_size as u64));
        }
        Ok(())
    }
}

/// Parse a BTB size given on the command line
pub fn parse_btb_size(arg: &str) -> Result<usize, ConfigError> {
    let value: i64 = arg
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidBtbSize(arg.to_string()))?;
    if value <= 0 {
        return Err(ConfigError::NonPositiveBtbSize(value));
    }
    if value as u64 > MAX_BTB_SIZE {
        return Err(ConfigError::BtbSizeTooLarge(value as u64));
    }
    usize::try_from(value).map_err(|_| ConfigError::InvalidBtbSize(arg.to_string()))
}
