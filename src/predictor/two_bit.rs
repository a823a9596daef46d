//! Two-bit saturating counter predictor
//! that predicts and updates based on observed branch behavior

use std::collections::HashMap;

use crate::error::ConfigError;
use crate::predictor::DirectionPredictor;
use crate::trace::BranchEvent;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum CounterState {
    StronglyNotTaken = 0,
    WeaklyNotTaken = 1,
    #[default]
    WeaklyTaken = 2,
    StronglyTaken = 3,
}

impl CounterState {
    pub fn value(self) -> u8 {
        self as u8
    }

    pub fn predict(self) -> bool {
        matches!(self, CounterState::WeaklyTaken | CounterState::StronglyTaken)
    }

    /// Move one step towards the observed outcome, saturating at both ends
    pub fn next(self, taken: bool) -> Self {
        if taken {
            match self {
                CounterState::StronglyNotTaken => CounterState::WeaklyNotTaken,
                CounterState::WeaklyNotTaken => CounterState::WeaklyTaken,
                CounterState::WeaklyTaken => CounterState::StronglyTaken,
                CounterState::StronglyTaken => CounterState::StronglyTaken,
            }
        } else {
            match self {
                CounterState::StronglyTaken => CounterState::WeaklyTaken,
                CounterState::WeaklyTaken => CounterState::WeaklyNotTaken,
                CounterState::WeaklyNotTaken => CounterState::StronglyNotTaken,
                CounterState::StronglyNotTaken => CounterState::StronglyNotTaken,
            }
        }
    }
}

impl TryFrom<u8> for CounterState {
    type Error = ConfigError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(CounterState::StronglyNotTaken),
            1 => Ok(CounterState::WeaklyNotTaken),
            2 => Ok(CounterState::WeaklyTaken),
            3 => Ok(CounterState::StronglyTaken),
            _ => Err(ConfigError::InvalidCounterState(value)),
        }
    }
}

/// Table of two-bit counters indexed by branch address modulo its size.
///
/// Slots are materialised on first update; an untouched slot reads as the
/// initial state, so memory follows the branches seen rather than `size`.
pub struct PatternHistoryTable {
    size: usize,
    initial: CounterState,
    buffer: HashMap<usize, CounterState>,
}

impl PatternHistoryTable {
    pub fn make(size: usize, initial: CounterState) -> Self {
        assert!(size > 0);
        Self {
            size,
            initial,
            buffer: HashMap::new(),
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    fn get_index(&self, address: u32) -> usize {
        (address as usize) % self.size
    }

    pub fn state(&self, address: u32) -> CounterState {
        self.buffer
            .get(&self.get_index(address))
            .copied()
            .unwrap_or(self.initial)
    }

    pub fn predict_address(&self, address: u32) -> bool {
        self.state(address).predict()
    }

    pub fn update_address(&mut self, address: u32, taken: bool) {
        let index = self.get_index(address);
        let state = self.buffer.entry(index).or_insert(self.initial);
        *state = state.next(taken);
    }
}

impl DirectionPredictor for PatternHistoryTable {
    fn name(&self) -> &'static str {
        "two-bit"
    }

    fn predict(&self, event: &BranchEvent) -> bool {
        self.predict_address(event.address)
    }

    fn update(&mut self, event: &BranchEvent) {
        self.update_address(event.address, event.taken);
    }
}
