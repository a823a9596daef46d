//! Branch direction predictors

pub mod static_scheme;
pub mod two_bit;

use crate::trace::BranchEvent;

pub use static_scheme::StaticScheme;
pub use two_bit::{CounterState, PatternHistoryTable};

/// Interface to a predictor of taken/not-taken outcomes.
pub trait DirectionPredictor {
    fn name(&self) -> &'static str;

    /// Return `true` if `event` is predicted taken
    fn predict(&self, event: &BranchEvent) -> bool;

    /// Update internal state with the resolved outcome of `event`
    fn update(&mut self, event: &BranchEvent);
}

/// Which predictor decides whether a BTB hit was mispredicted
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PredictorVariant {
    Static,
    #[default]
    TwoBit,
}

impl PredictorVariant {
    pub fn title(&self) -> &'static str {
        match self {
            PredictorVariant::Static => "Static Branch Predictor Simulation",
            PredictorVariant::TwoBit => "Two-Level Branch Prediction Simulation",
        }
    }

    /// Line printed under the title
    pub fn rule(&self) -> &'static str {
        match self {
            PredictorVariant::Static => "===================================",
            PredictorVariant::TwoBit => "-------------------------------------",
        }
    }
}
