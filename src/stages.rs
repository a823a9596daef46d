//! The four stages every branch event passes through:
//! fetch, BTB lookup, direction prediction and commit

use crate::btb::BtbOutcome;
use crate::error::TraceError;
use crate::predictor::{DirectionPredictor, PredictorVariant};
use crate::simulator::SimulatorState;
use crate::trace::BranchEvent;

/// Direction predictions made for one event
#[derive(Clone, Copy, Debug)]
pub struct Predictions {
    pub static_taken: bool,
    pub dynamic_taken: bool,
}

/// Fetch stage; `None` once the trace is exhausted
pub fn fetch<I>(events: &mut I) -> Result<Option<BranchEvent>, TraceError>
where
    I: Iterator<Item = Result<BranchEvent, TraceError>>,
{
    events.next().transpose()
}

/// BTB lookup stage
pub fn btb_lookup(state: &mut SimulatorState, event: &BranchEvent) -> BtbOutcome {
    let outcome = state.btb.lookup(event.address);
    match outcome {
        BtbOutcome::Hit => state.counters.btb_hits += 1,
        BtbOutcome::Miss => state.counters.btb_misses += 1,
    }
    outcome
}

/// Direction prediction stage
pub fn direction_predict(
    state: &mut SimulatorState,
    event: &BranchEvent,
    btb_outcome: BtbOutcome,
) -> Predictions {
    let static_taken = state.static_predictor.predict(event);
    let dynamic_taken = state.dynamic_predictor.predict(event);

    if static_taken == event.taken {
        state.counters.correct_static_predictions += 1;
    }
    if dynamic_taken == event.taken {
        state.counters.correct_dynamic_predictions += 1;
    }

    let primary_taken = match state.policy.variant {
        PredictorVariant::Static => static_taken,
        PredictorVariant::TwoBit => dynamic_taken,
    };
    if btb_outcome.is_hit() && primary_taken != event.taken {
        state.counters.mispredicted_btb_hits += 1;
    }

    Predictions {
        static_taken,
        dynamic_taken,
    }
}

/// Commit stage: train both structures with the resolved outcome
pub fn commit(state: &mut SimulatorState, event: &BranchEvent) {
    state.btb.update(event.address, event.target);
    state.static_predictor.update(event);
    state.dynamic_predictor.update(event);
    state.counters.total_instructions += 1;
}
