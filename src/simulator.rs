//! Simulator state and the per-event loop

use log::{debug, info};

use crate::btb::BranchTargetBuffer;
use crate::counters::Counters;
use crate::error::{SimulatorResult, TraceError};
use crate::policy::SimulationPolicy;
use crate::predictor::{PatternHistoryTable, StaticScheme};
use crate::stages;
use crate::trace::BranchEvent;

/// Everything one run owns
pub struct SimulatorState {
    pub policy: SimulationPolicy,

    pub btb: BranchTargetBuffer,
    pub static_predictor: StaticScheme,
    pub dynamic_predictor: PatternHistoryTable,

    pub counters: Counters,
}

impl SimulatorState {
    pub fn make(policy: SimulationPolicy) -> SimulatorResult<Self> {
        policy.validate()?;

        Ok(Self {
            policy,
            btb: BranchTargetBuffer::make(policy.btb_size),
            static_predictor: policy.static_scheme,
            dynamic_predictor: PatternHistoryTable::make(
                policy.btb_size,
                policy.initial_state,
            ),
            counters: Counters::default(),
        })
    }

    /// Run one event through BTB lookup, direction prediction and commit
    pub fn step(&mut self, event: &BranchEvent) {
        let btb_outcome = stages::btb_lookup(self, event);
        let prediction = stages::direction_predict(self, event, btb_outcome);
        stages::commit(self, event);

        if self.policy.verbose {
            debug!(
                "{:#010x} -> {:>10} taken={} btb={:?} static={} dynamic={}",
                event.address,
                event
                    .target
                    .map(|t| format!("{:#010x}", t))
                    .unwrap_or_else(|| "?".to_string()),
                event.taken,
                btb_outcome,
                prediction.static_taken,
                prediction.dynamic_taken,
            );
        }
    }
}

/// Drive a run over `events` until they are exhausted.
///
/// The first trace error aborts the run and no counters are returned.
pub fn run_events<I>(events: I, policy: SimulationPolicy) -> SimulatorResult<Counters>
where
    I: IntoIterator<Item = Result<BranchEvent, TraceError>>,
{
    let mut state = SimulatorState::make(policy)?;
    let mut events = events.into_iter();

    while let Some(event) = stages::fetch(&mut events)? {
        state.step(&event);
    }

    let counters = state.counters;
    debug_assert!(counters.is_consistent());

    info!(
        "BTB size {}: {} instructions, {} BTB hits, {} evictions",
        policy.btb_size,
        counters.total_instructions,
        counters.btb_hits,
        state.btb.history.num_evict,
    );

    Ok(counters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predictor::{CounterState, PredictorVariant};

    fn run(events: &[BranchEvent], policy: SimulationPolicy) -> Counters {
        run_events(events.iter().copied().map(Ok), policy).unwrap()
    }

    fn policy(btb_size: usize) -> SimulationPolicy {
        SimulationPolicy::make(btb_size).unwrap()
    }

    #[test]
    fn test_distinct_addresses_thrash_single_entry() {
        let events: Vec<BranchEvent> = (0..10u32)
            .map(|i| BranchEvent::conditional(0x1000 + 4 * i, 0x2000 + 4 * i, true))
            .collect();

        let counters = run(&events, policy(1));
        assert_eq!(counters.total_instructions, 10);
        assert_eq!(counters.btb_hits, 0);
        assert_eq!(counters.btb_misses, 10);
        assert_eq!(counters.mispredicted_btb_hits, 0);
    }

    #[test]
    fn test_repeated_branch_hits_after_first() {
        let events = vec![BranchEvent::conditional(0x8008, 0x8040, true); 10];

        for btb_size in [1, 2, 64] {
            let counters = run(&events, policy(btb_size));
            assert_eq!(counters.btb_hits, 9);
            assert_eq!(counters.btb_misses, 1);
        }
    }

    #[test]
    fn test_alternating_branch() {
        let events: Vec<BranchEvent> = [true, false, true, false]
            .iter()
            .map(|&taken| BranchEvent::conditional(0x8008, 0x8040, taken))
            .collect();
        let policy = SimulationPolicy {
            initial_state: CounterState::StronglyNotTaken,
            ..policy(4)
        };

        let mut state = SimulatorState::make(policy).unwrap();
        let mut states = vec![state.dynamic_predictor.state(0x8008).value()];
        for event in &events {
            state.step(event);
            states.push(state.dynamic_predictor.state(0x8008).value());
        }
        assert_eq!(states, vec![0, 1, 0, 1, 0]);

        let counters = state.counters;
        assert!(counters.dynamic_accuracy() <= 50.0);
        assert_eq!(counters.correct_dynamic_predictions, 2);
        // Only the second taken event hits the BTB and is mispredicted
        assert_eq!(counters.btb_hits, 3);
        assert_eq!(counters.mispredicted_btb_hits, 1);
    }

    #[test]
    fn test_primary_variant_decides_mispredicted_hits() {
        // A forward branch that is always taken: the static rule is always
        // wrong, the two-bit counter is always right
        let events = vec![BranchEvent::conditional(0x100, 0x200, true); 8];

        let two_bit = run(&events, policy(4));
        assert_eq!(two_bit.correct_dynamic_predictions, 8);
        assert_eq!(two_bit.correct_static_predictions, 0);
        assert_eq!(two_bit.mispredicted_btb_hits, 0);

        let static_only = run(
            &events,
            SimulationPolicy {
                variant: PredictorVariant::Static,
                ..policy(4)
            },
        );
        assert_eq!(static_only.mispredicted_btb_hits, 7);
        assert_eq!(static_only.btb_hits, 7);
    }

    #[test]
    fn test_invariants_on_mixed_trace() {
        let events: Vec<BranchEvent> = (0..1000u32)
            .map(|i| {
                let address = 0x4000 + 4 * ((i * 31) % 97);
                if i % 11 == 0 {
                    BranchEvent::ret(address, i % 3 == 0)
                } else {
                    BranchEvent::conditional(address, address ^ 0x80, i % 5 != 0)
                }
            })
            .collect();

        for btb_size in [1, 3, 16, 128] {
            let counters = run(&events, policy(btb_size));
            assert_eq!(counters.total_instructions, 1000);
            assert_eq!(
                counters.btb_hits + counters.btb_misses,
                counters.total_instructions
            );
            assert!(counters.mispredicted_btb_hits <= counters.btb_hits);
            assert_eq!(run(&events, policy(btb_size)), counters);
        }
    }

    #[test]
    fn test_trace_error_aborts_run() {
        let events = vec![
            Ok(BranchEvent::conditional(0x10, 0x20, true)),
            Err(TraceError::ParseError {
                path: "bad.trace".into(),
                line: 2,
                kind: crate::error::ParseErrorKind::MissingField("outcome"),
            }),
            Ok(BranchEvent::conditional(0x10, 0x20, true)),
        ];
        assert!(run_events(events, policy(4)).is_err());
    }

    #[test]
    fn test_zero_btb_size_is_rejected() {
        let policy = SimulationPolicy {
            btb_size: 0,
            ..SimulationPolicy::default()
        };
        assert!(SimulatorState::make(policy).is_err());
    }

    #[test]
    fn test_largest_btb_size_runs_small_trace() {
        let events = vec![BranchEvent::conditional(0x8008, 0x8040, true); 10];
        let largest = usize::try_from(crate::policy::MAX_BTB_SIZE).unwrap();

        let counters = run(&events, policy(largest));
        assert_eq!(counters, run(&events, policy(64)));

        let oversized = SimulationPolicy {
            btb_size: largest + 1,
            ..SimulationPolicy::default()
        };
        assert!(matches!(
            run_events(events.iter().copied().map(Ok), oversized),
            Err(crate::error::SimulatorError::ConfigError(
                crate::error::ConfigError::BtbSizeTooLarge(_)
            ))
        ));
    }
}
