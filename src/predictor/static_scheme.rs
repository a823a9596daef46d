use crate::predictor::DirectionPredictor;
use crate::trace::{BranchEvent, BranchKind, Direction};

/// Stateless prediction rules
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum StaticScheme {
    /// Backward conditional branches are taken, everything else is not
    #[default]
    BackwardTaken,
    AlwaysTaken,
    AlwaysNotTaken,
}

impl DirectionPredictor for StaticScheme {
    fn name(&self) -> &'static str {
        match self {
            StaticScheme::BackwardTaken => "backward-taken",
            StaticScheme::AlwaysTaken => "always-taken",
            StaticScheme::AlwaysNotTaken => "always-not-taken",
        }
    }

    fn predict(&self, event: &BranchEvent) -> bool {
        match self {
            StaticScheme::BackwardTaken => {
                event.kind == BranchKind::Conditional
                    && event.direction == Direction::Backward
            }
            StaticScheme::AlwaysTaken => true,
            StaticScheme::AlwaysNotTaken => false,
        }
    }

    fn update(&mut self, _: &BranchEvent) {}
}
