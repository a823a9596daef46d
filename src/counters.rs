//! Statistics accumulated over one simulation run

/// Run counters
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct Counters {
    pub total_instructions: u64,
    pub btb_hits: u64,
    pub btb_misses: u64,
    /// BTB hits whose direction the primary predictor got wrong
    pub mispredicted_btb_hits: u64,
    pub correct_static_predictions: u64,
    pub correct_dynamic_predictions: u64,
}

fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

impl Counters {
    pub fn static_misses(&self) -> u64 {
        self.total_instructions - self.correct_static_predictions
    }

    pub fn dynamic_misses(&self) -> u64 {
        self.total_instructions - self.correct_dynamic_predictions
    }

    /// BTB hit rate in percent
    pub fn btb_hit_rate(&self) -> f64 {
        percentage(self.btb_hits, self.btb_hits + self.btb_misses)
    }

    pub fn static_accuracy(&self) -> f64 {
        percentage(self.correct_static_predictions, self.total_instructions)
    }

    pub fn dynamic_accuracy(&self) -> f64 {
        percentage(self.correct_dynamic_predictions, self.total_instructions)
    }

    /// Dynamic minus static accuracy, in percentage points
    pub fn improvement(&self) -> f64 {
        self.dynamic_accuracy() - self.static_accuracy()
    }

    /// Instructions fetched per instruction executed, assuming every BTB miss
    /// and every mispredicted BTB hit costs one extra fetch
    pub fn overhead(&self) -> f64 {
        if self.total_instructions == 0 {
            return 0.0;
        }
        let fetched =
            self.total_instructions + self.btb_misses + self.mispredicted_btb_hits;
        fetched as f64 / self.total_instructions as f64
    }

    /// Check the relations every finished run must satisfy
    pub fn is_consistent(&self) -> bool {
        self.btb_hits + self.btb_misses == self.total_instructions
            && self.mispredicted_btb_hits <= self.btb_hits
            && self.correct_static_predictions <= self.total_instructions
            && self.correct_dynamic_predictions <= self.total_instructions
    }
}
