//! Report rendering
//!
//! The text layout is consumed by analysis scripts that match labels such as
//! `BTB hits: (\d+)` and `BTB hit rate:\s+(\d+\.\d+)%`, so labels and number
//! formatting must stay as they are.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::counters::Counters;
use crate::policy::SimulationPolicy;
use crate::predictor::{DirectionPredictor, PredictorVariant};

/// Output layout
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Text,
    /// One `key=value` pair per line
    KeyValue,
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(ReportFormat::Text),
            "kv" => Ok(ReportFormat::KeyValue),
            _ => Err(format!(
                "Invalid report format: '{}'. Expected 'text' or 'kv'.",
                s
            )),
        }
    }
}

/// Simulation parameters printed ahead of the statistics
pub fn render_header(trace_path: &Path, policy: &SimulationPolicy) -> String {
    Header { trace_path, policy }.to_string()
}

pub fn render(counters: &Counters, format: ReportFormat) -> String {
    match format {
        ReportFormat::Text => render_text(counters),
        ReportFormat::KeyValue => render_key_value(counters),
    }
}

pub fn render_text(counters: &Counters) -> String {
    TextReport(counters).to_string()
}

struct Header<'a> {
    trace_path: &'a Path,
    policy: &'a SimulationPolicy,
}

impl fmt::Display for Header<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let variant = self.policy.variant;
        writeln!(f, "{}", variant.title())?;
        writeln!(f, "{}", variant.rule())?;
        writeln!(f, "Trace file: {}", self.trace_path.display())?;
        match variant {
            PredictorVariant::Static => {
                writeln!(f, "BTB size: {}", self.policy.btb_size)?;
                writeln!(f, "Prediction policy: {}", self.policy.static_scheme.name())?;
            }
            PredictorVariant::TwoBit => {
                writeln!(f, "BTB size: {} entries", self.policy.btb_size)?;
            }
        }
        writeln!(f)
    }
}

struct TextReport<'a>(&'a Counters);

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = self.0;

        writeln!(f, "Branch Predictor Statistics:")?;
        writeln!(f, "===================================")?;
        writeln!(f, "Total instructions processed: {}", c.total_instructions)?;
        writeln!(f)?;

        writeln!(f, "Static Branch Prediction Statistics:")?;
        writeln!(f, "-----------------------------------")?;
        writeln!(f, "Direction prediction hits: {}", c.correct_static_predictions)?;
        writeln!(f, "Direction prediction misses: {}", c.static_misses())?;
        writeln!(f, "Direction prediction accuracy: {:.2}%", c.static_accuracy())?;
        writeln!(f)?;

        writeln!(f, "Two-Level Branch Prediction Statistics:")?;
        writeln!(f, "--------------------------------------")?;
        writeln!(f, "Direction prediction hits: {}", c.correct_dynamic_predictions)?;
        writeln!(f, "Direction prediction misses: {}", c.dynamic_misses())?;
        writeln!(f, "Direction prediction accuracy: {:.2}%", c.dynamic_accuracy())?;
        writeln!(f, "Improvement over static prediction: {:.2}%", c.improvement())?;
        writeln!(f)?;

        writeln!(f, "BTB Statistics:")?;
        writeln!(f, "--------------")?;
        writeln!(f, "BTB hits: {}", c.btb_hits)?;
        writeln!(f, "BTB misses: {}", c.btb_misses)?;
        writeln!(f, "BTB hits but direction mispredicted: {}", c.mispredicted_btb_hits)?;
        writeln!(f, "BTB hit rate: {:.2}%", c.btb_hit_rate())
    }
}

pub fn render_key_value(c: &Counters) -> String {
    let fields: [(&str, String); 11] = [
        ("total_instructions", c.total_instructions.to_string()),
        ("btb_hits", c.btb_hits.to_string()),
        ("btb_misses", c.btb_misses.to_string()),
        ("mispredicted_btb_hits", c.mispredicted_btb_hits.to_string()),
        ("correct_static_predictions", c.correct_static_predictions.to_string()),
        ("correct_dynamic_predictions", c.correct_dynamic_predictions.to_string()),
        ("static_accuracy", format!("{:.2}", c.static_accuracy())),
        ("dynamic_accuracy", format!("{:.2}", c.dynamic_accuracy())),
        ("improvement", format!("{:.2}", c.improvement())),
        ("btb_hit_rate", format!("{:.2}", c.btb_hit_rate())),
        ("overhead", format!("{:.4}", c.overhead())),
    ];

    fields
        .iter()
        .map(|(key, value)| format!("{}={}\n", key, value))
        .collect()
}
