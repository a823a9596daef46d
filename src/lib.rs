pub mod btb;
pub mod counters;
pub mod predictor;
pub mod trace;

pub mod simulator;
pub mod stages;

pub mod policy;
pub mod report;
pub mod run_wrapper;
pub mod sweep;

pub mod error;
pub mod flags;
