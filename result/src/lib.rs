//! Results of execution trace scenarios and the batch report they are
//! collected into.

pub mod report;
pub mod types;

pub use {
    report::BatchReport,
    types::{ScenarioResult, SubmissionStatus},
};
