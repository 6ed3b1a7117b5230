//! Core result types for execution trace scenarios.

use std::borrow::Cow;

/// What happened to the transaction after it was built and measured.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmissionStatus {
    /// The scenario did not ask for submission.
    NotRequested,
    /// The network accepted the transaction under this signature.
    Confirmed(String),
    /// Submission was requested but failed.
    Failed(String),
}

impl SubmissionStatus {
    /// Returns `true` if the scenario asked for submission.
    pub const fn was_requested(&self) -> bool {
        !matches!(self, SubmissionStatus::NotRequested)
    }
}

/// The overall result of one scenario.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScenarioResult {
    /// The ID of the execution trace row.
    pub trace_id: String,
    /// The serialized size of the signed transaction, in bytes.
    pub byte_size: usize,
    /// The fee the network estimated for the transaction, in lamports.
    pub fee_lamports: u64,
    /// The outcome of the optional submission.
    pub submission: SubmissionStatus,
}

impl ScenarioResult {
    /// The transaction signature, present only if the scenario was submitted
    /// and the submission succeeded.
    pub fn signature(&self) -> Option<&str> {
        match &self.submission {
            SubmissionStatus::Confirmed(signature) => Some(signature),
            _ => None,
        }
    }

    /// Render the result as one report row:
    /// `trace_id,byte_size,fee_lamports[,signature]`.
    pub fn to_row(&self) -> String {
        let mut row = format!(
            "{},{},{}",
            csv_field(&self.trace_id),
            self.byte_size,
            self.fee_lamports
        );
        if let Some(signature) = self.signature() {
            row.push(',');
            row.push_str(&csv_field(signature));
        }
        row
    }
}

/// Quote a report field if it holds a delimiter, a quote or a line break.
/// Embedded quotes are doubled.
pub fn csv_field(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}
