//! The batch report: one row per scenario that made it through binding.

use {
    crate::types::ScenarioResult,
    std::{
        fs, io,
        path::{Path, PathBuf},
    },
};

const RESULTS_SUFFIX: &str = "_results";
const RESULTS_EXTENSION: &str = "csv";

/// Ordered accumulator of scenario results for one batch run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchReport {
    results: Vec<ScenarioResult>,
}

impl BatchReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, result: ScenarioResult) {
        self.results.push(result);
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScenarioResult> {
        self.results.iter()
    }

    /// Get a result by its trace ID.
    pub fn get(&self, trace_id: &str) -> Option<&ScenarioResult> {
        self.results.iter().find(|r| r.trace_id == trace_id)
    }

    /// The report rows, in the order the scenarios ran.
    pub fn rows(&self) -> Vec<String> {
        self.results.iter().map(ScenarioResult::to_row).collect()
    }

    /// Where the report for `trace_file` lands inside `results_dir`:
    /// the trace file's base name with a `_results` suffix.
    pub fn report_path(results_dir: &Path, trace_file: &Path) -> PathBuf {
        let stem = trace_file
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        results_dir.join(format!("{stem}{RESULTS_SUFFIX}.{RESULTS_EXTENSION}"))
    }

    /// Write the report for `trace_file`, creating `results_dir` if needed.
    ///
    /// An existing report is overwritten, never appended to.
    pub fn write(&self, results_dir: &Path, trace_file: &Path) -> io::Result<PathBuf> {
        fs::create_dir_all(results_dir)?;
        let path = Self::report_path(results_dir, trace_file);

        let mut contents = String::new();
        for row in self.rows() {
            contents.push_str(&row);
            contents.push('\n');
        }
        fs::write(&path, contents)?;

        log::debug!("Wrote {} result rows to {}", self.len(), path.display());
        Ok(path)
    }
}

impl FromIterator<ScenarioResult> for BatchReport {
    fn from_iter<I: IntoIterator<Item = ScenarioResult>>(iter: I) -> Self {
        Self {
            results: iter.into_iter().collect(),
        }
    }
}
