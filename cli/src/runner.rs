//! CLI runner. Runs each trace file through a `TraceRunner` and prints what
//! happened to every row.

use {
    chrono::Utc,
    cuttle_trace::{
        accounts::SignerPolicy,
        client::OfflineConnector,
        keypair::WalletDir,
        runner::BatchRun,
        schema::IdlRegistry,
        TraceRunner,
    },
    std::path::{Path, PathBuf},
};

pub struct Runner {
    runner: TraceRunner<IdlRegistry, WalletDir, OfflineConnector>,
    results_dir: PathBuf,
    verbose: bool,
}

impl Runner {
    pub fn new<'a>(
        known_programs: impl IntoIterator<Item = &'a str>,
        schemas: IdlRegistry,
        wallets_dir: &Path,
        lamports_per_signature: u64,
        signer_policy: SignerPolicy,
        results_dir: PathBuf,
        verbose: bool,
    ) -> Self {
        let runner = TraceRunner::new(
            known_programs,
            schemas,
            WalletDir::new(wallets_dir),
            OfflineConnector {
                lamports_per_signature,
            },
        )
        .with_signer_policy(signer_policy);
        Self {
            runner,
            results_dir,
            verbose,
        }
    }

    fn print_run(&self, run: &BatchRun) {
        if self.verbose {
            println!("----------------------------------------");
        }

        for result in run.report.iter() {
            println!(
                "OK: {} size={} fee={}",
                result.trace_id, result.byte_size, result.fee_lamports
            );
            if self.verbose && result.submission.was_requested() {
                println!("    submission: {:?}", result.submission);
            }
        }

        for failure in &run.failures {
            println!(
                "SKIP: row {} ({}): {}",
                failure.index, failure.trace_id, failure.error
            );
        }

        if self.verbose {
            println!("----------------------------------------");
            println!();
        }
    }

    /// Run every trace file in order and return the report written for each.
    /// A batch-fatal error stops the run before the remaining files.
    pub async fn run_all(
        &self,
        traces: &[PathBuf],
    ) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
        let started = Utc::now();
        let mut results = 0;
        let mut skipped = 0;
        let mut reports = Vec::with_capacity(traces.len());

        for trace in traces {
            if self.verbose {
                println!("[TRACE]: {}", trace.display());
            }

            let (run, report_path) = self
                .runner
                .run_trace_file(trace, &self.results_dir)
                .await?;
            self.print_run(&run);

            results += run.report.len();
            skipped += run.failures.len();
            println!("[REPORT]: {}", report_path.display());
            reports.push(report_path);
        }

        println!();
        println!(
            "[DONE][TRACE RESULT]: {} results, {} skipped ({}s)",
            results,
            skipped,
            (Utc::now() - started).num_seconds()
        );

        Ok(reports)
    }
}
