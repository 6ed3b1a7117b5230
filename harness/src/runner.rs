//! Scenario runner. Drives each execution trace row from tokens to a
//! `ScenarioResult`:
//!
//! 1. Check the program is one the runner was told about.
//! 2. Look up the instruction's schema and check the row's token count.
//! 3. Bind accounts, then args, then the signing wallet and submit flag.
//! 4. Build the transaction, measure its size and ask the cluster for its
//!    fee.
//! 5. Submit it if the row asks to.
//!
//! Any failure in steps 2-4 skips the row; the batch carries on. A row
//! naming an unknown program fails the whole batch before anything runs.

use {
    crate::{
        accounts::{bind_accounts, SignerPolicy, WALLET_PREFIX},
        args::bind_args,
        client::{ClusterConnector, NetworkClient},
        error::{BatchError, SchemaError, TraceError},
        keypair::{Keypair, KeypairLoader},
        result::{BatchReport, ScenarioResult, SubmissionStatus},
        schema::SchemaProvider,
        tokens::{ScenarioRow, TraceFile, PREFIX_TOKENS, TRAILING_TOKENS},
        transaction::{build_transaction, wire_size, ResolvedInvocation},
    },
    std::{
        collections::HashSet,
        path::{Path, PathBuf},
    },
};

/// A scenario with every token bound.
#[derive(Debug)]
pub struct ResolvedScenario {
    pub trace_id: String,
    pub invocation: ResolvedInvocation,
    /// The signing wallet, which also pays the fee.
    pub payer: Keypair,
    pub submit: bool,
}

/// A row that was skipped, and why.
#[derive(Debug)]
pub struct ScenarioFailure {
    pub index: usize,
    pub trace_id: String,
    pub error: TraceError,
}

/// Everything a batch run produced.
#[derive(Debug, Default)]
pub struct BatchRun {
    pub report: BatchReport,
    pub failures: Vec<ScenarioFailure>,
}

pub struct TraceRunner<S, K, C> {
    known_programs: HashSet<String>,
    schemas: S,
    wallets: K,
    connector: C,
    signer_policy: SignerPolicy,
}

impl<S, K, C> TraceRunner<S, K, C>
where
    S: SchemaProvider,
    K: KeypairLoader,
    C: ClusterConnector,
{
    pub fn new<I, P>(known_programs: I, schemas: S, wallets: K, connector: C) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        Self {
            known_programs: known_programs.into_iter().map(Into::into).collect(),
            schemas,
            wallets,
            connector,
            signer_policy: SignerPolicy::default(),
        }
    }

    pub fn with_signer_policy(mut self, signer_policy: SignerPolicy) -> Self {
        self.signer_policy = signer_policy;
        self
    }

    pub fn schemas(&self) -> &S {
        &self.schemas
    }

    pub fn wallets(&self) -> &K {
        &self.wallets
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    pub fn is_known_program(&self, program: &str) -> bool {
        self.known_programs.contains(program)
    }

    /// Fail if any row targets a program the runner does not know.
    pub fn check_programs(&self, rows: &[ScenarioRow]) -> Result<(), BatchError> {
        for row in rows {
            if let Some(program) = row.program_name() {
                if !self.is_known_program(program) {
                    log::error!(
                        "Program {} not initialized yet (execution trace {}).",
                        program,
                        row.trace_id()
                    );
                    return Err(BatchError::ProgramNotInitialized {
                        trace_id: row.trace_id().to_string(),
                        program: program.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Bind every token of the row against the instruction's schema.
    pub fn resolve(&self, row: &ScenarioRow) -> Result<ResolvedScenario, TraceError> {
        let malformed = || TraceError::MalformedRow {
            tokens: row.tokens.len(),
        };
        if row.tokens.len() < PREFIX_TOKENS + TRAILING_TOKENS {
            return Err(malformed());
        }
        let program = row.program_name().ok_or_else(malformed)?;
        let instruction = row.instruction_name().ok_or_else(malformed)?;

        if !self.is_known_program(program) {
            return Err(SchemaError::ProgramNotFound(program.to_string()).into());
        }

        let schema = self.schemas.instruction(program, instruction)?;
        let expected = schema.expected_tokens();
        if row.tokens.len() != expected {
            return Err(TraceError::TokenCount {
                expected,
                actual: row.tokens.len(),
            });
        }
        let program_id = self.schemas.program_id(program)?;

        let mut cursor = row.slots();
        let accounts = bind_accounts(
            &mut cursor,
            &schema.accounts,
            &self.wallets,
            self.signer_policy,
        )?;
        let args = bind_args(&mut cursor, &schema.args)?;

        // The token count check guarantees both trailing tokens are present.
        let wallet_token = cursor.next_token().ok_or_else(malformed)?;
        let submit_token = cursor.next_token().ok_or_else(malformed)?;

        let wallet = wallet_token
            .strip_prefix(WALLET_PREFIX)
            .unwrap_or(wallet_token);
        let payer = self
            .wallets
            .load(wallet)
            .ok_or_else(|| TraceError::PayerWallet {
                path: self.wallets.path(wallet),
            })?;

        Ok(ResolvedScenario {
            trace_id: row.trace_id().to_string(),
            invocation: ResolvedInvocation {
                program_name: program.to_string(),
                program_id,
                schema,
                accounts,
                args,
            },
            payer,
            submit: submit_token.eq_ignore_ascii_case("true"),
        })
    }

    /// Run one scenario end to end.
    pub async fn run_scenario(&self, row: &ScenarioRow) -> Result<ScenarioResult, TraceError> {
        let scenario = self.resolve(row)?;
        let invocation = &scenario.invocation;

        let cluster = self.schemas.cluster(&invocation.program_name)?;
        let client = self.connector.connect(&cluster);

        let blockhash = client
            .latest_blockhash()
            .await
            .map_err(|err| TraceError::Build(err.to_string()))?;
        let transaction = build_transaction(invocation, &scenario.payer, blockhash)?;
        let byte_size = wire_size(&transaction)?;
        let fee_lamports = client
            .fee_for_message(&transaction.message)
            .await
            .map_err(TraceError::FeeEstimate)?;

        let submission = if scenario.submit {
            match client.send_transaction(&transaction).await {
                Ok(signature) => {
                    log::info!(
                        "Execution trace {} submitted: {}",
                        scenario.trace_id,
                        signature
                    );
                    SubmissionStatus::Confirmed(signature)
                }
                Err(err) => {
                    log::warn!(
                        "Execution trace {} failed to submit: {}",
                        scenario.trace_id,
                        err
                    );
                    SubmissionStatus::Failed(err.to_string())
                }
            }
        } else {
            SubmissionStatus::NotRequested
        };

        Ok(ScenarioResult {
            trace_id: scenario.trace_id,
            byte_size,
            fee_lamports,
            submission,
        })
    }

    /// Run every row in order. Failed rows are left out of the report.
    pub async fn run_all(&self, rows: &[ScenarioRow]) -> Result<BatchRun, BatchError> {
        self.check_programs(rows)?;

        let mut run = BatchRun::default();
        for row in rows {
            log::info!("Working on execution trace with ID {}...", row.trace_id());
            match self.run_scenario(row).await {
                Ok(result) => {
                    log::info!("Execution trace {} results computed!", row.index);
                    run.report.push(result);
                }
                Err(error) => {
                    log::warn!("Execution trace {} skipped: {}", row.trace_id(), error);
                    run.failures.push(ScenarioFailure {
                        index: row.index,
                        trace_id: row.trace_id().to_string(),
                        error,
                    });
                }
            }
        }
        Ok(run)
    }

    /// Run a trace file and write its report into `results_dir`.
    pub async fn run_trace_file(
        &self,
        trace_file: &Path,
        results_dir: &Path,
    ) -> Result<(BatchRun, PathBuf), BatchError> {
        let trace = TraceFile::load(trace_file).map_err(|source| BatchError::Io {
            path: trace_file.to_path_buf(),
            source,
        })?;

        let run = self.run_all(&trace.rows).await?;

        let report_path = run
            .report
            .write(results_dir, trace_file)
            .map_err(|source| BatchError::Io {
                path: results_dir.to_path_buf(),
                source,
            })?;
        log::info!("Results written successfully to {}", report_path.display());

        Ok((run, report_path))
    }
}
