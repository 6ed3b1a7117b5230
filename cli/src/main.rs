//! Cuttle CLI.

mod config;
mod runner;

use {
    crate::runner::Runner,
    clap::{Parser, Subcommand},
    config::ConfigFile,
    cuttle_trace::{accounts::SignerPolicy, schema::SchemaProvider},
    std::{
        fs,
        path::{Path, PathBuf},
    },
};

#[derive(Subcommand)]
enum SubCommand {
    /// Run the execution traces in a trace file, or in every `.csv` file
    /// under a directory, and write one report per file.
    Run {
        /// Path to a trace file or a directory containing them. Paths that
        /// do not exist are looked up under the configured traces
        /// directory.
        #[arg(required = true)]
        trace: String,

        /// Path to the config file.
        #[arg(short, long, default_value = "cuttle.yaml")]
        config: String,
        /// Directory to write reports to. Overrides the config file.
        #[arg(long)]
        results_dir: Option<PathBuf>,
        /// Bind address literals in signer slots instead of rejecting the
        /// scenario. Overrides the config file.
        #[arg(long)]
        permissive_signers: bool,
        /// Print every result and skipped row in detail, and enable debug
        /// logs.
        #[arg(short, long)]
        verbose: bool,
    },
    /// List the configured programs with their instructions, and the trace
    /// files found under the traces directory.
    List {
        /// Path to the config file.
        #[arg(short, long, default_value = "cuttle.yaml")]
        config: String,
    },
}

#[derive(Parser)]
struct Cli {
    #[clap(subcommand)]
    pub command: SubCommand,
}

fn search_paths(path: &Path, extension: &str) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
    fn search_path_recursive(
        path: &Path,
        extension: &str,
        result: &mut Vec<PathBuf>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        if path.is_dir() {
            let mut entries = fs::read_dir(path)?
                .map(|entry| entry.map(|entry| entry.path()))
                .collect::<Result<Vec<_>, _>>()?;
            entries.sort();
            for entry in entries {
                search_path_recursive(&entry, extension, result)?;
            }
        } else if path.extension().is_some_and(|ext| ext == extension) {
            result.push(path.to_path_buf());
        }
        Ok(())
    }

    let mut result = Vec::new();
    search_path_recursive(path, extension, &mut result)?;
    Ok(result)
}

fn resolve_trace_path(trace: &str, traces_dir: &Path) -> PathBuf {
    let path = PathBuf::from(trace);
    if path.exists() {
        path
    } else {
        traces_dir.join(path)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    match Cli::parse().command {
        SubCommand::Run {
            trace,
            config,
            results_dir,
            permissive_signers,
            verbose,
        } => {
            trezoa_logger::setup_with_default(if verbose {
                "cuttle_trace=debug"
            } else {
                "cuttle_trace=info"
            });

            let config = ConfigFile::try_load(&config)?;

            let signer_policy = if permissive_signers {
                SignerPolicy::Permissive
            } else {
                config.signer_policy
            };

            let traces = search_paths(&resolve_trace_path(&trace, &config.traces_dir), "csv")?;
            if traces.is_empty() {
                return Err(format!("No trace files found at {trace}").into());
            }

            Runner::new(
                config.known_programs(),
                config.registry()?,
                &config.wallets_dir,
                config.lamports_per_signature,
                signer_policy,
                results_dir.unwrap_or_else(|| config.results_dir.clone()),
                verbose,
            )
            .run_all(&traces)
            .await?;
        }
        SubCommand::List { config } => {
            trezoa_logger::setup_with_default("cuttle_trace=warn");

            let config = ConfigFile::try_load(&config)?;
            let registry = config.registry()?;
            for name in config.known_programs() {
                let program_id = registry.program_id(name)?;
                let cluster = registry.cluster(name)?;
                println!("{name} ({program_id}, {cluster})");
                for instruction in registry.instructions(name)? {
                    let schema = registry.instruction(name, &instruction)?;
                    let args = schema
                        .required_args()
                        .iter()
                        .map(|arg| format!("{}: {}", arg.name, arg.ty))
                        .collect::<Vec<_>>();
                    println!(
                        "    {}({}; {})",
                        schema.name,
                        schema.required_accounts().join(", "),
                        args.join(", ")
                    );
                }
            }

            println!();
            for trace in search_paths(&config.traces_dir, "csv")? {
                let name = trace.strip_prefix(&config.traces_dir).unwrap_or(&trace);
                println!("{}", name.display());
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_paths() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("b.csv"), "").unwrap();
        fs::write(dir.path().join("nested/a.csv"), "").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();

        let found = search_paths(dir.path(), "csv").unwrap();
        assert_eq!(
            found,
            vec![dir.path().join("b.csv"), dir.path().join("nested/a.csv")]
        );

        let single = search_paths(&dir.path().join("b.csv"), "csv").unwrap();
        assert_eq!(single, vec![dir.path().join("b.csv")]);
    }

    #[test]
    fn test_resolve_trace_path() {
        let dir = tempfile::tempdir().unwrap();
        let traces_dir = dir.path().join("execution_traces");
        assert_eq!(
            resolve_trace_path("counter.csv", &traces_dir),
            traces_dir.join("counter.csv")
        );

        let existing = dir.path().join("here.csv");
        fs::write(&existing, "").unwrap();
        assert_eq!(
            resolve_trace_path(existing.to_str().unwrap(), &traces_dir),
            existing
        );
    }
}
