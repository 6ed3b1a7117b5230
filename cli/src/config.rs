//! Cuttle config file.
//!
//! ```yaml
//! wallets_dir: solana_wallets
//! traces_dir: execution_traces
//! results_dir: execution_traces_results
//! lamports_per_signature: 5000
//! signer_policy: strict
//! programs:
//!   mycounter:
//!     idl: target/idl/mycounter.json
//!     cluster: devnet
//! ```
//!
//! Relative paths are resolved against the directory holding the config
//! file. Only programs listed under `programs` can be targeted by a trace.

use {
    cuttle_trace::{
        accounts::SignerPolicy,
        client::{Cluster, DEFAULT_LAMPORTS_PER_SIGNATURE},
        schema::{IdlRegistry, IdlSource},
    },
    serde::Deserialize,
    std::{
        collections::BTreeMap,
        fs::File,
        path::{Path, PathBuf},
        str::FromStr,
    },
    trezoa_pubkey::Pubkey,
};

#[derive(Debug, Deserialize)]
pub struct ProgramConfig {
    /// Path to the program's Anchor IDL.
    pub idl: PathBuf,
    #[serde(default = "default_cluster")]
    pub cluster: Cluster,
    /// Overrides the address recorded in the IDL.
    #[serde(default)]
    pub program_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ConfigFile {
    #[serde(default = "default_wallets_dir")]
    pub wallets_dir: PathBuf,
    #[serde(default = "default_traces_dir")]
    pub traces_dir: PathBuf,
    #[serde(default = "default_results_dir")]
    pub results_dir: PathBuf,
    #[serde(default = "default_lamports_per_signature")]
    pub lamports_per_signature: u64,
    #[serde(default)]
    pub signer_policy: SignerPolicy,
    #[serde(default)]
    pub programs: BTreeMap<String, ProgramConfig>,
}

fn default_cluster() -> Cluster {
    Cluster::Localnet
}

fn default_wallets_dir() -> PathBuf {
    PathBuf::from("solana_wallets")
}

fn default_traces_dir() -> PathBuf {
    PathBuf::from("execution_traces")
}

fn default_results_dir() -> PathBuf {
    PathBuf::from("execution_traces_results")
}

fn default_lamports_per_signature() -> u64 {
    DEFAULT_LAMPORTS_PER_SIGNATURE
}

impl ConfigFile {
    pub fn try_load(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let file = File::open(path)?;
        let mut config: Self = serde_yaml::from_reader(file)?;
        if let Some(base) = Path::new(path).parent() {
            config.rebase(base);
        }
        Ok(config)
    }

    fn rebase(&mut self, base: &Path) {
        let rebase = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        };
        rebase(&mut self.wallets_dir);
        rebase(&mut self.traces_dir);
        rebase(&mut self.results_dir);
        for program in self.programs.values_mut() {
            rebase(&mut program.idl);
        }
    }

    /// Names of the programs traces may target.
    pub fn known_programs(&self) -> impl Iterator<Item = &str> {
        self.programs.keys().map(String::as_str)
    }

    /// An IDL registry covering every configured program.
    pub fn registry(&self) -> Result<IdlRegistry, Box<dyn std::error::Error>> {
        let mut registry = IdlRegistry::new();
        for (name, program) in &self.programs {
            let program_id = program
                .program_id
                .as_deref()
                .map(Pubkey::from_str)
                .transpose()
                .map_err(|err| format!("Invalid program ID for {name}: {err}"))?;
            registry.register(
                name.clone(),
                IdlSource::File(program.idl.clone()),
                program.cluster.clone(),
                program_id,
            );
        }
        Ok(registry)
    }
}
