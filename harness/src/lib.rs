//! # Cuttle
//!
//! Cuttle exercises deployed Anchor program instructions in batch. A trace
//! file lists one scenario per row; each row is a flat sequence of text
//! tokens:
//!
//! ```text
//! trace_id;program;instruction;<account>...;<arg>...;signing_wallet;submit
//! ```
//!
//! For every row the runner looks up the instruction in the program's IDL,
//! binds one token per account slot and one token per argument slot, builds
//! and signs a transaction, measures its size, asks the cluster for its fee
//! and, if the row's `submit` flag is `true`, sends it. Each successful row
//! contributes one line to the batch report.
//!
//! ## Accounts
//!
//! Account tokens name their addressing mode:
//!
//! * `W:alice.json` loads the wallet keypair `alice.json` from the wallets
//!   directory. If the slot is a signer, the keypair signs the transaction.
//! * `P:<base58 address>` binds an address literal, typically a PDA.
//!
//! ## Arguments
//!
//! Scalar arguments take one token, coerced to the type the IDL declares.
//! Fixed-length arrays take one token holding space-separated elements,
//! e.g. `1 2 3` for `[u8; 3]`.
//!
//! ```rust,ignore
//! use cuttle_trace::{
//!     client::{Cluster, OfflineConnector},
//!     keypair::WalletDir,
//!     schema::{IdlRegistry, IdlSource},
//!     tokens::TraceFile,
//!     TraceRunner,
//! };
//!
//! let mut schemas = IdlRegistry::new();
//! schemas.register(
//!     "mycounter",
//!     IdlSource::File("idl/mycounter.json".into()),
//!     Cluster::Localnet,
//!     None,
//! );
//!
//! let runner = TraceRunner::new(
//!     ["mycounter"],
//!     schemas,
//!     WalletDir::new("wallets"),
//!     OfflineConnector::default(),
//! );
//!
//! let trace = TraceFile::load("traces/counter.csv")?;
//! let run = runner.run_all(&trace.rows).await?;
//! run.report.write("results".as_ref(), &trace.path)?;
//! ```

pub mod accounts;
pub mod args;
pub mod client;
pub mod keypair;
pub mod runner;
pub mod schema;
pub mod tokens;
pub mod transaction;

pub use {
    cuttle_trace_error::error, cuttle_trace_result as result, runner::TraceRunner,
};
