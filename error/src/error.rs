//! Cuttle errors. Every error except `BatchError` is local to one scenario:
//! the runner reports it against the trace ID and moves on to the next row.

use {std::path::PathBuf, thiserror::Error};

/// Failures resolving a program's published interface schema.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// No schema has been registered for the program.
    #[error("    [CUTTLE]: No published schema for program: {0}")]
    ProgramNotFound(String),
    /// The schema file could not be read.
    #[error("    [CUTTLE]: Failed to read schema file {}: {reason}", .path.display())]
    SchemaRead { path: PathBuf, reason: String },
    /// The schema could not be parsed.
    #[error("    [CUTTLE]: Invalid schema for program {program}: {reason}")]
    InvalidSchema { program: String, reason: String },
    /// The instruction is not part of the program's interface.
    #[error("    [CUTTLE]: Instruction {instruction} not found for the program {program}")]
    InstructionNotFound {
        program: String,
        instruction: String,
    },
    /// The program has no usable on-chain address.
    #[error("    [CUTTLE]: Invalid program ID for program {program}: {value}")]
    InvalidProgramId { program: String, value: String },
}

/// Failures binding an account token to an account slot.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccountBindingError {
    /// The token carries neither `W:` nor `P:`.
    #[error(
        "    [CUTTLE]: Account {slot}: did not find 'W:' or 'P:' to indicate whether `{token}` \
         is a wallet or a PDA"
    )]
    MissingAddressMode { slot: String, token: String },
    /// The wallet keypair file could not be loaded.
    #[error("    [CUTTLE]: Wallet for account {slot} not found at path {}", .path.display())]
    WalletNotFound { slot: String, path: PathBuf },
    /// The `P:` literal is not a valid address.
    #[error("    [CUTTLE]: Account {slot}: invalid address `{value}`")]
    InvalidAddress { slot: String, value: String },
    /// A declared signer slot was bound to an address without a keypair.
    #[error("    [CUTTLE]: Account {slot} must sign, but was given an address without a keypair")]
    SignerWithoutKeypair { slot: String },
    /// The row ran out of tokens.
    #[error("    [CUTTLE]: No token provided for account {slot}")]
    MissingToken { slot: String },
}

/// Failures binding an argument token to an argument slot.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArgumentBindingError {
    /// A fixed-length array was given the wrong number of elements.
    #[error("    [CUTTLE]: Arg {name}: expected array of length {expected}, but got {actual}")]
    ArrayLength {
        name: String,
        expected: usize,
        actual: usize,
    },
    /// A value could not be converted to the declared type. `index` is set
    /// for array elements.
    #[error(
        "    [CUTTLE]: Arg {name}: invalid input `{raw}`{}",
        .index.map(|i| format!(" at index {i}")).unwrap_or_default()
    )]
    TypeConversion {
        name: String,
        index: Option<usize>,
        raw: String,
    },
    /// The declared type has no coercion.
    #[error("    [CUTTLE]: Unsupported type `{declared}` for arg {name}")]
    UnsupportedType { name: String, declared: String },
    /// The row ran out of tokens.
    #[error("    [CUTTLE]: No token provided for arg {name}")]
    MissingToken { name: String },
}

/// Failures reported by a network client.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ClientError {
    /// The client cannot reach a network.
    #[error("    [CUTTLE]: Client for cluster {cluster} is offline")]
    Offline { cluster: String },
    /// The network rejected the request.
    #[error("    [CUTTLE]: Request rejected: {0}")]
    Rejected(String),
    /// The transaction could not be encoded for the request.
    #[error("    [CUTTLE]: Failed to encode transaction: {0}")]
    Encoding(String),
}

/// A scenario-local failure. The scenario is skipped and excluded from the
/// batch report.
#[derive(Debug, Error)]
pub enum TraceError {
    /// The row does not carry the fixed prefix and trailing tokens.
    #[error("    [CUTTLE]: Malformed execution trace row with {tokens} tokens")]
    MalformedRow { tokens: usize },
    /// The row's token count does not match the instruction's slots.
    #[error("    [CUTTLE]: Expected {expected} tokens for the instruction, but got {actual}")]
    TokenCount { expected: usize, actual: usize },
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Account(#[from] AccountBindingError),
    #[error(transparent)]
    Argument(#[from] ArgumentBindingError),
    /// The signing wallet could not be loaded.
    #[error("    [CUTTLE]: Provider wallet not found at path {}", .path.display())]
    PayerWallet { path: PathBuf },
    /// The transaction could not be assembled.
    #[error("    [CUTTLE]: Failed to build transaction: {0}")]
    Build(String),
    /// The fee could not be estimated.
    #[error("    [CUTTLE]: Failed to estimate fees: {0}")]
    FeeEstimate(ClientError),
}

/// A failure that halts the whole batch.
#[derive(Debug, Error)]
pub enum BatchError {
    /// A row targets a program that was never prepared.
    #[error("    [CUTTLE]: Program {program} not initialized yet (execution trace {trace_id})")]
    ProgramNotInitialized { trace_id: String, program: String },
    /// Reading the trace file or writing the report failed.
    #[error("    [CUTTLE]: I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
