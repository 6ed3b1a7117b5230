//! Schema lookup facade. Answers which accounts, signers and arguments an
//! instruction requires, with argument types resolved to `ArgType` once at
//! lookup time.

pub mod idl;

use {
    crate::{
        client::Cluster,
        error::SchemaError,
        tokens::{PREFIX_TOKENS, TRAILING_TOKENS},
        transaction::anchor_discriminator,
    },
    borsh::BorshSerialize,
    std::{collections::HashSet, fmt, io, str::FromStr},
    trezoa_pubkey::Pubkey,
};

pub use idl::{Idl, IdlRegistry, IdlSource};

/// A declared argument type. Scalars carry their own coercion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArgType {
    Bool,
    U8,
    U16,
    U32,
    U64,
    U128,
    I8,
    I16,
    I32,
    I64,
    I128,
    F32,
    F64,
    String,
    Pubkey,
    /// A fixed-length array of the element type.
    Array(Box<ArgType>, usize),
    /// A type the binder cannot coerce, kept by its declared name.
    Unsupported(String),
}

impl ArgType {
    /// Resolve a primitive type name as it appears in an interface schema.
    pub fn from_name(name: &str) -> Self {
        match name {
            "bool" => Self::Bool,
            "u8" => Self::U8,
            "u16" => Self::U16,
            "u32" => Self::U32,
            "u64" => Self::U64,
            "u128" => Self::U128,
            "i8" => Self::I8,
            "i16" => Self::I16,
            "i32" => Self::I32,
            "i64" => Self::I64,
            "i128" => Self::I128,
            "f32" => Self::F32,
            "f64" => Self::F64,
            "string" => Self::String,
            "pubkey" | "publicKey" => Self::Pubkey,
            other => Self::Unsupported(other.to_string()),
        }
    }

    /// The element type and length, if this is a fixed-length array.
    pub fn as_array(&self) -> Option<(&ArgType, usize)> {
        match self {
            Self::Array(element, len) => Some((element, *len)),
            _ => None,
        }
    }

    /// Returns `true` if a single token can be coerced to this type.
    pub fn is_scalar(&self) -> bool {
        !matches!(self, Self::Array(..) | Self::Unsupported(_))
    }

    /// Coerce a raw token. Returns `None` if the token does not parse, or if
    /// this type is not a scalar.
    pub fn coerce(&self, raw: &str) -> Option<ArgValue> {
        let value = match self {
            Self::Bool => ArgValue::Bool(parse_bool(raw)?),
            Self::U8 => ArgValue::U8(raw.parse().ok()?),
            Self::U16 => ArgValue::U16(raw.parse().ok()?),
            Self::U32 => ArgValue::U32(raw.parse().ok()?),
            Self::U64 => ArgValue::U64(raw.parse().ok()?),
            Self::U128 => ArgValue::U128(raw.parse().ok()?),
            Self::I8 => ArgValue::I8(raw.parse().ok()?),
            Self::I16 => ArgValue::I16(raw.parse().ok()?),
            Self::I32 => ArgValue::I32(raw.parse().ok()?),
            Self::I64 => ArgValue::I64(raw.parse().ok()?),
            Self::I128 => ArgValue::I128(raw.parse().ok()?),
            Self::F32 => ArgValue::F32(raw.parse().ok()?),
            Self::F64 => ArgValue::F64(raw.parse().ok()?),
            Self::String => ArgValue::String(raw.to_string()),
            Self::Pubkey => ArgValue::Pubkey(Pubkey::from_str(raw).ok()?),
            Self::Array(..) | Self::Unsupported(_) => return None,
        };
        Some(value)
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    if raw.eq_ignore_ascii_case("true") {
        Some(true)
    } else if raw.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

impl fmt::Display for ArgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bool => "bool",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::U128 => "u128",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::I128 => "i128",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::String => "string",
            Self::Pubkey => "pubkey",
            Self::Array(element, len) => return write!(f, "[{element}; {len}]"),
            Self::Unsupported(name) => name,
        };
        f.write_str(name)
    }
}

/// A typed argument value.
#[derive(Clone, Debug, PartialEq)]
pub enum ArgValue {
    Bool(bool),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    U128(u128),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    I128(i128),
    F32(f32),
    F64(f64),
    String(String),
    Pubkey(Pubkey),
    Array(Vec<ArgValue>),
}

impl ArgValue {
    /// Append the Borsh encoding of the value. Fixed-length arrays carry no
    /// length prefix.
    pub fn encode(&self, out: &mut Vec<u8>) -> io::Result<()> {
        self.serialize(out)
    }
}

impl BorshSerialize for ArgValue {
    fn serialize<W: io::Write>(&self, writer: &mut W) -> io::Result<()> {
        match self {
            Self::Bool(v) => v.serialize(writer),
            Self::U8(v) => v.serialize(writer),
            Self::U16(v) => v.serialize(writer),
            Self::U32(v) => v.serialize(writer),
            Self::U64(v) => v.serialize(writer),
            Self::U128(v) => v.serialize(writer),
            Self::I8(v) => v.serialize(writer),
            Self::I16(v) => v.serialize(writer),
            Self::I32(v) => v.serialize(writer),
            Self::I64(v) => v.serialize(writer),
            Self::I128(v) => v.serialize(writer),
            Self::F32(v) => v.serialize(writer),
            Self::F64(v) => v.serialize(writer),
            Self::String(v) => v.serialize(writer),
            Self::Pubkey(v) => v.to_bytes().serialize(writer),
            Self::Array(values) => values.iter().try_for_each(|v| v.serialize(writer)),
        }
    }
}

/// An account slot required by an instruction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccountSpec {
    pub name: String,
    pub signer: bool,
    pub writable: bool,
}

/// An argument slot required by an instruction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArgSpec {
    pub name: String,
    pub ty: ArgType,
}

/// Everything the binders need to know about one instruction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InstructionSchema {
    pub name: String,
    /// The 8-byte selector prefixed to the instruction data.
    pub discriminator: [u8; 8],
    pub accounts: Vec<AccountSpec>,
    pub args: Vec<ArgSpec>,
}

impl InstructionSchema {
    /// A schema using the Anchor discriminator derived from `name`.
    pub fn new(name: impl Into<String>, accounts: Vec<AccountSpec>, args: Vec<ArgSpec>) -> Self {
        let name = name.into();
        Self {
            discriminator: anchor_discriminator(&name),
            name,
            accounts,
            args,
        }
    }

    /// Account names, in slot order.
    pub fn required_accounts(&self) -> Vec<&str> {
        self.accounts.iter().map(|a| a.name.as_str()).collect()
    }

    /// The subset of required accounts that must sign.
    pub fn signer_accounts(&self) -> HashSet<&str> {
        self.accounts
            .iter()
            .filter(|a| a.signer)
            .map(|a| a.name.as_str())
            .collect()
    }

    pub fn required_args(&self) -> &[ArgSpec] {
        &self.args
    }

    /// The exact number of tokens a row invoking this instruction must have.
    pub fn expected_tokens(&self) -> usize {
        PREFIX_TOKENS + self.accounts.len() + self.args.len() + TRAILING_TOKENS
    }
}

/// A source of published program interfaces.
pub trait SchemaProvider {
    /// Names of every instruction the program exposes.
    fn instructions(&self, program: &str) -> Result<Vec<String>, SchemaError>;

    /// The slots of one instruction.
    fn instruction(&self, program: &str, instruction: &str)
        -> Result<InstructionSchema, SchemaError>;

    /// The on-chain address of the program.
    fn program_id(&self, program: &str) -> Result<Pubkey, SchemaError>;

    /// The cluster the program is deployed to.
    fn cluster(&self, program: &str) -> Result<Cluster, SchemaError>;
}
