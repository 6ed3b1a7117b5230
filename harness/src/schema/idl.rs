//! Anchor IDL backed schema provider.
//!
//! Both IDL generations are understood: the legacy layout (`isMut`,
//! `isSigner`, `publicKey`, address under `metadata`) and the current one
//! (`writable`, `signer`, `pubkey`, top-level `address`, explicit
//! discriminators). Nested account groups are flattened in declaration
//! order.

use {
    super::{AccountSpec, ArgSpec, ArgType, InstructionSchema, SchemaProvider},
    crate::{client::Cluster, error::SchemaError, transaction::anchor_discriminator},
    serde::Deserialize,
    serde_json::Value,
    std::{
        collections::HashMap,
        fs,
        path::{Path, PathBuf},
        str::FromStr,
        sync::OnceLock,
    },
    trezoa_pubkey::Pubkey,
};

#[derive(Clone, Debug, Deserialize)]
pub struct Idl {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub metadata: Option<IdlMetadata>,
    #[serde(default)]
    pub instructions: Vec<IdlInstruction>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct IdlMetadata {
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct IdlInstruction {
    pub name: String,
    #[serde(default)]
    pub discriminator: Option<Vec<u8>>,
    #[serde(default)]
    pub accounts: Vec<IdlAccountItem>,
    #[serde(default)]
    pub args: Vec<IdlField>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum IdlAccountItem {
    Group(IdlAccountGroup),
    Single(IdlAccount),
}

#[derive(Clone, Debug, Deserialize)]
pub struct IdlAccountGroup {
    pub name: String,
    pub accounts: Vec<IdlAccountItem>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct IdlAccount {
    pub name: String,
    #[serde(default, alias = "isMut")]
    pub writable: bool,
    #[serde(default, alias = "isSigner")]
    pub signer: bool,
}

#[derive(Clone, Debug, Deserialize)]
pub struct IdlField {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: Value,
}

impl Idl {
    pub fn from_json(program: &str, json: &str) -> Result<Self, SchemaError> {
        serde_json::from_str(json).map_err(|err| SchemaError::InvalidSchema {
            program: program.to_string(),
            reason: err.to_string(),
        })
    }

    pub fn from_file(program: &str, path: &Path) -> Result<Self, SchemaError> {
        let json = fs::read_to_string(path).map_err(|err| SchemaError::SchemaRead {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;
        Self::from_json(program, &json)
    }

    /// The address the IDL was published for, if it records one.
    pub fn declared_address(&self) -> Option<&str> {
        self.address
            .as_deref()
            .or_else(|| self.metadata.as_ref()?.address.as_deref())
    }

    fn find(&self, instruction: &str) -> Option<&IdlInstruction> {
        self.instructions.iter().find(|ix| ix.name == instruction)
    }
}

impl IdlInstruction {
    fn to_schema(&self) -> InstructionSchema {
        let mut accounts = Vec::new();
        flatten_accounts(&self.accounts, &mut accounts);

        let args = self
            .args
            .iter()
            .map(|field| ArgSpec {
                name: field.name.clone(),
                ty: arg_type(&field.ty),
            })
            .collect();

        let discriminator = self
            .discriminator
            .as_deref()
            .and_then(|bytes| <[u8; 8]>::try_from(bytes).ok())
            .unwrap_or_else(|| anchor_discriminator(&self.name));

        InstructionSchema {
            name: self.name.clone(),
            discriminator,
            accounts,
            args,
        }
    }
}

fn flatten_accounts(items: &[IdlAccountItem], out: &mut Vec<AccountSpec>) {
    for item in items {
        match item {
            IdlAccountItem::Group(group) => flatten_accounts(&group.accounts, out),
            IdlAccountItem::Single(account) => out.push(AccountSpec {
                name: account.name.clone(),
                signer: account.signer,
                writable: account.writable,
            }),
        }
    }
}

/// Map an IDL type node to a declared argument type.
pub fn arg_type(ty: &Value) -> ArgType {
    match ty {
        Value::String(name) => ArgType::from_name(name),
        Value::Object(map) => match map.get("array").and_then(Value::as_array) {
            Some(parts) if parts.len() == 2 => match parts[1].as_u64() {
                Some(len) => ArgType::Array(Box::new(arg_type(&parts[0])), len as usize),
                None => ArgType::Unsupported(ty.to_string()),
            },
            _ => ArgType::Unsupported(ty.to_string()),
        },
        other => ArgType::Unsupported(other.to_string()),
    }
}

/// Where a program's IDL comes from.
#[derive(Clone, Debug)]
pub enum IdlSource {
    /// Read from disk on first lookup, then kept.
    File(PathBuf),
    /// Already in memory.
    Inline(Idl),
}

#[derive(Clone, Debug)]
struct ProgramEntry {
    source: IdlSource,
    cluster: Cluster,
    program_id: Option<Pubkey>,
    parsed: OnceLock<Idl>,
}

/// Registry of program IDLs keyed by program name.
#[derive(Clone, Debug, Default)]
pub struct IdlRegistry {
    programs: HashMap<String, ProgramEntry>,
}

impl IdlRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a program. `program_id` overrides the address recorded in
    /// the IDL.
    pub fn register(
        &mut self,
        program: impl Into<String>,
        source: IdlSource,
        cluster: Cluster,
        program_id: Option<Pubkey>,
    ) {
        self.programs.insert(
            program.into(),
            ProgramEntry {
                source,
                cluster,
                program_id,
                parsed: OnceLock::new(),
            },
        );
    }

    /// Names of every registered program.
    pub fn programs(&self) -> impl Iterator<Item = &str> {
        self.programs.keys().map(String::as_str)
    }

    fn entry(&self, program: &str) -> Result<&ProgramEntry, SchemaError> {
        self.programs
            .get(program)
            .ok_or_else(|| SchemaError::ProgramNotFound(program.to_string()))
    }

    fn load(&self, program: &str) -> Result<&Idl, SchemaError> {
        let entry = self.entry(program)?;
        match &entry.source {
            IdlSource::Inline(idl) => Ok(idl),
            IdlSource::File(path) => {
                if let Some(idl) = entry.parsed.get() {
                    return Ok(idl);
                }
                let idl = Idl::from_file(program, path)?;
                Ok(entry.parsed.get_or_init(|| idl))
            }
        }
    }
}

impl SchemaProvider for IdlRegistry {
    fn instructions(&self, program: &str) -> Result<Vec<String>, SchemaError> {
        let idl = self.load(program)?;
        Ok(idl.instructions.iter().map(|ix| ix.name.clone()).collect())
    }

    fn instruction(
        &self,
        program: &str,
        instruction: &str,
    ) -> Result<InstructionSchema, SchemaError> {
        let idl = self.load(program)?;
        idl.find(instruction)
            .map(IdlInstruction::to_schema)
            .ok_or_else(|| SchemaError::InstructionNotFound {
                program: program.to_string(),
                instruction: instruction.to_string(),
            })
    }

    fn program_id(&self, program: &str) -> Result<Pubkey, SchemaError> {
        if let Some(program_id) = self.entry(program)?.program_id {
            return Ok(program_id);
        }
        let idl = self.load(program)?;
        let address = idl.declared_address().unwrap_or_default();
        Pubkey::from_str(address).map_err(|_| SchemaError::InvalidProgramId {
            program: program.to_string(),
            value: address.to_string(),
        })
    }

    fn cluster(&self, program: &str) -> Result<Cluster, SchemaError> {
        Ok(self.entry(program)?.cluster.clone())
    }
}

#[cfg(test)]
mod tests {
    use {super::*, serde_json::json};

    const LEGACY_IDL: &str = r#"{
        "version": "0.1.0",
        "name": "mycounter",
        "instructions": [
            {
                "name": "increment",
                "accounts": [
                    { "name": "authority", "isMut": false, "isSigner": true },
                    { "name": "counter", "isMut": true, "isSigner": false }
                ],
                "args": [ { "name": "amount", "type": "u64" } ]
            },
            {
                "name": "setAll",
                "accounts": [
                    {
                        "name": "common",
                        "accounts": [
                            { "name": "payer", "isMut": true, "isSigner": true },
                            { "name": "systemProgram", "isMut": false, "isSigner": false }
                        ]
                    },
                    { "name": "store", "isMut": true, "isSigner": false }
                ],
                "args": [
                    { "name": "values", "type": { "array": ["u8", 3] } },
                    { "name": "owner", "type": "publicKey" },
                    { "name": "extra", "type": { "vec": "u8" } }
                ]
            }
        ]
    }"#;

    fn registry() -> IdlRegistry {
        let mut registry = IdlRegistry::new();
        registry.register(
            "mycounter",
            IdlSource::Inline(Idl::from_json("mycounter", LEGACY_IDL).unwrap()),
            Cluster::Localnet,
            Some(Pubkey::new_unique()),
        );
        registry
    }

    #[test]
    fn test_legacy_instruction_schema() {
        let schema = registry().instruction("mycounter", "increment").unwrap();
        assert_eq!(schema.required_accounts(), vec!["authority", "counter"]);
        assert_eq!(
            schema.signer_accounts().into_iter().collect::<Vec<_>>(),
            vec!["authority"]
        );
        assert_eq!(
            schema.required_args(),
            &[ArgSpec {
                name: "amount".to_string(),
                ty: ArgType::U64,
            }]
        );
        assert_eq!(schema.discriminator, anchor_discriminator("increment"));
        assert_eq!(schema.expected_tokens(), 8);
    }

    #[test]
    fn test_nested_accounts_and_array_args() {
        let schema = registry().instruction("mycounter", "setAll").unwrap();
        assert_eq!(
            schema.required_accounts(),
            vec!["payer", "systemProgram", "store"]
        );
        assert_eq!(
            schema.args[0].ty,
            ArgType::Array(Box::new(ArgType::U8), 3)
        );
        assert_eq!(schema.args[1].ty, ArgType::Pubkey);
        assert!(matches!(schema.args[2].ty, ArgType::Unsupported(_)));
    }

    #[test]
    fn test_current_idl_layout() {
        let address = Pubkey::new_unique();
        let idl = json!({
            "address": address.to_string(),
            "metadata": { "name": "vault", "version": "0.1.0", "spec": "0.1.0" },
            "instructions": [{
                "name": "deposit",
                "discriminator": [1, 2, 3, 4, 5, 6, 7, 8],
                "accounts": [
                    { "name": "owner", "writable": true, "signer": true },
                    { "name": "vault", "writable": true }
                ],
                "args": [ { "name": "lamports", "type": "u64" } ]
            }]
        });

        let mut registry = IdlRegistry::new();
        registry.register(
            "vault",
            IdlSource::Inline(Idl::from_json("vault", &idl.to_string()).unwrap()),
            Cluster::Devnet,
            None,
        );

        assert_eq!(registry.program_id("vault").unwrap(), address);
        assert_eq!(registry.cluster("vault").unwrap(), Cluster::Devnet);
        assert_eq!(registry.instructions("vault").unwrap(), vec!["deposit"]);

        let schema = registry.instruction("vault", "deposit").unwrap();
        assert_eq!(schema.discriminator, [1, 2, 3, 4, 5, 6, 7, 8]);
        assert!(schema.accounts[0].signer && schema.accounts[0].writable);
        assert!(!schema.accounts[1].signer);
    }

    #[test]
    fn test_lookup_failures() {
        let registry = registry();
        assert!(matches!(
            registry.instruction("unknown", "increment"),
            Err(SchemaError::ProgramNotFound(_))
        ));
        assert!(matches!(
            registry.instruction("mycounter", "decrement"),
            Err(SchemaError::InstructionNotFound { .. })
        ));
    }

    #[test]
    fn test_idl_file_is_read_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mycounter.json");
        fs::write(&path, LEGACY_IDL).unwrap();

        let mut registry = IdlRegistry::new();
        registry.register(
            "mycounter",
            IdlSource::File(path.clone()),
            Cluster::Localnet,
            Some(Pubkey::new_unique()),
        );
        assert!(registry.instruction("mycounter", "increment").is_ok());

        // Later lookups are served from the parsed copy.
        fs::remove_file(&path).unwrap();
        assert!(registry.instruction("mycounter", "increment").is_ok());
        assert_eq!(registry.instructions("mycounter").unwrap().len(), 2);
    }

    #[test]
    fn test_missing_idl_file() {
        let mut registry = IdlRegistry::new();
        registry.register(
            "ghost",
            IdlSource::File(PathBuf::from("/nonexistent/ghost.json")),
            Cluster::Localnet,
            None,
        );
        assert!(matches!(
            registry.instructions("ghost"),
            Err(SchemaError::SchemaRead { .. })
        ));
    }
}
