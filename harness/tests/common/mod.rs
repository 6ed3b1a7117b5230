#![allow(dead_code)]

use {
    cuttle_trace::{
        client::{Cluster, ClusterConnector, NetworkClient},
        error::{ClientError, SchemaError},
        keypair::{Keypair, Signer, WalletDir},
        schema::{AccountSpec, ArgSpec, ArgType, InstructionSchema, SchemaProvider},
        transaction::{transaction_signature, Transaction},
    },
    std::{
        cell::{Cell, RefCell},
        collections::HashMap,
        rc::Rc,
    },
    tempfile::TempDir,
    trezoa_keypair::write_keypair_file,
    trezoa_hash::Hash,
    trezoa_message::Message,
    trezoa_pubkey::Pubkey,
};

pub const LAMPORTS_PER_SIGNATURE: u64 = 5000;

/// A temporary wallets directory.
pub struct Wallets {
    pub dir: TempDir,
}

impl Wallets {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    /// Write a fresh wallet file and return its address.
    pub fn add(&self, name: &str) -> Pubkey {
        let keypair = Keypair::new();
        write_keypair_file(&keypair, self.dir.path().join(name)).unwrap();
        keypair.pubkey()
    }

    pub fn loader(&self) -> WalletDir {
        WalletDir::new(self.dir.path())
    }
}

pub fn account(name: &str, signer: bool, writable: bool) -> AccountSpec {
    AccountSpec {
        name: name.to_string(),
        signer,
        writable,
    }
}

pub fn arg(name: &str, ty: ArgType) -> ArgSpec {
    ArgSpec {
        name: name.to_string(),
        ty,
    }
}

/// An in-memory schema provider.
#[derive(Default)]
pub struct StaticSchemas {
    pub programs: HashMap<String, (Pubkey, Vec<InstructionSchema>)>,
}

impl StaticSchemas {
    pub fn with(mut self, program: &str, instructions: Vec<InstructionSchema>) -> Self {
        self.programs
            .insert(program.to_string(), (Pubkey::new_unique(), instructions));
        self
    }
}

impl SchemaProvider for StaticSchemas {
    fn instructions(&self, program: &str) -> Result<Vec<String>, SchemaError> {
        let (_, instructions) = self
            .programs
            .get(program)
            .ok_or_else(|| SchemaError::ProgramNotFound(program.into()))?;
        Ok(instructions.iter().map(|ix| ix.name.clone()).collect())
    }

    fn instruction(
        &self,
        program: &str,
        instruction: &str,
    ) -> Result<InstructionSchema, SchemaError> {
        let (_, instructions) = self
            .programs
            .get(program)
            .ok_or_else(|| SchemaError::ProgramNotFound(program.into()))?;
        instructions
            .iter()
            .find(|ix| ix.name == instruction)
            .cloned()
            .ok_or_else(|| SchemaError::InstructionNotFound {
                program: program.into(),
                instruction: instruction.into(),
            })
    }

    fn program_id(&self, program: &str) -> Result<Pubkey, SchemaError> {
        self.programs
            .get(program)
            .map(|(id, _)| *id)
            .ok_or_else(|| SchemaError::ProgramNotFound(program.into()))
    }

    fn cluster(&self, _program: &str) -> Result<Cluster, SchemaError> {
        Ok(Cluster::Localnet)
    }
}

/// The `mycounter` program: `increment(authority, counter; amount: u64)`
/// and `set_values(authority, store; values: [u16; 3])`.
pub fn counter_schemas() -> StaticSchemas {
    StaticSchemas::default().with(
        "mycounter",
        vec![
            InstructionSchema::new(
                "increment",
                vec![account("authority", true, false), account("counter", false, true)],
                vec![arg("amount", ArgType::U64)],
            ),
            InstructionSchema::new(
                "set_values",
                vec![account("authority", true, false), account("store", false, true)],
                vec![arg("values", ArgType::Array(Box::new(ArgType::U16), 3))],
            ),
        ],
    )
}

/// Records every call the runner makes to the network.
#[derive(Default)]
pub struct MockNetwork {
    pub connected: RefCell<Vec<Cluster>>,
    pub fee_requests: Cell<usize>,
    pub submissions: Cell<usize>,
    pub reject_submissions: Cell<bool>,
}

#[derive(Clone, Default)]
pub struct MockConnector {
    pub network: Rc<MockNetwork>,
}

pub struct MockClient {
    network: Rc<MockNetwork>,
}

impl ClusterConnector for MockConnector {
    type Client = MockClient;

    fn connect(&self, cluster: &Cluster) -> MockClient {
        self.network.connected.borrow_mut().push(cluster.clone());
        MockClient {
            network: self.network.clone(),
        }
    }
}

impl NetworkClient for MockClient {
    async fn latest_blockhash(&self) -> Result<Hash, ClientError> {
        Ok(Hash::default())
    }

    async fn fee_for_message(&self, message: &Message) -> Result<u64, ClientError> {
        self.network
            .fee_requests
            .set(self.network.fee_requests.get() + 1);
        Ok(u64::from(message.header.num_required_signatures) * LAMPORTS_PER_SIGNATURE)
    }

    async fn send_transaction(&self, transaction: &Transaction) -> Result<String, ClientError> {
        self.network
            .submissions
            .set(self.network.submissions.get() + 1);
        if self.network.reject_submissions.get() {
            return Err(ClientError::Rejected("blockhash not found".to_string()));
        }
        Ok(transaction_signature(transaction).unwrap())
    }
}
