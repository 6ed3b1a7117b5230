//! Transaction assembly for a resolved invocation: Anchor instruction data,
//! a legacy message with the signing wallet as fee payer, and signatures
//! from every held keypair.

pub use trezoa_transaction::Transaction;
use {
    crate::{
        accounts::BoundAccounts,
        args::BoundArgs,
        error::TraceError,
        keypair::{Keypair, Signer},
        schema::InstructionSchema,
    },
    sha2::{Digest, Sha256},
    trezoa_hash::Hash,
    trezoa_instruction::{AccountMeta, Instruction},
    trezoa_message::Message,
    trezoa_pubkey::Pubkey,
    trezoa_signature::Signature,
};

/// The Anchor instruction selector: the first 8 bytes of
/// `sha256("global:<snake_case_name>")`.
pub fn anchor_discriminator(instruction: &str) -> [u8; 8] {
    let preimage = format!("global:{}", to_snake_case(instruction));
    let hash = Sha256::digest(preimage.as_bytes());
    let mut discriminator = [0u8; 8];
    discriminator.copy_from_slice(&hash[..8]);
    discriminator
}

fn to_snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// A fully bound scenario, ready to be turned into a transaction. Built once
/// and only read afterwards.
#[derive(Debug)]
pub struct ResolvedInvocation {
    pub program_name: String,
    pub program_id: Pubkey,
    pub schema: InstructionSchema,
    pub accounts: BoundAccounts,
    pub args: BoundArgs,
}

impl ResolvedInvocation {
    pub fn instruction_name(&self) -> &str {
        &self.schema.name
    }

    /// The instruction: account metas in slot order with the schema's
    /// privileges, data as discriminator followed by the encoded args.
    pub fn instruction(&self) -> Result<Instruction, TraceError> {
        let accounts = self
            .schema
            .accounts
            .iter()
            .zip(&self.accounts.accounts)
            .map(|(spec, bound)| {
                if spec.writable {
                    AccountMeta::new(bound.address, spec.signer)
                } else {
                    AccountMeta::new_readonly(bound.address, spec.signer)
                }
            })
            .collect();

        let mut data = self.schema.discriminator.to_vec();
        data.extend(
            self.args
                .encode()
                .map_err(|err| TraceError::Build(err.to_string()))?,
        );

        Ok(Instruction {
            program_id: self.program_id,
            accounts,
            data,
        })
    }
}

/// Compile and sign the invocation with `payer` as fee payer.
///
/// A required signer without a held keypair keeps the default signature.
pub fn build_transaction(
    invocation: &ResolvedInvocation,
    payer: &Keypair,
    blockhash: Hash,
) -> Result<Transaction, TraceError> {
    let payer_key = payer.pubkey();
    let message = Message::new(&[invocation.instruction()?], Some(&payer_key));
    let mut transaction = Transaction::new_unsigned(message);

    let mut signers: Vec<&Keypair> = vec![payer];
    for keypair in invocation.accounts.signers.values() {
        if signers.iter().all(|held| held.pubkey() != keypair.pubkey()) {
            signers.push(keypair);
        }
    }
    transaction
        .try_partial_sign(&signers, blockhash)
        .map_err(|err| TraceError::Build(err.to_string()))?;

    let required = usize::from(transaction.message.header.num_required_signatures);
    transaction
        .message
        .account_keys
        .iter()
        .take(required)
        .zip(&transaction.signatures)
        .filter(|(_, signature)| **signature == Signature::default())
        .for_each(|(key, _)| log::warn!("No keypair held for required signer {}", key));

    Ok(transaction)
}

/// The size of the transaction on the wire.
pub fn wire_size(transaction: &Transaction) -> Result<usize, TraceError> {
    bincode::serialize(transaction)
        .map(|bytes| bytes.len())
        .map_err(|err| TraceError::Build(err.to_string()))
}

/// The transaction signature: the fee payer's, base58 encoded.
pub fn transaction_signature(transaction: &Transaction) -> Option<String> {
    transaction.signatures.first().map(ToString::to_string)
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{
            accounts::{AddressMode, BoundAccount},
            schema::{AccountSpec, ArgSpec, ArgType, ArgValue},
        },
        std::collections::HashMap,
    };

    fn invocation(authority: &Keypair, hold_authority: bool) -> ResolvedInvocation {
        let schema = InstructionSchema::new(
            "increment",
            vec![
                AccountSpec {
                    name: "authority".to_string(),
                    signer: true,
                    writable: false,
                },
                AccountSpec {
                    name: "counter".to_string(),
                    signer: false,
                    writable: true,
                },
            ],
            vec![ArgSpec {
                name: "amount".to_string(),
                ty: ArgType::U64,
            }],
        );
        let mut signers = HashMap::new();
        if hold_authority {
            signers.insert(
                "authority".to_string(),
                Keypair::new_from_array(*authority.secret_bytes()),
            );
        }
        ResolvedInvocation {
            program_name: "mycounter".to_string(),
            program_id: Pubkey::new_unique(),
            schema,
            accounts: BoundAccounts {
                accounts: vec![
                    BoundAccount {
                        name: "authority".to_string(),
                        address: authority.pubkey(),
                        mode: AddressMode::Wallet,
                    },
                    BoundAccount {
                        name: "counter".to_string(),
                        address: Pubkey::new_unique(),
                        mode: AddressMode::Address,
                    },
                ],
                signers,
            },
            args: BoundArgs {
                args: vec![("amount".to_string(), ArgValue::U64(5))],
            },
        }
    }

    #[test]
    fn test_snake_case() {
        assert_eq!(to_snake_case("increment"), "increment");
        assert_eq!(to_snake_case("incrementBy"), "increment_by");
        assert_eq!(to_snake_case("set_all"), "set_all");
    }

    #[test]
    fn test_discriminator_is_name_style_agnostic() {
        assert_eq!(
            anchor_discriminator("incrementBy"),
            anchor_discriminator("increment_by")
        );
        assert_ne!(
            anchor_discriminator("increment"),
            anchor_discriminator("decrement")
        );
    }

    #[test]
    fn test_build_signs_with_payer_and_held_signers() {
        let authority = Keypair::new();
        let payer = Keypair::new();
        let invocation = invocation(&authority, true);

        let transaction = build_transaction(&invocation, &payer, Hash::default()).unwrap();
        assert_eq!(transaction.signatures.len(), 2);
        assert!(transaction.is_signed());
        assert_eq!(transaction.message.account_keys[0], payer.pubkey());
        assert_eq!(
            transaction_signature(&transaction),
            Some(transaction.signatures[0].to_string())
        );
        // Two signatures over a message with four keys and 16 data bytes.
        assert_eq!(wire_size(&transaction).unwrap(), 315);
    }

    #[test]
    fn test_payer_signing_for_its_own_slot_signs_once() {
        let authority = Keypair::new();
        let invocation = invocation(&authority, true);

        let transaction = build_transaction(&invocation, &authority, Hash::default()).unwrap();
        assert_eq!(transaction.signatures.len(), 1);
        assert!(transaction.is_signed());
        assert_eq!(wire_size(&transaction).unwrap(), 219);
    }

    #[test]
    fn test_missing_signer_keeps_default_signature() {
        let authority = Keypair::new();
        let payer = Keypair::new();
        let invocation = invocation(&authority, false);

        let transaction = build_transaction(&invocation, &payer, Hash::default()).unwrap();
        assert_eq!(transaction.signatures.len(), 2);
        assert!(!transaction.is_signed());
        assert_ne!(transaction.signatures[0], Signature::default());
        assert_eq!(transaction.signatures[1], Signature::default());
    }

    #[test]
    fn test_unencodable_args_fail_the_build() {
        let authority = Keypair::new();
        let mut invocation = invocation(&authority, true);
        invocation.args.args = vec![("ratio".to_string(), ArgValue::F64(f64::NAN))];

        assert!(matches!(
            build_transaction(&invocation, &authority, Hash::default()),
            Err(TraceError::Build(_))
        ));
    }
}
