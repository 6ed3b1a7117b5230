//! Account binder. Consumes one token per account slot and resolves it in
//! one of two addressing modes:
//!
//! * `W:<wallet file>`: a wallet keypair, kept for signing when the slot is a
//!   declared signer.
//! * `P:<address>`: an address literal (typically a PDA), never kept as a
//!   signer.

use {
    crate::{
        error::AccountBindingError,
        keypair::{Keypair, KeypairLoader, Signer},
        schema::AccountSpec,
        tokens::TokenCursor,
    },
    serde::Deserialize,
    std::{collections::HashMap, str::FromStr},
    trezoa_pubkey::Pubkey,
};

pub const WALLET_PREFIX: &str = "W:";
pub const ADDRESS_PREFIX: &str = "P:";

/// What to do when a declared signer slot is given an address literal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignerPolicy {
    /// Reject the scenario before a transaction is built.
    #[default]
    Strict,
    /// Bind the address without a signer. The resulting transaction carries
    /// an empty signature for the slot and will fail if submitted.
    Permissive,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddressMode {
    Wallet,
    Address,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoundAccount {
    pub name: String,
    pub address: Pubkey,
    pub mode: AddressMode,
}

/// Accounts resolved for one scenario, in slot order, along with the
/// keypairs of the signer slots bound to wallets.
#[derive(Debug, Default)]
pub struct BoundAccounts {
    pub accounts: Vec<BoundAccount>,
    pub signers: HashMap<String, Keypair>,
}

impl BoundAccounts {
    pub fn address(&self, name: &str) -> Option<Pubkey> {
        self.accounts
            .iter()
            .find(|account| account.name == name)
            .map(|account| account.address)
    }

    pub fn signer(&self, name: &str) -> Option<&Keypair> {
        self.signers.get(name)
    }
}

/// Bind every account slot, in order, consuming one token each.
pub fn bind_accounts<K: KeypairLoader + ?Sized>(
    cursor: &mut TokenCursor,
    accounts: &[AccountSpec],
    wallets: &K,
    policy: SignerPolicy,
) -> Result<BoundAccounts, AccountBindingError> {
    let mut bound = BoundAccounts::default();

    for spec in accounts {
        let token = cursor
            .next_token()
            .ok_or_else(|| AccountBindingError::MissingToken {
                slot: spec.name.clone(),
            })?;

        if let Some(wallet) = token.strip_prefix(WALLET_PREFIX) {
            let keypair =
                wallets
                    .load(wallet)
                    .ok_or_else(|| AccountBindingError::WalletNotFound {
                        slot: spec.name.clone(),
                        path: wallets.path(wallet),
                    })?;
            log::debug!("Account {} bound to wallet {}", spec.name, wallet);

            bound.accounts.push(BoundAccount {
                name: spec.name.clone(),
                address: keypair.pubkey(),
                mode: AddressMode::Wallet,
            });
            if spec.signer {
                bound.signers.insert(spec.name.clone(), keypair);
            }
        } else if let Some(literal) = token.strip_prefix(ADDRESS_PREFIX) {
            if spec.signer && policy == SignerPolicy::Strict {
                return Err(AccountBindingError::SignerWithoutKeypair {
                    slot: spec.name.clone(),
                });
            }
            let address =
                Pubkey::from_str(literal).map_err(|_| AccountBindingError::InvalidAddress {
                    slot: spec.name.clone(),
                    value: literal.to_string(),
                })?;
            log::debug!("Account {} bound to address {}", spec.name, address);

            bound.accounts.push(BoundAccount {
                name: spec.name.clone(),
                address,
                mode: AddressMode::Address,
            });
        } else {
            return Err(AccountBindingError::MissingAddressMode {
                slot: spec.name.clone(),
                token: token.to_string(),
            });
        }
    }

    Ok(bound)
}
