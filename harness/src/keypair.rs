//! Wallet keypairs and the loader that reads them from a wallets directory.
//!
//! Keypair files use the Solana CLI layout: a JSON array of 64 bytes, the
//! secret key followed by the public key. A wallet's address is always
//! derived from its secret key; a file whose public half disagrees is
//! rejected.

pub use {trezoa_keypair::Keypair, trezoa_signer::Signer};
use {
    std::path::{Path, PathBuf},
    trezoa_keypair::read_keypair_file,
};

/// Resolves wallet names to keypairs.
pub trait KeypairLoader {
    /// Where the wallet named `name` lives.
    fn path(&self, name: &str) -> PathBuf;

    /// Load the wallet named `name`, or `None` if it is missing or invalid.
    fn load(&self, name: &str) -> Option<Keypair>;
}

/// A directory of keypair files, addressed by file name.
#[derive(Clone, Debug)]
pub struct WalletDir {
    root: PathBuf,
}

impl WalletDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl KeypairLoader for WalletDir {
    fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    fn load(&self, name: &str) -> Option<Keypair> {
        let path = self.path(name);
        let stored = match read_keypair_file(&path) {
            Ok(keypair) => keypair,
            Err(err) => {
                log::debug!("Cannot load wallet {}: {}", path.display(), err);
                return None;
            }
        };

        let derived = Keypair::new_from_array(*stored.secret_bytes());
        if derived.pubkey() != stored.pubkey() {
            log::debug!(
                "Wallet {} public key does not match its secret key",
                path.display()
            );
            return None;
        }
        Some(derived)
    }
}
