//! Network client seam. The runner only ever talks to a cluster through
//! `NetworkClient`, obtained per program from a `ClusterConnector`.

use {
    crate::{error::ClientError, transaction::Transaction},
    serde::Deserialize,
    std::{fmt, str::FromStr},
    trezoa_hash::Hash,
    trezoa_message::Message,
};

/// Base fee charged per required signature.
pub const DEFAULT_LAMPORTS_PER_SIGNATURE: u64 = 5000;

/// The cluster a program is deployed to.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum Cluster {
    Localnet,
    Devnet,
    Mainnet,
    /// Any other cluster, by RPC URL.
    Custom(String),
}

impl FromStr for Cluster {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "localnet" | "localhost" => Ok(Self::Localnet),
            "devnet" => Ok(Self::Devnet),
            "mainnet" | "mainnet-beta" => Ok(Self::Mainnet),
            _ if s.starts_with("http://") || s.starts_with("https://") => {
                Ok(Self::Custom(s.to_string()))
            }
            _ => Err(format!("unknown cluster `{s}`")),
        }
    }
}

impl TryFrom<String> for Cluster {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Cluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Localnet => f.write_str("localnet"),
            Self::Devnet => f.write_str("devnet"),
            Self::Mainnet => f.write_str("mainnet"),
            Self::Custom(url) => f.write_str(url),
        }
    }
}

/// The network operations a scenario needs. Each call is awaited to
/// completion before the runner moves on.
#[allow(async_fn_in_trait)]
pub trait NetworkClient {
    /// The blockhash to compile the transaction message against.
    async fn latest_blockhash(&self) -> Result<Hash, ClientError>;

    /// The fee the network would charge for the message, in lamports.
    async fn fee_for_message(&self, message: &Message) -> Result<u64, ClientError>;

    /// Submit a signed transaction, returning its signature.
    async fn send_transaction(&self, transaction: &Transaction) -> Result<String, ClientError>;
}

/// Hands out a client bound to a cluster.
pub trait ClusterConnector {
    type Client: NetworkClient;

    fn connect(&self, cluster: &Cluster) -> Self::Client;
}

/// A client that never leaves the process: fees are computed from the
/// signature count and submission always fails.
#[derive(Clone, Debug)]
pub struct OfflineClient {
    pub cluster: Cluster,
    pub lamports_per_signature: u64,
}

impl NetworkClient for OfflineClient {
    async fn latest_blockhash(&self) -> Result<Hash, ClientError> {
        Ok(Hash::default())
    }

    async fn fee_for_message(&self, message: &Message) -> Result<u64, ClientError> {
        let signatures = u64::from(message.header.num_required_signatures);
        Ok(signatures.saturating_mul(self.lamports_per_signature))
    }

    async fn send_transaction(&self, _transaction: &Transaction) -> Result<String, ClientError> {
        Err(ClientError::Offline {
            cluster: self.cluster.to_string(),
        })
    }
}

/// Connects every cluster to an `OfflineClient`.
#[derive(Clone, Debug)]
pub struct OfflineConnector {
    pub lamports_per_signature: u64,
}

impl Default for OfflineConnector {
    fn default() -> Self {
        Self {
            lamports_per_signature: DEFAULT_LAMPORTS_PER_SIGNATURE,
        }
    }
}

impl ClusterConnector for OfflineConnector {
    type Client = OfflineClient;

    fn connect(&self, cluster: &Cluster) -> OfflineClient {
        OfflineClient {
            cluster: cluster.clone(),
            lamports_per_signature: self.lamports_per_signature,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cluster() {
        assert_eq!("Devnet".parse::<Cluster>(), Ok(Cluster::Devnet));
        assert_eq!("localhost".parse::<Cluster>(), Ok(Cluster::Localnet));
        assert_eq!("mainnet-beta".parse::<Cluster>(), Ok(Cluster::Mainnet));
        assert_eq!(
            "http://127.0.0.1:8899".parse::<Cluster>(),
            Ok(Cluster::Custom("http://127.0.0.1:8899".to_string()))
        );
        assert!("moon".parse::<Cluster>().is_err());
    }
}
