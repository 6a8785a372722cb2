use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Cedra network the wallet is connected to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    #[default]
    Testnet,
    Devnet,
}

impl Network {
    pub const ALL: [Network; 3] = [Network::Mainnet, Network::Testnet, Network::Devnet];

    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
            Network::Devnet => "devnet",
        }
    }

    /// Fullnode REST endpoint for this network.
    pub fn rpc_endpoint(&self) -> &'static str {
        match self {
            Network::Mainnet => "https://mainnet.cedra.dev/v1",
            Network::Testnet => "https://testnet.cedra.dev/v1",
            Network::Devnet => "https://devnet.cedra.dev/v1",
        }
    }

    /// Block explorer link for a transaction hash.
    pub fn explorer_tx_url(&self, hash: &str) -> String {
        format!("https://cedrascan.com/txn/{hash}?network={}", self.as_str())
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Network::Mainnet),
            "testnet" => Ok(Network::Testnet),
            "devnet" => Ok(Network::Devnet),
            _ => Err(DomainError::UnknownNetwork(s.to_string())),
        }
    }
}

/// Direction of a history entry relative to the watched account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityDirection {
    Sent,
    Received,
}
