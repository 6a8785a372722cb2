//! Runtime configuration of the dashboard services.

use crate::scheduler::{ACTIVITY_POLL_INTERVAL, BALANCE_POLL_INTERVAL};
use sphere_domain::Network;
use std::time::Duration;

/// Default GraphQL indexer endpoint.
pub const DEFAULT_INDEXER_URL: &str = "https://graphql.cedra.dev/v1/graphql";

/// Settings read once at process start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SphereConfig {
    /// Selected network.
    pub network: Network,
    /// OAuth client id handed to the wallet SDK.
    pub google_client_id: Option<String>,
    /// Fullnode endpoint; `None` uses the network default.
    pub rpc_endpoint: Option<String>,
    /// GraphQL indexer endpoint; `None` disables indexer reads.
    pub indexer_url: Option<String>,
    /// OAuth redirect target handed to the wallet SDK.
    pub redirect_uri: Option<String>,
    /// Period of the balance cycle.
    pub balance_interval: Duration,
    /// Period of the activity cycle.
    pub activity_interval: Duration,
}

impl Default for SphereConfig {
    fn default() -> Self {
        Self {
            network: Network::default(),
            google_client_id: None,
            rpc_endpoint: None,
            indexer_url: Some(DEFAULT_INDEXER_URL.to_string()),
            redirect_uri: None,
            balance_interval: BALANCE_POLL_INTERVAL,
            activity_interval: ACTIVITY_POLL_INTERVAL,
        }
    }
}

impl SphereConfig {
    /// Fullnode endpoint in effect.
    pub fn rpc_endpoint(&self) -> &str {
        self.rpc_endpoint
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| self.network.rpc_endpoint())
    }

    /// Indexer endpoint in effect; blank counts as disabled.
    pub fn indexer_url(&self) -> Option<&str> {
        self.indexer_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SphereConfig::default();
        assert_eq!(config.network, Network::Testnet);
        assert_eq!(config.rpc_endpoint(), "https://testnet.cedra.dev/v1");
        assert_eq!(config.indexer_url(), Some(DEFAULT_INDEXER_URL));
        assert_eq!(config.balance_interval, Duration::from_secs(10));
        assert_eq!(config.activity_interval, Duration::from_secs(15));
    }

    #[test]
    fn test_blank_values_fall_back() {
        let config = SphereConfig {
            network: Network::Devnet,
            rpc_endpoint: Some(" ".to_string()),
            indexer_url: Some(String::new()),
            ..SphereConfig::default()
        };
        assert_eq!(config.rpc_endpoint(), "https://devnet.cedra.dev/v1");
        assert_eq!(config.indexer_url(), None);
    }
}
