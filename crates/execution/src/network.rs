//! Network switching for the signed-in wallet.

use crate::session::Session;
use crate::wallet::SdkError;
use sphere_domain::Network;
use std::sync::Arc;
use tracing::{error, info};

/// Points the wallet SDK at another network and records the choice.
pub struct NetworkService {
    session: Arc<Session>,
}

impl NetworkService {
    pub fn new(session: Arc<Session>) -> Self {
        Self { session }
    }

    /// Networks offered in the selector.
    pub fn available(&self) -> &'static [Network] {
        &Network::ALL
    }

    /// Currently selected network.
    pub fn current(&self) -> Network {
        self.session.snapshot().network
    }

    /// Switches to `network`. On failure the session keeps its network.
    pub async fn switch(&self, network: Network) -> Result<(), SdkError> {
        let snapshot = self.session.snapshot();
        if let Some(wallet) = &snapshot.wallet {
            if let Err(e) = wallet.update_network(network, network.rpc_endpoint()).await {
                error!(network = %network, error = %e, "Network switch failed");
                return Err(e);
            }
        }

        self.session.set_network(network);
        info!(from = %snapshot.network, to = %network, "Network switched");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeWallet;

    #[tokio::test]
    async fn test_switch_updates_sdk_and_session() {
        let session = Arc::new(Session::new(Network::Testnet, None));
        let wallet = Arc::new(FakeWallet::new("0xabc"));
        session.attach_wallet(wallet.clone());
        let service = NetworkService::new(session.clone());
        let epoch = session.epoch();

        service.switch(Network::Devnet).await.unwrap();

        assert_eq!(service.current(), Network::Devnet);
        assert_eq!(session.epoch(), epoch + 1);
        assert_eq!(
            wallet.networks.lock().unwrap().as_slice(),
            &[(Network::Devnet, "https://devnet.cedra.dev/v1".to_string())]
        );
    }

    #[tokio::test]
    async fn test_failed_switch_leaves_session_unchanged() {
        let session = Arc::new(Session::new(Network::Testnet, None));
        session.attach_wallet(Arc::new(FakeWallet::new("0xabc").rejecting_network_changes()));
        let service = NetworkService::new(session.clone());
        let epoch = session.epoch();

        assert!(service.switch(Network::Mainnet).await.is_err());
        assert_eq!(service.current(), Network::Testnet);
        assert!(session.is_current(epoch));
    }

    #[tokio::test]
    async fn test_switch_without_wallet_records_choice() {
        let session = Arc::new(Session::new(Network::Testnet, None));
        let service = NetworkService::new(session);

        service.switch(Network::Mainnet).await.unwrap();
        assert_eq!(service.current(), Network::Mainnet);
        assert_eq!(service.available().len(), 3);
    }
}
