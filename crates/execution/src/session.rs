//! Explicit session context shared by the dashboard services.
//!
//! The session owns the signed-in wallet, the selected network and the
//! indexer endpoint. Every mutation bumps `epoch`, so a cycle can tell whether
//! the inputs it started from are still current before publishing.

use crate::wallet::WalletSdk;
use sphere_domain::Network;
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

/// Point-in-time view of the session.
#[derive(Clone)]
pub struct SessionSnapshot {
    /// Signed-in wallet, if any.
    pub wallet: Option<Arc<dyn WalletSdk>>,
    /// Address of the signed-in wallet.
    pub address: Option<String>,
    /// Selected network.
    pub network: Network,
    /// GraphQL indexer endpoint; `None` disables indexer reads.
    pub indexer_url: Option<String>,
    /// Incremented on every change.
    pub epoch: u64,
}

impl fmt::Debug for SessionSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionSnapshot")
            .field("address", &self.address)
            .field("network", &self.network)
            .field("indexer_url", &self.indexer_url)
            .field("epoch", &self.epoch)
            .finish_non_exhaustive()
    }
}

/// Shared, observable session state.
pub struct Session {
    state: watch::Sender<SessionSnapshot>,
}

impl Session {
    /// Creates a session with no wallet attached.
    pub fn new(network: Network, indexer_url: Option<String>) -> Self {
        let (state, _) = watch::channel(SessionSnapshot {
            wallet: None,
            address: None,
            network,
            indexer_url: normalize_url(indexer_url),
            epoch: 0,
        });
        Self { state }
    }

    /// Returns the current state.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.borrow().clone()
    }

    /// Current change counter.
    pub fn epoch(&self) -> u64 {
        self.state.borrow().epoch
    }

    /// True when nothing changed since `epoch` was read.
    pub fn is_current(&self, epoch: u64) -> bool {
        self.epoch() == epoch
    }

    /// Watches session changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state.subscribe()
    }

    /// Signs a wallet in.
    pub fn attach_wallet(&self, wallet: Arc<dyn WalletSdk>) {
        let address = wallet.address();
        info!(address = %address, "Wallet attached");
        self.update(|s| {
            s.address = Some(address);
            s.wallet = Some(wallet);
        });
    }

    /// Signs the current wallet out.
    pub fn detach_wallet(&self) {
        info!("Wallet detached");
        self.update(|s| {
            s.address = None;
            s.wallet = None;
        });
    }

    /// Records the selected network.
    pub fn set_network(&self, network: Network) {
        self.update(|s| s.network = network);
    }

    /// Replaces the indexer endpoint; blank disables indexer reads.
    pub fn set_indexer_url(&self, indexer_url: Option<String>) {
        let indexer_url = normalize_url(indexer_url);
        self.update(|s| s.indexer_url = indexer_url);
    }

    fn update(&self, f: impl FnOnce(&mut SessionSnapshot)) {
        self.state.send_modify(|s| {
            f(s);
            s.epoch += 1;
        });
    }
}

fn normalize_url(url: Option<String>) -> Option<String> {
    url.map(|u| u.trim().to_string()).filter(|u| !u.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeWallet;

    #[test]
    fn test_blank_indexer_url_disables_indexer() {
        let session = Session::new(Network::Testnet, Some("  ".to_string()));
        assert_eq!(session.snapshot().indexer_url, None);
    }

    #[test]
    fn test_every_change_bumps_epoch() {
        let session = Session::new(Network::Testnet, None);
        let start = session.epoch();

        session.attach_wallet(Arc::new(FakeWallet::new("0xAbC")));
        session.set_network(Network::Devnet);
        session.set_indexer_url(Some("https://indexer.test/graphql".to_string()));

        assert_eq!(session.epoch(), start + 3);
        assert!(!session.is_current(start));

        let snapshot = session.snapshot();
        assert_eq!(snapshot.address.as_deref(), Some("0xAbC"));
        assert_eq!(snapshot.network, Network::Devnet);
    }

    #[tokio::test]
    async fn test_subscribers_see_changes() {
        let session = Session::new(Network::Testnet, None);
        let mut rx = session.subscribe();

        session.set_network(Network::Mainnet);

        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().network, Network::Mainnet);
    }
}
