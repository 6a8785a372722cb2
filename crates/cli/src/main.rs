//! Command Line Interface for the Sphere dashboard.
mod fullnode;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use dotenv::dotenv;
use fullnode::FullnodeWallet;
use serde::Serialize;
use sphere_data::providers::GraphqlIndexer;
use sphere_data::{DEFAULT_ACTIVITY_LIMIT, IndexerProvider};
use sphere_domain::{EnrichedBalance, HistoryEntry, Network};
use sphere_execution::prelude::*;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "sphere")]
#[command(about = "Sphere Connect wallet dashboard CLI", long_about = None)]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,

    /// Print JSON instead of a table
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ConfigArgs {
    /// Network to query
    #[arg(long, env = "SPHERE_NETWORK", default_value = "testnet")]
    network: Network,

    /// OAuth client id for the wallet SDK
    #[arg(long, env = "SPHERE_GOOGLE_CLIENT_ID")]
    google_client_id: Option<String>,

    /// Fullnode REST endpoint
    #[arg(long, env = "SPHERE_RPC_ENDPOINT")]
    rpc_endpoint: Option<String>,

    /// GraphQL indexer endpoint (empty disables the indexer)
    #[arg(long, env = "SPHERE_INDEXER_URL")]
    indexer_url: Option<String>,

    /// Read history from the fullnode instead of the indexer
    #[arg(long)]
    no_indexer: bool,

    /// OAuth redirect URI for the wallet SDK
    #[arg(long, env = "SPHERE_REDIRECT_URI")]
    redirect_uri: Option<String>,
}

impl ConfigArgs {
    fn into_config(self) -> SphereConfig {
        let indexer_url = if self.no_indexer {
            None
        } else {
            Some(self.indexer_url.unwrap_or_else(|| DEFAULT_INDEXER_URL.to_string()))
        };

        SphereConfig {
            network: self.network,
            google_client_id: self.google_client_id,
            rpc_endpoint: self.rpc_endpoint,
            indexer_url,
            redirect_uri: self.redirect_uri,
            ..SphereConfig::default()
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Show the token balances of an address
    Balances {
        /// Account address
        #[arg(short, long)]
        address: String,
    },
    /// Show recent activity of an address
    Activity {
        /// Account address
        #[arg(short, long)]
        address: String,

        /// Indexer rows to fetch
        #[arg(short, long, default_value_t = DEFAULT_ACTIVITY_LIMIT)]
        limit: u32,
    },
    /// Poll balances and activity until Ctrl-C
    Watch {
        /// Account address
        #[arg(short, long)]
        address: String,
    },
    /// List supported networks
    Networks,
}

struct Dashboard {
    session: Arc<Session>,
    indexer: Arc<dyn IndexerProvider>,
}

impl Dashboard {
    fn connect(config: &SphereConfig, address: &str) -> Result<Self> {
        let session = Arc::new(Session::new(
            config.network,
            config.indexer_url().map(str::to_string),
        ));
        let wallet = FullnodeWallet::new(address, config.rpc_endpoint())?;
        session.attach_wallet(Arc::new(wallet));

        info!(
            network = %config.network,
            rpc = config.rpc_endpoint(),
            indexer = config.indexer_url().unwrap_or("disabled"),
            "Session ready"
        );

        Ok(Self {
            session,
            indexer: Arc::new(GraphqlIndexer::new()?),
        })
    }

    fn balances(&self) -> BalanceReconciler {
        BalanceReconciler::new(
            self.indexer.clone(),
            self.session.clone(),
            BalanceReconcilerConfig::default(),
        )
    }

    fn activity(&self, fetch_limit: u32) -> ActivityReconciler {
        ActivityReconciler::new(
            self.indexer.clone(),
            self.session.clone(),
            ActivityReconcilerConfig {
                fetch_limit,
                ..ActivityReconcilerConfig::default()
            },
        )
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_balances(tokens: &[EnrichedBalance], json: bool) -> Result<()> {
    if json {
        return print_json(&tokens);
    }
    if tokens.is_empty() {
        println!("No balances found.");
        return Ok(());
    }

    println!("{:<10} | {:<20} | {:>24} | Asset type", "Symbol", "Name", "Balance");
    println!("{}", "-".repeat(90));
    for token in tokens {
        println!(
            "{:<10} | {:<20} | {:>24} | {}",
            token.symbol, token.name, token.formatted_amount, token.asset_type
        );
    }
    Ok(())
}

/// History amounts carry no decimals, so they are shown in the smallest unit.
fn history_header() -> String {
    format!(
        "{:<19} | {:<8} | {:<16} | {:>20} | Explorer",
        "Time", "Type", "Kind", "Amount (raw units)"
    )
}

fn print_history(entries: &[HistoryEntry], network: Network, json: bool) -> Result<()> {
    if json {
        return print_json(&entries);
    }
    if entries.is_empty() {
        println!("No transactions yet.");
        return Ok(());
    }

    println!("{}", history_header());
    println!("{}", "-".repeat(110));
    for entry in entries {
        let time = chrono::DateTime::from_timestamp(entry.timestamp, 0).unwrap_or_default();
        let amount = entry
            .amount
            .map(|a| a.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<19} | {:<8} | {:<16} | {:>20} | {}{}",
            time.format("%Y-%m-%d %H:%M:%S"),
            format!("{:?}", entry.direction),
            entry.kind,
            amount,
            network.explorer_tx_url(&entry.hash),
            if entry.success { "" } else { " (failed)" }
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let json = cli.json;
    let config = cli.config.into_config();

    match cli.command {
        Commands::Balances { address } => {
            let dashboard = Dashboard::connect(&config, &address)?;
            let reconciler = dashboard.balances();
            reconciler.reconcile().await;
            print_balances(&reconciler.latest().tokens, json)?;
        }
        Commands::Activity { address, limit } => {
            let dashboard = Dashboard::connect(&config, &address)?;
            let reconciler = dashboard.activity(limit);
            reconciler.reconcile().await;
            print_history(&reconciler.latest().entries, config.network, json)?;
        }
        Commands::Watch { address } => {
            let dashboard = Dashboard::connect(&config, &address)?;
            let balances = Arc::new(dashboard.balances());
            let activity = Arc::new(dashboard.activity(DEFAULT_ACTIVITY_LIMIT));
            let mut balance_rx = balances.subscribe();
            let mut activity_rx = activity.subscribe();

            let balance_poller = Poller::new(balances.clone(), config.balance_interval)
                .spawn_with_trigger(dashboard.session.subscribe());
            let activity_poller = Poller::new(activity.clone(), config.activity_interval)
                .spawn_with_trigger(dashboard.session.subscribe());

            println!("Watching {address} on {}. Press Ctrl-C to stop.", config.network);
            loop {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => break,
                    Ok(()) = balance_rx.changed() => {
                        let view = balance_rx.borrow_and_update().clone();
                        print_balances(&view.tokens, json)?;
                    }
                    Ok(()) = activity_rx.changed() => {
                        let view = activity_rx.borrow_and_update().clone();
                        print_history(&view.entries, config.network, json)?;
                    }
                }
            }

            balance_poller.stop().await;
            activity_poller.stop().await;
            info!("Stopped");
        }
        Commands::Networks => {
            if json {
                let networks: Vec<_> = Network::ALL
                    .iter()
                    .map(|n| {
                        serde_json::json!({
                            "network": n,
                            "rpc_endpoint": n.rpc_endpoint(),
                            "selected": *n == config.network,
                        })
                    })
                    .collect();
                print_json(&networks)?;
            } else {
                for network in Network::ALL {
                    let marker = if network == config.network { "*" } else { " " };
                    println!("{marker} {:<8} {}", network, network.rpc_endpoint());
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_indexer_flag_disables_indexer() {
        let cli = Cli::parse_from(["sphere", "--no-indexer", "balances", "--address", "0xabc"]);
        let config = cli.config.into_config();
        assert_eq!(config.indexer_url(), None);
    }

    #[test]
    fn test_history_header_marks_raw_units() {
        assert!(history_header().contains("Amount (raw units)"));
    }

    #[test]
    fn test_explicit_network() {
        let cli = Cli::parse_from(["sphere", "--network", "devnet", "networks"]);
        let config = cli.config.into_config();
        assert_eq!(config.network, Network::Devnet);
        assert_eq!(config.rpc_endpoint(), "https://devnet.cedra.dev/v1");
    }
}
