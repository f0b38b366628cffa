//! freecpu daemon: runs the sponsor service or submits client transfers.
//!
//! Private keys are read from the environment only: `EOSIO_SIGNING_KEY` for
//! the sponsor, `FREECPU_CLIENT_KEY` for the client. Both take a
//! comma-separated list of `PVT_ED_` keys.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Parser;
use freecpu_chain::{ChainApi, HttpChainClient};
use freecpu_crypto::{generate_keypair, KeyStoreProvider, SigningKeys};
use freecpu_policy::Policy;
use freecpu_rpc::{RpcServer, ServiceConfig, SponsorService};
use freecpu_types::{Asset, Name, NetworkId, PermissionLevel};
use freecpu_utils::{init_logging, LogFormat};
use freecpu_wallet_core::{ClientConfig, TransferRequest, Wallet};

const SPONSOR_KEY_VAR: &str = "EOSIO_SIGNING_KEY";
const CLIENT_KEY_VAR: &str = "FREECPU_CLIENT_KEY";

#[derive(Parser)]
#[command(name = "freecpu", about = "Delegated-fee co-signing for EOSIO-style ledgers")]
struct Cli {
    /// Path to a TOML configuration file. File settings are the base; CLI
    /// flags and env vars override them.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Network: "jungle", "kylin" or "mainnet".
    #[arg(long, global = true, env = "FREECPU_NETWORK")]
    network: Option<NetworkId>,

    /// Node URL with explicit protocol and port, e.g. "https://host:443".
    #[arg(long, global = true, env = "FREECPU_NODE_URL")]
    node_url: Option<String>,

    /// Log level or filter directive, e.g. "info" or "freecpu_rpc=debug".
    #[arg(long, global = true, env = "FREECPU_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log output: "human" or "json".
    #[arg(long, global = true, env = "FREECPU_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// The sponsor signing service.
    #[command(name = "sponsor")]
    Sponsor {
        #[command(subcommand)]
        action: SponsorAction,
    },

    /// Transfer tokens, sponsored when a sponsor is configured.
    Transfer {
        /// Receiving account.
        #[arg(long)]
        to: Name,

        /// Quantity, e.g. "1.0000 EOS".
        #[arg(long)]
        amount: Asset,

        #[arg(long, default_value = "")]
        memo: String,

        /// Number of transfer actions in the one transaction.
        #[arg(long, default_value_t = 1)]
        count: usize,

        /// Sender as `actor@permission`, when not set in the config file.
        #[arg(long, env = "FREECPU_SENDER")]
        sender: Option<PermissionLevel>,

        /// Pay own resources even if a sponsor is configured.
        #[arg(long)]
        no_sponsor: bool,
    },

    /// Print a fresh key pair.
    Keygen,
}

#[derive(clap::Subcommand)]
enum SponsorAction {
    /// Serve `POST /api/eos/sign` until interrupted.
    Run {
        /// Permission the sponsor pays with, when not set in the config file.
        #[arg(long, env = "FREECPU_SPONSOR")]
        sponsor: Option<PermissionLevel>,

        #[arg(long, env = "FREECPU_PORT")]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Sponsor {
            action: SponsorAction::Run { ref sponsor, port },
        } => {
            let config = service_config(&cli, sponsor.clone(), port)?;
            run_sponsor(config).await
        }
        Command::Transfer {
            ref to,
            ref amount,
            ref memo,
            count,
            ref sender,
            no_sponsor,
        } => {
            let mut config = client_config(&cli, sender.clone())?;
            if no_sponsor {
                config.sponsor = None;
            }
            let request = TransferRequest {
                receiver: Some(to.clone()),
                quantity: Some(amount.clone()),
                memo: memo.clone(),
                repetitions: count,
            };
            run_transfer(config, request).await
        }
        Command::Keygen => {
            let pair = generate_keypair();
            println!("public:  {}", pair.public);
            println!("private: {}", pair.private.to_text());
            Ok(())
        }
    }
}

fn service_config(
    cli: &Cli,
    sponsor: Option<PermissionLevel>,
    port: Option<u16>,
) -> anyhow::Result<ServiceConfig> {
    let mut config = match (&cli.config, sponsor.clone()) {
        (Some(path), _) => ServiceConfig::from_toml_file(path)?,
        (None, Some(sponsor)) => ServiceConfig::new(sponsor),
        (None, None) => bail!("no sponsor permission: pass --sponsor or --config"),
    };
    if let Some(sponsor) = sponsor {
        config.sponsor = sponsor;
    }
    if let Some(port) = port {
        config.port = port;
    }
    if let Some(network) = cli.network {
        config.network = network;
    }
    if let Some(url) = &cli.node_url {
        config.node_url = Some(url.clone());
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }
    Ok(config)
}

fn client_config(cli: &Cli, sender: Option<PermissionLevel>) -> anyhow::Result<ClientConfig> {
    let mut config = match (&cli.config, sender.clone()) {
        (Some(path), _) => ClientConfig::from_toml_file(path)?,
        (None, Some(sender)) => ClientConfig::new(sender),
        (None, None) => bail!("no sender: pass --sender or --config"),
    };
    if let Some(sender) = sender {
        config.sender = sender;
    }
    if let Some(network) = cli.network {
        config.network = network;
    }
    if let Some(url) = &cli.node_url {
        config.node_url = Some(url.clone());
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }
    Ok(config)
}

fn keys_from_env(var: &str) -> anyhow::Result<Arc<SigningKeys>> {
    let raw = std::env::var(var).with_context(|| format!("{var} is not set"))?;
    let keys = SigningKeys::parse_list(&raw).with_context(|| format!("{var} is malformed"))?;
    if keys.is_empty() {
        bail!("{var} holds no keys");
    }
    Ok(Arc::new(keys))
}

async fn run_sponsor(config: ServiceConfig) -> anyhow::Result<()> {
    init_logging(config.log_format, &config.log_level)?;

    let keys = keys_from_env(SPONSOR_KEY_VAR)?;
    tracing::info!(keys = keys.len(), "loaded sponsor signing keys");

    let endpoint = config.node_endpoint()?;
    let chain = HttpChainClient::with_timeout(
        endpoint.clone(),
        std::time::Duration::from_secs(config.chain_timeout_secs),
    )?;
    let chain_id = config.network.chain_id();
    let info = chain
        .chain_info()
        .await
        .with_context(|| format!("querying {endpoint}"))?;
    if info.chain_id != chain_id {
        bail!(
            "node {endpoint} serves chain {}, not {} ({chain_id})",
            info.chain_id,
            config.network.as_str()
        );
    }

    let policy = Policy::from_config(&config.policy).with_sponsor(config.sponsor.clone());
    let service = SponsorService::new(
        policy,
        Arc::new(chain),
        Arc::new(KeyStoreProvider::new(keys)),
        chain_id,
    );

    let addr = config.listen_addr()?;
    tracing::info!(
        "Starting sponsor for {} on {} network (node {}, listen {})",
        config.sponsor,
        config.network.as_str(),
        endpoint,
        addr
    );
    RpcServer::new(addr, service)
        .start_with_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received, stopping sponsor");
        })
        .await?;

    tracing::info!("freecpu sponsor exited cleanly");
    Ok(())
}

async fn run_transfer(config: ClientConfig, request: TransferRequest) -> anyhow::Result<()> {
    init_logging(config.log_format, &config.log_level)?;

    let keys = keys_from_env(CLIENT_KEY_VAR)?;
    let wallet = Wallet::from_config(&config, Arc::new(KeyStoreProvider::new(keys)))?;
    tracing::info!(
        sender = %wallet.sender(),
        sponsored = wallet.is_sponsored(),
        network = config.network.as_str(),
        "wallet ready"
    );

    let receipt = wallet.transfer(&request).await?;
    match &receipt.fallback_reason {
        Some(reason) => println!("{} (self-paid: {reason})", receipt.transaction_id),
        None if receipt.sponsored => println!("{} (sponsored)", receipt.transaction_id),
        None => println!("{} (self-paid)", receipt.transaction_id),
    }
    Ok(())
}
