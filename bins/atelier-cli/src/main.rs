//! atelier — command-line interface for per-project USDT wallets.
//!
//! Keeps encrypted wallet bundles in a local JSON store, one wallet per
//! business category, all under a single master password. Chain access
//! goes through TronGrid.

mod store;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};

use atelier_core::{Amount, TronAddress};
use atelier_tron::balance::BalanceReader;
use atelier_tron::history::TransferHistory;
use atelier_tron::network::Network;
use atelier_tron::rpc::HttpTronRpc;
use atelier_tron::transfer::{TransferService, TxStatus};
use atelier_wallet::session::WalletSession;

use crate::store::FileWalletStore;

/// Per-project USDT wallet manager.
#[derive(Parser)]
#[command(name = "atelier")]
#[command(version, about = "Non-custodial USDT wallets, one per project.")]
struct Cli {
    /// Path to the encrypted wallet store (default: ~/.atelier/wallets.json).
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Network (mainnet or shasta).
    #[arg(long, global = true, default_value = "mainnet")]
    network: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Wallet management subcommands.
    Wallet {
        #[command(subcommand)]
        action: WalletAction,
    },
    /// Show the address for a category.
    Address(AddressArgs),
    /// Query USDT and TRX balances.
    Balance(BalanceArgs),
    /// Send USDT from a category wallet.
    Send(SendArgs),
    /// Check the status of a broadcast transaction.
    Status(StatusArgs),
    /// List recent USDT transfers for an address.
    History(HistoryArgs),
    /// Re-encrypt every wallet under a new master password.
    RotatePassword,
}

#[derive(Subcommand)]
enum WalletAction {
    /// Generate a new wallet for a category.
    Create(CategoryArgs),
    /// Import a wallet from a mnemonic or hex private key.
    Import(CategoryArgs),
    /// List unlocked categories and their addresses.
    List,
}

#[derive(Args)]
struct CategoryArgs {
    /// Category ("project") the wallet belongs to.
    #[arg(short, long)]
    category: String,
}

#[derive(Args)]
struct AddressArgs {
    #[arg(short, long)]
    category: String,
}

#[derive(Args)]
struct BalanceArgs {
    /// Category whose wallet to query.
    #[arg(short, long, conflicts_with = "address")]
    category: Option<String>,

    /// Query an arbitrary address instead.
    #[arg(short, long)]
    address: Option<String>,
}

#[derive(Args)]
struct SendArgs {
    /// Category whose wallet signs the transfer.
    #[arg(short, long)]
    category: String,

    /// Recipient TRON address.
    #[arg(short, long)]
    to: String,

    /// Amount in USDT (e.g. 10.5).
    #[arg(short, long)]
    amount: String,
}

#[derive(Args)]
struct StatusArgs {
    /// Transaction hash returned by `send`.
    #[arg(short, long)]
    txid: String,
}

#[derive(Args)]
struct HistoryArgs {
    /// Category whose wallet to query.
    #[arg(short, long, conflicts_with = "address")]
    category: Option<String>,

    /// Query an arbitrary address instead.
    #[arg(short, long)]
    address: Option<String>,

    /// Maximum number of transfers to list.
    #[arg(short, long, default_value = "20")]
    limit: u32,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let network: Network = cli
        .network
        .parse()
        .map_err(|_| anyhow::anyhow!("unknown network: {}", cli.network))?;
    let store_path = resolve_store_path(cli.store)?;

    match cli.command {
        Commands::Wallet { action } => match action {
            WalletAction::Create(args) => wallet_create(&store_path, args).await,
            WalletAction::Import(args) => wallet_import(&store_path, args).await,
            WalletAction::List => wallet_list(&store_path).await,
        },
        Commands::Address(args) => wallet_address(&store_path, args).await,
        Commands::Balance(args) => balance(&store_path, network, args).await,
        Commands::Send(args) => send(&store_path, network, args).await,
        Commands::Status(args) => status(network, args).await,
        Commands::History(args) => history(&store_path, network, args).await,
        Commands::RotatePassword => rotate_password(&store_path).await,
    }
}

/// Default store location under the home directory.
fn resolve_store_path(explicit: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path);
    }
    let home = dirs::home_dir().context("cannot determine home directory")?;
    Ok(home.join(".atelier").join("wallets.json"))
}

/// Open the store and unlock a session with a prompted password.
async fn open_session(store_path: &PathBuf) -> Result<WalletSession> {
    let store = FileWalletStore::open(store_path)
        .with_context(|| format!("open store {}", store_path.display()))?;
    let session = WalletSession::new(Arc::new(store));

    let password = prompt_password("Master password")?;
    session
        .unlock(&password)
        .await
        .context("unlock failed (check password)")?;
    Ok(session)
}

fn prompt_password(label: &str) -> Result<String> {
    let password =
        rpassword::prompt_password(format!("{label}: ")).context("read password")?;
    if password.is_empty() {
        bail!("password must not be empty");
    }
    Ok(password)
}

fn chain_rpc(network: Network) -> Arc<HttpTronRpc> {
    let api_key = std::env::var("TRON_GRID_API_KEY").ok();
    Arc::new(HttpTronRpc::with_api_key(network, api_key))
}

/// Generate a wallet for a category and print the mnemonic exactly once.
async fn wallet_create(store_path: &PathBuf, args: CategoryArgs) -> Result<()> {
    let session = open_session(store_path).await?;
    let created = session
        .create_wallet(&args.category)
        .await
        .context("create wallet")?;

    println!("\n=== WALLET CREATED ===");
    println!("Category: {}", created.category_id);
    println!("Address:  {}", created.address);
    println!("\nSEED PHRASE (BACKUP THIS — 12 WORDS):");
    println!("  {}", created.mnemonic.as_str());
    println!("\nWARNING: This seed phrase will NOT be shown again.");
    println!("Anyone with this phrase or the master password can move the funds.");
    Ok(())
}

/// Import a wallet from a mnemonic or a raw private key.
async fn wallet_import(store_path: &PathBuf, args: CategoryArgs) -> Result<()> {
    let session = open_session(store_path).await?;
    let secret = rpassword::prompt_password("Mnemonic or hex private key: ")
        .context("read secret")?;

    let address = session
        .import_wallet(&args.category, &secret)
        .await
        .context("import wallet")?;

    println!("\n=== WALLET IMPORTED ===");
    println!("Category: {}", args.category);
    println!("Address:  {address}");
    Ok(())
}

/// List categories and addresses in the unlocked session.
async fn wallet_list(store_path: &PathBuf) -> Result<()> {
    let session = open_session(store_path).await?;
    let mut entries = session.addresses().await;
    entries.sort();

    if entries.is_empty() {
        println!("No wallets yet. Create one with `atelier wallet create`.");
        return Ok(());
    }
    for (category, address) in entries {
        println!("{category}\t{address}");
    }
    Ok(())
}

async fn wallet_address(store_path: &PathBuf, args: AddressArgs) -> Result<()> {
    let session = open_session(store_path).await?;
    let wallet = session
        .get_wallet(&args.category)
        .await
        .with_context(|| format!("no wallet for category {}", args.category))?;
    println!("{}", wallet.address);
    Ok(())
}

/// Resolve `--category`/`--address` flags to a concrete address.
async fn resolve_address(
    store_path: &PathBuf,
    category: Option<String>,
    address: Option<String>,
) -> Result<TronAddress> {
    let raw = match (category, address) {
        (_, Some(addr)) => addr,
        (Some(category), None) => {
            let session = open_session(store_path).await?;
            session
                .get_wallet(&category)
                .await
                .with_context(|| format!("no wallet for category {category}"))?
                .address
                .clone()
        }
        (None, None) => bail!("pass --category or --address"),
    };
    TronAddress::from_base58(&raw).with_context(|| format!("invalid address {raw}"))
}

async fn balance(store_path: &PathBuf, network: Network, args: BalanceArgs) -> Result<()> {
    let address = resolve_address(store_path, args.category, args.address).await?;
    let reader = BalanceReader::new(chain_rpc(network), network);

    let balance = reader.wallet_balance(&address).await;
    println!("Address: {address}");
    println!("USDT:    {}", balance.usdt);
    println!("TRX:     {}", balance.trx);
    Ok(())
}

async fn send(store_path: &PathBuf, network: Network, args: SendArgs) -> Result<()> {
    let amount: Amount = args
        .amount
        .parse()
        .with_context(|| format!("invalid amount {}", args.amount))?;
    if !TronAddress::is_valid(&args.to) {
        bail!("invalid recipient address: {}", args.to);
    }

    let session = open_session(store_path).await?;
    let wallet = session
        .get_wallet(&args.category)
        .await
        .with_context(|| format!("no wallet for category {}", args.category))?;
    let from = TronAddress::from_base58(&wallet.address).context("stored address invalid")?;
    let to = TronAddress::from_base58(&args.to).context("invalid recipient")?;

    let service = TransferService::new(chain_rpc(network), network);

    // Advisory estimate; real fees depend on staked resources
    match service.estimate_fee(&from, &to, amount).await {
        Some(fee) => println!(
            "Estimated fee: ~{} TRX ({} energy, {} bandwidth bytes)",
            fee.total_fee, fee.estimated_energy, fee.estimated_bandwidth
        ),
        None => println!("Fee estimate unavailable; sending anyway."),
    }

    let result = service
        .send_transfer(&wallet.private_key, &args.to, amount)
        .await;
    session.lock().await;

    if result.success {
        println!("Broadcast OK");
        println!("txid: {}", result.tx_hash.unwrap_or_default());
        println!("Track it with `atelier status --txid <txid>`.");
        Ok(())
    } else {
        bail!(
            "transfer failed: {}",
            result.error.unwrap_or_else(|| "unknown error".into())
        );
    }
}

async fn status(network: Network, args: StatusArgs) -> Result<()> {
    let service = TransferService::new(chain_rpc(network), network);
    let status = service.transaction_status(&args.txid).await;
    match status {
        TxStatus::Pending => println!("pending"),
        TxStatus::Confirmed => println!("confirmed"),
        TxStatus::Failed => println!("failed"),
    }
    Ok(())
}

async fn history(store_path: &PathBuf, network: Network, args: HistoryArgs) -> Result<()> {
    let address = resolve_address(store_path, args.category, args.address).await?;
    let history = TransferHistory::new(chain_rpc(network), network);

    let records = history.usdt_transfers(&address, args.limit, None).await;
    if records.is_empty() {
        println!("No transfers found.");
        return Ok(());
    }
    for record in records {
        let direction = match record.direction {
            atelier_tron::history::Direction::Incoming => "in ",
            atelier_tron::history::Direction::Outgoing => "out",
        };
        println!(
            "{direction}  {:>16} USDT  block {:>9}  {}",
            record.amount.to_string(),
            record.block_number,
            record.tx_hash
        );
    }
    Ok(())
}

async fn rotate_password(store_path: &PathBuf) -> Result<()> {
    let store = FileWalletStore::open(store_path)
        .with_context(|| format!("open store {}", store_path.display()))?;
    let session = WalletSession::new(Arc::new(store));

    let old = prompt_password("Current master password")?;
    let new = prompt_password("New master password")?;
    let confirm = prompt_password("Confirm new password")?;
    if new != confirm {
        bail!("passwords do not match");
    }

    session
        .rotate_master_password(&old, &new)
        .await
        .context("rotation failed; nothing was changed")?;

    println!("All wallets re-encrypted under the new master password.");
    Ok(())
}
