use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "lal",
    about = "Loan Asset Ledger — issue, transfer and redeem loan assets",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Ledger snapshot file (overrides `ledger_path` in the config)
    #[arg(long, global = true)]
    pub ledger: Option<PathBuf>,

    /// Base64 caller token (overrides `identity` in the config)
    #[arg(long, global = true)]
    pub identity: Option<String>,

    /// Plain caller name, encoded into a token for you
    #[arg(long = "as", global = true, conflicts_with = "identity")]
    pub as_name: Option<String>,

    #[arg(long, global = true, default_value = "lal.toml")]
    pub config: PathBuf,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Write the six demonstration assets
    Init,
    /// Issue a new loan asset
    Create(CreateArgs),
    /// Show one asset
    Read(IdArgs),
    /// Remove an asset from the ledger
    Delete(IdArgs),
    /// Check whether an asset exists
    Exists(IdArgs),
    /// Assign a new borrower
    Transfer(TransferArgs),
    /// List every asset
    List,
    /// Show an asset's lifecycle state
    State(IdArgs),
    /// Move an asset to another lifecycle state
    Transition(TransitionArgs),
    /// Record a payment hash
    Pay(PayArgs),
    /// Set payment-routing addresses
    Addresses(AddressesArgs),
    /// Print the display name of a numeric state code
    StateName(StateNameArgs),
}

#[derive(Args)]
pub struct IdArgs {
    pub id: String,
}

#[derive(Args)]
pub struct CreateArgs {
    pub id: String,
    /// Start date as YYYYMMDD
    #[arg(long)]
    pub start: i64,
    /// End date as YYYYMMDD
    #[arg(long)]
    pub end: i64,
    #[arg(long)]
    pub amount: i64,
}

#[derive(Args)]
pub struct TransferArgs {
    pub id: String,
    pub borrower: String,
}

#[derive(Args)]
pub struct TransitionArgs {
    pub id: String,
    /// Target state (issued, pending, trading, redeemed)
    pub state: String,
}

#[derive(Args)]
pub struct PayArgs {
    pub id: String,
    pub hash: String,
}

#[derive(Args)]
pub struct AddressesArgs {
    pub id: String,
    #[arg(long)]
    pub borrower: String,
    #[arg(long)]
    pub investor: String,
}

#[derive(Args)]
pub struct StateNameArgs {
    pub code: u32,
}
