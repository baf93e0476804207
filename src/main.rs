use clap::Parser;
use std::path::PathBuf;

use aichainx::cli::{CliHandler, Commands};
use aichainx::version::CURRENT_VERSION;

#[derive(Parser)]
#[command(
    name = "aichainx",
    about = "AIChainX marketplace client",
    long_about = "AIChainX - Decentralized AI model marketplace

OVERVIEW:
  Browse AI model listings, inspect their details and integration snippets,
  and publish your own models by minting them through the on-chain model
  registry with your wallet.

QUICK START:
  aichainx browse --search vision         # Search the marketplace
  aichainx show <ID> --tab integration    # Model details and snippets
  aichainx config set-wallet-rpc <URL>    # Point at your wallet's RPC endpoint
  aichainx upload                         # Upload wizard + on-chain mint
  aichainx login                          # Sign in with email and password
  aichainx dashboard                      # Your models and stats",
    version = CURRENT_VERSION,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Use this config file instead of the default location
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(format!("aichainx={}", log_level));
    subscriber.init();

    let mut handler = CliHandler::with_config_path(cli.config);

    if let Err(e) = handler.execute(cli.command).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
