//! Locker Scout - find the LP locker behind a Clanker token
//!
//! Usage:
//!   locker_scout <TOKEN> [--block N] [--json]
//!
//! Environment:
//!   BASE_RPC_URL / ALCHEMY_API_KEY - RPC endpoint (public Base RPC otherwise)
//!   LOCKER_CACHE_PATH              - cache file (default ./cache/lockers.json)
//!   RPC_MAX_ATTEMPTS, RPC_RETRY_DELAY_MS, RPC_TIMEOUT_SECS
//!   RUST_LOG                       - Log level (default: info)

use clap::Parser;
use locker_scout::utils::constants::{APP_NAME, APP_VERSION, EXAMPLE_TOKEN, EXAMPLE_TOKEN_CREATION_BLOCK};
use locker_scout::{
    FileLockerCache, JsonRpcLogClient, LockerCache, LockerScanner, NoopCache, RetryPolicy,
    ScoutConfig,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Debug, Parser)]
#[command(
    name = "locker_scout",
    version,
    about = "Find the locker contract and LP-position NFT id of a Clanker V1 token",
    after_help = format!(
        "Example:\n  locker_scout {} --block {}",
        EXAMPLE_TOKEN, EXAMPLE_TOKEN_CREATION_BLOCK
    )
)]
struct Cli {
    /// Token contract address (0x-prefixed, checksummed or single-case)
    token: String,

    /// Creation block of the token; searches only a few blocks around it
    #[arg(short, long)]
    block: Option<u64>,

    /// JSON-RPC endpoint (overrides BASE_RPC_URL / ALCHEMY_API_KEY)
    #[arg(long, env = "BASE_RPC_URL")]
    rpc_url: Option<String>,

    /// Cache file location
    #[arg(long, env = "LOCKER_CACHE_PATH")]
    cache_path: Option<PathBuf>,

    /// Skip the result cache entirely
    #[arg(long)]
    no_cache: bool,

    /// Attempts per RPC call
    #[arg(long)]
    max_attempts: Option<u32>,

    /// Delay between attempts in milliseconds
    #[arg(long)]
    retry_delay_ms: Option<u64>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    info!("🚀 {} v{}", APP_NAME, APP_VERSION);

    let mut config = ScoutConfig::from_env();
    if let Some(url) = cli.rpc_url {
        config.rpc_url = url;
    }
    if let Some(path) = cli.cache_path {
        config.cache_path = path;
    }
    if cli.max_attempts.is_some() || cli.retry_delay_ms.is_some() {
        config.scanner.retry = RetryPolicy::new(
            cli.max_attempts.unwrap_or(config.scanner.retry.max_attempts),
            cli.retry_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(config.scanner.retry.delay),
        );
    }

    let client = JsonRpcLogClient::new(config.rpc_url.clone(), config.rpc_timeout)?;
    info!("🌐 RPC endpoint: {}", client.masked_url());

    let cache: Arc<dyn LockerCache> = if cli.no_cache {
        Arc::new(NoopCache)
    } else {
        info!("💾 Cache: {}", config.cache_path.display());
        Arc::new(FileLockerCache::new(config.cache_path.clone()))
    };

    let scanner = LockerScanner::new(client, cache, config.scanner.clone());

    // progress goes to stderr so stdout stays machine-readable
    let sink = |message: &str| eprintln!("⏳ {}", message);

    match scanner.discover(&cli.token, cli.block, Some(&sink)).await {
        Ok(result) => {
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("Locker Found");
                println!("   Token:    {}", result.token_address);
                println!("   Locker:   {}", result.locker_address);
                println!("   Token ID: {}", result.token_id);
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(e.code.exit_code());
        }
    }
}
