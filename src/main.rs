use anyhow::Result;
use clap::Parser;

use vault_strategy_engine::application;
use vault_strategy_engine::shared::config::{Config, RpcCfg, StrategyCfg, WalletCfg};

#[derive(Parser, Debug)]
#[command(version, about = "Autonomous strategy engine for a Solana yield vault")]
struct Args {
    /// Path to config file (optional)
    #[arg(long)]
    config: Option<String>,

    /// RPC endpoint URL (overrides config)
    #[arg(long)]
    rpc_url: Option<String>,

    /// Wallet owner public key (overrides config)
    #[arg(long)]
    owner: Option<String>,

    /// Agent identifier
    #[arg(long, default_value = "agent-1")]
    agent_id: String,

    /// Strategy kinds to run when the config lists none (comma-separated)
    #[arg(long, default_value = "arbitrage")]
    strategies: String,

    /// Milliseconds between monitoring cycles (overrides config)
    #[arg(long)]
    check_interval_ms: Option<u64>,

    /// Run a single monitoring cycle and exit
    #[arg(long)]
    dry_run: bool,
}

fn default_strategies(kinds: &str, config: &Config) -> Vec<StrategyCfg> {
    kinds
        .split(',')
        .map(|kind| StrategyCfg {
            kind: kind.trim().to_string(),
            id: None,
            input_token: config.tokens.sol_mint.clone(),
            output_token: config.tokens.usdc_mint.clone(),
            min_profit_bps: 50,
            max_slippage_bps: 100,
            execution_interval_secs: 60,
            max_position_size: 1_000.0,
            pools: Vec::new(),
            targets: Default::default(),
        })
        .collect()
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let args = Args::parse();

    // Priority: CLI args > config file > defaults
    let mut config = if let Some(config_path) = &args.config {
        Config::from_file(config_path)?
    } else {
        let rpc_url = args
            .rpc_url
            .clone()
            .ok_or_else(|| anyhow::anyhow!("--rpc-url is required when not using --config"))?;
        let owner = args
            .owner
            .clone()
            .ok_or_else(|| anyhow::anyhow!("--owner is required when not using --config"))?;
        Config {
            rpc: RpcCfg { url: rpc_url },
            wallet: WalletCfg { owner },
            quote: Default::default(),
            agent: Default::default(),
            rules: Default::default(),
            ceilings: Default::default(),
            tracker: Default::default(),
            tokens: Default::default(),
            strategies: Vec::new(),
        }
    };

    if let Some(rpc_url) = args.rpc_url {
        config.rpc.url = rpc_url;
    }
    if let Some(owner) = args.owner {
        config.wallet.owner = owner;
    }
    if let Some(check_interval_ms) = args.check_interval_ms {
        config.agent.check_interval_ms = check_interval_ms;
    }
    if config.strategies.is_empty() {
        let defaults = default_strategies(&args.strategies, &config);
        config.strategies = defaults;
    }

    application::run(config, &args.agent_id, args.dry_run).await
}
