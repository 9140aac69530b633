//! Builds the object graph from configuration and runs the agent fleet

use anyhow::{Context, Result};
use solana_sdk::pubkey::Pubkey;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;

use crate::domain::agent::{AgentConfig, AgentManager};
use crate::domain::execution::{ExecutionSubmitter, MockSubmitter};
use crate::domain::market::{MockApySource, PriceMonitor};
use crate::domain::strategy::{
    StrategyCeilings, StrategyFactory, StrategyInputs, StrategyKind, StrategyParameters,
};
use crate::infrastructure::chain::RpcBalanceSource;
use crate::infrastructure::quote::JupiterQuoteClient;
use crate::shared::config::{CeilingsCfg, Config, StrategyCfg, TokensCfg};

fn parse_pubkey(s: &str, what: &str) -> Result<Pubkey> {
    Pubkey::from_str(s).with_context(|| format!("invalid {what} address: {s}"))
}

impl From<&CeilingsCfg> for StrategyCeilings {
    fn from(cfg: &CeilingsCfg) -> Self {
        Self {
            arbitrage_trade_cap: cfg.arbitrage_trade_cap,
            yield_pool_cap: cfg.yield_pool_cap,
            target_apy_pct: cfg.target_apy_pct,
            rebalance_threshold_pct: cfg.rebalance_threshold_pct,
            rebalance_step_fraction: cfg.rebalance_step_fraction,
            reference_worst_price: cfg.reference_worst_price,
        }
    }
}

fn strategy_parameters(cfg: &StrategyCfg) -> Result<StrategyParameters> {
    Ok(StrategyParameters {
        input_token: parse_pubkey(&cfg.input_token, "input token")?,
        output_token: parse_pubkey(&cfg.output_token, "output token")?,
        min_profit_bps: cfg.min_profit_bps,
        max_slippage_bps: cfg.max_slippage_bps,
        execution_interval_secs: cfg.execution_interval_secs,
        max_position_size: cfg.max_position_size,
    })
}

fn strategy_inputs(cfg: &StrategyCfg) -> Result<StrategyInputs> {
    let pools = cfg
        .pools
        .iter()
        .map(|p| parse_pubkey(p, "pool"))
        .collect::<Result<Vec<_>>>()?;
    let target_allocations = cfg
        .targets
        .iter()
        .map(|(mint, pct)| Ok((parse_pubkey(mint, "target mint")?, *pct)))
        .collect::<Result<HashMap<_, _>>>()?;
    Ok(StrategyInputs {
        pools,
        target_allocations,
    })
}

/// Rebalancing target table used when the config provides none:
/// USDC 40 / SOL 30 / mSOL 30
fn default_target_allocations(tokens: &TokensCfg) -> Result<HashMap<Pubkey, f64>> {
    Ok(HashMap::from([
        (parse_pubkey(&tokens.usdc_mint, "USDC mint")?, 40.0),
        (parse_pubkey(&tokens.sol_mint, "SOL mint")?, 30.0),
        (parse_pubkey(&tokens.msol_mint, "mSOL mint")?, 30.0),
    ]))
}

/// Run the engine until Ctrl-C, then stop every agent and report. With
/// `dry_run` the agent performs exactly one monitoring cycle instead of
/// polling.
pub async fn run(config: Config, agent_id: &str, dry_run: bool) -> Result<()> {
    let owner = parse_pubkey(&config.wallet.owner, "wallet owner")?;

    let quote_client = Arc::new(JupiterQuoteClient::new(
        config.quote.base_url.clone(),
        config.quote.api_key.clone(),
    ));
    let price_monitor = Arc::new(PriceMonitor::new(
        quote_client,
        config.quote.slippage_bps,
    ));
    let balances = Arc::new(RpcBalanceSource::new(config.rpc.url.clone()));

    // On-chain submission is handled by the vault program collaborator;
    // until that integration lands, orders go through the mock seam.
    let submitter: Arc<dyn ExecutionSubmitter> = Arc::new(MockSubmitter::new());

    let factory = Arc::new(StrategyFactory::new(
        price_monitor.clone(),
        submitter,
        balances,
        Arc::new(MockApySource),
        owner,
        StrategyCeilings::from(&config.ceilings),
    ));

    let manager = AgentManager::new(
        factory,
        price_monitor,
        config.rules.clone(),
        config.tracker.max_history_per_strategy,
        config.agent.enable_volatility_gate,
    );

    let agent = manager
        .create_agent(agent_id, AgentConfig::from(&config.agent))
        .await;

    for strategy_cfg in &config.strategies {
        let kind = StrategyKind::from_str(&strategy_cfg.kind)?;
        let id = match &strategy_cfg.id {
            Some(id) => parse_pubkey(id, "strategy")?,
            None => Pubkey::new_unique(),
        };
        let mut inputs = strategy_inputs(strategy_cfg)?;
        if kind == StrategyKind::Rebalancing && inputs.target_allocations.is_empty() {
            inputs.target_allocations = default_target_allocations(&config.tokens)?;
        }
        agent
            .add_strategy(kind, id, strategy_parameters(strategy_cfg)?, inputs)
            .await?;
    }

    if dry_run {
        info!(agent_id, "dry run: executing a single monitoring cycle");
        agent.run_cycle().await?;
    } else {
        manager.start_all().await;
        info!(agent_id, "engine running, press Ctrl-C to stop");

        tokio::signal::ctrl_c()
            .await
            .context("listen for shutdown signal")?;
        info!("shutdown signal received");

        manager.stop_all().await;
    }

    let summary = manager.performance_summary().await;
    info!(
        total_agents = summary.total_agents,
        running_agents = summary.running_agents,
        "final performance summary"
    );
    for entry in &summary.agents {
        info!(
            agent_id = %entry.agent_id,
            strategies = entry.performance.total_strategies,
            executions = entry.performance.total_executions,
            total_profit = entry.performance.total_profit,
            avg_success_rate = entry.performance.avg_success_rate,
            "agent performance"
        );
    }

    Ok(())
}
