//! TOML configuration with CLI overrides layered on top

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::{fs, path::Path};

#[derive(Debug, Clone, Deserialize)]
pub struct RpcCfg {
    pub url: String,
}

/// Wallet identity. Only the public key lives here; signing is supplied
/// by the external wallet collaborator.
#[derive(Debug, Clone, Deserialize)]
pub struct WalletCfg {
    pub owner: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuoteCfg {
    pub base_url: String,
    pub api_key: Option<String>,
    pub slippage_bps: u32,
}

impl Default for QuoteCfg {
    fn default() -> Self {
        Self {
            base_url: "https://api.jup.ag/swap/v1".to_string(),
            api_key: None,
            slippage_bps: 50,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case", tag = "policy")]
pub enum RestartCfg {
    None,
    FixedBackoff { delay_ms: u64 },
    ExponentialBackoff { base_ms: u64, cap_ms: u64 },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AgentCfg {
    pub check_interval_ms: u64,
    pub max_concurrent_executions: usize,
    pub enable_risk_management: bool,
    pub enable_market_analysis: bool,
    pub enable_volatility_gate: bool,
    pub restart: RestartCfg,
}

impl Default for AgentCfg {
    fn default() -> Self {
        Self {
            check_interval_ms: 30_000,
            max_concurrent_executions: 3,
            enable_risk_management: true,
            enable_market_analysis: true,
            // The volatility gate ships disabled; flipping it on changes
            // trade approval behavior. Explicit toggle, owner's call.
            enable_volatility_gate: false,
            restart: RestartCfg::None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RulesCfg {
    pub cooldown_secs: i64,
    pub max_daily_loss_usd: f64,
    pub min_confidence: f64,
    pub allow_high_risk_trades: bool,
    pub medium_risk_window: usize,
    pub medium_risk_max_failures: usize,
    pub min_history_for_rate_check: usize,
    pub rate_check_window: usize,
    pub min_success_rate: f64,
}

impl Default for RulesCfg {
    fn default() -> Self {
        Self {
            cooldown_secs: 300,
            max_daily_loss_usd: 50.0,
            min_confidence: 60.0,
            // High-risk signals pass by default. Explicit toggle,
            // owner's call.
            allow_high_risk_trades: true,
            medium_risk_window: 5,
            medium_risk_max_failures: 2,
            min_history_for_rate_check: 5,
            rate_check_window: 10,
            min_success_rate: 0.5,
        }
    }
}

/// Per-strategy sizing constants, promoted from hard-coded ceilings
/// to configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CeilingsCfg {
    pub arbitrage_trade_cap: f64,
    pub yield_pool_cap: f64,
    pub target_apy_pct: f64,
    pub rebalance_threshold_pct: f64,
    pub rebalance_step_fraction: f64,
    pub reference_worst_price: f64,
}

impl Default for CeilingsCfg {
    fn default() -> Self {
        Self {
            arbitrage_trade_cap: 1_000.0,
            yield_pool_cap: 500.0,
            target_apy_pct: 10.0,
            rebalance_threshold_pct: 5.0,
            rebalance_step_fraction: 0.1,
            reference_worst_price: 0.05,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TrackerCfg {
    pub max_history_per_strategy: usize,
}

impl Default for TrackerCfg {
    fn default() -> Self {
        Self {
            max_history_per_strategy: 1_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TokensCfg {
    pub usdc_mint: String,
    pub sol_mint: String,
    pub msol_mint: String,
}

impl Default for TokensCfg {
    fn default() -> Self {
        Self {
            usdc_mint: "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v".to_string(),
            sol_mint: "So11111111111111111111111111111111111111112".to_string(),
            msol_mint: "mSoLzYCxHdYgdzU16g5QSh3i5K3z3KZK7ytfqcJm7So".to_string(),
        }
    }
}

/// One strategy to register on the configured agent
#[derive(Debug, Clone, Deserialize)]
pub struct StrategyCfg {
    pub kind: String,
    /// On-chain strategy account address; generated when omitted
    pub id: Option<String>,
    pub input_token: String,
    pub output_token: String,
    pub min_profit_bps: u32,
    pub max_slippage_bps: u32,
    pub execution_interval_secs: u64,
    pub max_position_size: f64,
    /// Yield-farming candidate pools
    #[serde(default)]
    pub pools: Vec<String>,
    /// Rebalancing target allocations, mint -> percentage
    #[serde(default)]
    pub targets: HashMap<String, f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub rpc: RpcCfg,
    pub wallet: WalletCfg,
    #[serde(default)]
    pub quote: QuoteCfg,
    #[serde(default)]
    pub agent: AgentCfg,
    #[serde(default)]
    pub rules: RulesCfg,
    #[serde(default)]
    pub ceilings: CeilingsCfg,
    #[serde(default)]
    pub tracker: TrackerCfg,
    #[serde(default)]
    pub tokens: TokensCfg,
    #[serde(default)]
    pub strategies: Vec<StrategyCfg>,
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let s = fs::read_to_string(path.as_ref())?;
        let cfg: Self = toml::from_str(&s).context("parse Config.toml")?;
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = r#"
        [rpc]
        url = "https://api.mainnet-beta.solana.com"

        [wallet]
        owner = "11111111111111111111111111111111"

        [agent]
        check_interval_ms = 10000

        [agent.restart]
        policy = "fixed_backoff"
        delay_ms = 5000

        [rules]
        allow_high_risk_trades = false

        [[strategies]]
        kind = "arbitrage"
        input_token = "So11111111111111111111111111111111111111112"
        output_token = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v"
        min_profit_bps = 50
        max_slippage_bps = 100
        execution_interval_secs = 60
        max_position_size = 1000.0
    "#;

    #[test]
    fn test_parse_sample_config() {
        let cfg: Config = toml::from_str(SAMPLE).unwrap();
        assert_eq!(cfg.agent.check_interval_ms, 10_000);
        // unspecified fields fall back to defaults
        assert_eq!(cfg.agent.max_concurrent_executions, 3);
        assert!(!cfg.rules.allow_high_risk_trades);
        assert_eq!(cfg.rules.cooldown_secs, 300);
        assert_eq!(cfg.ceilings.arbitrage_trade_cap, 1_000.0);
        assert_eq!(cfg.strategies.len(), 1);
        match cfg.agent.restart {
            RestartCfg::FixedBackoff { delay_ms } => assert_eq!(delay_ms, 5_000),
            other => panic!("unexpected restart policy: {:?}", other),
        }
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let cfg: Config = toml::from_str(
            "[rpc]\nurl = \"http://localhost:8899\"\n[wallet]\nowner = \"x\"\n",
        )
        .unwrap();
        assert!(cfg.strategies.is_empty());
        assert_eq!(cfg.tracker.max_history_per_strategy, 1_000);
        assert_eq!(cfg.quote.slippage_bps, 50);
    }
}
