//! Yield allocation into the best-paying pool

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use solana_sdk::pubkey::Pubkey;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

use super::{ExecutionSignal, RiskLevel, Strategy, StrategyKind, StrategyParameters};
use crate::domain::execution::{ExecutionResult, ExecutionSubmitter, TradeOrder};
use crate::domain::market::{ApyMonitor, MarketData};

/// APY above which a pool is considered aggressive
const HIGH_RISK_APY: f64 = 50.0;

/// Moves capital into whichever candidate pool pays the most, once it
/// clears the target APY.
pub struct YieldFarmingStrategy {
    id: Pubkey,
    parameters: StrategyParameters,
    apy_monitor: Arc<ApyMonitor>,
    submitter: Arc<dyn ExecutionSubmitter>,
    pools: Vec<Pubkey>,
    target_apy: f64,
    /// Per-pool allocation ceiling, in input token units
    pool_cap: f64,
}

impl YieldFarmingStrategy {
    pub fn new(
        id: Pubkey,
        parameters: StrategyParameters,
        apy_monitor: Arc<ApyMonitor>,
        submitter: Arc<dyn ExecutionSubmitter>,
        pools: Vec<Pubkey>,
        target_apy: f64,
        pool_cap: f64,
    ) -> Self {
        Self {
            id,
            parameters,
            apy_monitor,
            submitter,
            pools,
            target_apy,
            pool_cap,
        }
    }
}

#[async_trait]
impl Strategy for YieldFarmingStrategy {
    fn id(&self) -> Pubkey {
        self.id
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::YieldFarming
    }

    fn parameters(&self) -> &StrategyParameters {
        &self.parameters
    }

    async fn analyze(&self, _market_data: &[MarketData]) -> ExecutionSignal {
        if self.pools.is_empty() {
            return ExecutionSignal::hold("No pools configured", RiskLevel::Low);
        }

        let best = match self.apy_monitor.best_yield_opportunity(&self.pools).await {
            Some(best) => best,
            None => return ExecutionSignal::hold("No pools configured", RiskLevel::Low),
        };

        if best.apy < self.target_apy {
            return ExecutionSignal::hold(
                format!(
                    "Best APY {:.1}% < target {:.1}%",
                    best.apy, self.target_apy
                ),
                RiskLevel::Low,
            );
        }

        info!(pool = %best.pool, apy = best.apy, "high yield pool found");

        let amount = self.parameters.max_position_size.min(self.pool_cap);
        let expected_annual_profit = amount * best.apy / 100.0;
        let risk = if best.apy > HIGH_RISK_APY {
            RiskLevel::High
        } else {
            RiskLevel::Medium
        };

        ExecutionSignal {
            execute: true,
            amount,
            reason: format!("High APY pool found: {:.1}%", best.apy),
            confidence: 80.0,
            expected_profit: expected_annual_profit / 365.0,
            risk,
            metadata: Some(json!({
                "pool": best.pool.to_string(),
                "apy": best.apy,
            })),
        }
    }

    /// A full implementation would swap half into the pair token, add
    /// liquidity and stake the LP tokens; the submitter seam carries
    /// the single allocation order. Yield accrues over time, so the
    /// immediate profit is zero.
    async fn execute(&self, signal: &ExecutionSignal) -> ExecutionResult {
        let started = Instant::now();
        info!(amount = signal.amount, "providing liquidity");

        if let Err(e) = self.validate_signal(signal) {
            return ExecutionResult {
                success: false,
                signature: None,
                input_amount: signal.amount,
                output_amount: 0.0,
                profit: 0.0,
                gas_cost: 0.0,
                execution_time_ms: started.elapsed().as_millis() as u64,
                timestamp: Utc::now(),
                error: Some(e.to_string()),
            };
        }

        let order = TradeOrder {
            input_token: self.parameters.input_token,
            output_token: self.parameters.output_token,
            amount: signal.amount,
            max_slippage_bps: self.parameters.max_slippage_bps,
        };

        match self.submitter.submit(&order).await {
            Ok(receipt) => {
                info!(signature = %receipt.signature, "liquidity provided");
                ExecutionResult {
                    success: true,
                    signature: Some(receipt.signature),
                    input_amount: signal.amount,
                    output_amount: signal.amount,
                    profit: 0.0,
                    gas_cost: receipt.gas_cost,
                    execution_time_ms: started.elapsed().as_millis() as u64,
                    timestamp: Utc::now(),
                    error: None,
                }
            }
            Err(e) => {
                error!("liquidity provision failed: {}", e);
                ExecutionResult {
                    success: false,
                    signature: None,
                    input_amount: signal.amount,
                    output_amount: 0.0,
                    profit: 0.0,
                    gas_cost: 0.0,
                    execution_time_ms: started.elapsed().as_millis() as u64,
                    timestamp: Utc::now(),
                    error: Some(e.to_string()),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::execution::MockSubmitter;
    use crate::domain::market::ApySource;
    use anyhow::Result;
    use assert_approx_eq::assert_approx_eq;
    use std::collections::HashMap;

    struct FixedApySource {
        apys: HashMap<Pubkey, f64>,
    }

    #[async_trait]
    impl ApySource for FixedApySource {
        async fn pool_apy(&self, pool: &Pubkey) -> Result<f64> {
            Ok(self.apys.get(pool).copied().unwrap_or(0.0))
        }
    }

    fn params() -> StrategyParameters {
        StrategyParameters {
            input_token: Pubkey::new_unique(),
            output_token: Pubkey::new_unique(),
            min_profit_bps: 50,
            max_slippage_bps: 100,
            execution_interval_secs: 60,
            max_position_size: 1_000.0,
        }
    }

    fn strategy(apys: Vec<(Pubkey, f64)>, pools: Vec<Pubkey>) -> YieldFarmingStrategy {
        let monitor = Arc::new(ApyMonitor::new(Arc::new(FixedApySource {
            apys: apys.into_iter().collect(),
        })));
        YieldFarmingStrategy::new(
            Pubkey::new_unique(),
            params(),
            monitor,
            Arc::new(MockSubmitter::new()),
            pools,
            10.0,
            500.0,
        )
    }

    #[tokio::test]
    async fn test_no_pools_holds() {
        let strategy = strategy(vec![], vec![]);
        let signal = strategy.analyze(&[]).await;
        assert!(!signal.execute);
        assert_eq!(signal.reason, "No pools configured");
    }

    #[tokio::test]
    async fn test_apy_below_target_holds() {
        let pool = Pubkey::new_unique();
        let strategy = strategy(vec![(pool, 6.0)], vec![pool]);
        let signal = strategy.analyze(&[]).await;
        assert!(!signal.execute);
    }

    #[tokio::test]
    async fn test_high_apy_allocates_capped_amount() {
        let pool = Pubkey::new_unique();
        let strategy = strategy(vec![(pool, 14.6)], vec![pool]);
        let signal = strategy.analyze(&[]).await;

        assert!(signal.execute);
        // pool cap of 500 wins over the 1000 position limit
        assert_approx_eq!(signal.amount, 500.0);
        // daily share of 14.6% annual on 500
        assert_approx_eq!(signal.expected_profit, 500.0 * 14.6 / 100.0 / 365.0);
        assert_eq!(signal.risk, RiskLevel::Medium);
        assert_approx_eq!(signal.confidence, 80.0);
    }

    #[tokio::test]
    async fn test_extreme_apy_flags_high_risk() {
        let pool = Pubkey::new_unique();
        let strategy = strategy(vec![(pool, 75.0)], vec![pool]);
        let signal = strategy.analyze(&[]).await;
        assert!(signal.execute);
        assert_eq!(signal.risk, RiskLevel::High);
    }

    #[tokio::test]
    async fn test_execute_reports_zero_immediate_profit() {
        let pool = Pubkey::new_unique();
        let strategy = strategy(vec![(pool, 20.0)], vec![pool]);
        let signal = strategy.analyze(&[]).await;
        let result = strategy.execute(&signal).await;

        assert!(result.success);
        assert_approx_eq!(result.profit, 0.0);
        assert_approx_eq!(result.output_amount, result.input_amount);
    }
}
