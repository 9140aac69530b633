//! Portfolio rebalancing toward target allocations

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use solana_sdk::pubkey::Pubkey;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

use super::{ExecutionSignal, RiskLevel, Strategy, StrategyKind, StrategyParameters};
use crate::domain::execution::{ExecutionResult, ExecutionSubmitter, TradeOrder};
use crate::domain::market::{MarketData, PortfolioMonitor};

/// Trades the portfolio back toward target percentages when any token
/// drifts past the threshold. Risk management, not profit seeking.
pub struct RebalancingStrategy {
    id: Pubkey,
    parameters: StrategyParameters,
    portfolio_monitor: Arc<PortfolioMonitor>,
    submitter: Arc<dyn ExecutionSubmitter>,
    owner: Pubkey,
    /// Target allocation percentages keyed by mint
    targets: HashMap<Pubkey, f64>,
    /// Deviation in percentage points that triggers a rebalance
    threshold_pct: f64,
    /// Fraction of portfolio value traded per rebalance step
    step_fraction: f64,
}

impl RebalancingStrategy {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: Pubkey,
        parameters: StrategyParameters,
        portfolio_monitor: Arc<PortfolioMonitor>,
        submitter: Arc<dyn ExecutionSubmitter>,
        owner: Pubkey,
        targets: HashMap<Pubkey, f64>,
        threshold_pct: f64,
        step_fraction: f64,
    ) -> Self {
        Self {
            id,
            parameters,
            portfolio_monitor,
            submitter,
            owner,
            targets,
            threshold_pct,
            step_fraction,
        }
    }
}

#[async_trait]
impl Strategy for RebalancingStrategy {
    fn id(&self) -> Pubkey {
        self.id
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Rebalancing
    }

    fn parameters(&self) -> &StrategyParameters {
        &self.parameters
    }

    async fn analyze(&self, _market_data: &[MarketData]) -> ExecutionSignal {
        let portfolio = self
            .portfolio_monitor
            .portfolio(
                &self.owner,
                &[self.parameters.input_token, self.parameters.output_token],
            )
            .await;

        // value in whole tokens; stable-pair simplification
        let total_value: f64 = portfolio.values().map(|b| *b as f64 / 1e6).sum();
        if total_value <= 0.0 {
            return ExecutionSignal::hold("Portfolio is empty", RiskLevel::Low);
        }

        let current_allocations: HashMap<Pubkey, f64> = portfolio
            .iter()
            .map(|(mint, balance)| (*mint, *balance as f64 / 1e6 / total_value * 100.0))
            .collect();

        let mut max_deviation = 0.0f64;
        let mut needs_rebalance = false;
        for (mint, target_pct) in &self.targets {
            let current_pct = current_allocations.get(mint).copied().unwrap_or(0.0);
            let deviation = (current_pct - target_pct).abs();
            max_deviation = max_deviation.max(deviation);
            if deviation > self.threshold_pct {
                needs_rebalance = true;
            }
        }

        if !needs_rebalance {
            return ExecutionSignal::hold(
                format!("Portfolio balanced (max deviation: {:.1}%)", max_deviation),
                RiskLevel::Low,
            );
        }

        info!(
            max_deviation,
            threshold = self.threshold_pct,
            "rebalancing needed"
        );

        let amount = (total_value * self.step_fraction).min(self.parameters.max_position_size);
        let current_json: HashMap<String, f64> = current_allocations
            .iter()
            .map(|(mint, pct)| (mint.to_string(), *pct))
            .collect();
        let targets_json: HashMap<String, f64> = self
            .targets
            .iter()
            .map(|(mint, pct)| (mint.to_string(), *pct))
            .collect();

        ExecutionSignal {
            execute: true,
            amount,
            reason: format!(
                "Portfolio deviation {:.1}% exceeds {:.1}%",
                max_deviation, self.threshold_pct
            ),
            confidence: 90.0,
            expected_profit: 0.0,
            risk: RiskLevel::Low,
            metadata: Some(json!({
                "current_allocations": current_json,
                "target_allocations": targets_json,
            })),
        }
    }

    async fn execute(&self, signal: &ExecutionSignal) -> ExecutionResult {
        let started = Instant::now();
        info!(amount = signal.amount, "rebalancing portfolio");

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
                info!(signature = %receipt.signature, "portfolio rebalanced");
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
                error!("rebalancing failed: {}", e);
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
    use crate::infrastructure::chain::BalanceSource;
    use anyhow::anyhow;
    use assert_approx_eq::assert_approx_eq;

    struct FixedBalances {
        balances: HashMap<Pubkey, u64>,
    }

    #[async_trait]
    impl BalanceSource for FixedBalances {
        async fn token_balance(&self, _owner: &Pubkey, mint: &Pubkey) -> anyhow::Result<u64> {
            self.balances
                .get(mint)
                .copied()
                .ok_or_else(|| anyhow!("no account for {}", mint))
        }
    }

    fn strategy(
        input: Pubkey,
        output: Pubkey,
        balances: Vec<(Pubkey, u64)>,
        targets: Vec<(Pubkey, f64)>,
    ) -> RebalancingStrategy {
        let monitor = Arc::new(PortfolioMonitor::new(Arc::new(FixedBalances {
            balances: balances.into_iter().collect(),
        })));
        RebalancingStrategy::new(
            Pubkey::new_unique(),
            StrategyParameters {
                input_token: input,
                output_token: output,
                min_profit_bps: 50,
                max_slippage_bps: 100,
                execution_interval_secs: 60,
                max_position_size: 1_000.0,
            },
            monitor,
            Arc::new(MockSubmitter::new()),
            Pubkey::new_unique(),
            targets.into_iter().collect(),
            5.0,
            0.1,
        )
    }

    #[tokio::test]
    async fn test_balanced_portfolio_holds() {
        let usdc = Pubkey::new_unique();
        let sol = Pubkey::new_unique();
        // 40/60 split against 40/60 targets
        let strategy = strategy(
            usdc,
            sol,
            vec![(usdc, 40_000_000), (sol, 60_000_000)],
            vec![(usdc, 40.0), (sol, 60.0)],
        );

        let signal = strategy.analyze(&[]).await;
        assert!(!signal.execute);
        assert!(signal.reason.starts_with("Portfolio balanced"));
    }

    #[tokio::test]
    async fn test_drifted_portfolio_trades_one_step() {
        let usdc = Pubkey::new_unique();
        let sol = Pubkey::new_unique();
        // 70/30 against 40/60 targets, 30 point deviation
        let strategy = strategy(
            usdc,
            sol,
            vec![(usdc, 70_000_000), (sol, 30_000_000)],
            vec![(usdc, 40.0), (sol, 60.0)],
        );

        let signal = strategy.analyze(&[]).await;
        assert!(signal.execute);
        // 10% of the 100-token portfolio
        assert_approx_eq!(signal.amount, 10.0);
        assert_approx_eq!(signal.confidence, 90.0);
        assert_eq!(signal.risk, RiskLevel::Low);
        assert_approx_eq!(signal.expected_profit, 0.0);
    }

    #[tokio::test]
    async fn test_empty_portfolio_holds() {
        let usdc = Pubkey::new_unique();
        let sol = Pubkey::new_unique();
        let strategy = strategy(usdc, sol, vec![], vec![(usdc, 40.0), (sol, 60.0)]);

        let signal = strategy.analyze(&[]).await;
        assert!(!signal.execute);
        assert_eq!(signal.reason, "Portfolio is empty");
    }

    #[tokio::test]
    async fn test_execute_preserves_amounts() {
        let usdc = Pubkey::new_unique();
        let sol = Pubkey::new_unique();
        let strategy = strategy(
            usdc,
            sol,
            vec![(usdc, 70_000_000), (sol, 30_000_000)],
            vec![(usdc, 40.0), (sol, 60.0)],
        );

        let signal = strategy.analyze(&[]).await;
        let result = strategy.execute(&signal).await;
        assert!(result.success);
        assert_approx_eq!(result.input_amount, result.output_amount);
        assert_approx_eq!(result.profit, 0.0);
    }
}
