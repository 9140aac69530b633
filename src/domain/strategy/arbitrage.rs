//! Cross-venue spread capture

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use solana_sdk::pubkey::Pubkey;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

use super::{ExecutionSignal, RiskLevel, Strategy, StrategyKind, StrategyParameters};
use crate::domain::execution::{ExecutionResult, ExecutionSubmitter, TradeOrder};
use crate::domain::market::{MarketData, MultiDexPriceMonitor};

/// Buy where the pair is cheap, sell where it is dear
pub struct ArbitrageStrategy {
    id: Pubkey,
    parameters: StrategyParameters,
    price_monitor: Arc<MultiDexPriceMonitor>,
    submitter: Arc<dyn ExecutionSubmitter>,
    /// Per-trade size ceiling, in input token units
    trade_cap: f64,
}

impl ArbitrageStrategy {
    pub fn new(
        id: Pubkey,
        parameters: StrategyParameters,
        price_monitor: Arc<MultiDexPriceMonitor>,
        submitter: Arc<dyn ExecutionSubmitter>,
        trade_cap: f64,
    ) -> Self {
        Self {
            id,
            parameters,
            price_monitor,
            submitter,
            trade_cap,
        }
    }
}

#[async_trait]
impl Strategy for ArbitrageStrategy {
    fn id(&self) -> Pubkey {
        self.id
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Arbitrage
    }

    fn parameters(&self) -> &StrategyParameters {
        &self.parameters
    }

    async fn analyze(&self, _market_data: &[MarketData]) -> ExecutionSignal {
        let prices = match self
            .price_monitor
            .get_price_across_dexes(&self.parameters.input_token, &self.parameters.output_token)
            .await
        {
            Ok(prices) => prices,
            Err(e) => {
                error!("error analyzing arbitrage: {}", e);
                return ExecutionSignal::hold("Error analyzing arbitrage", RiskLevel::High);
            }
        };

        debug!(
            best = prices.best.price,
            worst = prices.worst.price,
            spread_bps = prices.spread_bps,
            "price spread"
        );

        if prices.spread_bps < self.parameters.min_profit_bps as f64 {
            return ExecutionSignal::hold(
                format!(
                    "Spread {:.0} bps < minimum {} bps",
                    prices.spread_bps, self.parameters.min_profit_bps
                ),
                RiskLevel::Low,
            );
        }

        let amount = self.parameters.max_position_size.min(self.trade_cap);
        let expected_profit = amount * prices.spread_bps / 10_000.0;
        let confidence = (prices.spread_bps / self.parameters.min_profit_bps as f64 * 60.0
            + 40.0)
            .min(100.0);
        let risk = if prices.spread_bps > 200.0 {
            RiskLevel::High
        } else if prices.spread_bps > 100.0 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        };

        info!(
            spread_bps = prices.spread_bps,
            expected_profit,
            confidence,
            "arbitrage opportunity found"
        );

        ExecutionSignal {
            execute: true,
            amount,
            reason: format!("Profitable spread of {:.0} bps detected", prices.spread_bps),
            confidence,
            expected_profit,
            risk,
            metadata: Some(json!({
                "best_price": prices.best.price,
                "worst_price": prices.worst.price,
                "spread_bps": prices.spread_bps,
            })),
        }
    }

    async fn execute(&self, signal: &ExecutionSignal) -> ExecutionResult {
        let started = Instant::now();
        info!(
            amount = signal.amount,
            expected_profit = signal.expected_profit,
            "executing arbitrage trade"
        );

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
                let profit = receipt.output_amount - signal.amount;
                info!(signature = %receipt.signature, profit, "trade executed");
                ExecutionResult {
                    success: true,
                    signature: Some(receipt.signature),
                    input_amount: signal.amount,
                    output_amount: receipt.output_amount,
                    profit,
                    gas_cost: receipt.gas_cost,
                    execution_time_ms: started.elapsed().as_millis() as u64,
                    timestamp: Utc::now(),
                    error: None,
                }
            }
            Err(e) => {
                error!("trade failed: {}", e);
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
