//! Strategy construction with injected collaborators

use solana_sdk::pubkey::Pubkey;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

use super::{
    ArbitrageStrategy, RebalancingStrategy, Strategy, StrategyKind, StrategyParameters,
    YieldFarmingStrategy,
};
use crate::domain::execution::ExecutionSubmitter;
use crate::domain::market::{ApyMonitor, ApySource, MultiDexPriceMonitor, PortfolioMonitor, PriceMonitor};
use crate::infrastructure::chain::BalanceSource;
use crate::shared::errors::StrategyError;

/// Sizing limits and reference prices shared by all strategies
#[derive(Debug, Clone)]
pub struct StrategyCeilings {
    /// Per-trade cap for arbitrage, input token units
    pub arbitrage_trade_cap: f64,
    /// Per-pool allocation cap for yield farming
    pub yield_pool_cap: f64,
    /// Minimum APY a pool must pay before capital moves
    pub target_apy_pct: f64,
    /// Allocation drift that triggers a rebalance, percentage points
    pub rebalance_threshold_pct: f64,
    /// Fraction of portfolio value traded per rebalance step
    pub rebalance_step_fraction: f64,
    /// Stand-in worst price for cross-venue comparison
    pub reference_worst_price: f64,
}

impl Default for StrategyCeilings {
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

/// Everything a strategy needs beyond its own parameters: pools for
/// yield farming, target allocations for rebalancing. Unused fields
/// are ignored by the other kinds.
#[derive(Debug, Clone, Default)]
pub struct StrategyInputs {
    pub pools: Vec<Pubkey>,
    pub target_allocations: HashMap<Pubkey, f64>,
}

/// Builds strategies from shared collaborators. Replaces any global
/// registry: the set of kinds is closed and the factory is passed
/// where construction happens.
pub struct StrategyFactory {
    price_monitor: Arc<PriceMonitor>,
    submitter: Arc<dyn ExecutionSubmitter>,
    balances: Arc<dyn BalanceSource>,
    apy_source: Arc<dyn ApySource>,
    owner: Pubkey,
    ceilings: StrategyCeilings,
}

impl StrategyFactory {
    pub fn new(
        price_monitor: Arc<PriceMonitor>,
        submitter: Arc<dyn ExecutionSubmitter>,
        balances: Arc<dyn BalanceSource>,
        apy_source: Arc<dyn ApySource>,
        owner: Pubkey,
        ceilings: StrategyCeilings,
    ) -> Self {
        Self {
            price_monitor,
            submitter,
            balances,
            apy_source,
            owner,
            ceilings,
        }
    }

    pub fn build(
        &self,
        kind: StrategyKind,
        id: Pubkey,
        parameters: StrategyParameters,
        inputs: StrategyInputs,
    ) -> Result<Box<dyn Strategy>, StrategyError> {
        parameters.validate()?;
        info!(%kind, %id, "building strategy");

        let strategy: Box<dyn Strategy> = match kind {
            StrategyKind::Arbitrage => {
                let multi_dex = Arc::new(MultiDexPriceMonitor::new(
                    self.price_monitor.clone(),
                    self.ceilings.reference_worst_price,
                ));
                Box::new(ArbitrageStrategy::new(
                    id,
                    parameters,
                    multi_dex,
                    self.submitter.clone(),
                    self.ceilings.arbitrage_trade_cap,
                ))
            }
            StrategyKind::YieldFarming => {
                let apy_monitor = Arc::new(ApyMonitor::new(self.apy_source.clone()));
                Box::new(YieldFarmingStrategy::new(
                    id,
                    parameters,
                    apy_monitor,
                    self.submitter.clone(),
                    inputs.pools,
                    self.ceilings.target_apy_pct,
                    self.ceilings.yield_pool_cap,
                ))
            }
            StrategyKind::Rebalancing => {
                let portfolio = Arc::new(PortfolioMonitor::new(self.balances.clone()));
                Box::new(RebalancingStrategy::new(
                    id,
                    parameters,
                    portfolio,
                    self.submitter.clone(),
                    self.owner,
                    inputs.target_allocations,
                    self.ceilings.rebalance_threshold_pct,
                    self.ceilings.rebalance_step_fraction,
                ))
            }
        };

        Ok(strategy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::execution::MockSubmitter;
    use crate::domain::market::test_support::CountingQuoteClient;
    use crate::domain::market::MockApySource;
    use anyhow::anyhow;
    use async_trait::async_trait;

    struct NoBalances;

    #[async_trait]
    impl BalanceSource for NoBalances {
        async fn token_balance(&self, _owner: &Pubkey, _mint: &Pubkey) -> anyhow::Result<u64> {
            Err(anyhow!("no accounts"))
        }
    }

    fn factory() -> StrategyFactory {
        let client = Arc::new(CountingQuoteClient::returning(vec![60_000]));
        StrategyFactory::new(
            Arc::new(PriceMonitor::new(client, 50)),
            Arc::new(MockSubmitter::new()),
            Arc::new(NoBalances),
            Arc::new(MockApySource),
            Pubkey::new_unique(),
            StrategyCeilings::default(),
        )
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

    #[test]
    fn test_builds_each_kind() {
        let factory = factory();
        for kind in [
            StrategyKind::Arbitrage,
            StrategyKind::YieldFarming,
            StrategyKind::Rebalancing,
        ] {
            let strategy = factory
                .build(kind, Pubkey::new_unique(), params(), StrategyInputs::default())
                .unwrap();
            assert_eq!(strategy.kind(), kind);
        }
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        let factory = factory();
        let mut bad = params();
        bad.max_position_size = -1.0;
        let result = factory.build(
            StrategyKind::Arbitrage,
            Pubkey::new_unique(),
            bad,
            StrategyInputs::default(),
        );
        assert!(result.is_err());
    }
}
