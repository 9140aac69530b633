//! Autonomous agent driving strategies through the decision pipeline

use solana_sdk::pubkey::Pubkey;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use super::rules::{AgentRulesEngine, RuleContext};
use crate::domain::execution::{ExecutionStats, ExecutionTracker};
use crate::domain::market::MarketConditionsAnalyzer;
use crate::domain::strategy::{
    Strategy, StrategyFactory, StrategyInputs, StrategyKind, StrategyParameters,
};
use crate::shared::config::{AgentCfg, RestartCfg};
use crate::shared::errors::{AgentError, AppError, StrategyError};
use crate::shared::utils::chunked;

/// What the monitoring loop does after a fatal cycle error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartPolicy {
    /// Stop the agent
    None,
    FixedBackoff { delay: Duration },
    ExponentialBackoff { base: Duration, cap: Duration },
}

impl From<&RestartCfg> for RestartPolicy {
    fn from(cfg: &RestartCfg) -> Self {
        match cfg {
            RestartCfg::None => RestartPolicy::None,
            RestartCfg::FixedBackoff { delay_ms } => RestartPolicy::FixedBackoff {
                delay: Duration::from_millis(*delay_ms),
            },
            RestartCfg::ExponentialBackoff { base_ms, cap_ms } => {
                RestartPolicy::ExponentialBackoff {
                    base: Duration::from_millis(*base_ms),
                    cap: Duration::from_millis(*cap_ms),
                }
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub check_interval: Duration,
    pub max_concurrent_executions: usize,
    pub enable_risk_management: bool,
    pub enable_market_analysis: bool,
    pub restart: RestartPolicy,
}

impl From<&AgentCfg> for AgentConfig {
    fn from(cfg: &AgentCfg) -> Self {
        Self {
            check_interval: Duration::from_millis(cfg.check_interval_ms),
            max_concurrent_executions: cfg.max_concurrent_executions,
            enable_risk_management: cfg.enable_risk_management,
            enable_market_analysis: cfg.enable_market_analysis,
            restart: RestartPolicy::from(&cfg.restart),
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self::from(&AgentCfg::default())
    }
}

/// Aggregate view over all of an agent's strategies
#[derive(Debug, Clone, PartialEq)]
pub struct AgentPerformance {
    pub total_strategies: usize,
    pub total_executions: usize,
    pub total_profit: f64,
    /// Unweighted mean of per-strategy success rates, percent
    pub avg_success_rate: f64,
    pub is_running: bool,
}

/// Rule-gated autonomous executor. Cheap to clone; clones share all
/// state.
#[derive(Clone)]
pub struct Agent {
    agent_id: String,
    strategies: Arc<RwLock<HashMap<String, Arc<dyn Strategy>>>>,
    rules_engine: Arc<AgentRulesEngine>,
    tracker: Arc<ExecutionTracker>,
    market_analyzer: Arc<MarketConditionsAnalyzer>,
    factory: Arc<StrategyFactory>,
    config: AgentConfig,
    running: Arc<AtomicBool>,
}

impl Agent {
    pub fn new(
        agent_id: impl Into<String>,
        rules_engine: Arc<AgentRulesEngine>,
        tracker: Arc<ExecutionTracker>,
        market_analyzer: Arc<MarketConditionsAnalyzer>,
        factory: Arc<StrategyFactory>,
        config: AgentConfig,
    ) -> Self {
        Self {
            agent_id: agent_id.into(),
            strategies: Arc::new(RwLock::new(HashMap::new())),
            rules_engine,
            tracker,
            market_analyzer,
            factory,
            config,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn id(&self) -> &str {
        &self.agent_id
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Build a strategy through the factory, initialize it and register
    /// it under its account address.
    pub async fn add_strategy(
        &self,
        kind: StrategyKind,
        id: Pubkey,
        parameters: StrategyParameters,
        inputs: StrategyInputs,
    ) -> Result<(), StrategyError> {
        let mut strategy = self.factory.build(kind, id, parameters, inputs)?;
        strategy.initialize().await?;
        self.strategies
            .write()
            .await
            .insert(id.to_string(), Arc::from(strategy));
        info!(agent_id = %self.agent_id, strategy = %id, "added strategy");
        Ok(())
    }

    pub async fn remove_strategy(&self, strategy_id: &str) -> Result<(), AgentError> {
        let removed = self.strategies.write().await.remove(strategy_id);
        match removed {
            Some(_) => {
                info!(agent_id = %self.agent_id, strategy_id, "removed strategy");
                Ok(())
            }
            None => Err(AgentError::StrategyNotFound(strategy_id.to_string())),
        }
    }

    /// Spawn the monitoring loop. Starting a running agent is a no-op.
    pub async fn start(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!(agent_id = %self.agent_id, "agent already running");
            return;
        }

        let strategies = self.strategies.read().await.len();
        info!(agent_id = %self.agent_id, strategies, "agent started");

        let agent = self.clone();
        tokio::spawn(async move {
            agent.monitoring_loop().await;
        });
    }

    /// Signal the loop to exit after its current cycle. Stopping a
    /// stopped agent is a no-op.
    pub async fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            info!(agent_id = %self.agent_id, "agent already stopped");
            return;
        }
        info!(agent_id = %self.agent_id, "agent stopped");
    }

    async fn monitoring_loop(&self) {
        let mut consecutive_failures: u32 = 0;

        while self.running.load(Ordering::SeqCst) {
            match self.run_cycle().await {
                Ok(()) => {
                    consecutive_failures = 0;
                    tokio::time::sleep(self.config.check_interval).await;
                }
                Err(e) => {
                    consecutive_failures += 1;
                    error!(
                        agent_id = %self.agent_id,
                        consecutive_failures,
                        "fatal error in monitoring loop: {}", e
                    );
                    match self.config.restart {
                        RestartPolicy::None => {
                            self.stop().await;
                        }
                        RestartPolicy::FixedBackoff { delay } => {
                            tokio::time::sleep(delay).await;
                        }
                        RestartPolicy::ExponentialBackoff { base, cap } => {
                            let shift = (consecutive_failures - 1).min(16);
                            let delay = base.saturating_mul(1u32 << shift).min(cap);
                            tokio::time::sleep(delay).await;
                        }
                    }
                }
            }
        }
    }

    /// One pass over every registered strategy, in bounded-concurrency
    /// chunks. A panicking strategy task is the only fatal error.
    pub async fn run_cycle(&self) -> Result<(), AppError> {
        let strategies: Vec<(String, Arc<dyn Strategy>)> = self
            .strategies
            .read()
            .await
            .iter()
            .map(|(key, strategy)| (key.clone(), strategy.clone()))
            .collect();

        if strategies.is_empty() {
            return Ok(());
        }

        debug!(count = strategies.len(), "checking strategies");

        for chunk in chunked(strategies, self.config.max_concurrent_executions) {
            let handles: Vec<_> = chunk
                .into_iter()
                .map(|(strategy_id, strategy)| {
                    let agent = self.clone();
                    tokio::spawn(async move {
                        agent.monitor_strategy(&strategy_id, strategy).await;
                    })
                })
                .collect();

            for handle in handles {
                handle
                    .await
                    .map_err(|e| AppError::AgentError(format!("strategy task failed: {e}")))?;
            }
        }

        Ok(())
    }

    /// monitor -> analyze -> rules -> market check -> execute. Errors at
    /// any stage skip this strategy for the cycle, never the whole loop.
    async fn monitor_strategy(&self, strategy_id: &str, strategy: Arc<dyn Strategy>) {
        let market_data = match strategy.monitor().await {
            Ok(data) => data,
            Err(e) => {
                error!(strategy_id, "error monitoring strategy: {}", e);
                return;
            }
        };

        let signal = strategy.analyze(&market_data).await;
        if !signal.execute {
            debug!(strategy_id, reason = %signal.reason, "no execution signal");
            return;
        }

        info!(
            strategy_id,
            amount = signal.amount,
            confidence = signal.confidence,
            expected_profit = signal.expected_profit,
            "execution signal received"
        );

        let recent = self.tracker.recent(strategy_id, 20).await;

        if self.config.enable_risk_management {
            let ctx = RuleContext {
                agent_id: &self.agent_id,
                strategy_id,
                signal: &signal,
                recent_executions: &recent,
            };
            let outcome = self.rules_engine.evaluate_all(&ctx).await;
            if !outcome.passed {
                warn!(
                    strategy_id,
                    failed_rules = ?outcome.failed_rules,
                    "rules check failed"
                );
                return;
            }
        }

        if self.config.enable_market_analysis {
            let params = strategy.parameters();
            match self
                .market_analyzer
                .is_good_time_to_trade(&params.input_token, &params.output_token)
                .await
            {
                Ok(window) if !window.should_trade => {
                    warn!(strategy_id, reason = %window.reason, "market conditions unfavorable");
                    return;
                }
                Ok(_) => {}
                // conditions unknown, skip the trade this cycle
                Err(e) => {
                    warn!(strategy_id, "market conditions unknown: {}", e);
                    return;
                }
            }
        }

        info!(strategy_id, reason = %signal.reason, "executing strategy");
        let result = strategy.execute(&signal).await;
        self.tracker.record(strategy_id, result.clone()).await;

        if result.success {
            info!(
                strategy_id,
                profit = result.profit,
                signature = result.signature.as_deref().unwrap_or(""),
                "execution successful"
            );
        } else {
            error!(
                strategy_id,
                error = result.error.as_deref().unwrap_or("unknown"),
                "execution failed"
            );
        }

        let stats = self.tracker.stats(strategy_id).await;
        info!(
            strategy_id,
            success_rate = stats.success_rate,
            total_profit = stats.total_profit,
            executions = stats.total,
            "strategy stats"
        );
    }

    pub async fn strategy_stats(&self, strategy_id: &str) -> ExecutionStats {
        self.tracker.stats(strategy_id).await
    }

    pub async fn performance(&self) -> AgentPerformance {
        let keys: Vec<String> = self.strategies.read().await.keys().cloned().collect();

        let mut total_executions = 0;
        let mut total_profit = 0.0;
        let mut rate_sum = 0.0;
        for key in &keys {
            let stats = self.tracker.stats(key).await;
            total_executions += stats.total;
            total_profit += stats.total_profit;
            rate_sum += stats.success_rate;
        }

        let avg_success_rate = if keys.is_empty() {
            0.0
        } else {
            rate_sum / keys.len() as f64
        };

        AgentPerformance {
            total_strategies: keys.len(),
            total_executions,
            total_profit,
            avg_success_rate,
            is_running: self.is_running(),
        }
    }

    #[cfg(test)]
    pub(crate) async fn insert_strategy(&self, key: &str, strategy: Arc<dyn Strategy>) {
        self.strategies.write().await.insert(key.to_string(), strategy);
    }
}
