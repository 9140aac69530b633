//! Fleet management over multiple agents

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use super::agent::{Agent, AgentConfig, AgentPerformance};
use super::rules::AgentRulesEngine;
use crate::domain::execution::ExecutionTracker;
use crate::domain::market::{MarketConditionsAnalyzer, PriceMonitor};
use crate::domain::strategy::StrategyFactory;
use crate::shared::config::RulesCfg;
use crate::shared::errors::AgentError;

#[derive(Debug, Clone, PartialEq)]
pub struct AgentPerformanceEntry {
    pub agent_id: String,
    pub performance: AgentPerformance,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceSummary {
    pub total_agents: usize,
    pub running_agents: usize,
    pub agents: Vec<AgentPerformanceEntry>,
}

/// Creates and supervises agents. Each agent gets its own rules engine
/// and tracker; the factory and price monitor are shared.
pub struct AgentManager {
    agents: RwLock<HashMap<String, Agent>>,
    factory: Arc<StrategyFactory>,
    price_monitor: Arc<PriceMonitor>,
    rules: RulesCfg,
    max_history_per_strategy: usize,
    volatility_gate: bool,
}

impl AgentManager {
    pub fn new(
        factory: Arc<StrategyFactory>,
        price_monitor: Arc<PriceMonitor>,
        rules: RulesCfg,
        max_history_per_strategy: usize,
        volatility_gate: bool,
    ) -> Self {
        Self {
            agents: RwLock::new(HashMap::new()),
            factory,
            price_monitor,
            rules,
            max_history_per_strategy,
            volatility_gate,
        }
    }

    /// Build and register an agent. An existing agent under the same id
    /// is replaced.
    pub async fn create_agent(&self, agent_id: &str, config: AgentConfig) -> Agent {
        let agent = Agent::new(
            agent_id,
            Arc::new(AgentRulesEngine::new(&self.rules)),
            Arc::new(ExecutionTracker::new(self.max_history_per_strategy)),
            Arc::new(MarketConditionsAnalyzer::new(
                self.price_monitor.clone(),
                self.volatility_gate,
            )),
            self.factory.clone(),
            config,
        );

        self.agents
            .write()
            .await
            .insert(agent_id.to_string(), agent.clone());
        info!(agent_id, "created agent");
        agent
    }

    pub async fn get_agent(&self, agent_id: &str) -> Option<Agent> {
        self.agents.read().await.get(agent_id).cloned()
    }

    pub async fn start_agent(&self, agent_id: &str) -> Result<(), AgentError> {
        match self.get_agent(agent_id).await {
            Some(agent) => {
                agent.start().await;
                Ok(())
            }
            None => Err(AgentError::AgentNotFound(agent_id.to_string())),
        }
    }

    pub async fn stop_agent(&self, agent_id: &str) -> Result<(), AgentError> {
        match self.get_agent(agent_id).await {
            Some(agent) => {
                agent.stop().await;
                Ok(())
            }
            None => Err(AgentError::AgentNotFound(agent_id.to_string())),
        }
    }

    pub async fn start_all(&self) {
        info!("starting all agents");
        let agents: Vec<Agent> = self.agents.read().await.values().cloned().collect();
        for agent in agents {
            agent.start().await;
        }
    }

    pub async fn stop_all(&self) {
        info!("stopping all agents");
        let agents: Vec<Agent> = self.agents.read().await.values().cloned().collect();
        for agent in agents {
            agent.stop().await;
        }
    }

    pub async fn performance_summary(&self) -> PerformanceSummary {
        let agents: Vec<(String, Agent)> = self
            .agents
            .read()
            .await
            .iter()
            .map(|(id, agent)| (id.clone(), agent.clone()))
            .collect();

        let mut entries = Vec::with_capacity(agents.len());
        for (agent_id, agent) in agents {
            entries.push(AgentPerformanceEntry {
                agent_id,
                performance: agent.performance().await,
            });
        }
        entries.sort_by(|a, b| a.agent_id.cmp(&b.agent_id));

        PerformanceSummary {
            total_agents: entries.len(),
            running_agents: entries.iter().filter(|e| e.performance.is_running).count(),
            agents: entries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::execution::MockSubmitter;
    use crate::domain::market::test_support::CountingQuoteClient;
    use crate::domain::market::MockApySource;
    use crate::domain::strategy::StrategyCeilings;
    use crate::infrastructure::chain::BalanceSource;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use solana_sdk::pubkey::Pubkey;

    struct NoBalances;

    #[async_trait]
    impl BalanceSource for NoBalances {
        async fn token_balance(&self, _owner: &Pubkey, _mint: &Pubkey) -> anyhow::Result<u64> {
            Err(anyhow!("no accounts"))
        }
    }

    fn manager() -> AgentManager {
        let client = Arc::new(CountingQuoteClient::returning(vec![60_000]));
        let price_monitor = Arc::new(PriceMonitor::new(client, 50));
        let factory = Arc::new(StrategyFactory::new(
            price_monitor.clone(),
            Arc::new(MockSubmitter::new()),
            Arc::new(NoBalances),
            Arc::new(MockApySource),
            Pubkey::new_unique(),
            StrategyCeilings::default(),
        ));
        AgentManager::new(factory, price_monitor, RulesCfg::default(), 1_000, false)
    }

    #[tokio::test]
    async fn test_create_and_lookup() {
        let manager = manager();
        manager.create_agent("agent-1", AgentConfig::default()).await;

        assert!(manager.get_agent("agent-1").await.is_some());
        assert!(manager.get_agent("agent-2").await.is_none());
    }

    #[tokio::test]
    async fn test_start_unknown_agent_errors() {
        let manager = manager();
        assert!(manager.start_agent("ghost").await.is_err());
    }

    #[tokio::test]
    async fn test_summary_counts_running_agents() {
        let manager = manager();
        manager.create_agent("agent-1", AgentConfig::default()).await;
        manager.create_agent("agent-2", AgentConfig::default()).await;

        manager.start_agent("agent-1").await.unwrap();
        let summary = manager.performance_summary().await;
        assert_eq!(summary.total_agents, 2);
        assert_eq!(summary.running_agents, 1);

        manager.stop_all().await;
        let summary = manager.performance_summary().await;
        assert_eq!(summary.running_agents, 0);
    }
}
