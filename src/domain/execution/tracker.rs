//! Execution history and aggregate statistics

use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

use super::ExecutionResult;

/// Aggregate view over one strategy's history
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionStats {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    /// Percent, 0 for an empty history
    pub success_rate: f64,
    /// Sum over successful executions only
    pub total_profit: f64,
    /// Mean over successful executions, 0 when there are none
    pub avg_profit: f64,
    /// Sum over all executions, failures included
    pub total_gas_cost: f64,
}

impl ExecutionStats {
    fn empty() -> Self {
        Self {
            total: 0,
            successful: 0,
            failed: 0,
            success_rate: 0.0,
            total_profit: 0.0,
            avg_profit: 0.0,
            total_gas_cost: 0.0,
        }
    }
}

/// Per-strategy append-only history with bounded retention
pub struct ExecutionTracker {
    history: RwLock<HashMap<String, Vec<ExecutionResult>>>,
    max_history: usize,
}

impl ExecutionTracker {
    pub fn new(max_history: usize) -> Self {
        Self {
            history: RwLock::new(HashMap::new()),
            max_history: max_history.max(1),
        }
    }

    /// Append a result, evicting the oldest entries past the retention
    /// cap.
    pub async fn record(&self, strategy_id: &str, result: ExecutionResult) {
        let mut history = self.history.write().await;
        let entries = history.entry(strategy_id.to_string()).or_default();
        entries.push(result);
        if entries.len() > self.max_history {
            let excess = entries.len() - self.max_history;
            entries.drain(..excess);
        }
        debug!(strategy_id, entries = entries.len(), "execution recorded");
    }

    /// Last `limit` results, oldest first
    pub async fn recent(&self, strategy_id: &str, limit: usize) -> Vec<ExecutionResult> {
        let history = self.history.read().await;
        match history.get(strategy_id) {
            Some(entries) => {
                let start = entries.len().saturating_sub(limit);
                entries[start..].to_vec()
            }
            None => Vec::new(),
        }
    }

    pub async fn stats(&self, strategy_id: &str) -> ExecutionStats {
        let history = self.history.read().await;
        let entries = match history.get(strategy_id) {
            Some(entries) if !entries.is_empty() => entries,
            _ => return ExecutionStats::empty(),
        };

        let successful: Vec<&ExecutionResult> =
            entries.iter().filter(|r| r.success).collect();
        let total_profit: f64 = successful.iter().map(|r| r.profit).sum();
        let avg_profit = if successful.is_empty() {
            0.0
        } else {
            total_profit / successful.len() as f64
        };

        ExecutionStats {
            total: entries.len(),
            successful: successful.len(),
            failed: entries.len() - successful.len(),
            success_rate: successful.len() as f64 / entries.len() as f64 * 100.0,
            total_profit,
            avg_profit,
            total_gas_cost: entries.iter().map(|r| r.gas_cost).sum(),
        }
    }
}
