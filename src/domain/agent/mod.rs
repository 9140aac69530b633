//! Agent domain - rule-gated autonomous execution

#[allow(clippy::module_inception)]
mod agent;
mod manager;
mod rules;

pub use agent::{Agent, AgentConfig, AgentPerformance, RestartPolicy};
pub use manager::{AgentManager, AgentPerformanceEntry, PerformanceSummary};
pub use rules::{AgentRule, AgentRulesEngine, RuleContext, RuleOutcome};
