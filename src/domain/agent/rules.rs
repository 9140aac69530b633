//! Risk rules gating execution signals

use async_trait::async_trait;
use chrono::{Duration, Local, Utc};
use tracing::warn;

use crate::domain::execution::ExecutionResult;
use crate::domain::strategy::{ExecutionSignal, RiskLevel};
use crate::shared::config::RulesCfg;

/// What a rule gets to look at when judging a signal
pub struct RuleContext<'a> {
    pub agent_id: &'a str,
    pub strategy_id: &'a str,
    pub signal: &'a ExecutionSignal,
    pub recent_executions: &'a [ExecutionResult],
}

#[async_trait]
pub trait AgentRule: Send + Sync {
    fn name(&self) -> &'static str;

    async fn check(&self, ctx: &RuleContext<'_>) -> bool;
}

/// Verdict from running every rule. No early exit: each failed rule is
/// named so the log shows the full picture.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleOutcome {
    pub passed: bool,
    pub failed_rules: Vec<String>,
}

struct CooldownPeriod {
    cooldown_secs: i64,
}

#[async_trait]
impl AgentRule for CooldownPeriod {
    fn name(&self) -> &'static str {
        "cooldown_period"
    }

    async fn check(&self, ctx: &RuleContext<'_>) -> bool {
        let last = match ctx.recent_executions.last() {
            Some(last) => last,
            None => return true,
        };

        let elapsed = Utc::now().signed_duration_since(last.timestamp);
        let cooldown = Duration::seconds(self.cooldown_secs);
        if elapsed < cooldown {
            warn!(
                remaining_secs = (cooldown - elapsed).num_seconds(),
                "cooldown period not expired"
            );
            return false;
        }
        true
    }
}

struct DailyLossLimit {
    max_daily_loss_usd: f64,
}

#[async_trait]
impl AgentRule for DailyLossLimit {
    fn name(&self) -> &'static str {
        "daily_loss_limit"
    }

    async fn check(&self, ctx: &RuleContext<'_>) -> bool {
        let today = Local::now().date_naive();
        let today_loss: f64 = ctx
            .recent_executions
            .iter()
            .filter(|e| e.timestamp.with_timezone(&Local).date_naive() == today)
            .filter(|e| !e.success || e.profit < 0.0)
            .map(|e| e.profit.abs())
            .sum();

        if today_loss >= self.max_daily_loss_usd {
            warn!(
                loss = today_loss,
                limit = self.max_daily_loss_usd,
                "daily loss limit reached"
            );
            return false;
        }
        true
    }
}

struct ConfidenceThreshold {
    min_confidence: f64,
}

#[async_trait]
impl AgentRule for ConfidenceThreshold {
    fn name(&self) -> &'static str {
        "confidence_threshold"
    }

    async fn check(&self, ctx: &RuleContext<'_>) -> bool {
        if ctx.signal.confidence < self.min_confidence {
            warn!(
                confidence = ctx.signal.confidence,
                required = self.min_confidence,
                "confidence too low"
            );
            return false;
        }
        true
    }
}

struct RiskAssessment {
    allow_high_risk_trades: bool,
    medium_risk_window: usize,
    medium_risk_max_failures: usize,
}

#[async_trait]
impl AgentRule for RiskAssessment {
    fn name(&self) -> &'static str {
        "risk_assessment"
    }

    async fn check(&self, ctx: &RuleContext<'_>) -> bool {
        if ctx.signal.risk == RiskLevel::High {
            if !self.allow_high_risk_trades {
                warn!("trade risk too high");
                return false;
            }
            return true;
        }

        if ctx.signal.risk == RiskLevel::Medium {
            let window_start = ctx
                .recent_executions
                .len()
                .saturating_sub(self.medium_risk_window);
            let recent_failures = ctx.recent_executions[window_start..]
                .iter()
                .filter(|e| !e.success)
                .count();
            if recent_failures >= self.medium_risk_max_failures {
                warn!(recent_failures, "too many recent failures for medium-risk trade");
                return false;
            }
        }

        true
    }
}

struct SuccessRateCheck {
    min_history: usize,
    window: usize,
    min_success_rate: f64,
}

#[async_trait]
impl AgentRule for SuccessRateCheck {
    fn name(&self) -> &'static str {
        "success_rate_check"
    }

    async fn check(&self, ctx: &RuleContext<'_>) -> bool {
        if ctx.recent_executions.len() < self.min_history {
            return true;
        }

        let window_start = ctx.recent_executions.len().saturating_sub(self.window);
        let window = &ctx.recent_executions[window_start..];
        let success_rate =
            window.iter().filter(|e| e.success).count() as f64 / window.len() as f64;

        if success_rate < self.min_success_rate {
            warn!(rate = success_rate * 100.0, "success rate too low");
            return false;
        }
        true
    }
}

/// Ordered rule set applied to every execution signal
pub struct AgentRulesEngine {
    rules: Vec<Box<dyn AgentRule>>,
}

impl AgentRulesEngine {
    pub fn new(config: &RulesCfg) -> Self {
        let mut engine = Self::empty();
        engine.add_rule(Box::new(CooldownPeriod {
            cooldown_secs: config.cooldown_secs,
        }));
        engine.add_rule(Box::new(DailyLossLimit {
            max_daily_loss_usd: config.max_daily_loss_usd,
        }));
        engine.add_rule(Box::new(ConfidenceThreshold {
            min_confidence: config.min_confidence,
        }));
        engine.add_rule(Box::new(RiskAssessment {
            allow_high_risk_trades: config.allow_high_risk_trades,
            medium_risk_window: config.medium_risk_window,
            medium_risk_max_failures: config.medium_risk_max_failures,
        }));
        engine.add_rule(Box::new(SuccessRateCheck {
            min_history: config.min_history_for_rate_check,
            window: config.rate_check_window,
            min_success_rate: config.min_success_rate,
        }));
        engine
    }

    /// No built-in rules; custom rules only
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn add_rule(&mut self, rule: Box<dyn AgentRule>) {
        self.rules.push(rule);
    }

    /// Runs every rule even after a failure so the outcome names all
    /// violations.
    pub async fn evaluate_all(&self, ctx: &RuleContext<'_>) -> RuleOutcome {
        let mut failed_rules = Vec::new();
        for rule in &self.rules {
            if !rule.check(ctx).await {
                failed_rules.push(rule.name().to_string());
            }
        }

        RuleOutcome {
            passed: failed_rules.is_empty(),
            failed_rules,
        }
    }
}
