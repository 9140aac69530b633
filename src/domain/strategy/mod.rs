//! Strategy domain - decision units and their factory

mod arbitrage;
mod factory;
mod rebalancing;
mod yield_farming;

pub use arbitrage::ArbitrageStrategy;
pub use factory::{StrategyCeilings, StrategyFactory, StrategyInputs};
pub use rebalancing::RebalancingStrategy;
pub use yield_farming::YieldFarmingStrategy;

use async_trait::async_trait;
use solana_sdk::pubkey::Pubkey;
use std::fmt;
use std::str::FromStr;
use tracing::{info, warn};

use crate::domain::market::MarketData;
use crate::shared::errors::{ExecutionError, QuoteError, StrategyError};

/// The closed set of strategy kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    Arbitrage,
    YieldFarming,
    Rebalancing,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Arbitrage => "arbitrage",
            StrategyKind::YieldFarming => "yieldfarming",
            StrategyKind::Rebalancing => "rebalancing",
        }
    }
}

impl FromStr for StrategyKind {
    type Err = StrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "arbitrage" => Ok(StrategyKind::Arbitrage),
            "yieldfarming" => Ok(StrategyKind::YieldFarming),
            "rebalancing" => Ok(StrategyKind::Rebalancing),
            other => Err(StrategyError::UnknownKind(other.to_string())),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable per-strategy configuration
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyParameters {
    pub input_token: Pubkey,
    pub output_token: Pubkey,
    /// Minimum profit in basis points (50 = 0.5%)
    pub min_profit_bps: u32,
    /// Maximum slippage tolerance in basis points
    pub max_slippage_bps: u32,
    /// Seconds between checks
    pub execution_interval_secs: u64,
    /// Maximum trade size in the input token's base currency
    pub max_position_size: f64,
}

impl StrategyParameters {
    pub fn validate(&self) -> Result<(), StrategyError> {
        if self.max_position_size <= 0.0 {
            return Err(StrategyError::InvalidParameters(format!(
                "max_position_size must be positive, got {}",
                self.max_position_size
            )));
        }
        if self.execution_interval_secs < 1 {
            return Err(StrategyError::InvalidParameters(
                "execution_interval_secs must be at least 1".to_string(),
            ));
        }
        // a zero floor would make every spread infinitely confident
        if self.min_profit_bps < 1 {
            return Err(StrategyError::InvalidParameters(
                "min_profit_bps must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        };
        f.write_str(s)
    }
}

/// Output of a strategy's analysis step, produced fresh every cycle
#[derive(Debug, Clone)]
pub struct ExecutionSignal {
    pub execute: bool,
    pub amount: f64,
    pub reason: String,
    /// 0-100
    pub confidence: f64,
    pub expected_profit: f64,
    pub risk: RiskLevel,
    pub metadata: Option<serde_json::Value>,
}

impl ExecutionSignal {
    /// A no-execution signal; amount and expected profit carry no
    /// actionable meaning and are zeroed by convention.
    pub fn hold(reason: impl Into<String>, risk: RiskLevel) -> Self {
        Self {
            execute: false,
            amount: 0.0,
            reason: reason.into(),
            confidence: 0.0,
            expected_profit: 0.0,
            risk,
            metadata: None,
        }
    }
}

/// Minimum confidence a signal needs to clear execution validation
const MIN_EXECUTABLE_CONFIDENCE: f64 = 50.0;

/// Polymorphic decision unit bound to one on-chain strategy account
#[async_trait]
pub trait Strategy: Send + Sync {
    fn id(&self) -> Pubkey;

    fn kind(&self) -> StrategyKind;

    fn parameters(&self) -> &StrategyParameters;

    /// Idempotent; must not fail for valid parameter sets. The on-chain
    /// parameter refresh belongs to the external program collaborator.
    async fn initialize(&mut self) -> Result<(), StrategyError> {
        self.parameters().validate()?;
        info!("strategy initialized: {}", self.id());
        Ok(())
    }

    /// Market inputs this strategy needs; empty by default
    async fn monitor(&self) -> Result<Vec<MarketData>, QuoteError> {
        Ok(Vec::new())
    }

    /// Pure decision function. Never errors for "no opportunity":
    /// internal failures degrade to an `execute: false` high-risk
    /// signal.
    async fn analyze(&self, market_data: &[MarketData]) -> ExecutionSignal;

    /// Perform the trade. Always returns a result; failures yield
    /// `success: false` with an error message rather than propagating.
    async fn execute(&self, signal: &ExecutionSignal) -> crate::domain::execution::ExecutionResult;

    /// Precondition for `execute`: position size and confidence floors
    fn validate_signal(&self, signal: &ExecutionSignal) -> Result<(), ExecutionError> {
        if !signal.execute {
            return Err(ExecutionError::SignalRejected(
                "signal does not request execution".to_string(),
            ));
        }
        if signal.amount > self.parameters().max_position_size {
            warn!(
                "amount {} exceeds max position size {}",
                signal.amount,
                self.parameters().max_position_size
            );
            return Err(ExecutionError::SignalRejected(format!(
                "amount {} exceeds max position size {}",
                signal.amount,
                self.parameters().max_position_size
            )));
        }
        if signal.confidence < MIN_EXECUTABLE_CONFIDENCE {
            warn!("confidence {}% too low", signal.confidence);
            return Err(ExecutionError::SignalRejected(format!(
                "confidence {}% below minimum {}%",
                signal.confidence, MIN_EXECUTABLE_CONFIDENCE
            )));
        }
        Ok(())
    }
}
