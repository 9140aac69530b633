//! Execution domain - trade submission and history

mod submitter;
mod tracker;

pub use submitter::{ExecutionSubmitter, MockSubmitter, SubmitReceipt, TradeOrder};
pub use tracker::{ExecutionStats, ExecutionTracker};

use chrono::{DateTime, Utc};

/// Immutable record of one execution attempt
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionResult {
    pub success: bool,
    /// Transaction signature, present on success
    pub signature: Option<String>,
    pub input_amount: f64,
    pub output_amount: f64,
    /// Negative values are realized losses
    pub profit: f64,
    pub gas_cost: f64,
    pub execution_time_ms: u64,
    pub timestamp: DateTime<Utc>,
    pub error: Option<String>,
}
