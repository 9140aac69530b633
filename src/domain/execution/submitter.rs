//! Transaction submission seam

use async_trait::async_trait;
use solana_sdk::pubkey::Pubkey;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::info;

use crate::shared::errors::ExecutionError;
use crate::shared::utils::generate_id;

/// What a strategy wants executed on chain
#[derive(Debug, Clone)]
pub struct TradeOrder {
    pub input_token: Pubkey,
    pub output_token: Pubkey,
    pub amount: f64,
    pub max_slippage_bps: u32,
}

/// Outcome of a submitted order
#[derive(Debug, Clone)]
pub struct SubmitReceipt {
    pub signature: String,
    pub output_amount: f64,
    pub gas_cost: f64,
}

/// Seam between strategy decisions and the chain. Strategies never
/// build transactions themselves; they hand an order to the submitter.
#[async_trait]
pub trait ExecutionSubmitter: Send + Sync {
    async fn submit(&self, order: &TradeOrder) -> Result<SubmitReceipt, ExecutionError>;
}

/// Submitter that fabricates fills without touching the chain. Useful
/// in tests and dry runs; the default output amount mirrors a small
/// profitable fill.
pub struct MockSubmitter {
    fixed_output: f64,
    gas_cost: f64,
    fail: bool,
    calls: AtomicUsize,
}

impl MockSubmitter {
    pub fn new() -> Self {
        Self {
            fixed_output: 5.0,
            gas_cost: 0.0005,
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_output(mut self, output: f64) -> Self {
        self.fixed_output = output;
        self
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockSubmitter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ExecutionSubmitter for MockSubmitter {
    async fn submit(&self, order: &TradeOrder) -> Result<SubmitReceipt, ExecutionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ExecutionError::SubmissionFailed(
                "mock submitter configured to fail".to_string(),
            ));
        }

        let signature = format!("mock-{}", generate_id());
        info!(
            amount = order.amount,
            %signature,
            "mock submission accepted"
        );
        Ok(SubmitReceipt {
            signature,
            output_amount: self.fixed_output,
            gas_cost: self.gas_cost,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order() -> TradeOrder {
        TradeOrder {
            input_token: Pubkey::new_unique(),
            output_token: Pubkey::new_unique(),
            amount: 1.0,
            max_slippage_bps: 100,
        }
    }

    #[tokio::test]
    async fn test_mock_receipt_and_call_count() {
        let submitter = MockSubmitter::new();
        let receipt = submitter.submit(&order()).await.unwrap();
        assert!(receipt.signature.starts_with("mock-"));
        assert_eq!(receipt.output_amount, 5.0);
        assert_eq!(submitter.call_count(), 1);
    }

    #[tokio::test]
    async fn test_failing_mock_errors() {
        let submitter = MockSubmitter::failing();
        assert!(submitter.submit(&order()).await.is_err());
        assert_eq!(submitter.call_count(), 1);
    }
}
