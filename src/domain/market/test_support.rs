//! Test doubles for the quote fetch boundary

use async_trait::async_trait;
use solana_sdk::pubkey::Pubkey;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::infrastructure::quote::{Quote, QuoteClient, SwapTransaction};
use crate::shared::errors::QuoteError;

/// Counting fake: serves a scripted sequence of output amounts and
/// records how many upstream fetches were made.
pub(crate) struct CountingQuoteClient {
    calls: AtomicUsize,
    out_amounts: Vec<u64>,
    fail: bool,
}

impl CountingQuoteClient {
    pub fn returning(out_amounts: Vec<u64>) -> Self {
        assert!(!out_amounts.is_empty());
        Self {
            calls: AtomicUsize::new(0),
            out_amounts,
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            out_amounts: Vec::new(),
            fail: true,
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QuoteClient for CountingQuoteClient {
    async fn get_quote(
        &self,
        input_mint: &Pubkey,
        output_mint: &Pubkey,
        amount: u64,
        _slippage_bps: u32,
    ) -> Result<Quote, QuoteError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(QuoteError::Status {
                status: 429,
                body: "rate limited".to_string(),
            });
        }
        let out_amount = self.out_amounts[call.min(self.out_amounts.len() - 1)];
        Ok(Quote {
            input_mint: *input_mint,
            output_mint: *output_mint,
            in_amount: amount,
            out_amount,
            other_amount_threshold: out_amount,
            price_impact_pct: 0.0,
            route_hops: 1,
            raw: serde_json::Value::Null,
        })
    }

    async fn build_swap_transaction(
        &self,
        _quote: &Quote,
        _signer: &Pubkey,
    ) -> Result<SwapTransaction, QuoteError> {
        Ok(SwapTransaction {
            transaction_base64: String::new(),
            last_valid_block_height: None,
        })
    }
}
