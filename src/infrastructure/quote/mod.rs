//! Quote aggregation API clients

mod jupiter;

pub use jupiter::JupiterQuoteClient;

use async_trait::async_trait;
use solana_sdk::pubkey::Pubkey;

use crate::shared::errors::QuoteError;

/// A swap quote from the aggregator. Route internals stay opaque beyond
/// the hop count, which is only used for display.
#[derive(Debug, Clone)]
pub struct Quote {
    pub input_mint: Pubkey,
    pub output_mint: Pubkey,
    pub in_amount: u64,
    pub out_amount: u64,
    /// Minimum guaranteed output under the requested slippage
    pub other_amount_threshold: u64,
    pub price_impact_pct: f64,
    pub route_hops: usize,
    /// Raw aggregator response, passed back verbatim when building the
    /// swap transaction
    pub raw: serde_json::Value,
}

/// A signable transaction payload built from a quote
#[derive(Debug, Clone)]
pub struct SwapTransaction {
    pub transaction_base64: String,
    pub last_valid_block_height: Option<u64>,
}

/// Client for the external quote aggregation API
///
/// Both endpoints are black boxes that may fail, rate-limit, or return
/// stale prices. Amounts are always in the smallest indivisible unit of
/// the input token.
#[async_trait]
pub trait QuoteClient: Send + Sync {
    async fn get_quote(
        &self,
        input_mint: &Pubkey,
        output_mint: &Pubkey,
        amount: u64,
        slippage_bps: u32,
    ) -> Result<Quote, QuoteError>;

    /// Exchange a quote plus a signer identity for a signable payload
    async fn build_swap_transaction(
        &self,
        quote: &Quote,
        signer: &Pubkey,
    ) -> Result<SwapTransaction, QuoteError>;
}
