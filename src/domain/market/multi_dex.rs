//! Cross-venue price comparison

use chrono::Utc;
use solana_sdk::pubkey::Pubkey;
use std::sync::Arc;
use tracing::debug;

use super::{MarketData, PriceMonitor};
use crate::shared::errors::QuoteError;
use crate::shared::utils::profit_bps;

/// Best/worst quotes for a pair and the spread between them
#[derive(Debug, Clone)]
pub struct PriceSpread {
    pub best: MarketData,
    pub worst: MarketData,
    pub spread: f64,
    pub spread_bps: f64,
}

/// Compares the aggregated quote against a conservative reference.
///
/// Approximation layer: the aggregator already spans the major venues,
/// so its price stands in for "best" while a fixed reference price
/// stands in for "worst". Real multi-venue pricing would replace the
/// reference with genuine per-venue quotes.
pub struct MultiDexPriceMonitor {
    price_monitor: Arc<PriceMonitor>,
    reference_worst_price: f64,
}

impl MultiDexPriceMonitor {
    pub fn new(price_monitor: Arc<PriceMonitor>, reference_worst_price: f64) -> Self {
        Self {
            price_monitor,
            reference_worst_price,
        }
    }

    pub async fn get_price_across_dexes(
        &self,
        input_mint: &Pubkey,
        output_mint: &Pubkey,
    ) -> Result<PriceSpread, QuoteError> {
        let best = self
            .price_monitor
            .get_price(input_mint, output_mint, self.price_monitor.probe_amount())
            .await?;

        let worst = MarketData {
            input_token: *input_mint,
            output_token: *output_mint,
            price: self.reference_worst_price,
            volume_24h: 0.0,
            liquidity_usd: 0.0,
            price_change_24h: best.price_change_24h,
            timestamp: Utc::now(),
        };

        let spread = best.price - worst.price;
        let spread_bps = profit_bps(worst.price, best.price);
        debug!(
            best = best.price,
            worst = worst.price,
            spread_bps,
            "cross-venue spread"
        );

        Ok(PriceSpread {
            best,
            worst,
            spread,
            spread_bps,
        })
    }
}
