//! Market domain - price, portfolio, yield and conditions monitoring

mod apy;
mod conditions;
mod multi_dex;
mod portfolio;
mod price_monitor;

#[cfg(test)]
pub(crate) mod test_support;

pub use apy::{ApyMonitor, ApySource, MockApySource, YieldOpportunity};
pub use conditions::{MarketConditionsAnalyzer, TradeWindow, Trend, VolatilityReport};
pub use multi_dex::{MultiDexPriceMonitor, PriceSpread};
pub use portfolio::PortfolioMonitor;
pub use price_monitor::PriceMonitor;

use chrono::{DateTime, Utc};
use solana_sdk::pubkey::Pubkey;

/// Point-in-time market snapshot for a token pair
///
/// Immutable once produced; superseded by fresher snapshots, never
/// mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketData {
    pub input_token: Pubkey,
    pub output_token: Pubkey,
    /// Output per unit input
    pub price: f64,
    pub volume_24h: f64,
    pub liquidity_usd: f64,
    pub price_change_24h: f64,
    pub timestamp: DateTime<Utc>,
}
