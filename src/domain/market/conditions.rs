//! Overall market conditions analysis

use solana_sdk::pubkey::Pubkey;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::PriceMonitor;
use crate::shared::errors::QuoteError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Up,
    Down,
    Sideways,
}

/// Volatility heuristic over a short sampling window. Not a statistical
/// test: volatility is the population standard deviation of the raw
/// samples and confidence counts pairwise moves agreeing with the
/// overall trend.
#[derive(Debug, Clone)]
pub struct VolatilityReport {
    pub volatility: f64,
    pub trend: Trend,
    pub confidence: f64,
}

#[derive(Debug, Clone)]
pub struct TradeWindow {
    pub should_trade: bool,
    pub reason: String,
}

/// Gating thresholds used when the volatility gate is enabled
const MAX_VOLATILITY: f64 = 0.05;
const MIN_TREND_CONFIDENCE: f64 = 60.0;

/// Trend classification threshold: ±1% total change
const TREND_THRESHOLD: f64 = 0.01;

pub struct MarketConditionsAnalyzer {
    price_monitor: Arc<PriceMonitor>,
    /// Explicit toggle; disabled, the gate approves every trade
    gate_enabled: bool,
    sample_spacing: Duration,
}

impl MarketConditionsAnalyzer {
    pub fn new(price_monitor: Arc<PriceMonitor>, gate_enabled: bool) -> Self {
        Self {
            price_monitor,
            gate_enabled,
            sample_spacing: Duration::from_secs(1),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_spacing(mut self, spacing: Duration) -> Self {
        self.sample_spacing = spacing;
        self
    }

    /// Sample the pair price `samples` times with fixed spacing and
    /// derive volatility, trend and trend confidence.
    pub async fn analyze_volatility(
        &self,
        input_mint: &Pubkey,
        output_mint: &Pubkey,
        samples: usize,
    ) -> Result<VolatilityReport, QuoteError> {
        let samples = samples.max(2);
        let mut prices = Vec::with_capacity(samples);

        for i in 0..samples {
            let market_data = self
                .price_monitor
                .get_price(input_mint, output_mint, self.price_monitor.probe_amount())
                .await?;
            prices.push(market_data.price);
            if i < samples - 1 {
                tokio::time::sleep(self.sample_spacing).await;
            }
        }

        let mean = prices.iter().sum::<f64>() / prices.len() as f64;
        let variance =
            prices.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / prices.len() as f64;
        let volatility = variance.sqrt();

        let first = prices[0];
        let last = prices[prices.len() - 1];
        let change = (last - first) / first;

        let trend = if change > TREND_THRESHOLD {
            Trend::Up
        } else if change < -TREND_THRESHOLD {
            Trend::Down
        } else {
            Trend::Sideways
        };

        let consistent_moves = prices
            .windows(2)
            .filter(|pair| {
                let local = if pair[1] > pair[0] { Trend::Up } else { Trend::Down };
                local == trend
            })
            .count();
        let confidence = consistent_moves as f64 / (samples - 1) as f64 * 100.0;

        debug!(volatility, ?trend, confidence, "volatility analysis");

        Ok(VolatilityReport {
            volatility,
            trend,
            confidence,
        })
    }

    /// Trade-window gate. With the gate disabled (the default) every
    /// trade is approved after sampling.
    pub async fn is_good_time_to_trade(
        &self,
        input_mint: &Pubkey,
        output_mint: &Pubkey,
    ) -> Result<TradeWindow, QuoteError> {
        let conditions = self.analyze_volatility(input_mint, output_mint, 5).await?;

        if self.gate_enabled {
            if conditions.volatility > MAX_VOLATILITY {
                return Ok(TradeWindow {
                    should_trade: false,
                    reason: "Market too volatile".to_string(),
                });
            }
            if conditions.confidence < MIN_TREND_CONFIDENCE {
                return Ok(TradeWindow {
                    should_trade: false,
                    reason: "Trend confidence too low".to_string(),
                });
            }
        }

        Ok(TradeWindow {
            should_trade: true,
            reason: "Market conditions favorable".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::market::test_support::CountingQuoteClient;
    use assert_approx_eq::assert_approx_eq;

    fn analyzer(out_amounts: Vec<u64>, gate_enabled: bool) -> MarketConditionsAnalyzer {
        let client = Arc::new(CountingQuoteClient::returning(out_amounts));
        // zero TTL so every sample is a fresh fetch
        let monitor =
            Arc::new(PriceMonitor::new(client, 50).with_ttl(Duration::from_millis(0)));
        MarketConditionsAnalyzer::new(monitor, gate_enabled).with_spacing(Duration::from_millis(0))
    }

    #[tokio::test]
    async fn test_rising_prices_classify_as_uptrend() {
        // probe 1_000_000: prices 1.0, 1.1, 1.2, 1.3, 1.4
        let analyzer = analyzer(
            vec![1_000_000, 1_100_000, 1_200_000, 1_300_000, 1_400_000],
            false,
        );

        let report = analyzer
            .analyze_volatility(&Pubkey::new_unique(), &Pubkey::new_unique(), 5)
            .await
            .unwrap();

        assert_eq!(report.trend, Trend::Up);
        // every pairwise move agrees with the trend
        assert_approx_eq!(report.confidence, 100.0);
    }

    #[tokio::test]
    async fn test_flat_prices_classify_as_sideways() {
        let analyzer = analyzer(vec![1_000_000], false);
        let report = analyzer
            .analyze_volatility(&Pubkey::new_unique(), &Pubkey::new_unique(), 5)
            .await
            .unwrap();

        assert_eq!(report.trend, Trend::Sideways);
        assert_approx_eq!(report.volatility, 0.0);
    }

    #[tokio::test]
    async fn test_disabled_gate_always_approves() {
        // wild swings, but the gate is off
        let analyzer = analyzer(vec![1_000_000, 5_000_000, 500_000, 4_000_000, 100_000], false);
        let window = analyzer
            .is_good_time_to_trade(&Pubkey::new_unique(), &Pubkey::new_unique())
            .await
            .unwrap();
        assert!(window.should_trade);
    }

    #[tokio::test]
    async fn test_enabled_gate_denies_high_volatility() {
        let analyzer = analyzer(vec![1_000_000, 5_000_000, 500_000, 4_000_000, 100_000], true);
        let window = analyzer
            .is_good_time_to_trade(&Pubkey::new_unique(), &Pubkey::new_unique())
            .await
            .unwrap();
        assert!(!window.should_trade);
        assert_eq!(window.reason, "Market too volatile");
    }
}
