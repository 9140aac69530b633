//! Aggregated price monitoring with a short-TTL cache

use chrono::Utc;
use futures::future::try_join_all;
use solana_sdk::pubkey::Pubkey;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, error};

use super::MarketData;
use crate::infrastructure::quote::QuoteClient;
use crate::shared::errors::QuoteError;
use crate::shared::types::pair_key;

const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(5);

/// Default probe size: 1 USDC in base units
const DEFAULT_PROBE_AMOUNT: u64 = 1_000_000;

struct CacheEntry {
    data: MarketData,
    inserted: Instant,
}

/// Best-effort price snapshots for token pairs, shielding callers from
/// the latency and rate limits of the upstream quote service.
///
/// Cache entries are keyed by the ordered pair. Concurrent lookups for
/// the same pair before the first completes each issue their own
/// upstream request; acceptable for a 5-second TTL.
pub struct PriceMonitor {
    quote_client: Arc<dyn QuoteClient>,
    cache: RwLock<HashMap<String, CacheEntry>>,
    cache_ttl: Duration,
    probe_amount: u64,
    slippage_bps: u32,
}

impl PriceMonitor {
    pub fn new(quote_client: Arc<dyn QuoteClient>, slippage_bps: u32) -> Self {
        Self {
            quote_client,
            cache: RwLock::new(HashMap::new()),
            cache_ttl: DEFAULT_CACHE_TTL,
            probe_amount: DEFAULT_PROBE_AMOUNT,
            slippage_bps,
        }
    }

    #[cfg(test)]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Price for one pair. A cache entry younger than the TTL is
    /// returned unchanged without an upstream request; a deliberate
    /// staleness/availability trade-off, not a correctness guarantee.
    ///
    /// `amount` is in the smallest indivisible unit of the input token;
    /// callers are responsible for decimal conversion.
    pub async fn get_price(
        &self,
        input_mint: &Pubkey,
        output_mint: &Pubkey,
        amount: u64,
    ) -> Result<MarketData, QuoteError> {
        let cache_key = pair_key(input_mint, output_mint);

        {
            let cache = self.cache.read().await;
            if let Some(entry) = cache.get(&cache_key) {
                if entry.inserted.elapsed() < self.cache_ttl {
                    return Ok(entry.data.clone());
                }
            }
        }

        let quote = match self
            .quote_client
            .get_quote(input_mint, output_mint, amount, self.slippage_bps)
            .await
        {
            Ok(quote) => quote,
            Err(e) => {
                error!("error fetching quote: {}", e);
                return Err(e);
            }
        };

        let price = quote.out_amount as f64 / amount as f64;
        debug!(%input_mint, %output_mint, price, "fetched fresh price");

        let data = MarketData {
            input_token: *input_mint,
            output_token: *output_mint,
            price,
            volume_24h: 0.0,
            liquidity_usd: 0.0,
            price_change_24h: quote.price_impact_pct,
            timestamp: Utc::now(),
        };

        let mut cache = self.cache.write().await;
        cache.insert(
            cache_key,
            CacheEntry {
                data: data.clone(),
                inserted: Instant::now(),
            },
        );

        Ok(data)
    }

    /// Prices for many pairs, fetched concurrently. The result preserves
    /// input order; any single failure fails the whole batch.
    pub async fn get_multiple_prices(
        &self,
        pairs: &[(Pubkey, Pubkey)],
    ) -> Result<Vec<MarketData>, QuoteError> {
        try_join_all(
            pairs
                .iter()
                .map(|(input, output)| self.get_price(input, output, self.probe_amount)),
        )
        .await
    }

    pub async fn clear_cache(&self) {
        self.cache.write().await.clear();
    }

    pub fn probe_amount(&self) -> u64 {
        self.probe_amount
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::market::test_support::CountingQuoteClient;

    #[tokio::test]
    async fn test_price_is_output_over_input() {
        let client = Arc::new(CountingQuoteClient::returning(vec![150]));
        let monitor = PriceMonitor::new(client, 50);
        let (a, b) = (Pubkey::new_unique(), Pubkey::new_unique());

        let data = monitor.get_price(&a, &b, 100).await.unwrap();
        assert_eq!(data.price, 1.5);
    }

    #[tokio::test]
    async fn test_second_call_within_ttl_hits_cache() {
        let client = Arc::new(CountingQuoteClient::returning(vec![150, 999]));
        let monitor = PriceMonitor::new(Arc::clone(&client) as Arc<dyn QuoteClient>, 50);
        let (a, b) = (Pubkey::new_unique(), Pubkey::new_unique());

        let first = monitor.get_price(&a, &b, 100).await.unwrap();
        let second = monitor.get_price(&a, &b, 100).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(client.call_count(), 1);
    }

    #[tokio::test]
    async fn test_expired_entry_refetches() {
        let client = Arc::new(CountingQuoteClient::returning(vec![150, 200]));
        let monitor = PriceMonitor::new(Arc::clone(&client) as Arc<dyn QuoteClient>, 50)
            .with_ttl(Duration::from_millis(0));
        let (a, b) = (Pubkey::new_unique(), Pubkey::new_unique());

        monitor.get_price(&a, &b, 100).await.unwrap();
        let second = monitor.get_price(&a, &b, 100).await.unwrap();

        assert_eq!(second.price, 2.0);
        assert_eq!(client.call_count(), 2);
    }

    #[tokio::test]
    async fn test_multiple_prices_preserve_input_order() {
        let client = Arc::new(CountingQuoteClient::returning(vec![100]));
        let monitor = PriceMonitor::new(client, 50);
        let pairs = vec![
            (Pubkey::new_unique(), Pubkey::new_unique()),
            (Pubkey::new_unique(), Pubkey::new_unique()),
        ];

        let prices = monitor.get_multiple_prices(&pairs).await.unwrap();
        assert_eq!(prices.len(), 2);
        assert_eq!(prices[0].input_token, pairs[0].0);
        assert_eq!(prices[1].input_token, pairs[1].0);
    }

    #[tokio::test]
    async fn test_clear_cache_forces_refetch() {
        let client = Arc::new(CountingQuoteClient::returning(vec![150, 200]));
        let monitor = PriceMonitor::new(Arc::clone(&client) as Arc<dyn QuoteClient>, 50);
        let (a, b) = (Pubkey::new_unique(), Pubkey::new_unique());

        monitor.get_price(&a, &b, 100).await.unwrap();
        monitor.clear_cache().await;
        let second = monitor.get_price(&a, &b, 100).await.unwrap();

        assert_eq!(second.price, 2.0);
        assert_eq!(client.call_count(), 2);
    }

    #[tokio::test]
    async fn test_upstream_failure_propagates() {
        let client = Arc::new(CountingQuoteClient::failing());
        let monitor = PriceMonitor::new(client, 50);
        let (a, b) = (Pubkey::new_unique(), Pubkey::new_unique());

        let result = monitor.get_price(&a, &b, 100).await;
        assert!(matches!(result, Err(QuoteError::Status { status: 429, .. })));
    }
}
