//! Yield monitoring across pools

use anyhow::Result;
use async_trait::async_trait;
use futures::future::join_all;
use rand::Rng;
use solana_sdk::pubkey::Pubkey;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::error;

const APY_CACHE_TTL: Duration = Duration::from_secs(60);

/// Source of pool APY figures
#[async_trait]
pub trait ApySource: Send + Sync {
    /// Current APY for the pool, in percent
    async fn pool_apy(&self, pool: &Pubkey) -> Result<f64>;
}

/// Stand-in APY source fabricating 5-25% yields. Production sources
/// would query the lending/LP protocol APIs instead.
pub struct MockApySource;

#[async_trait]
impl ApySource for MockApySource {
    async fn pool_apy(&self, _pool: &Pubkey) -> Result<f64> {
        let apy = rand::thread_rng().gen_range(5.0..25.0);
        Ok(apy)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct YieldOpportunity {
    pub pool: Pubkey,
    pub apy: f64,
}

/// Tracks yields across protocols with a one-minute cache
pub struct ApyMonitor {
    source: Arc<dyn ApySource>,
    cache: RwLock<HashMap<Pubkey, (f64, Instant)>>,
}

impl ApyMonitor {
    pub fn new(source: Arc<dyn ApySource>) -> Self {
        Self {
            source,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// APY for one pool; source failures degrade to 0% with a logged
    /// error.
    pub async fn pool_apy(&self, pool: &Pubkey) -> f64 {
        {
            let cache = self.cache.read().await;
            if let Some((apy, inserted)) = cache.get(pool) {
                if inserted.elapsed() < APY_CACHE_TTL {
                    return *apy;
                }
            }
        }

        let apy = match self.source.pool_apy(pool).await {
            Ok(apy) => apy,
            Err(e) => {
                error!("error fetching APY for {}: {}", pool, e);
                return 0.0;
            }
        };

        let mut cache = self.cache.write().await;
        cache.insert(*pool, (apy, Instant::now()));
        apy
    }

    /// Highest-APY pool among the candidates, `None` on empty input
    pub async fn best_yield_opportunity(&self, pools: &[Pubkey]) -> Option<YieldOpportunity> {
        if pools.is_empty() {
            return None;
        }

        let apys = join_all(pools.iter().map(|pool| async move {
            YieldOpportunity {
                pool: *pool,
                apy: self.pool_apy(pool).await,
            }
        }))
        .await;

        apys.into_iter()
            .max_by(|a, b| a.apy.partial_cmp(&b.apy).unwrap_or(std::cmp::Ordering::Equal))
    }
}
