//! Portfolio monitoring - token holdings and their value

use solana_sdk::pubkey::Pubkey;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::error;

use super::PriceMonitor;
use crate::infrastructure::chain::BalanceSource;
use crate::shared::errors::QuoteError;

/// Tracks an owner's token holdings
pub struct PortfolioMonitor {
    balances: Arc<dyn BalanceSource>,
}

impl PortfolioMonitor {
    pub fn new(balances: Arc<dyn BalanceSource>) -> Self {
        Self { balances }
    }

    /// Balance in base units. Read failures degrade to zero with a
    /// logged error; a missing token account is not a portfolio error.
    pub async fn token_balance(&self, owner: &Pubkey, mint: &Pubkey) -> u64 {
        match self.balances.token_balance(owner, mint).await {
            Ok(amount) => amount,
            Err(e) => {
                error!("error fetching token balance for {}: {}", mint, e);
                0
            }
        }
    }

    /// Balances for every mint, keyed by mint
    pub async fn portfolio(&self, owner: &Pubkey, mints: &[Pubkey]) -> HashMap<Pubkey, u64> {
        let mut balances = HashMap::new();
        for mint in mints {
            balances.insert(*mint, self.token_balance(owner, mint).await);
        }
        balances
    }

    /// Total portfolio value in USDC. USDC itself is valued 1:1; other
    /// tokens are priced through the monitor.
    pub async fn portfolio_value(
        &self,
        owner: &Pubkey,
        mints: &[Pubkey],
        price_monitor: &PriceMonitor,
        usdc_mint: &Pubkey,
    ) -> Result<f64, QuoteError> {
        let portfolio = self.portfolio(owner, mints).await;
        let mut total_value = 0.0;

        for (mint, balance) in &portfolio {
            if *balance == 0 {
                continue;
            }
            if mint == usdc_mint {
                total_value += *balance as f64 / 1e6;
            } else {
                let market_data = price_monitor.get_price(mint, usdc_mint, *balance).await?;
                total_value += *balance as f64 * market_data.price / 1e6;
            }
        }

        Ok(total_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use async_trait::async_trait;

    pub(crate) struct FixedBalances {
        balances: HashMap<Pubkey, u64>,
    }

    impl FixedBalances {
        pub fn new(entries: Vec<(Pubkey, u64)>) -> Self {
            Self {
                balances: entries.into_iter().collect(),
            }
        }
    }

    #[async_trait]
    impl BalanceSource for FixedBalances {
        async fn token_balance(&self, _owner: &Pubkey, mint: &Pubkey) -> anyhow::Result<u64> {
            self.balances
                .get(mint)
                .copied()
                .ok_or_else(|| anyhow!("no account for {}", mint))
        }
    }

    #[tokio::test]
    async fn test_missing_account_degrades_to_zero() {
        let monitor = PortfolioMonitor::new(Arc::new(FixedBalances::new(vec![])));
        let balance = monitor
            .token_balance(&Pubkey::new_unique(), &Pubkey::new_unique())
            .await;
        assert_eq!(balance, 0);
    }

    #[tokio::test]
    async fn test_portfolio_value_prices_non_usdc_holdings() {
        use crate::domain::market::test_support::CountingQuoteClient;
        use assert_approx_eq::assert_approx_eq;

        let usdc = Pubkey::new_unique();
        let other = Pubkey::new_unique();
        let monitor = PortfolioMonitor::new(Arc::new(FixedBalances::new(vec![
            (usdc, 40_000_000),
            (other, 2_000_000),
        ])));
        // quote prices `other` at 1.5 USDC per unit
        let price_monitor = PriceMonitor::new(
            Arc::new(CountingQuoteClient::returning(vec![3_000_000])),
            50,
        );

        let value = monitor
            .portfolio_value(&Pubkey::new_unique(), &[usdc, other], &price_monitor, &usdc)
            .await
            .unwrap();

        // 40 USDC at par plus 2_000_000 * 1.5 / 1e6
        assert_approx_eq!(value, 43.0);
    }

    #[tokio::test]
    async fn test_portfolio_keys_by_mint() {
        let usdc = Pubkey::new_unique();
        let sol = Pubkey::new_unique();
        let monitor = PortfolioMonitor::new(Arc::new(FixedBalances::new(vec![
            (usdc, 40_000_000),
            (sol, 2_000_000_000),
        ])));

        let portfolio = monitor.portfolio(&Pubkey::new_unique(), &[usdc, sol]).await;
        assert_eq!(portfolio[&usdc], 40_000_000);
        assert_eq!(portfolio[&sol], 2_000_000_000);
    }
}
