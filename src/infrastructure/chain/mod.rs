//! Chain reads - token balances via RPC

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::program_pack::Pack;
use solana_sdk::pubkey::Pubkey;
use std::sync::Arc;

/// Source of token balances for an owner
#[async_trait]
pub trait BalanceSource: Send + Sync {
    /// Balance of `mint` held by `owner`, in base units
    async fn token_balance(&self, owner: &Pubkey, mint: &Pubkey) -> Result<u64>;
}

/// Reads balances from the owner's associated token accounts
pub struct RpcBalanceSource {
    rpc_client: Arc<RpcClient>,
}

impl RpcBalanceSource {
    pub fn new(rpc_url: impl Into<String>) -> Self {
        Self {
            rpc_client: Arc::new(RpcClient::new(rpc_url.into())),
        }
    }
}

#[async_trait]
impl BalanceSource for RpcBalanceSource {
    async fn token_balance(&self, owner: &Pubkey, mint: &Pubkey) -> Result<u64> {
        let ata = spl_associated_token_account::get_associated_token_address(owner, mint);
        let data = self.rpc_client.get_account_data(&ata).await?;
        let account = spl_token::state::Account::unpack(&data)
            .map_err(|e| anyhow!("invalid token account {}: {}", ata, e))?;
        Ok(account.amount)
    }
}
