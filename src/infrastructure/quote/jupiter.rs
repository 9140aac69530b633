use reqwest::Client;
use serde::Deserialize;
use solana_sdk::pubkey::Pubkey;
use tracing::debug;

use super::{Quote, QuoteClient, SwapTransaction};
use crate::shared::errors::QuoteError;

/// Jupiter quote response (string-encoded amounts, per the API)
#[derive(Debug, Deserialize)]
struct JupiterQuoteResponse {
    #[serde(rename = "inAmount")]
    in_amount: String,
    #[serde(rename = "outAmount")]
    out_amount: String,
    #[serde(rename = "otherAmountThreshold")]
    other_amount_threshold: String,
    #[serde(rename = "priceImpactPct", default)]
    price_impact_pct: Option<String>,
    #[serde(rename = "routePlan", default)]
    route_plan: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct JupiterSwapResponse {
    #[serde(rename = "swapTransaction")]
    swap_transaction: String,
    #[serde(rename = "lastValidBlockHeight", default)]
    last_valid_block_height: Option<u64>,
}

/// Jupiter aggregator API client
pub struct JupiterQuoteClient {
    http_client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl JupiterQuoteClient {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.into(),
            api_key,
        }
    }

    fn with_api_key(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.header("x-api-key", key),
            None => request,
        }
    }

    fn parse_amount(value: &str, field: &str) -> Result<u64, QuoteError> {
        value
            .parse::<u64>()
            .map_err(|_| QuoteError::Malformed(format!("{}: {:?}", field, value)))
    }
}

#[async_trait::async_trait]
impl QuoteClient for JupiterQuoteClient {
    async fn get_quote(
        &self,
        input_mint: &Pubkey,
        output_mint: &Pubkey,
        amount: u64,
        slippage_bps: u32,
    ) -> Result<Quote, QuoteError> {
        let url = format!(
            "{}/quote?slippageBps={}&swapMode=ExactIn&restrictIntermediateTokens=true\
             &maxAccounts=64&inputMint={}&outputMint={}&amount={}",
            self.base_url, slippage_bps, input_mint, output_mint, amount
        );
        debug!(%url, "fetching quote");

        let response = self.with_api_key(self.http_client.get(&url)).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(QuoteError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let raw: serde_json::Value = response.json().await?;
        let quote: JupiterQuoteResponse = serde_json::from_value(raw.clone())
            .map_err(|e| QuoteError::Malformed(e.to_string()))?;

        let price_impact_pct = quote
            .price_impact_pct
            .as_deref()
            .and_then(|p| p.parse::<f64>().ok())
            .unwrap_or(0.0);

        Ok(Quote {
            input_mint: *input_mint,
            output_mint: *output_mint,
            in_amount: Self::parse_amount(&quote.in_amount, "inAmount")?,
            out_amount: Self::parse_amount(&quote.out_amount, "outAmount")?,
            other_amount_threshold: Self::parse_amount(
                &quote.other_amount_threshold,
                "otherAmountThreshold",
            )?,
            price_impact_pct,
            route_hops: quote.route_plan.len(),
            raw,
        })
    }

    async fn build_swap_transaction(
        &self,
        quote: &Quote,
        signer: &Pubkey,
    ) -> Result<SwapTransaction, QuoteError> {
        let url = format!("{}/swap", self.base_url);
        let body = serde_json::json!({
            "userPublicKey": signer.to_string(),
            "quoteResponse": quote.raw,
        });

        let response = self
            .with_api_key(self.http_client.post(&url))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(QuoteError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let swap: JupiterSwapResponse = response
            .json()
            .await
            .map_err(|e| QuoteError::Malformed(e.to_string()))?;

        Ok(SwapTransaction {
            transaction_base64: swap.swap_transaction,
            last_valid_block_height: swap.last_valid_block_height,
        })
    }
}
