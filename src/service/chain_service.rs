use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

/// Wrapped-native mint; collateral unwrap and on-chain completion always run
/// against this mint.
pub const NATIVE_MINT_ADDRESS: &str = "So11111111111111111111111111111111111111112";

/// Executor/vault chain boundary: the gateway holds the executor key and
/// submits the transactions. `release_collateral` returns `Ok(None)` when
/// there is no intermediate holding account to unwrap.
#[async_trait]
pub trait VaultChain: Send + Sync {
    async fn release_collateral(&self) -> Result<Option<String>, String>;
    async fn complete_withdrawal(
        &self,
        owner_address: &str,
        mint_address: &str,
    ) -> Result<String, String>;
}

#[derive(Debug, Deserialize)]
struct UnwrapResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    closed: bool,
    signature: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CompleteWithdrawalResponse {
    #[serde(default)]
    success: bool,
    signature: Option<String>,
    error: Option<String>,
}

pub struct HttpVaultChain {
    base_url: String,
    client: reqwest::Client,
}

impl HttpVaultChain {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| format!("chain http client build failed: {e}"))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }
}

#[async_trait]
impl VaultChain for HttpVaultChain {
    async fn release_collateral(&self) -> Result<Option<String>, String> {
        let response = self
            .client
            .post(format!("{}/unwrap", self.base_url))
            .json(&json!({ "mint_address": NATIVE_MINT_ADDRESS }))
            .send()
            .await
            .map_err(|e| format!("unwrap request failed: {e}"))?;
        let status = response.status();
        let payload = response
            .json::<UnwrapResponse>()
            .await
            .map_err(|e| format!("unwrap decode failed: {e}"))?;
        if !status.is_success() || !payload.success {
            return Err(payload
                .error
                .unwrap_or_else(|| format!("unwrap rejected: http {}", status.as_u16())));
        }
        if !payload.closed {
            return Ok(None);
        }
        Ok(payload.signature.filter(|s| !s.is_empty()))
    }

    async fn complete_withdrawal(
        &self,
        owner_address: &str,
        mint_address: &str,
    ) -> Result<String, String> {
        let response = self
            .client
            .post(format!("{}/complete-withdrawal", self.base_url))
            .json(&json!({
                "owner_address": owner_address,
                "mint_address": mint_address,
            }))
            .send()
            .await
            .map_err(|e| format!("complete-withdrawal request failed: {e}"))?;
        let status = response.status();
        let payload = response
            .json::<CompleteWithdrawalResponse>()
            .await
            .map_err(|e| format!("complete-withdrawal decode failed: {e}"))?;
        if !status.is_success() || !payload.success {
            return Err(payload.error.unwrap_or_else(|| {
                format!("complete-withdrawal rejected: http {}", status.as_u16())
            }));
        }
        payload
            .signature
            .filter(|s| !s.is_empty())
            .ok_or_else(|| "complete-withdrawal response missing signature".to_string())
    }
}
