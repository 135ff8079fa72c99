use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::info;

/// Shielded-pool collaborator boundary. The step processor only ever needs a
/// native deposit and a private withdrawal; everything behind those calls
/// (note selection, proof construction, tree state) belongs to the pool.
#[async_trait]
pub trait ShieldedPool: Send + Sync {
    async fn deposit_native(&self, amount: u64) -> Result<PoolDeposit, String>;
    async fn withdraw_native(&self, withdrawal: PoolWithdrawal) -> Result<PoolPayout, String>;
}

#[derive(Debug, Clone)]
pub struct PoolDeposit {
    pub signature: String,
}

#[derive(Debug, Clone)]
pub struct PoolWithdrawal {
    pub amount: u64,
    pub recipient_address: String,
    pub notes: Vec<Value>,
}

#[derive(Debug, Clone)]
pub struct PoolPayout {
    pub signature: String,
    pub proof: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PoolGatewayConfig {
    #[serde(default)]
    pub deposit_fee_rate: f64,
    #[serde(default)]
    pub withdraw_fee_rate: f64,
    #[serde(default)]
    pub max_deposit_amount: u64,
}

#[derive(Debug, Deserialize)]
struct PoolTxResponse {
    #[serde(default)]
    success: bool,
    signature: Option<String>,
    proof: Option<Value>,
    error: Option<String>,
}

/// HTTP client for the pool gateway. The gateway config is fetched once per
/// process on first use; the handle itself is constructed at startup and
/// injected, so there is no hidden module-level initialization flag.
pub struct HttpShieldedPool {
    base_url: String,
    client: reqwest::Client,
    gateway_config: OnceCell<PoolGatewayConfig>,
}

impl HttpShieldedPool {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| format!("pool http client build failed: {e}"))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            gateway_config: OnceCell::new(),
        })
    }

    async fn gateway_config(&self) -> Result<&PoolGatewayConfig, String> {
        self.gateway_config
            .get_or_try_init(|| async {
                let response = self
                    .client
                    .get(format!("{}/config", self.base_url))
                    .send()
                    .await
                    .map_err(|e| format!("pool config fetch failed: {e}"))?;
                if !response.status().is_success() {
                    return Err(format!(
                        "pool config fetch failed: http {}",
                        response.status().as_u16()
                    ));
                }
                let config = response
                    .json::<PoolGatewayConfig>()
                    .await
                    .map_err(|e| format!("pool config decode failed: {e}"))?;
                info!(
                    max_deposit_amount = config.max_deposit_amount,
                    withdraw_fee_rate = config.withdraw_fee_rate,
                    "shielded pool gateway initialized"
                );
                Ok(config)
            })
            .await
    }
}

#[async_trait]
impl ShieldedPool for HttpShieldedPool {
    async fn deposit_native(&self, amount: u64) -> Result<PoolDeposit, String> {
        let config = self.gateway_config().await?;
        if config.max_deposit_amount > 0 && amount > config.max_deposit_amount {
            return Err(format!(
                "deposit amount {amount} exceeds pool maximum {}",
                config.max_deposit_amount
            ));
        }

        let response = self
            .client
            .post(format!("{}/deposit", self.base_url))
            .json(&json!({ "amount": amount }))
            .send()
            .await
            .map_err(|e| format!("pool deposit request failed: {e}"))?;
        let status = response.status();
        let payload = response
            .json::<PoolTxResponse>()
            .await
            .map_err(|e| format!("pool deposit decode failed: {e}"))?;
        if !status.is_success() || !payload.success {
            return Err(payload
                .error
                .unwrap_or_else(|| format!("pool deposit rejected: http {}", status.as_u16())));
        }
        let signature = payload
            .signature
            .filter(|s| !s.is_empty())
            .ok_or_else(|| "pool deposit response missing signature".to_string())?;
        Ok(PoolDeposit { signature })
    }

    async fn withdraw_native(&self, withdrawal: PoolWithdrawal) -> Result<PoolPayout, String> {
        // the gateway needs no warm state for withdrawals, but a handle that
        // never deposited still initializes exactly once here
        self.gateway_config().await?;

        let response = self
            .client
            .post(format!("{}/withdraw", self.base_url))
            .json(&json!({
                "amount": withdrawal.amount,
                "recipient_address": withdrawal.recipient_address,
                "notes": withdrawal.notes,
            }))
            .send()
            .await
            .map_err(|e| format!("pool withdraw request failed: {e}"))?;
        let status = response.status();
        let payload = response
            .json::<PoolTxResponse>()
            .await
            .map_err(|e| format!("pool withdraw decode failed: {e}"))?;
        if !status.is_success() || !payload.success {
            return Err(payload
                .error
                .unwrap_or_else(|| format!("pool withdraw rejected: http {}", status.as_u16())));
        }
        let signature = payload
            .signature
            .filter(|s| !s.is_empty())
            .ok_or_else(|| "pool withdraw response missing signature".to_string())?;
        Ok(PoolPayout {
            signature,
            proof: payload.proof,
        })
    }
}
