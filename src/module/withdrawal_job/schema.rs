use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

/// Create request. Accepts both the snake_case field names and the camelCase
/// names the web frontend sends; `tokenType`/`utxos` are the legacy aliases.
/// Missing fields default so intake can reject them with a stable error code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateWithdrawalJobRequest {
    #[serde(default, alias = "assetType", alias = "tokenType")]
    pub asset_type: String,
    #[serde(default)]
    pub amount: u64,
    #[serde(default, alias = "recipientAddress")]
    pub recipient_address: String,
    #[serde(default, alias = "ownerAddress")]
    pub owner_address: String,
    #[serde(default, alias = "mintAddress")]
    pub mint_address: Option<String>,
    #[serde(default, alias = "utxos")]
    pub notes: Vec<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateWithdrawalJobResponse {
    pub accepted: bool,
    pub job_id: String,
    pub status: Option<JobStatus>,
    pub error_code: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WithdrawalJobView {
    pub job_id: String,
    pub status: JobStatus,
    pub step: String,
    pub progress: u8,
    pub asset_type: String,
    pub amount: u64,
    pub created_at: i64,
    pub updated_at: i64,
    pub deposit_signature: Option<String>,
    pub signature: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetWithdrawalJobResponse {
    pub found: bool,
    pub job: Option<WithdrawalJobView>,
    pub error_code: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvanceJobResponse {
    pub success: bool,
    pub status: Option<JobStatus>,
    pub step: String,
    pub progress: u8,
    pub deposit_signature: Option<String>,
    pub signature: Option<String>,
    pub error: Option<String>,
    pub error_code: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthMetricsView {
    pub jobs_created: u64,
    pub jobs_completed: u64,
    pub jobs_failed: u64,
    pub jobs_swept: u64,
    pub advance_count: u64,
    pub advance_avg_ms: u64,
    pub last_error_ts: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub store_persistent: bool,
    pub jobs_stored: u64,
    pub adapters_configured: bool,
    pub sweeper_enabled: bool,
    pub metrics: HealthMetricsView,
    pub error_code: Option<String>,
    pub reason: String,
}
