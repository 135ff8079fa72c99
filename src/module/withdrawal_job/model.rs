use super::schema::JobStatus;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One persisted withdrawal workflow. Input fields are frozen at creation;
/// the step processor fills the result fields as the job moves through the
/// progress ladder (0 → 20 → 50 → 85 → 100).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WithdrawalJobRecord {
    pub job_id: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub status: JobStatus,
    pub step: String,
    pub progress: u8,
    pub asset_type: String,
    pub amount: u64,
    pub recipient_address: String,
    pub owner_address: String,
    pub mint_address: Option<String>,
    pub notes: Vec<Value>,
    pub deposit_signature: Option<String>,
    pub signature: Option<String>,
    pub proof: Option<Value>,
    pub error: Option<String>,
}

impl WithdrawalJobRecord {
    pub fn is_terminal(&self) -> bool {
        matches!(self.status, JobStatus::Completed | JobStatus::Failed)
    }
}
