use super::error::AppError;
use super::model::WithdrawalJobRecord;
use super::schema::{
    CreateWithdrawalJobRequest, CreateWithdrawalJobResponse, GetWithdrawalJobResponse, JobStatus,
    WithdrawalJobView,
};
use crate::app::AppState;
use crate::infra::InfraClients;
use crate::service::{metrics_service, validation_service};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

pub const INITIAL_STEP: &str = "Queued";

/// Durable key-value store for withdrawal jobs, one JSON document per job id.
/// The persistent backend survives process restart; the in-memory backend is
/// for tests and deployments without a data directory.
#[derive(Debug)]
pub struct JobStore {
    backend: StoreBackend,
}

#[derive(Debug)]
enum StoreBackend {
    Memory(Mutex<HashMap<String, WithdrawalJobRecord>>),
    Persistent(sled::Db),
}

impl Default for JobStore {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl JobStore {
    pub fn in_memory() -> Self {
        Self {
            backend: StoreBackend::Memory(Mutex::new(HashMap::new())),
        }
    }

    pub fn persistent(db: sled::Db) -> Self {
        Self {
            backend: StoreBackend::Persistent(db),
        }
    }

    pub fn from_infra(infra: Option<&InfraClients>) -> Self {
        match infra {
            Some(clients) => Self::persistent(clients.job_db.clone()),
            None => Self::in_memory(),
        }
    }

    pub fn is_persistent(&self) -> bool {
        matches!(self.backend, StoreBackend::Persistent(_))
    }

    pub fn insert(&self, record: &WithdrawalJobRecord) -> Result<(), String> {
        match &self.backend {
            StoreBackend::Memory(jobs) => {
                let mut guard = jobs
                    .lock()
                    .map_err(|_| "job store lock poisoned".to_string())?;
                guard.insert(record.job_id.clone(), record.clone());
                Ok(())
            }
            StoreBackend::Persistent(db) => {
                let bytes = encode_record(record)?;
                db.insert(record.job_id.as_bytes(), bytes)
                    .map_err(|e| format!("job db insert error: {e}"))?;
                Ok(())
            }
        }
    }

    pub fn fetch(&self, job_id: &str) -> Result<Option<WithdrawalJobRecord>, String> {
        match &self.backend {
            StoreBackend::Memory(jobs) => {
                let guard = jobs
                    .lock()
                    .map_err(|_| "job store lock poisoned".to_string())?;
                Ok(guard.get(job_id).cloned())
            }
            StoreBackend::Persistent(db) => {
                let Some(bytes) = db
                    .get(job_id.as_bytes())
                    .map_err(|e| format!("job db get error: {e}"))?
                else {
                    return Ok(None);
                };
                decode_record(&bytes).map(Some)
            }
        }
    }

    /// Read-modify-write against the current persisted value. Refreshes
    /// `updated_at`. Terminal records are returned unchanged without running
    /// the mutation: once a job is completed or failed it is immutable.
    pub fn apply<F>(&self, job_id: &str, mutate: F) -> Result<Option<WithdrawalJobRecord>, String>
    where
        F: FnOnce(&mut WithdrawalJobRecord),
    {
        match &self.backend {
            StoreBackend::Memory(jobs) => {
                let mut guard = jobs
                    .lock()
                    .map_err(|_| "job store lock poisoned".to_string())?;
                let Some(record) = guard.get_mut(job_id) else {
                    return Ok(None);
                };
                if record.is_terminal() {
                    return Ok(Some(record.clone()));
                }
                mutate(record);
                record.updated_at = Utc::now().timestamp();
                Ok(Some(record.clone()))
            }
            StoreBackend::Persistent(db) => {
                let Some(bytes) = db
                    .get(job_id.as_bytes())
                    .map_err(|e| format!("job db get error: {e}"))?
                else {
                    return Ok(None);
                };
                let mut record = decode_record(&bytes)?;
                if record.is_terminal() {
                    return Ok(Some(record));
                }
                mutate(&mut record);
                record.updated_at = Utc::now().timestamp();
                let bytes = encode_record(&record)?;
                db.insert(job_id.as_bytes(), bytes)
                    .map_err(|e| format!("job db insert error: {e}"))?;
                Ok(Some(record))
            }
        }
    }

    pub fn remove(&self, job_id: &str) -> Result<bool, String> {
        match &self.backend {
            StoreBackend::Memory(jobs) => {
                let mut guard = jobs
                    .lock()
                    .map_err(|_| "job store lock poisoned".to_string())?;
                Ok(guard.remove(job_id).is_some())
            }
            StoreBackend::Persistent(db) => Ok(db
                .remove(job_id.as_bytes())
                .map_err(|e| format!("job db remove error: {e}"))?
                .is_some()),
        }
    }

    pub fn list(&self) -> Result<Vec<WithdrawalJobRecord>, String> {
        match &self.backend {
            StoreBackend::Memory(jobs) => {
                let guard = jobs
                    .lock()
                    .map_err(|_| "job store lock poisoned".to_string())?;
                Ok(guard.values().cloned().collect())
            }
            StoreBackend::Persistent(db) => {
                let mut records = Vec::new();
                for entry in db.iter() {
                    let (_, bytes) = entry.map_err(|e| format!("job db scan error: {e}"))?;
                    // skip records written by an incompatible version
                    if let Ok(record) = decode_record(&bytes) {
                        records.push(record);
                    }
                }
                Ok(records)
            }
        }
    }

    pub fn job_count(&self) -> Result<u64, String> {
        match &self.backend {
            StoreBackend::Memory(jobs) => {
                let guard = jobs
                    .lock()
                    .map_err(|_| "job store lock poisoned".to_string())?;
                Ok(guard.len() as u64)
            }
            StoreBackend::Persistent(db) => Ok(db.len() as u64),
        }
    }

    /// Removes every record older than the TTL, regardless of status.
    /// Clients are expected to have consumed terminal results within the
    /// retention window. Returns the number of records removed.
    pub fn sweep_expired(&self, ttl_seconds: i64) -> Result<u64, String> {
        let now = Utc::now().timestamp();
        match &self.backend {
            StoreBackend::Memory(jobs) => {
                let mut guard = jobs
                    .lock()
                    .map_err(|_| "job store lock poisoned".to_string())?;
                let before = guard.len();
                guard.retain(|_, record| now - record.created_at <= ttl_seconds);
                Ok((before - guard.len()) as u64)
            }
            StoreBackend::Persistent(db) => {
                let mut expired = Vec::new();
                for entry in db.iter() {
                    let (key, bytes) = entry.map_err(|e| format!("job db scan error: {e}"))?;
                    if let Ok(record) = decode_record(&bytes) {
                        if now - record.created_at > ttl_seconds {
                            expired.push(key);
                        }
                    }
                }
                let mut removed = 0u64;
                for key in expired {
                    db.remove(&key)
                        .map_err(|e| format!("job db remove error: {e}"))?;
                    removed += 1;
                }
                Ok(removed)
            }
        }
    }
}

fn encode_record(record: &WithdrawalJobRecord) -> Result<Vec<u8>, String> {
    serde_json::to_vec(record).map_err(|e| format!("job encode error: {e}"))
}

fn decode_record(bytes: &[u8]) -> Result<WithdrawalJobRecord, String> {
    serde_json::from_slice(bytes).map_err(|e| format!("job decode error: {e}"))
}

pub(crate) fn store_error(message: String) -> AppError {
    AppError::internal("STORE_ERROR", message)
}

fn generate_job_id() -> String {
    format!("job-{}", Uuid::new_v4())
}

pub async fn create_withdrawal_job(
    state: &AppState,
    req: CreateWithdrawalJobRequest,
) -> Result<CreateWithdrawalJobResponse, AppError> {
    validation_service::validate_create_request(&req)?;

    // bound storage growth before adding a record
    match state.store.sweep_expired(state.config.job_ttl_seconds) {
        Ok(0) => {}
        Ok(removed) => {
            metrics_service::inc_jobs_swept(removed);
            info!(removed, "expired withdrawal jobs swept");
        }
        Err(e) => warn!(error = %e, "create-time sweep failed"),
    }

    let now = Utc::now().timestamp();
    let record = WithdrawalJobRecord {
        job_id: generate_job_id(),
        created_at: now,
        updated_at: now,
        status: JobStatus::Pending,
        step: INITIAL_STEP.to_string(),
        progress: 0,
        asset_type: req.asset_type,
        amount: req.amount,
        recipient_address: req.recipient_address,
        owner_address: req.owner_address,
        mint_address: req.mint_address,
        notes: req.notes,
        deposit_signature: None,
        signature: None,
        proof: None,
        error: None,
    };
    state.store.insert(&record).map_err(store_error)?;
    metrics_service::inc_jobs_created();

    Ok(CreateWithdrawalJobResponse {
        accepted: true,
        job_id: record.job_id,
        status: Some(JobStatus::Pending),
        error_code: None,
        reason: "withdrawal job created; poll status and call advance until terminal".to_string(),
    })
}

pub async fn get_withdrawal_job(
    state: &AppState,
    job_id: &str,
) -> Result<GetWithdrawalJobResponse, AppError> {
    let record = state
        .store
        .fetch(job_id)
        .map_err(store_error)?
        .ok_or_else(|| {
            AppError::not_found("JOB_NOT_FOUND", format!("no withdrawal job for id {job_id}"))
        })?;

    Ok(GetWithdrawalJobResponse {
        found: true,
        job: Some(to_view(&record)),
        error_code: None,
        reason: "job found".to_string(),
    })
}

pub fn to_view(record: &WithdrawalJobRecord) -> WithdrawalJobView {
    WithdrawalJobView {
        job_id: record.job_id.clone(),
        status: record.status.clone(),
        step: record.step.clone(),
        progress: record.progress,
        asset_type: record.asset_type.clone(),
        amount: record.amount,
        created_at: record.created_at,
        updated_at: record.updated_at,
        deposit_signature: record.deposit_signature.clone(),
        signature: record.signature.clone(),
        error: record.error.clone(),
    }
}
