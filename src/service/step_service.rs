use crate::app::{Adapters, AppState};
use crate::module::withdrawal_job::crud::store_error;
use crate::module::withdrawal_job::error::AppError;
use crate::module::withdrawal_job::model::WithdrawalJobRecord;
use crate::module::withdrawal_job::schema::{AdvanceJobResponse, JobStatus};
use crate::service::chain_service::NATIVE_MINT_ADDRESS;
use crate::service::metrics_service;
use crate::service::pool_service::PoolWithdrawal;
use chrono::Utc;
use std::time::Instant;
use tracing::{info, warn};

pub const NATIVE_ASSET: &str = "SOL";

const CONTINUE_HINT: &str = "continue calling advance until the job reaches a terminal status";

/// Advances a withdrawal job by exactly one progress range and returns. The
/// driver calls this repeatedly until the job is terminal; `progress` read
/// from the store is the only position marker, so invocations are safe to
/// repeat across unrelated processes.
///
/// Known gap: a driver retry after a timeout inside the deposit or withdraw
/// ranges repeats the underlying adapter call, which can duplicate an
/// irreversible transfer — the collaborators expose no de-duplication token.
pub async fn advance_job(state: &AppState, job_id: &str) -> Result<AdvanceJobResponse, AppError> {
    let started = Instant::now();
    let result = run_one_range(state, job_id).await;
    metrics_service::record_advance_duration_ms(started.elapsed().as_millis() as u64);
    if result.is_err() {
        metrics_service::set_last_error_ts(Utc::now().timestamp());
    }
    result
}

async fn run_one_range(state: &AppState, job_id: &str) -> Result<AdvanceJobResponse, AppError> {
    let job = state
        .store
        .fetch(job_id)
        .map_err(store_error)?
        .ok_or_else(|| job_not_found(job_id))?;

    // terminal jobs report their stored result: no writes, no adapter calls
    if job.is_terminal() {
        return Ok(terminal_response(&job));
    }

    let job = mark_processing(state, job_id)?;

    // a mis-configured service must leave the job retryable, never failed
    let Some(adapters) = &state.adapters else {
        return Err(AppError::internal(
            "ADAPTERS_UNCONFIGURED",
            "pool gateway and chain executor base urls are not configured",
        ));
    };

    if job.progress < 20 && job.asset_type == NATIVE_ASSET {
        return unwrap_range(state, adapters, &job).await;
    }
    if job.progress < 50 {
        return deposit_range(state, adapters, &job).await;
    }
    if job.progress < 85 {
        return withdraw_range(state, adapters, &job).await;
    }
    if job.progress < 100 {
        return completion_range(state, adapters, &job).await;
    }

    // progress already 100; nothing left to run
    Ok(progressing_response(&job))
}

async fn unwrap_range(
    state: &AppState,
    adapters: &Adapters,
    job: &WithdrawalJobRecord,
) -> Result<AdvanceJobResponse, AppError> {
    set_step(state, &job.job_id, "Unwrapping collateral")?;

    // best-effort: an absent holding account means already unwrapped, and a
    // failed unwrap never blocks the withdrawal
    match adapters.chain.release_collateral().await {
        Ok(Some(signature)) => {
            info!(job_id = %job.job_id, signature = %signature, "collateral unwrapped");
        }
        Ok(None) => {
            info!(job_id = %job.job_id, "no collateral account to unwrap");
        }
        Err(e) => {
            warn!(job_id = %job.job_id, error = %e, "collateral unwrap failed; continuing");
        }
    }

    let job = finish_range(state, &job.job_id, 20, "Collateral unwrapped", |_| {})?;
    Ok(progressing_response(&job))
}

async fn deposit_range(
    state: &AppState,
    adapters: &Adapters,
    job: &WithdrawalJobRecord,
) -> Result<AdvanceJobResponse, AppError> {
    set_step(state, &job.job_id, "Depositing to shielded pool")?;

    if job.asset_type != NATIVE_ASSET {
        let message = format!("asset type {} is not supported", job.asset_type);
        let job = fail_job(state, &job.job_id, &message)?;
        return Ok(failed_response(&job));
    }

    match adapters.pool.deposit_native(job.amount).await {
        Ok(deposit) => {
            info!(job_id = %job.job_id, signature = %deposit.signature, "shielded deposit confirmed");
            let signature = deposit.signature;
            let job = finish_range(state, &job.job_id, 50, "Shielded deposit complete", |record| {
                record.deposit_signature = Some(signature);
            })?;
            Ok(progressing_response(&job))
        }
        Err(message) => {
            let job = fail_job(state, &job.job_id, &message)?;
            Ok(failed_response(&job))
        }
    }
}

async fn withdraw_range(
    state: &AppState,
    adapters: &Adapters,
    job: &WithdrawalJobRecord,
) -> Result<AdvanceJobResponse, AppError> {
    set_step(state, &job.job_id, "Generating privacy proof and withdrawing")?;

    let withdrawal = PoolWithdrawal {
        amount: job.amount,
        recipient_address: job.recipient_address.clone(),
        notes: job.notes.clone(),
    };
    match adapters.pool.withdraw_native(withdrawal).await {
        Ok(payout) => {
            info!(job_id = %job.job_id, signature = %payout.signature, "private withdrawal sent");
            let signature = payout.signature;
            let proof = payout.proof;
            let job = finish_range(state, &job.job_id, 85, "Private withdrawal sent", |record| {
                record.signature = Some(signature);
                record.proof = proof;
            })?;
            Ok(progressing_response(&job))
        }
        Err(message) => {
            let job = fail_job(state, &job.job_id, &message)?;
            Ok(failed_response(&job))
        }
    }
}

async fn completion_range(
    state: &AppState,
    adapters: &Adapters,
    job: &WithdrawalJobRecord,
) -> Result<AdvanceJobResponse, AppError> {
    set_step(state, &job.job_id, "Completing withdrawal on-chain")?;

    // funds already reached the recipient at progress 85; a bookkeeping
    // failure here must not misreport the outcome to the caller
    match adapters
        .chain
        .complete_withdrawal(&job.owner_address, NATIVE_MINT_ADDRESS)
        .await
    {
        Ok(signature) => {
            info!(job_id = %job.job_id, signature = %signature, "on-chain completion confirmed");
        }
        Err(e) => {
            warn!(
                job_id = %job.job_id,
                error = %e,
                "on-chain completion failed; vault bookkeeping needs manual reconciliation"
            );
        }
    }

    let job = finish_range(state, &job.job_id, 100, "Complete", |record| {
        record.status = JobStatus::Completed;
    })?;
    metrics_service::inc_jobs_completed();
    Ok(completed_response(&job))
}

fn mark_processing(state: &AppState, job_id: &str) -> Result<WithdrawalJobRecord, AppError> {
    state
        .store
        .apply(job_id, |job| {
            job.status = JobStatus::Processing;
        })
        .map_err(store_error)?
        .ok_or_else(|| job_not_found(job_id))
}

fn set_step(state: &AppState, job_id: &str, step: &str) -> Result<(), AppError> {
    state
        .store
        .apply(job_id, |job| {
            job.step = step.to_string();
        })
        .map_err(store_error)?
        .ok_or_else(|| job_not_found(job_id))?;
    Ok(())
}

fn finish_range<F>(
    state: &AppState,
    job_id: &str,
    progress: u8,
    step: &str,
    extra: F,
) -> Result<WithdrawalJobRecord, AppError>
where
    F: FnOnce(&mut WithdrawalJobRecord),
{
    state
        .store
        .apply(job_id, |job| {
            job.progress = progress;
            job.step = step.to_string();
            extra(job);
        })
        .map_err(store_error)?
        .ok_or_else(|| job_not_found(job_id))
}

fn fail_job(
    state: &AppState,
    job_id: &str,
    message: &str,
) -> Result<WithdrawalJobRecord, AppError> {
    warn!(job_id = %job_id, error = %message, "withdrawal job failed");
    metrics_service::inc_jobs_failed();
    metrics_service::set_last_error_ts(Utc::now().timestamp());
    state
        .store
        .apply(job_id, |job| {
            job.status = JobStatus::Failed;
            job.error = Some(message.to_string());
        })
        .map_err(store_error)?
        .ok_or_else(|| job_not_found(job_id))
}

fn job_not_found(job_id: &str) -> AppError {
    AppError::not_found("JOB_NOT_FOUND", format!("no withdrawal job for id {job_id}"))
}

fn terminal_response(job: &WithdrawalJobRecord) -> AdvanceJobResponse {
    match job.status {
        JobStatus::Completed => completed_response(job),
        _ => failed_response(job),
    }
}

fn completed_response(job: &WithdrawalJobRecord) -> AdvanceJobResponse {
    AdvanceJobResponse {
        success: true,
        status: Some(JobStatus::Completed),
        step: job.step.clone(),
        progress: job.progress,
        deposit_signature: job.deposit_signature.clone(),
        signature: job.signature.clone(),
        error: job.error.clone(),
        error_code: None,
        reason: "withdrawal complete".to_string(),
    }
}

fn failed_response(job: &WithdrawalJobRecord) -> AdvanceJobResponse {
    AdvanceJobResponse {
        success: false,
        status: Some(JobStatus::Failed),
        step: job.step.clone(),
        progress: job.progress,
        deposit_signature: job.deposit_signature.clone(),
        signature: job.signature.clone(),
        error: job.error.clone(),
        error_code: None,
        reason: job
            .error
            .clone()
            .unwrap_or_else(|| "withdrawal job failed".to_string()),
    }
}

fn progressing_response(job: &WithdrawalJobRecord) -> AdvanceJobResponse {
    AdvanceJobResponse {
        success: true,
        status: Some(job.status.clone()),
        step: job.step.clone(),
        progress: job.progress,
        deposit_signature: job.deposit_signature.clone(),
        signature: job.signature.clone(),
        error: None,
        error_code: None,
        reason: CONTINUE_HINT.to_string(),
    }
}
