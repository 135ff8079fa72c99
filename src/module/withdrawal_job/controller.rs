use super::crud;
use super::error::AppError;
use super::schema::{
    AdvanceJobResponse, CreateWithdrawalJobRequest, CreateWithdrawalJobResponse,
    GetWithdrawalJobResponse, HealthMetricsView, HealthResponse,
};
use crate::app::AppState;
use crate::service::{metrics_service, step_service};
use axum::Json;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use tracing::{error, info};

pub async fn create_withdrawal_job(
    State(state): State<AppState>,
    Json(req): Json<CreateWithdrawalJobRequest>,
) -> impl IntoResponse {
    match crud::create_withdrawal_job(&state, req).await {
        Ok(resp) => {
            info!(job_id = %resp.job_id, "withdrawal job accepted");
            (axum::http::StatusCode::OK, Json(resp))
        }
        Err(err) => error_create(err),
    }
}

pub async fn get_withdrawal_job(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> impl IntoResponse {
    match crud::get_withdrawal_job(&state, &job_id).await {
        Ok(resp) => (axum::http::StatusCode::OK, Json(resp)),
        Err(err) => error_get(err),
    }
}

pub async fn advance_withdrawal_job(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> impl IntoResponse {
    match step_service::advance_job(&state, &job_id).await {
        Ok(resp) => {
            info!(
                job_id = %job_id,
                status = resp.status.as_ref().map(|s| s.as_str()).unwrap_or("unknown"),
                progress = resp.progress,
                step = %resp.step,
                "withdrawal job advanced"
            );
            (axum::http::StatusCode::OK, Json(resp))
        }
        Err(err) => error_advance(err),
    }
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let (store_ok, jobs_stored) = match state.store.job_count() {
        Ok(count) => (true, count),
        Err(_) => (false, 0),
    };

    let m = metrics_service::snapshot();
    let metrics = HealthMetricsView {
        jobs_created: m.jobs_created,
        jobs_completed: m.jobs_completed,
        jobs_failed: m.jobs_failed,
        jobs_swept: m.jobs_swept,
        advance_count: m.advance_count,
        advance_avg_ms: m.advance_avg_ms,
        last_error_ts: m.last_error_ts,
    };

    (
        axum::http::StatusCode::OK,
        Json(HealthResponse {
            ok: store_ok,
            store_persistent: state.store.is_persistent(),
            jobs_stored,
            adapters_configured: state.adapters.is_some(),
            sweeper_enabled: state.config.sweeper_enabled,
            metrics,
            error_code: None,
            reason: if store_ok {
                "healthy".to_string()
            } else {
                "job store unavailable".to_string()
            },
        }),
    )
}

fn error_create(err: AppError) -> (axum::http::StatusCode, Json<CreateWithdrawalJobResponse>) {
    error!(error_code = err.code, reason = %err.message, "withdrawal job rejected");
    (
        err.status,
        Json(CreateWithdrawalJobResponse {
            accepted: false,
            job_id: String::new(),
            status: None,
            error_code: Some(err.code.to_string()),
            reason: err.message,
        }),
    )
}

fn error_get(err: AppError) -> (axum::http::StatusCode, Json<GetWithdrawalJobResponse>) {
    error!(error_code = err.code, reason = %err.message, "withdrawal job lookup failed");
    (
        err.status,
        Json(GetWithdrawalJobResponse {
            found: false,
            job: None,
            error_code: Some(err.code.to_string()),
            reason: err.message,
        }),
    )
}

fn error_advance(err: AppError) -> (axum::http::StatusCode, Json<AdvanceJobResponse>) {
    error!(error_code = err.code, reason = %err.message, "withdrawal job advance failed");
    (
        err.status,
        Json(AdvanceJobResponse {
            success: false,
            status: None,
            step: String::new(),
            progress: 0,
            deposit_signature: None,
            signature: None,
            error: None,
            error_code: Some(err.code.to_string()),
            reason: err.message,
        }),
    )
}
