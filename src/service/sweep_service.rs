use crate::app::AppState;
use crate::service::metrics_service;
use std::time::Duration;
use tracing::{info, warn};

/// Periodic TTL sweep. Expired jobs are removed regardless of status so
/// storage stays bounded even when a caller stops polling.
pub async fn run_sweeper(state: AppState) {
    let interval = Duration::from_secs(state.config.sweep_interval_seconds.max(1) as u64);
    info!(
        interval_seconds = interval.as_secs(),
        ttl_seconds = state.config.job_ttl_seconds,
        "withdrawal job sweeper started"
    );

    loop {
        tokio::time::sleep(interval).await;
        match state.store.sweep_expired(state.config.job_ttl_seconds) {
            Ok(0) => {}
            Ok(removed) => {
                metrics_service::inc_jobs_swept(removed);
                info!(removed, "expired withdrawal jobs swept");
            }
            Err(e) => warn!(error = %e, "job sweep failed"),
        }
    }
}
