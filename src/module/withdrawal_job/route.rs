use super::controller;
use crate::app::AppState;
use axum::Router;
use axum::routing::{get, post};

pub fn register_routes(state: AppState) -> Router {
    Router::new()
        .route(
            "/v1/withdrawal-jobs",
            post(controller::create_withdrawal_job),
        )
        .route("/v1/withdrawal-jobs/health", get(controller::health))
        .route(
            "/v1/withdrawal-jobs/:job_id",
            get(controller::get_withdrawal_job),
        )
        .route(
            "/v1/withdrawal-jobs/:job_id/advance",
            post(controller::advance_withdrawal_job),
        )
        .with_state(state)
}
