#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::{Body, to_bytes};
use http::Request;
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tower::util::ServiceExt;
use withdrawal_job_engine::app::{Adapters, AppState, build_router};
use withdrawal_job_engine::config::environment::AppConfig;
use withdrawal_job_engine::module::withdrawal_job::schema::{
    AdvanceJobResponse, CreateWithdrawalJobResponse, GetWithdrawalJobResponse, HealthResponse,
};
use withdrawal_job_engine::service::chain_service::VaultChain;
use withdrawal_job_engine::service::pool_service::{
    PoolDeposit, PoolPayout, PoolWithdrawal, ShieldedPool,
};

pub const RECIPIENT: &str = "9xQeWvG816bUx9EPjHmaT23yvVM2ZWbrrpZb9PusVFin";
pub const OWNER: &str = "4Nd1mBQtrMJVYVfKf2PJy9NZUZdTAsp7D4xWLs4gDB4T";

pub fn test_config() -> AppConfig {
    AppConfig {
        rust_env: "test".to_string(),
        api_host: "127.0.0.1".to_string(),
        api_port: 0,
        job_db_path: None,
        job_ttl_seconds: 3600,
        sweeper_enabled: false,
        sweep_interval_seconds: 60,
        pool_gateway_base_url: None,
        chain_executor_base_url: None,
        adapter_timeout_seconds: 45,
    }
}

pub fn valid_create_body() -> Value {
    json!({
        "asset_type": "SOL",
        "amount": 1_000_000u64,
        "recipient_address": RECIPIENT,
        "owner_address": OWNER,
        "notes": [{"commitment": "c1"}],
    })
}

/// Shielded-pool fake: canned results plus call counters so tests can assert
/// that terminal jobs trigger no further collaborator calls.
pub struct FakePool {
    pub deposit_result: Result<String, String>,
    pub withdraw_result: Result<(String, Option<Value>), String>,
    pub deposit_calls: AtomicUsize,
    pub withdraw_calls: AtomicUsize,
}

impl FakePool {
    pub fn happy() -> Self {
        Self::with_results(
            Ok("pool-deposit-sig".to_string()),
            Ok((
                "pool-withdraw-sig".to_string(),
                Some(json!({"proof_bytes": "0xabc123"})),
            )),
        )
    }

    pub fn deposit_failure(message: &str) -> Self {
        Self::with_results(
            Err(message.to_string()),
            Ok(("pool-withdraw-sig".to_string(), None)),
        )
    }

    pub fn withdraw_failure(message: &str) -> Self {
        Self::with_results(
            Ok("pool-deposit-sig".to_string()),
            Err(message.to_string()),
        )
    }

    fn with_results(
        deposit_result: Result<String, String>,
        withdraw_result: Result<(String, Option<Value>), String>,
    ) -> Self {
        Self {
            deposit_result,
            withdraw_result,
            deposit_calls: AtomicUsize::new(0),
            withdraw_calls: AtomicUsize::new(0),
        }
    }

    pub fn deposit_call_count(&self) -> usize {
        self.deposit_calls.load(Ordering::SeqCst)
    }

    pub fn withdraw_call_count(&self) -> usize {
        self.withdraw_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ShieldedPool for FakePool {
    async fn deposit_native(&self, _amount: u64) -> Result<PoolDeposit, String> {
        self.deposit_calls.fetch_add(1, Ordering::SeqCst);
        self.deposit_result
            .clone()
            .map(|signature| PoolDeposit { signature })
    }

    async fn withdraw_native(&self, _withdrawal: PoolWithdrawal) -> Result<PoolPayout, String> {
        self.withdraw_calls.fetch_add(1, Ordering::SeqCst);
        self.withdraw_result
            .clone()
            .map(|(signature, proof)| PoolPayout { signature, proof })
    }
}

/// Executor/vault chain fake with the same counter pattern.
pub struct FakeChain {
    pub release_result: Result<Option<String>, String>,
    pub complete_result: Result<String, String>,
    pub release_calls: AtomicUsize,
    pub complete_calls: AtomicUsize,
}

impl FakeChain {
    pub fn happy() -> Self {
        Self::with_results(
            Ok(Some("unwrap-sig".to_string())),
            Ok("complete-sig".to_string()),
        )
    }

    pub fn without_collateral_account() -> Self {
        Self::with_results(Ok(None), Ok("complete-sig".to_string()))
    }

    pub fn release_failure(message: &str) -> Self {
        Self::with_results(Err(message.to_string()), Ok("complete-sig".to_string()))
    }

    pub fn complete_failure(message: &str) -> Self {
        Self::with_results(Ok(Some("unwrap-sig".to_string())), Err(message.to_string()))
    }

    fn with_results(
        release_result: Result<Option<String>, String>,
        complete_result: Result<String, String>,
    ) -> Self {
        Self {
            release_result,
            complete_result,
            release_calls: AtomicUsize::new(0),
            complete_calls: AtomicUsize::new(0),
        }
    }

    pub fn release_call_count(&self) -> usize {
        self.release_calls.load(Ordering::SeqCst)
    }

    pub fn complete_call_count(&self) -> usize {
        self.complete_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VaultChain for FakeChain {
    async fn release_collateral(&self) -> Result<Option<String>, String> {
        self.release_calls.fetch_add(1, Ordering::SeqCst);
        self.release_result.clone()
    }

    async fn complete_withdrawal(
        &self,
        _owner_address: &str,
        _mint_address: &str,
    ) -> Result<String, String> {
        self.complete_calls.fetch_add(1, Ordering::SeqCst);
        self.complete_result.clone()
    }
}

pub struct TestHarness {
    pub app: axum::Router,
    pub pool: Arc<FakePool>,
    pub chain: Arc<FakeChain>,
}

pub fn harness(pool: FakePool, chain: FakeChain) -> TestHarness {
    harness_with_config(test_config(), pool, chain)
}

pub fn harness_with_config(config: AppConfig, pool: FakePool, chain: FakeChain) -> TestHarness {
    let pool = Arc::new(pool);
    let chain = Arc::new(chain);
    let adapters = Adapters {
        pool: pool.clone(),
        chain: chain.clone(),
    };
    let app = build_router(AppState::new(config, None, Some(adapters)));
    TestHarness { app, pool, chain }
}

pub fn router_without_adapters() -> axum::Router {
    build_router(AppState::new(test_config(), None, None))
}

pub async fn post_create(
    app: axum::Router,
    body: &Value,
) -> (http::StatusCode, CreateWithdrawalJobResponse) {
    let request = Request::builder()
        .method("POST")
        .uri("/v1/withdrawal-jobs")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).expect("serialize")))
        .expect("build request");
    let response = app.oneshot(request).await.expect("response");
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    let payload: CreateWithdrawalJobResponse = serde_json::from_slice(&body).expect("parse body");
    (status, payload)
}

pub async fn get_job(
    app: axum::Router,
    job_id: &str,
) -> (http::StatusCode, GetWithdrawalJobResponse) {
    let request = Request::builder()
        .method("GET")
        .uri(format!("/v1/withdrawal-jobs/{job_id}"))
        .body(Body::empty())
        .expect("build request");
    let response = app.oneshot(request).await.expect("response");
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    let payload: GetWithdrawalJobResponse = serde_json::from_slice(&body).expect("parse body");
    (status, payload)
}

pub async fn post_advance(
    app: axum::Router,
    job_id: &str,
) -> (http::StatusCode, AdvanceJobResponse) {
    let request = Request::builder()
        .method("POST")
        .uri(format!("/v1/withdrawal-jobs/{job_id}/advance"))
        .body(Body::empty())
        .expect("build request");
    let response = app.oneshot(request).await.expect("response");
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    let payload: AdvanceJobResponse = serde_json::from_slice(&body).expect("parse body");
    (status, payload)
}

pub async fn get_health(app: axum::Router) -> (http::StatusCode, HealthResponse) {
    let request = Request::builder()
        .method("GET")
        .uri("/v1/withdrawal-jobs/health")
        .body(Body::empty())
        .expect("build request");
    let response = app.oneshot(request).await.expect("response");
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    let payload: HealthResponse = serde_json::from_slice(&body).expect("parse body");
    (status, payload)
}

pub async fn create_job(app: axum::Router) -> String {
    let (status, created) = post_create(app, &valid_create_body()).await;
    assert_eq!(status, http::StatusCode::OK);
    assert!(created.accepted);
    created.job_id
}
