use crate::config::environment::AppConfig;
use crate::infra::InfraClients;
use crate::module::withdrawal_job::crud::JobStore;
use crate::module::withdrawal_job::route::register_routes;
use crate::service::chain_service::{HttpVaultChain, VaultChain};
use crate::service::pool_service::{HttpShieldedPool, ShieldedPool};
use axum::Router;
use axum::http::Method;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};

/// Collaborator handles, constructed once per process and injected so tests
/// can swap in fakes. `None` means the gateway base urls are unconfigured and
/// the advance operation is unavailable.
#[derive(Clone)]
pub struct Adapters {
    pub pool: Arc<dyn ShieldedPool>,
    pub chain: Arc<dyn VaultChain>,
}

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub store: Arc<JobStore>,
    pub adapters: Option<Adapters>,
}

impl AppState {
    pub fn new(config: AppConfig, infra: Option<InfraClients>, adapters: Option<Adapters>) -> Self {
        let store = Arc::new(JobStore::from_infra(infra.as_ref()));
        Self {
            config,
            store,
            adapters,
        }
    }
}

pub fn init_adapters(config: &AppConfig) -> Result<Option<Adapters>, String> {
    let (Some(pool_url), Some(chain_url)) = (
        &config.pool_gateway_base_url,
        &config.chain_executor_base_url,
    ) else {
        return Ok(None);
    };

    let timeout = Duration::from_secs(config.adapter_timeout_seconds.max(1) as u64);
    let pool = HttpShieldedPool::new(pool_url, timeout)?;
    let chain = HttpVaultChain::new(chain_url, timeout)?;
    Ok(Some(Adapters {
        pool: Arc::new(pool),
        chain: Arc::new(chain),
    }))
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin([
            "http://localhost:3000".parse().expect("valid origin"),
            "http://127.0.0.1:3000".parse().expect("valid origin"),
        ])
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    register_routes(state).layer(cors)
}
