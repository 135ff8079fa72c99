use tokio::net::TcpListener;
use tracing::{error, info, warn};
use withdrawal_job_engine::app::{AppState, build_router, init_adapters};
use withdrawal_job_engine::config::environment::AppConfig;
use withdrawal_job_engine::infra::init_infra;
use withdrawal_job_engine::service::sweep_service;

#[tokio::main]
async fn main() {
    init_logging();

    let config = match AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "config error");
            std::process::exit(1);
        }
    };

    let bind_addr = format!("{}:{}", config.api_host, config.api_port);
    let listener = match TcpListener::bind(&bind_addr).await {
        Ok(l) => l,
        Err(e) => {
            error!(error = %e, bind_addr = %bind_addr, "server bind error");
            std::process::exit(1);
        }
    };

    info!(
        env = %config.rust_env,
        host = %config.api_host,
        port = config.api_port,
        job_ttl_seconds = config.job_ttl_seconds,
        durable_store = config.job_db_path.is_some(),
        pool_gateway_configured = config.pool_gateway_base_url.is_some(),
        chain_executor_configured = config.chain_executor_base_url.is_some(),
        "withdrawal-job-engine started"
    );

    let infra = match init_infra(&config) {
        Ok(i) => i,
        Err(e) => {
            warn!(error = %e, "job db init failed; falling back to in-memory store");
            None
        }
    };
    let adapters = match init_adapters(&config) {
        Ok(a) => a,
        Err(e) => {
            warn!(error = %e, "adapter init failed; advance disabled");
            None
        }
    };
    if adapters.is_none() {
        warn!("pool/chain gateway base urls not configured; jobs can be created but not advanced");
    }

    let state = AppState::new(config, infra, adapters);
    if state.config.sweeper_enabled {
        let sweeper_state = state.clone();
        tokio::spawn(sweep_service::run_sweeper(sweeper_state));
    }
    let app = build_router(state);
    if let Err(e) = axum::serve(listener, app).await {
        error!(error = %e, "server runtime error");
        std::process::exit(1);
    }
}

fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
