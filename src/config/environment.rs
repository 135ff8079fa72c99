use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub rust_env: String,
    pub api_host: String,
    pub api_port: u16,
    pub job_db_path: Option<String>,
    pub job_ttl_seconds: i64,
    pub sweeper_enabled: bool,
    pub sweep_interval_seconds: i64,
    pub pool_gateway_base_url: Option<String>,
    pub chain_executor_base_url: Option<String>,
    pub adapter_timeout_seconds: i64,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        load_dotenv_layers();
        Ok(Self {
            rust_env: read_var("RUST_ENV")?,
            api_host: read_var("API_HOST")?,
            api_port: read_var("API_PORT")?
                .parse::<u16>()
                .map_err(|e| format!("invalid API_PORT: {e}"))?,
            job_db_path: env::var("JOB_DB_PATH").ok(),
            job_ttl_seconds: read_optional_i64("JOB_TTL_SECONDS", 3600)?,
            sweeper_enabled: read_optional_bool("SWEEPER_ENABLED", true),
            sweep_interval_seconds: read_optional_i64("SWEEP_INTERVAL_SECONDS", 60)?,
            pool_gateway_base_url: env::var("POOL_GATEWAY_BASE_URL").ok(),
            chain_executor_base_url: env::var("CHAIN_EXECUTOR_BASE_URL").ok(),
            adapter_timeout_seconds: read_optional_i64("ADAPTER_TIMEOUT_SECONDS", 45)?,
        })
    }
}

fn read_var(key: &str) -> Result<String, String> {
    env::var(key).map_err(|_| format!("missing required env var: {key}"))
}

fn read_optional_i64(key: &str, default: i64) -> Result<i64, String> {
    match env::var(key) {
        Ok(v) => v.parse::<i64>().map_err(|e| format!("invalid {key}: {e}")),
        Err(_) => Ok(default),
    }
}

fn read_optional_bool(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(v) => matches!(v.as_str(), "1" | "true" | "TRUE" | "yes" | "YES"),
        Err(_) => default,
    }
}

fn load_dotenv_layers() {
    for path in [".env", "../.env", "../../.env"] {
        let _ = dotenvy::from_path_override(path);
    }
}
