use crate::config::environment::AppConfig;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct InfraClients {
    pub job_db: sled::Db,
}

/// Opens the durable job database when `JOB_DB_PATH` is configured.
/// Without a path the store falls back to its in-memory backend, which is
/// fine for tests but loses jobs on restart.
pub fn init_infra(config: &AppConfig) -> Result<Option<InfraClients>, String> {
    let Some(path) = &config.job_db_path else {
        return Ok(None);
    };

    let path_ref = Path::new(path);
    if let Some(parent) = path_ref.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("job db dir create failed at {}: {e}", parent.display()))?;
        }
    }
    let job_db =
        sled::open(path_ref).map_err(|e| format!("job db open failed at {path}: {e}"))?;
    Ok(Some(InfraClients { job_db }))
}
