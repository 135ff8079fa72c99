pub mod chain_service;
pub mod metrics_service;
pub mod pool_service;
pub mod step_service;
pub mod sweep_service;
pub mod validation_service;
