use std::sync::Arc;

use crate::config::Config;
use academy_core::fees::{FeeService, FeeServiceTrait};
use academy_storage_sqlite::{
    db,
    directory::DirectoryRepository,
    fees::{FeeChallanRepository, FeePaymentRepository, FeePlanRepository},
};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

pub struct AppState {
    pub fee_service: Arc<dyn FeeServiceTrait>,
    /// Student and program lookups. Admissions writes these tables; the API
    /// only reads them.
    pub directory: Arc<DirectoryRepository>,
}

pub fn init_tracing() {
    let log_format = std::env::var("ACADEMY_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let db_path = db::init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);

    let pool = db::create_pool(&db_path)?;
    db::run_migrations(&pool)?;
    let writer = db::spawn_writer((*pool).clone());

    let plan_repository = Arc::new(FeePlanRepository::new(pool.clone(), writer.clone()));
    let challan_repository = Arc::new(FeeChallanRepository::new(pool.clone(), writer.clone()));
    let payment_repository = Arc::new(FeePaymentRepository::new(pool.clone(), writer.clone()));
    let directory = Arc::new(DirectoryRepository::new(pool.clone(), writer));

    let fee_service: Arc<dyn FeeServiceTrait> = Arc::new(FeeService::new(
        plan_repository,
        challan_repository,
        payment_repository,
        directory.clone(),
        directory.clone(),
    ));

    Ok(Arc::new(AppState {
        fee_service,
        directory,
    }))
}
