use crate::cli::ServeArgs;
use crate::infra::{sample_applicants, sample_houses, seed_principal, AppState};
use crate::routes::with_allocation_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use homealloc::config::AppConfig;
use homealloc::error::AppError;
use homealloc::telemetry;
use homealloc::workflows::allocation::{AllocationService, InMemoryAllocationStore};
use homealloc::workflows::inventory::InventoryImporter;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = Arc::new(InMemoryAllocationStore::new());
    let allocation_service = Arc::new(AllocationService::new(store, config.allocation.clone())?);

    if args.seed_sample_data {
        let summary = InventoryImporter::seed(
            &allocation_service,
            &seed_principal(),
            sample_houses()?,
            sample_applicants()?,
        )?;
        info!(
            houses = summary.houses,
            applicants = summary.applicants,
            "sample data loaded"
        );
    }

    let app = with_allocation_routes(allocation_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        match_threshold = config.allocation.batch.match_threshold,
        "housing allocation service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
