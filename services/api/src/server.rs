use crate::cli::ServeArgs;
use crate::infra::{insight_provider, AppState, InMemoryElectionRepository};
use crate::routes::with_service_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use club_elections::config::AppConfig;
use club_elections::election::ElectionService;
use club_elections::error::AppError;
use club_elections::telemetry;
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

    let repository = Arc::new(InMemoryElectionRepository::seeded_from(
        config.store.snapshot_path.as_deref(),
    )?);
    let election_service = Arc::new(ElectionService::new(
        repository,
        insight_provider(config.insights.enabled),
    ));

    let app = with_service_routes(election_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "club election service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
