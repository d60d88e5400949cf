use crate::cli::ServeArgs;
use crate::infra::{file_context, AppState};
use crate::routes::with_calendar_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use cafe_shift::config::AppConfig;
use cafe_shift::error::AppError;
use cafe_shift::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{error, info};

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

    let context = file_context(&config)?;
    let remote_configured = context.loader.has_remote();
    match context.loader.load().await {
        Ok(snapshot) => info!(
            count = snapshot.len(),
            source = ?snapshot.source,
            "initial shift snapshot loaded"
        ),
        // Serve an empty calendar; POST /api/v1/shifts/refresh can recover.
        Err(err) => error!(error = %err, "initial shift load failed"),
    }

    let app = with_calendar_routes(context)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        remote = remote_configured,
        "shift calendar service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
