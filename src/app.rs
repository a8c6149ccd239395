use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::AppConfig;
use crate::metrics::Metrics;
use crate::queue::PendingQueue;
use crate::sheets::{AttendanceSink, SheetsLogger};
use crate::web;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub sink: Arc<dyn AttendanceSink>,
    pub pending: PendingQueue,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(config: AppConfig, sink: Arc<dyn AttendanceSink>) -> Self {
        Self {
            config,
            sink,
            pending: PendingQueue::new(),
            metrics: Arc::new(Metrics::default()),
        }
    }
}

pub async fn run() -> Result<()> {
    let config = AppConfig::load().await?;
    info!(
        spreadsheet_id = %config.spreadsheet_id,
        sheet_name = %config.sheet_name,
        credentials_path = %config.credentials_path,
        "config loaded"
    );

    let sink = Arc::new(SheetsLogger::from_config(&config).await?);
    let state = AppState::new(config.clone(), sink);

    let app = build_router(state, &config);

    let addr: std::net::SocketAddr = config.bind_addr.parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!("listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

fn build_router(state: AppState, config: &AppConfig) -> Router {
    web::router(state)
        .layer(CorsLayer::permissive())
        .layer(RequestBodyLimitLayer::new(
            usize::try_from(config.max_body_bytes).unwrap_or(usize::MAX),
        ))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.request_timeout_seconds,
        )))
        .layer(TraceLayer::new_for_http())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate()).expect("sigterm handler");
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
