mod app;
mod config;
mod error;
mod metrics;
mod model;
mod queue;
mod sheets;
mod web;

pub use app::AppState;
pub use config::AppConfig;
pub use error::AppError;
pub use metrics::Metrics;
pub use queue::PendingQueue;
pub use sheets::{AttendanceSink, SheetsLogger};
pub use web::router;

pub async fn run() -> anyhow::Result<()> {
    app::run().await
}
