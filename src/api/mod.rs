//! REST API over the dashboard pipeline.
//!
//! - `GET /machines`, `GET /machines/{id}/consumption`, `GET /machines/{id}/table`
//! - `GET /ideal-values`, `GET /ideal-values/summary`
//! - `GET /summary`, `GET /overview`
//! - `POST /reports`, `POST /reports/csv`

mod handlers;
mod types;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};

use crate::config::TableConfig;
use crate::source::DataSource;

pub use types::{ErrorResponse, TablePage, TableQuery};

/// Application state shared across all request handlers.
///
/// Read-only after startup, so it is shared behind an `Arc` without locks.
pub struct AppState<S> {
    pub source: S,
    /// Default and offered page sizes.
    pub table: TableConfig,
}

/// Builds the axum router with all API routes.
pub fn router<S>(state: Arc<AppState<S>>) -> Router
where
    S: DataSource + Send + Sync + 'static,
{
    Router::new()
        .route("/machines", get(handlers::list_machines::<S>))
        .route("/machines/{id}/consumption", get(handlers::machine_consumption::<S>))
        .route("/machines/{id}/table", get(handlers::consumption_table::<S>))
        .route("/ideal-values", get(handlers::ideal_values::<S>))
        .route("/ideal-values/summary", get(handlers::ideal_value_summary::<S>))
        .route("/summary", get(handlers::summary::<S>))
        .route("/overview", get(handlers::overview::<S>))
        .route("/reports", post(handlers::generate_report::<S>))
        .route("/reports/csv", post(handlers::download_report_csv::<S>))
        .with_state(state)
}

/// Binds to the given address and serves the API.
///
/// # Errors
///
/// Returns an error if the listener cannot bind to `addr` or the server
/// stops with an I/O failure.
pub async fn serve<S>(state: Arc<AppState<S>>, addr: SocketAddr) -> std::io::Result<()>
where
    S: DataSource + Send + Sync + 'static,
{
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("API server listening on http://{addr}");
    axum::serve(listener, app).await
}
