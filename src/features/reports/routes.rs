use std::sync::Arc;

use axum::{routing::post, Router};

use crate::features::reports::handlers;
use crate::features::reports::services::ReportDispatcher;

/// Admin routes for on-demand report runs, nested under `/api/admin`
pub fn admin_routes(dispatcher: Arc<ReportDispatcher>) -> Router {
    Router::new()
        .route("/reports/dispatch", post(handlers::dispatch_reports))
        .with_state(dispatcher)
}
