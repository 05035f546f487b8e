//! Periodic financial summary emails.
//!
//! A [`ReportScheduler`] fans a per-user job out over every active user on a
//! fixed interval; admins can also trigger a run on demand.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | POST | `/api/admin/reports/dispatch` | Queue reports for all active users |

pub mod dtos;
pub mod handlers;
pub mod period;
pub mod routes;
pub mod services;
pub mod workers;

pub use services::{ReportDispatcher, SummaryReportService};
pub use workers::ReportScheduler;
