mod fan_out;
mod report_dispatcher;
mod summary_report_service;

pub use fan_out::{FanOutSummary, UserReportJob};
pub use report_dispatcher::ReportDispatcher;
pub use summary_report_service::SummaryReportService;
