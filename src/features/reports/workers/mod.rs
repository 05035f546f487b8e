mod report_scheduler;

pub use report_scheduler::ReportScheduler;
