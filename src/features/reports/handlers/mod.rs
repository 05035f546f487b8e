pub mod report_handler;

pub use report_handler::{__path_dispatch_reports, dispatch_reports};
