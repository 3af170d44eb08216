//! Solution import, publishing and import job reporting

pub mod customizations;
pub mod diagnostics;
pub mod job_log;
pub mod naming;
pub mod report;

pub use customizations::{publish_customizations, ImportCustomizations, ImportOptions};
pub use job_log::{output_import_job_data, ComponentFailure, ComponentScope, ImportJobLog};
pub use naming::split_node_name;
pub use report::{LogReporter, ReportLevel, ReportLine, Reporter};
