//! Where human-readable progress and import results go

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportLevel {
    Info,
    Warn,
}

/// One line of output for the operator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLine {
    pub level: ReportLevel,
    pub message: String,
}

impl ReportLine {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: ReportLevel::Info,
            message: message.into(),
        }
    }

    pub fn warn(message: impl Into<String>) -> Self {
        Self {
            level: ReportLevel::Warn,
            message: message.into(),
        }
    }
}

impl fmt::Display for ReportLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

pub trait Reporter: Send + Sync {
    fn report(&self, line: &ReportLine);
}

/// Sends every line to the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn report(&self, line: &ReportLine) {
        match line.level {
            ReportLevel::Info => log::info!("{}", line.message),
            ReportLevel::Warn => log::warn!("{}", line.message),
        }
    }
}
