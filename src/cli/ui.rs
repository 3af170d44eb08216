use colored::*;

use crate::import::{LogReporter, ReportLevel, ReportLine, Reporter};

/// Prints report lines to the terminal and mirrors them into the log
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn report(&self, line: &ReportLine) {
        match line.level {
            ReportLevel::Info => println!("{}", line.message),
            ReportLevel::Warn => println!("{} {}", "!".bright_yellow().bold(), line.message.yellow()),
        }
        LogReporter.report(line);
    }
}
