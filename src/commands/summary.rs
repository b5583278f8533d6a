//! Per-batch success and failure bookkeeping.

use crate::error::{FleetError, Result};

/// Succeeded and failed projects of one batch operation.
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub title: String,
    pub succeeded: Vec<String>,
    pub failed: Vec<(String, String)>,
}

impl BatchSummary {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Record one project's result, printing failures as they happen.
    pub fn record(&mut self, project: &str, result: Result<()>) {
        match result {
            Ok(()) => self.succeeded.push(project.to_string()),
            Err(e) => {
                eprintln!("[{}] {}", project, e);
                self.failed.push((project.to_string(), e.to_string()));
            }
        }
    }

    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    pub fn print(&self) {
        println!("\n=== {} ===", self.title);
        println!("Succeeded: {}", self.succeeded.len());
        println!("Failed: {}", self.failed.len());
        println!("Total: {}", self.total());
        for (project, reason) in &self.failed {
            println!("  FAILED {}: {}", project, reason);
        }
    }

    /// `Err` naming the failure count when any project failed.
    pub fn into_result(self) -> Result<()> {
        if self.failed.is_empty() {
            Ok(())
        } else {
            Err(FleetError::UserError(format!(
                "{}: {} of {} project(s) failed",
                self.title,
                self.failed.len(),
                self.total()
            )))
        }
    }
}
