//! Console summary of a run

use crate::seqera::{UNKNOWN, WorkflowSummary};
use std::collections::BTreeMap;
use std::fmt;

const UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];

/// Format a byte count with 1024-based units and two decimals.
///
/// ```
/// use seqera_io_usage::report::bytes_to_readable;
///
/// assert_eq!(bytes_to_readable(0.0), "0 B");
/// assert_eq!(bytes_to_readable(1536.0), "1.50 KB");
/// ```
pub fn bytes_to_readable(bytes: f64) -> String {
    if bytes == 0.0 {
        return "0 B".to_string();
    }

    let mut value = bytes;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.2} {}", value, UNITS[unit])
}

/// IO totals of the workflows launched by one user.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UserUsage {
    pub user: String,
    pub workflows: usize,
    pub read_bytes: f64,
    pub write_bytes: f64,
}

impl UserUsage {
    pub fn total_bytes(&self) -> f64 {
        self.read_bytes + self.write_bytes
    }
}

/// Totals across every collected workflow, with a per-user breakdown.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UsageSummary {
    pub workflows: usize,
    pub read_bytes: f64,
    pub write_bytes: f64,
    /// One entry per distinct user, sorted by name
    pub by_user: Vec<UserUsage>,
}

impl UsageSummary {
    pub fn from_workflows(workflows: &[WorkflowSummary]) -> Self {
        let mut users: BTreeMap<&str, UserUsage> = BTreeMap::new();
        for workflow in workflows {
            let user = workflow.user_name.as_deref().unwrap_or(UNKNOWN);
            let usage = users.entry(user).or_insert_with(|| UserUsage {
                user: user.to_string(),
                ..Default::default()
            });
            usage.workflows += 1;
            usage.read_bytes += workflow.total_read_bytes;
            usage.write_bytes += workflow.total_write_bytes;
        }

        Self {
            workflows: workflows.len(),
            read_bytes: workflows.iter().map(|w| w.total_read_bytes).sum(),
            write_bytes: workflows.iter().map(|w| w.total_write_bytes).sum(),
            by_user: users.into_values().collect(),
        }
    }

    pub fn total_bytes(&self) -> f64 {
        self.read_bytes + self.write_bytes
    }
}

impl fmt::Display for UsageSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "IO Metrics Summary:")?;
        writeln!(f, "Total workflows analyzed: {}", self.workflows)?;
        writeln!(f, "Total read volume: {}", bytes_to_readable(self.read_bytes))?;
        writeln!(f, "Total write volume: {}", bytes_to_readable(self.write_bytes))?;
        writeln!(f, "Total IO volume: {}", bytes_to_readable(self.total_bytes()))?;

        if self.by_user.len() > 1 {
            writeln!(f)?;
            writeln!(f, "IO Metrics by User:")?;
            for usage in &self.by_user {
                writeln!(f, "User: {}", usage.user)?;
                writeln!(f, "  Workflows: {}", usage.workflows)?;
                writeln!(f, "  Read: {}", bytes_to_readable(usage.read_bytes))?;
                writeln!(f, "  Write: {}", bytes_to_readable(usage.write_bytes))?;
                writeln!(f, "  Total: {}", bytes_to_readable(usage.total_bytes()))?;
            }
        }

        Ok(())
    }
}
