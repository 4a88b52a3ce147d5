//! IO metrics extraction
//!
//! Flattens one workflow's detail and metrics responses into a summary row
//! and one row per process.

use super::{ProcessMetric, ProcessRecord, UNKNOWN, WorkflowDetail, WorkflowIo, WorkflowSummary};
use crate::etl::Transformer;
use eyre::Result;
use serde_json::Value;

/// Build the summary and process rows for one workflow.
///
/// The organization and workspace names embedded in `detail` take
/// precedence over `org_name` and `workspace_name`. Totals are the sums of
/// each process's mean read and write bytes, and
/// `total_io_bytes = total_read_bytes + total_write_bytes`.
pub fn extract_io_metrics(
    detail: &WorkflowDetail,
    metrics: &[ProcessMetric],
    org_name: &str,
    workspace_name: &str,
) -> WorkflowIo {
    let mut total_read_bytes = 0.0;
    let mut total_write_bytes = 0.0;

    let processes: Vec<ProcessRecord> = metrics
        .iter()
        .map(|metric| {
            total_read_bytes += metric.mean_read_bytes;
            total_write_bytes += metric.mean_write_bytes;
            ProcessRecord {
                workflow_id: detail.id.clone(),
                process_name: metric.process.clone(),
                read_bytes: metric.mean_read_bytes,
                write_bytes: metric.mean_write_bytes,
                total_bytes: metric.mean_read_bytes + metric.mean_write_bytes,
            }
        })
        .collect();

    let summary = WorkflowSummary {
        workflow_id: detail.id.clone(),
        workflow_name: detail.run_name.clone(),
        status: detail.status.clone(),
        user_name: detail.user_name.clone(),
        start_time: detail.start.clone(),
        end_time: detail.complete.clone(),
        total_read_bytes,
        total_write_bytes,
        total_io_bytes: total_read_bytes + total_write_bytes,
        organization_name: detail
            .org_name
            .clone()
            .unwrap_or_else(|| org_name.to_string()),
        workspace_name: detail
            .workspace_name
            .clone()
            .unwrap_or_else(|| workspace_name.to_string()),
    };

    WorkflowIo { summary, processes }
}

/// Raw `workflow/{id}` and `workflow/{id}/metrics` payloads of one workflow.
#[derive(Clone, Debug)]
pub struct WorkflowResponses {
    pub details: Value,
    pub metrics: Value,
}

/// Transformer from raw workflow responses to IO rows, for one workspace.
///
/// Carries the fallback organization and workspace names used when the
/// detail response does not name them.
pub struct IoMetricsTransformer {
    org_name: String,
    workspace_name: String,
}

impl IoMetricsTransformer {
    pub fn new(org_name: impl Into<String>, workspace_name: impl Into<String>) -> Self {
        Self {
            org_name: org_name.into(),
            workspace_name: workspace_name.into(),
        }
    }
}

impl Default for IoMetricsTransformer {
    fn default() -> Self {
        Self::new(UNKNOWN, UNKNOWN)
    }
}

impl Transformer for IoMetricsTransformer {
    type Input = WorkflowResponses;
    type Output = WorkflowIo;

    fn transform(&self, input: Self::Input) -> Result<Self::Output> {
        let detail = WorkflowDetail::from_response(&input.details);
        let metrics = ProcessMetric::from_response(&input.metrics);
        Ok(extract_io_metrics(
            &detail,
            &metrics,
            &self.org_name,
            &self.workspace_name,
        ))
    }
}
