//! Entities read from, and rows derived from, the Seqera API

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Display name used when an organization or workspace cannot be resolved.
pub const UNKNOWN: &str = "Unknown";

/// Top-level tenant grouping workspaces (`GET /orgs`).
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct Organization {
    #[serde(rename = "orgId", default, deserialize_with = "lenient_id")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
}

/// Project container holding workflows (`GET /orgs/{id}/workspaces`).
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct Workspace {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    /// Parent organization, filled in by the client
    #[serde(skip)]
    pub org_id: Option<String>,
    #[serde(skip)]
    pub org_name: Option<String>,
}

/// One hit of the paginated workflow search.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WorkflowSearchResult {
    pub id: Option<String>,
}

impl WorkflowSearchResult {
    pub fn from_value(value: &Value) -> Self {
        Self {
            id: value
                .get("workflow")
                .and_then(|w| w.get("id"))
                .and_then(id_string),
        }
    }
}

/// The fields of `GET /workflow/{id}` that end up in the summary table.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WorkflowDetail {
    pub id: Option<String>,
    pub run_name: Option<String>,
    pub status: Option<String>,
    pub user_name: Option<String>,
    pub start: Option<String>,
    pub complete: Option<String>,
    /// Names embedded in the response; they win over caller-supplied ones.
    pub org_name: Option<String>,
    pub workspace_name: Option<String>,
}

impl WorkflowDetail {
    /// Read a workflow detail response. Missing or mistyped fields are `None`.
    pub fn from_response(response: &Value) -> Self {
        let workflow = response.get("workflow");
        let field = |key: &str| workflow.and_then(|w| w.get(key));
        let text = |v: Option<&Value>| v.and_then(Value::as_str).map(String::from);

        Self {
            id: field("id").and_then(id_string),
            run_name: text(field("runName")),
            status: text(field("status")),
            user_name: text(field("userName")),
            start: text(field("start")),
            complete: text(field("complete")),
            org_name: text(response.get("orgName")),
            workspace_name: text(response.get("workspaceName")),
        }
    }
}

/// Mean IO of one pipeline step, from `GET /workflow/{id}/metrics`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProcessMetric {
    pub process: String,
    pub mean_read_bytes: f64,
    pub mean_write_bytes: f64,
}

impl ProcessMetric {
    /// Read one entry of the `metrics` array.
    ///
    /// An absent or null `reads`/`writes` object means no IO was recorded
    /// and counts as 0, as does a missing, negative or non-numeric `mean`.
    pub fn from_value(value: &Value) -> Self {
        Self {
            process: value
                .get("process")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            mean_read_bytes: mean_of(value.get("reads")),
            mean_write_bytes: mean_of(value.get("writes")),
        }
    }

    /// Read every entry of a metrics response, in response order.
    pub fn from_response(response: &Value) -> Vec<Self> {
        response
            .get("metrics")
            .and_then(Value::as_array)
            .map(|metrics| metrics.iter().map(Self::from_value).collect())
            .unwrap_or_default()
    }
}

fn mean_of(stats: Option<&Value>) -> f64 {
    match stats {
        Some(stats) if !stats.is_null() => stats
            .get("mean")
            .and_then(Value::as_f64)
            .filter(|mean| mean.is_finite() && *mean >= 0.0)
            .unwrap_or(0.0),
        _ => 0.0,
    }
}

/// One row of the workflow summary table.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct WorkflowSummary {
    pub workflow_id: Option<String>,
    pub workflow_name: Option<String>,
    pub status: Option<String>,
    pub user_name: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub total_read_bytes: f64,
    pub total_write_bytes: f64,
    pub total_io_bytes: f64,
    pub organization_name: String,
    pub workspace_name: String,
}

/// One row of the process-level table.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ProcessRecord {
    pub workflow_id: Option<String>,
    pub process_name: String,
    pub read_bytes: f64,
    pub write_bytes: f64,
    pub total_bytes: f64,
}

/// Everything extracted from a single workflow.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WorkflowIo {
    pub summary: WorkflowSummary,
    pub processes: Vec<ProcessRecord>,
}

/// The two output tables of a run, in visit order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IoReport {
    pub workflows: Vec<WorkflowSummary>,
    pub processes: Vec<ProcessRecord>,
}

impl IoReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, io: WorkflowIo) {
        self.workflows.push(io.summary);
        self.processes.extend(io.processes);
    }

    pub fn is_empty(&self) -> bool {
        self.workflows.is_empty()
    }
}

impl Extend<WorkflowIo> for IoReport {
    fn extend<I: IntoIterator<Item = WorkflowIo>>(&mut self, iter: I) {
        for io in iter {
            self.push(io);
        }
    }
}

/// Parse the array under `key` of a list response, skipping bad entries.
pub fn parse_list<T: DeserializeOwned>(response: Option<&Value>, key: &str) -> Vec<T> {
    let Some(items) = response.and_then(|r| r.get(key)).and_then(Value::as_array) else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| match T::deserialize(item) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                log::warn!("Skipping malformed entry in '{}': {}", key, e);
                None
            }
        })
        .collect()
}

/// Ids arrive as JSON numbers (orgs, workspaces) or strings (workflows).
fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn lenient_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?
        .as_ref()
        .and_then(id_string))
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_organizations() {
        let response = json!({
            "organizations": [
                {"orgId": 1, "name": "acme"},
                {"orgId": "2", "name": null},
                {"name": "no-id"},
                42
            ],
            "totalSize": 4
        });

        let orgs: Vec<Organization> = parse_list(Some(&response), "organizations");
        assert_eq!(orgs.len(), 3);
        assert_eq!(orgs[0].id.as_deref(), Some("1"));
        assert_eq!(orgs[0].name.as_deref(), Some("acme"));
        assert_eq!(orgs[1].id.as_deref(), Some("2"));
        assert_eq!(orgs[1].name, None);
        assert_eq!(orgs[2].id, None);
    }

    #[test]
    fn test_parse_list_missing_key() {
        let orgs: Vec<Organization> = parse_list(Some(&json!({"other": []})), "organizations");
        assert!(orgs.is_empty());
        let orgs: Vec<Organization> = parse_list(None, "organizations");
        assert!(orgs.is_empty());
    }

    #[test]
    fn test_search_result_id() {
        let hit = WorkflowSearchResult::from_value(&json!({"workflow": {"id": "4Bi5xBK6E2Nbhj"}}));
        assert_eq!(hit.id.as_deref(), Some("4Bi5xBK6E2Nbhj"));
        assert_eq!(WorkflowSearchResult::from_value(&json!({"workflow": {}})).id, None);
    }

    #[test]
    fn test_process_metric_defaults() {
        let metric = ProcessMetric::from_value(&json!({
            "process": "FASTQC",
            "reads": null,
            "writes": {"min": 1}
        }));
        assert_eq!(metric.process, "FASTQC");
        assert_eq!(metric.mean_read_bytes, 0.0);
        assert_eq!(metric.mean_write_bytes, 0.0);

        let metric = ProcessMetric::from_value(&json!({
            "reads": {"mean": -5},
            "writes": {"mean": "lots"}
        }));
        assert_eq!(metric.process, "");
        assert_eq!(metric.mean_read_bytes, 0.0);
        assert_eq!(metric.mean_write_bytes, 0.0);
    }

    #[test]
    fn test_workflow_detail_tolerates_missing_fields() {
        let detail = WorkflowDetail::from_response(&json!({"workflow": {"id": "w1", "status": 3}}));
        assert_eq!(detail.id.as_deref(), Some("w1"));
        assert_eq!(detail.status, None);
        assert_eq!(detail.org_name, None);

        assert_eq!(WorkflowDetail::from_response(&json!({})), WorkflowDetail::default());
    }

    #[test]
    fn test_report_push_keeps_order() {
        let mut report = IoReport::new();
        assert!(report.is_empty());

        for id in ["a", "b"] {
            report.push(WorkflowIo {
                summary: WorkflowSummary {
                    workflow_id: Some(id.to_string()),
                    ..Default::default()
                },
                processes: vec![ProcessRecord {
                    workflow_id: Some(id.to_string()),
                    ..Default::default()
                }],
            });
        }

        let ids: Vec<_> = report
            .workflows
            .iter()
            .map(|w| w.workflow_id.as_deref())
            .collect();
        assert_eq!(ids, vec![Some("a"), Some("b")]);
        assert_eq!(report.processes.len(), 2);
        assert!(!report.is_empty());
    }
}
