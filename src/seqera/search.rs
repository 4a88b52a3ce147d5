//! Workflow search API extractor
//!
//! Walks `GET /workflow?search=...&workspaceId=...&offset=...` page by page
//! until the reported `totalSize` is reached.

use super::WorkflowSearchResult;
use crate::client::SeqeraClient;
use crate::etl::Extractor;
use chrono::NaiveDate;
use eyre::Result;
use serde_json::Value;

/// Inclusive range of calendar days, interpreted in UTC.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateRange {
    from: NaiveDate,
    to: NaiveDate,
}

impl DateRange {
    /// # Errors
    /// Returns an error if `from` is later than `to`.
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self> {
        if from > to {
            eyre::bail!("Start date {} is after end date {}", from, to);
        }
        Ok(Self { from, to })
    }

    /// First millisecond of the start day, e.g. `2024-01-01T00:00:00.000Z`
    pub fn min_time(&self) -> String {
        format!("{}T00:00:00.000Z", self.from.format("%Y-%m-%d"))
    }

    /// Last millisecond of the end day, e.g. `2024-01-31T23:59:59.999Z`
    pub fn max_time(&self) -> String {
        format!("{}T23:59:59.999Z", self.to.format("%Y-%m-%d"))
    }
}

/// Search expression for the workflow list endpoint.
///
/// Rendered as space-separated `key:value` tokens. Values are passed
/// through verbatim.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchQuery {
    min_time: String,
    max_time: String,
    user: Option<String>,
    status: Option<String>,
}

impl SearchQuery {
    pub fn new(range: &DateRange) -> Self {
        Self {
            min_time: range.min_time(),
            max_time: range.max_time(),
            user: None,
            status: None,
        }
    }

    /// Restrict to workflows launched by `user`. Blank values are ignored.
    pub fn user(mut self, user: Option<&str>) -> Self {
        self.user = filter_value("user", user);
        self
    }

    /// Restrict to workflows in `status`. Blank values are ignored.
    pub fn status(mut self, status: Option<&str>) -> Self {
        self.status = filter_value("status", status);
        self
    }
}

fn filter_value(key: &str, value: Option<&str>) -> Option<String> {
    let value = value.map(str::trim).filter(|v| !v.is_empty())?;
    if value.contains(|c: char| c.is_whitespace() || c == ':') {
        log::warn!(
            "Search {} '{}' contains whitespace or ':' and is sent unescaped; it may not match",
            key,
            value
        );
    }
    Some(value.to_string())
}

impl std::fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "after:{} before:{}", self.min_time, self.max_time)?;
        if let Some(user) = &self.user {
            write!(f, " user:{}", user)?;
        }
        if let Some(status) = &self.status {
            write!(f, " status:{}", status)?;
        }
        Ok(())
    }
}

/// Extractor for the workflows of one workspace matching a search query
///
/// Requests pages starting at offset 0 and advances the offset by the
/// number of items each page returned. Stops when:
/// - a page request fails (empty result),
/// - the accumulated count reaches the server's `totalSize`, or
/// - a page returns no items, even if `totalSize` was not reached.
pub struct WorkflowSearch {
    client: SeqeraClient,
    workspace_id: String,
    query: SearchQuery,
}

impl WorkflowSearch {
    pub fn new(client: SeqeraClient, workspace_id: &str, query: SearchQuery) -> Self {
        Self {
            client,
            workspace_id: workspace_id.to_string(),
            query,
        }
    }

    async fn fetch_all(&self) -> Result<Vec<Value>> {
        let search = self.query.to_string();
        let mut workflows: Vec<Value> = Vec::new();
        let mut offset = 0usize;

        loop {
            let params = [
                ("search", search.clone()),
                ("workspaceId", self.workspace_id.clone()),
                ("offset", offset.to_string()),
            ];
            let Some(page) = self.client.get("workflow", &params).await? else {
                log::debug!("No search page at offset {}, stopping", offset);
                break;
            };

            let items = page
                .get("workflows")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();
            let total = page.get("totalSize").and_then(Value::as_u64).unwrap_or(0) as usize;
            let received = items.len();
            workflows.extend(items);

            if workflows.len() >= total {
                break;
            }
            if received == 0 {
                log::warn!(
                    "Search in workspace {} reported {} workflow(s) but returned {}; stopping",
                    self.workspace_id,
                    total,
                    workflows.len()
                );
                break;
            }

            offset += received;
        }

        Ok(workflows)
    }
}

impl Extractor for WorkflowSearch {
    type Item = WorkflowSearchResult;

    async fn extract(&self) -> Result<Vec<Self::Item>> {
        let workflows = self.fetch_all().await?;

        log::debug!(
            "Search '{}' matched {} workflow(s) in workspace {}",
            self.query,
            workflows.len(),
            self.workspace_id
        );

        Ok(workflows
            .iter()
            .map(WorkflowSearchResult::from_value)
            .collect())
    }
}
