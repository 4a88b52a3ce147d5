//! Per-workspace IO metrics extractor

use super::{IoMetricsTransformer, SearchQuery, WorkflowIo, WorkflowResponses};
use crate::client::SeqeraClient;
use crate::etl::{Extractor, Transformer};
use eyre::Result;

/// Extractor for the IO metrics of every matching workflow in a workspace
///
/// Searches the workspace, then fetches detail and metrics for each hit in
/// turn. A workflow is kept only when both fetches return data; otherwise
/// it is logged and skipped.
///
/// # Example
/// ```no_run
/// use seqera_io_usage::client::{Auth, SeqeraClient};
/// use seqera_io_usage::etl::Extractor;
/// use seqera_io_usage::seqera::{DateRange, SearchQuery, WorkspaceExtractor};
/// use chrono::NaiveDate;
/// use url::Url;
///
/// # async fn example() -> eyre::Result<()> {
/// let client = SeqeraClient::try_new(
///     Url::parse("https://api.cloud.seqera.io")?,
///     Auth::Bearer("token".to_string()),
/// )?;
/// let range = DateRange::new(
///     NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
/// )?;
/// let query = SearchQuery::new(&range).status(Some("SUCCEEDED"));
///
/// let extractor = WorkspaceExtractor::new(client, "123", "acme", "research", query);
/// let workflows = extractor.extract().await?;
/// # Ok(())
/// # }
/// ```
pub struct WorkspaceExtractor {
    client: SeqeraClient,
    workspace_id: String,
    workspace_name: String,
    query: SearchQuery,
    transformer: IoMetricsTransformer,
}

impl WorkspaceExtractor {
    /// Create a new workspace extractor
    ///
    /// # Arguments
    /// * `client` - Seqera API client
    /// * `workspace_id` - Workspace to search
    /// * `org_name` - Organization name used when a workflow does not name one
    /// * `workspace_name` - Workspace name used when a workflow does not name one
    /// * `query` - Date window and filters for the workflow search
    pub fn new(
        client: SeqeraClient,
        workspace_id: &str,
        org_name: &str,
        workspace_name: &str,
        query: SearchQuery,
    ) -> Self {
        Self {
            client,
            workspace_id: workspace_id.to_string(),
            workspace_name: workspace_name.to_string(),
            query,
            transformer: IoMetricsTransformer::new(org_name, workspace_name),
        }
    }

    async fn fetch_workflow(&self, workflow_id: &str) -> Result<Option<WorkflowResponses>> {
        let details = self
            .client
            .workflow_details(workflow_id, &self.workspace_id)
            .await?;
        let metrics = self
            .client
            .workflow_metrics(workflow_id, &self.workspace_id)
            .await?;

        Ok(match (details, metrics) {
            (Some(details), Some(metrics)) => Some(WorkflowResponses { details, metrics }),
            (details, _) => {
                log::warn!(
                    "Skipping workflow {}: no {} returned",
                    workflow_id,
                    if details.is_none() { "details" } else { "metrics" }
                );
                None
            }
        })
    }
}

impl Extractor for WorkspaceExtractor {
    type Item = WorkflowIo;

    async fn extract(&self) -> Result<Vec<Self::Item>> {
        let hits = self
            .client
            .workflows(&self.workspace_id, &self.query)
            .await?;
        log::info!(
            "Found {} workflows in workspace {}",
            hits.len(),
            self.workspace_name
        );

        let mut collected = Vec::new();
        for hit in hits {
            let Some(workflow_id) = hit.id else {
                log::warn!(
                    "Search result without a workflow ID in workspace {}, skipping",
                    self.workspace_id
                );
                continue;
            };

            if let Some(responses) = self.fetch_workflow(&workflow_id).await? {
                collected.push(self.transformer.transform(responses)?);
                log::info!("Collected IO metrics for workflow {}", workflow_id);
            }
        }

        Ok(collected)
    }
}
