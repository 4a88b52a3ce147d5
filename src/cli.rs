//! CLI helper functions

use crate::{
    client::{Auth, SeqeraClient},
    etl::{Extractor, Loader},
    report::UsageSummary,
    seqera::{
        DateRange, IoReport, ProcessRecord, SearchQuery, UNKNOWN, WorkflowSummary,
        WorkspaceExtractor,
    },
    storage::CsvWriter,
};
use chrono::NaiveDate;
use eyre::{Context, Result};
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};
use url::Url;

/// API endpoint used when neither `--endpoint` nor `TOWER_API_ENDPOINT` is set
pub const DEFAULT_API_ENDPOINT: &str = "https://api.cloud.seqera.io";

/// Summary CSV written when `--output` is not given
pub const DEFAULT_OUTPUT: &str = "io_metrics.csv";

/// Options of a single IO metrics run.
#[derive(Clone, Debug)]
pub struct RunOptions {
    /// First day to include
    pub from: NaiveDate,
    /// Last day to include; today (UTC) when `None`
    pub to: Option<NaiveDate>,
    /// Summary CSV path; process rows go to `process_<file name>` beside it
    pub output: PathBuf,
    /// Restrict the run to one workspace
    pub workspace_id: Option<String>,
    pub user: Option<String>,
    pub status: Option<String>,
    /// Overrides `TOWER_API_ENDPOINT`
    pub endpoint: Option<String>,
}

/// Which workspaces a run visits.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Scope {
    /// One workspace, by id
    Workspace(String),
    /// Every workspace of every organization
    All,
}

impl Scope {
    pub fn from_workspace_id(workspace_id: Option<&str>) -> Self {
        match workspace_id.map(str::trim) {
            Some(id) if !id.is_empty() => Self::Workspace(id.to_string()),
            _ => Self::All,
        }
    }
}

/// Load the Seqera client from the command line and environment variables
///
/// Expected environment variables:
/// - TOWER_ACCESS_TOKEN: Personal access token (required)
/// - TOWER_API_ENDPOINT: API base URL (optional, defaults to
///   `https://api.cloud.seqera.io`; `endpoint` takes precedence)
pub fn load_seqera_client(endpoint: Option<&str>) -> Result<SeqeraClient> {
    let url_str = match endpoint {
        Some(endpoint) => endpoint.to_string(),
        None => std::env::var("TOWER_API_ENDPOINT")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_ENDPOINT.to_string()),
    };
    let url =
        Url::parse(&url_str).with_context(|| format!("Invalid API endpoint: {}", url_str))?;

    let auth = Auth::from_token(std::env::var("TOWER_ACCESS_TOKEN").ok());
    if let Auth::None = auth {
        eyre::bail!("Environment variable TOWER_ACCESS_TOKEN is not set");
    }

    SeqeraClient::try_new(url, auth).context("Failed to create Seqera client")
}

/// Path of the process-level table for a given summary table path.
///
/// `reports/io.csv` becomes `reports/process_io.csv`.
pub fn process_output_path(output: &Path) -> PathBuf {
    match output.file_name() {
        Some(name) => output.with_file_name(format!("process_{}", name.to_string_lossy())),
        None => PathBuf::from(format!("process_{}", output.display())),
    }
}

/// Resolve the organization and workspace names of a workspace id.
///
/// Scans every organization's workspaces and returns the first match, or
/// `("Unknown", "Unknown")` when the id is not listed anywhere.
pub async fn resolve_workspace_names(
    client: &SeqeraClient,
    workspace_id: &str,
) -> Result<(String, String)> {
    for org in client.organizations().await? {
        for workspace in client.workspaces(&org).await? {
            if workspace.id.as_deref() == Some(workspace_id) {
                let org_name = workspace.org_name.unwrap_or_else(|| UNKNOWN.to_string());
                let workspace_name = workspace.name.unwrap_or_else(|| UNKNOWN.to_string());
                log::info!(
                    "Workspace {} is {} / {}",
                    workspace_id,
                    org_name,
                    workspace_name
                );
                return Ok((org_name, workspace_name));
            }
        }
    }

    log::warn!(
        "Workspace {} not found in any organization, names will be '{}'",
        workspace_id,
        UNKNOWN
    );
    Ok((UNKNOWN.to_string(), UNKNOWN.to_string()))
}

/// Collect the IO metrics of every workflow in `scope` matching `query`
///
/// Workspaces are visited one at a time, in listing order, and their rows
/// appended to a single report.
pub async fn collect_io_metrics(
    client: &SeqeraClient,
    scope: &Scope,
    query: &SearchQuery,
) -> Result<IoReport> {
    let mut report = IoReport::new();

    match scope {
        Scope::Workspace(workspace_id) => {
            log::info!("Processing only workspace ID: {}", workspace_id);
            let (org_name, workspace_name) =
                resolve_workspace_names(client, workspace_id).await?;
            let extractor = WorkspaceExtractor::new(
                client.clone(),
                workspace_id,
                &org_name,
                &workspace_name,
                query.clone(),
            );
            report.extend(extractor.extract().await?);
        }
        Scope::All => {
            for org in client.organizations().await? {
                let org_name = org.name.clone().unwrap_or_else(|| UNKNOWN.to_string());
                for workspace in client.workspaces(&org).await? {
                    let workspace_name =
                        workspace.name.unwrap_or_else(|| UNKNOWN.to_string());
                    let Some(workspace_id) = workspace.id else {
                        log::warn!("Workspace {} has no ID, skipping", workspace_name);
                        continue;
                    };

                    let extractor = WorkspaceExtractor::new(
                        client.clone(),
                        &workspace_id,
                        &org_name,
                        &workspace_name,
                        query.clone(),
                    );
                    report.extend(extractor.extract().await?);
                }
            }
        }
    }

    log::info!(
        "Collected {} workflow(s) and {} process record(s)",
        report.workflows.len(),
        report.processes.len()
    );

    Ok(report)
}

/// Write the report tables next to each other
///
/// The summary table goes to `output`. The process table is written only
/// when there is at least one process row.
///
/// Returns the paths written.
pub async fn export_report(report: IoReport, output: &Path) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    let summary_writer: CsvWriter<WorkflowSummary> = CsvWriter::new(output);
    summary_writer.load(report.workflows).await?;
    log::info!("Workflow summary IO metrics saved to {}", output.display());
    written.push(output.to_path_buf());

    if !report.processes.is_empty() {
        let process_output = process_output_path(output);
        let process_writer: CsvWriter<ProcessRecord> = CsvWriter::new(&process_output);
        process_writer.load(report.processes).await?;
        log::info!(
            "Process-level IO metrics saved to {}",
            process_output.display()
        );
        written.push(process_output);
    }

    Ok(written)
}

/// Run a complete collection against `client`: search, extract, write
/// files and print the summary.
///
/// Returns the number of workflows collected. When nothing matched, no
/// files are written and a notice is printed instead.
pub async fn execute(client: &SeqeraClient, options: &RunOptions) -> Result<usize> {
    let to = options
        .to
        .unwrap_or_else(|| chrono::Utc::now().date_naive());
    let range = DateRange::new(options.from, to)?;
    let query = SearchQuery::new(&range)
        .user(options.user.as_deref())
        .status(options.status.as_deref());
    let scope = Scope::from_workspace_id(options.workspace_id.as_deref());

    log::info!(
        "Collecting IO metrics from {} between {} and {}",
        client,
        range.min_time(),
        range.max_time()
    );

    let report = collect_io_metrics(client, &scope, &query).await?;

    if report.is_empty() {
        log::warn!("No workflow data collected");
        println!(
            "{}",
            "No workflow data collected. Check your filters or date range.".yellow()
        );
        return Ok(0);
    }

    let summary = UsageSummary::from_workflows(&report.workflows);
    export_report(report, &options.output).await?;

    println!();
    print!("{}", summary);

    Ok(summary.workflows)
}

/// Load the client from the environment and [`execute`] a run.
pub async fn run(options: &RunOptions) -> Result<usize> {
    let client = load_seqera_client(options.endpoint.as_deref())?;
    execute(&client, options).await
}
