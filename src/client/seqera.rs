//! Seqera client module
//!
//! Provides `SeqeraClient` for making best-effort GET requests to the
//! Seqera Platform (Tower) REST API. Transport failures and non-2xx
//! responses are logged and come back as `Ok(None)`, the "no data" result
//! every caller is expected to skip over.

use super::Auth;
use crate::etl::Extractor;
use crate::seqera::{
    Organization, SearchQuery, WorkflowSearch, WorkflowSearchResult, Workspace, parse_list,
};
use eyre::{Context, Result};
use reqwest::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use serde_json::Value;
use std::time::Duration;
use url::Url;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Seqera Platform client for making API requests.
///
/// Every request is a single attempt: there is no retry or backoff. A
/// request that fails for any transport or HTTP reason yields `None`.
///
/// # Example
/// ```no_run
/// use seqera_io_usage::client::{Auth, SeqeraClient};
/// use url::Url;
///
/// # async fn example() -> eyre::Result<()> {
/// let url = Url::parse("https://api.cloud.seqera.io")?;
/// let client = SeqeraClient::try_new(url, Auth::Bearer("token".to_string()))?;
///
/// for org in client.organizations().await? {
///     for workspace in client.workspaces(&org).await? {
///         println!("{:?} / {:?}", org.name, workspace.name);
///     }
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct SeqeraClient {
    client: Client,
    url: Url,
}

impl SeqeraClient {
    /// Create a new SeqeraClient from a base URL and credentials.
    ///
    /// The base URL may include a path prefix (e.g. `https://host/api`);
    /// endpoint paths are appended after it.
    ///
    /// # Errors
    /// Returns an error if the token is not a valid header value or the HTTP
    /// client cannot be built.
    pub fn try_new(url: Url, auth: Auth) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, "application/json".parse()?);
        match auth {
            Auth::Bearer(token) => {
                let mut value = format!("Bearer {}", token)
                    .parse::<HeaderValue>()
                    .with_context(|| "Access token is not a valid header value")?;
                value.set_sensitive(true);
                headers.insert(AUTHORIZATION, value);
            }
            Auth::None => {}
        }
        let client = Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self { client, url })
    }

    /// Get the base URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    fn endpoint_url(&self, endpoint: &str) -> Result<Url> {
        let joined = format!(
            "{}/{}",
            self.url.as_str().trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        );
        Url::parse(&joined).with_context(|| format!("Invalid endpoint URL: {}", joined))
    }

    /// Send a GET request to `endpoint` with the given query parameters.
    ///
    /// Returns `Ok(None)` when the request fails in transit, the server
    /// answers with a non-2xx status, or the body is empty (`null`, `{}`,
    /// `[]` or no content). The failure is logged.
    ///
    /// # Errors
    /// Returns an error only if a successful response carries a body that
    /// is not valid JSON.
    pub async fn get(&self, endpoint: &str, params: &[(&str, String)]) -> Result<Option<Value>> {
        let url = self.endpoint_url(endpoint)?;
        log::info!("Making GET request to {} with params {:?}", url, params);

        let response = match self.client.get(url.clone()).query(params).send().await {
            Ok(response) => response,
            Err(e) => {
                log::error!("{}: {}", error_class(&e), e);
                return Ok(None);
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::error!("HTTP Error: {} for url {}: {}", status, url, body);
            return Ok(None);
        }
        log::info!("Response from {}: {}", url, status.as_u16());

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                log::error!("{}: {}", error_class(&e), e);
                return Ok(None);
            }
        };
        if body.trim().is_empty() {
            log::debug!("Empty response body from {}", url);
            return Ok(None);
        }

        let value: Value = serde_json::from_str(&body)
            .with_context(|| format!("Failed to parse response from {}", url))?;
        Ok(non_empty(value))
    }

    /// List every organization visible to the token.
    pub async fn organizations(&self) -> Result<Vec<Organization>> {
        let response = self.get("orgs", &[]).await?;
        Ok(parse_list(response.as_ref(), "organizations"))
    }

    /// List the workspaces of one organization.
    ///
    /// Each returned workspace carries the id and name of `org`. An
    /// organization without an id has no listable workspaces.
    pub async fn workspaces(&self, org: &Organization) -> Result<Vec<Workspace>> {
        let Some(org_id) = org.id.as_deref() else {
            log::warn!(
                "Organization {} has no ID, skipping",
                org.name.as_deref().unwrap_or("<unnamed>")
            );
            return Ok(Vec::new());
        };

        let response = self.get(&format!("orgs/{}/workspaces", org_id), &[]).await?;
        let workspaces: Vec<Workspace> = parse_list(response.as_ref(), "workspaces");
        Ok(workspaces
            .into_iter()
            .map(|workspace| Workspace {
                org_id: org.id.clone(),
                org_name: org.name.clone(),
                ..workspace
            })
            .collect())
    }

    /// Search the workflows of a workspace, walking every result page.
    pub async fn workflows(
        &self,
        workspace_id: &str,
        query: &SearchQuery,
    ) -> Result<Vec<WorkflowSearchResult>> {
        WorkflowSearch::new(self.clone(), workspace_id, query.clone())
            .extract()
            .await
    }

    /// Fetch the detail record of one workflow.
    pub async fn workflow_details(
        &self,
        workflow_id: &str,
        workspace_id: &str,
    ) -> Result<Option<Value>> {
        let params = [("workspaceId", workspace_id.to_string())];
        self.get(&format!("workflow/{}", workflow_id), &params).await
    }

    /// Fetch the per-process metrics of one workflow.
    pub async fn workflow_metrics(
        &self,
        workflow_id: &str,
        workspace_id: &str,
    ) -> Result<Option<Value>> {
        let params = [("workspaceId", workspace_id.to_string())];
        self.get(&format!("workflow/{}/metrics", workflow_id), &params)
            .await
    }
}

impl std::fmt::Display for SeqeraClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.url)
    }
}

fn error_class(error: &reqwest::Error) -> &'static str {
    if error.is_timeout() {
        "Timeout Error"
    } else if error.is_connect() {
        "Error Connecting"
    } else if error.is_status() {
        "HTTP Error"
    } else {
        "Request Exception"
    }
}

/// Collapse empty JSON payloads into the "no data" sentinel.
fn non_empty(value: Value) -> Option<Value> {
    match &value {
        Value::Null => None,
        Value::Object(map) if map.is_empty() => None,
        Value::Array(items) if items.is_empty() => None,
        _ => Some(value),
    }
}
