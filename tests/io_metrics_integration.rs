//! Integration tests for IO metrics collection against a mock Seqera API

use chrono::NaiveDate;
use eyre::Result;
use seqera_io_usage::cli::{RunOptions, Scope, collect_io_metrics, execute};
use seqera_io_usage::client::{Auth, SeqeraClient};
use seqera_io_usage::seqera::{DateRange, SearchQuery};
use serde_json::{Value, json};
use std::path::Path;
use tempfile::TempDir;
use url::Url;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SEARCH: &str = "after:2024-01-01T00:00:00.000Z before:2024-01-31T23:59:59.999Z status:SUCCEEDED";

fn client_for(server: &MockServer) -> SeqeraClient {
    let url = Url::parse(&server.uri()).unwrap();
    SeqeraClient::try_new(url, Auth::Bearer("test-token".to_string())).unwrap()
}

fn options(output: &Path, workspace_id: Option<&str>) -> RunOptions {
    RunOptions {
        from: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        to: NaiveDate::from_ymd_opt(2024, 1, 31),
        output: output.to_path_buf(),
        workspace_id: workspace_id.map(String::from),
        user: None,
        status: Some("SUCCEEDED".to_string()),
        endpoint: None,
    }
}

async fn mount_json(server: &MockServer, route: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .and(header("Authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn mount_search(server: &MockServer, workspace_id: &str, workflow_ids: &[&str]) {
    let workflows: Vec<Value> = workflow_ids
        .iter()
        .map(|id| json!({"workflow": {"id": id}}))
        .collect();

    Mock::given(method("GET"))
        .and(path("/workflow"))
        .and(query_param("workspaceId", workspace_id))
        .and(query_param("search", SEARCH))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "workflows": workflows,
            "totalSize": workflow_ids.len()
        })))
        .expect(1)
        .mount(server)
        .await;
}

/// Mount detail and metrics for a workflow with two processes:
/// reads 100 + 200 and writes 50 + 0.
async fn mount_workflow(server: &MockServer, id: &str, user: &str, extra: Value) {
    let mut details = json!({
        "workflow": {
            "id": id,
            "runName": format!("run_{}", id),
            "status": "SUCCEEDED",
            "userName": user,
            "start": "2024-01-02T10:00:00Z",
            "complete": "2024-01-02T11:00:00Z"
        }
    });
    if let (Some(details), Some(extra)) = (details.as_object_mut(), extra.as_object()) {
        details.extend(extra.clone());
    }

    mount_json(server, &format!("/workflow/{}", id), details).await;
    mount_json(
        server,
        &format!("/workflow/{}/metrics", id),
        json!({
            "metrics": [
                {"process": "ALIGN", "reads": {"mean": 100}, "writes": {"mean": 50}},
                {"process": "SORT", "reads": {"mean": 200}, "writes": {"mean": 0}}
            ]
        }),
    )
    .await;
}

async fn mount_two_orgs(server: &MockServer) {
    mount_json(
        server,
        "/orgs",
        json!({
            "organizations": [
                {"orgId": 1, "name": "acme"},
                {"orgId": 2, "name": "globex"}
            ]
        }),
    )
    .await;
    mount_json(
        server,
        "/orgs/1/workspaces",
        json!({"workspaces": [{"id": 10, "name": "research"}]}),
    )
    .await;
    mount_json(
        server,
        "/orgs/2/workspaces",
        json!({"workspaces": [{"id": 20, "name": "production"}, {"name": "no-id"}]}),
    )
    .await;
}

fn read_lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(String::from)
        .collect()
}

#[tokio::test]
async fn test_all_workspaces_writes_both_tables() -> Result<()> {
    let server = MockServer::start().await;
    mount_two_orgs(&server).await;
    mount_search(&server, "10", &["wf-a"]).await;
    mount_search(&server, "20", &["wf-b"]).await;
    mount_workflow(&server, "wf-a", "alice", json!({})).await;
    mount_workflow(
        &server,
        "wf-b",
        "bob",
        json!({"workspaceName": "production-embedded"}),
    )
    .await;

    let temp_dir = TempDir::new()?;
    let output = temp_dir.path().join("io_metrics.csv");
    let count = execute(&client_for(&server), &options(&output, None)).await?;
    assert_eq!(count, 2);

    let summary = read_lines(&output);
    assert_eq!(
        summary[0],
        "workflow_id,workflow_name,status,user_name,start_time,end_time,\
         total_read_bytes,total_write_bytes,total_io_bytes,organization_name,workspace_name"
    );
    assert_eq!(
        summary[1],
        "wf-a,run_wf-a,SUCCEEDED,alice,2024-01-02T10:00:00Z,2024-01-02T11:00:00Z,\
         300.0,50.0,350.0,acme,research"
    );
    assert_eq!(
        summary[2],
        "wf-b,run_wf-b,SUCCEEDED,bob,2024-01-02T10:00:00Z,2024-01-02T11:00:00Z,\
         300.0,50.0,350.0,globex,production-embedded"
    );
    assert_eq!(summary.len(), 3);

    let processes = read_lines(&temp_dir.path().join("process_io_metrics.csv"));
    assert_eq!(
        processes,
        vec![
            "workflow_id,process_name,read_bytes,write_bytes,total_bytes",
            "wf-a,ALIGN,100.0,50.0,150.0",
            "wf-a,SORT,200.0,0.0,200.0",
            "wf-b,ALIGN,100.0,50.0,150.0",
            "wf-b,SORT,200.0,0.0,200.0",
        ]
    );

    Ok(())
}

#[tokio::test]
async fn test_single_workspace_resolves_names() -> Result<()> {
    let server = MockServer::start().await;
    mount_two_orgs(&server).await;
    mount_search(&server, "20", &["wf-b"]).await;
    mount_workflow(&server, "wf-b", "bob", json!({})).await;

    let range = DateRange::new(
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
    )?;
    let query = SearchQuery::new(&range).status(Some("SUCCEEDED"));
    let report = collect_io_metrics(
        &client_for(&server),
        &Scope::Workspace("20".to_string()),
        &query,
    )
    .await?;

    assert_eq!(report.workflows.len(), 1);
    assert_eq!(report.workflows[0].organization_name, "globex");
    assert_eq!(report.workflows[0].workspace_name, "production");
    assert_eq!(report.processes.len(), 2);

    Ok(())
}

#[tokio::test]
async fn test_unknown_workspace_keeps_unknown_names() -> Result<()> {
    let server = MockServer::start().await;
    mount_two_orgs(&server).await;
    mount_search(&server, "999", &["wf-x"]).await;
    mount_workflow(&server, "wf-x", "carol", json!({})).await;

    let temp_dir = TempDir::new()?;
    let output = temp_dir.path().join("io.csv");
    let count = execute(&client_for(&server), &options(&output, Some("999"))).await?;
    assert_eq!(count, 1);

    let summary = read_lines(&output);
    assert!(summary[1].ends_with(",Unknown,Unknown"));

    Ok(())
}

#[tokio::test]
async fn test_no_matching_workflows_writes_nothing() -> Result<()> {
    let server = MockServer::start().await;
    mount_two_orgs(&server).await;
    mount_search(&server, "10", &[]).await;
    mount_search(&server, "20", &[]).await;

    let temp_dir = TempDir::new()?;
    let output = temp_dir.path().join("io_metrics.csv");
    let count = execute(&client_for(&server), &options(&output, None)).await?;

    assert_eq!(count, 0);
    assert!(!output.exists());
    assert!(!temp_dir.path().join("process_io_metrics.csv").exists());

    Ok(())
}

#[tokio::test]
async fn test_unreachable_organizations_is_not_fatal() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/orgs"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let temp_dir = TempDir::new()?;
    let output = temp_dir.path().join("io_metrics.csv");
    let count = execute(&client_for(&server), &options(&output, None)).await?;

    assert_eq!(count, 0);
    assert!(!output.exists());

    Ok(())
}

#[tokio::test]
async fn test_workflow_without_metrics_is_excluded() -> Result<()> {
    let server = MockServer::start().await;
    mount_two_orgs(&server).await;
    mount_search(&server, "10", &["wf-a", "wf-broken"]).await;
    mount_search(&server, "20", &[]).await;
    mount_workflow(&server, "wf-a", "alice", json!({})).await;
    mount_json(&server, "/workflow/wf-broken", json!({"workflow": {"id": "wf-broken"}})).await;
    Mock::given(method("GET"))
        .and(path("/workflow/wf-broken/metrics"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let temp_dir = TempDir::new()?;
    let output = temp_dir.path().join("io_metrics.csv");
    let count = execute(&client_for(&server), &options(&output, None)).await?;
    assert_eq!(count, 1);

    let summary = read_lines(&output);
    assert_eq!(summary.len(), 2);
    assert!(summary[1].starts_with("wf-a,"));

    let processes = read_lines(&temp_dir.path().join("process_io_metrics.csv"));
    assert!(processes.iter().skip(1).all(|line| line.starts_with("wf-a,")));

    Ok(())
}
