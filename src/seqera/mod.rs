//! Seqera Platform resources
//!
//! Typed views over the organization, workspace and workflow endpoints,
//! plus the extract/transform stages that turn them into IO metrics rows.

mod metrics;
mod model;
mod search;
mod workspace;

pub use metrics::{IoMetricsTransformer, WorkflowResponses, extract_io_metrics};
pub use model::{
    IoReport, Organization, ProcessMetric, ProcessRecord, UNKNOWN, WorkflowDetail, WorkflowIo,
    WorkflowSearchResult, WorkflowSummary, Workspace, parse_list,
};
pub use search::{DateRange, SearchQuery, WorkflowSearch};
pub use workspace::WorkspaceExtractor;
