//! Seqera IO Usage
//!
//! Collects per-workflow and per-process IO metrics from the Seqera
//! Platform API over a date range and exports them as CSV tables.

pub mod cli;
pub mod client;
pub mod etl;
pub mod logging;
pub mod report;
pub mod seqera;
pub mod storage;

// Re-exports for convenience
pub use client::{Auth, SeqeraClient};
pub use etl::{Extractor, Loader, Transformer};
pub use report::{UsageSummary, bytes_to_readable};
pub use seqera::{IoReport, ProcessRecord, WorkflowSummary};
pub use storage::CsvWriter;
