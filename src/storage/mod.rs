//! File system storage operations
//!
//! Output tables are written once, at the end of a run, from fully
//! accumulated rows.

mod csv_writer;

pub use csv_writer::CsvWriter;
