//! Core ETL (Extract, Transform, Load) abstractions
//!
//! Every stage of an IO metrics run is one of these: workflow search and
//! workspace processing extract records from the API, the metrics
//! extractor transforms raw responses into table rows, and the CSV writer
//! loads rows into files.

mod extract;
mod load;
mod transform;

pub use extract::Extractor;
pub use load::Loader;
pub use transform::Transformer;
