//! CSV table output

use crate::etl::Loader;

use eyre::{Context, Result};
use serde::Serialize;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// Write serializable rows to a CSV file
///
/// The header row is taken from the field names of `T`, in declaration
/// order. Existing files are overwritten.
pub struct CsvWriter<T> {
    path: PathBuf,
    _row: PhantomData<fn(T)>,
}

impl<T: Serialize> CsvWriter<T> {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            _row: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write a header row followed by one row per item
    pub fn write(&self, rows: &[T]) -> Result<()> {
        let mut writer = csv::Writer::from_path(&self.path)
            .with_context(|| format!("Failed to create CSV file: {}", self.path.display()))?;

        for row in rows {
            writer
                .serialize(row)
                .with_context(|| format!("Failed to write CSV row to {}", self.path.display()))?;
        }

        writer
            .flush()
            .with_context(|| format!("Failed to write CSV file: {}", self.path.display()))?;

        Ok(())
    }
}

impl<T: Serialize + Send> Loader for CsvWriter<T> {
    type Item = T;

    async fn load(&self, items: Vec<Self::Item>) -> Result<usize> {
        self.write(&items)?;
        Ok(items.len())
    }
}
