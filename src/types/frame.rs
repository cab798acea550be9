//! In-memory timestamp-indexed frame for raw telemetry.
//!
//! A `RawFrame` is a read-only per-run input: one row per native statistic
//! interval, columns of optional f64 values. Nulls represent samples the
//! historian never delivered.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use thiserror::Error;

/// Frame construction errors.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("column '{column}' has {actual} values but the index has {expected} rows")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },
}

/// Timestamp-indexed columnar frame of raw telemetry statistics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawFrame {
    index: Vec<DateTime<Utc>>,
    columns: BTreeMap<String, Vec<Option<f64>>>,
}

impl RawFrame {
    /// Create an empty frame over the given timestamp index.
    #[must_use]
    pub fn new(index: Vec<DateTime<Utc>>) -> Self {
        Self {
            index,
            columns: BTreeMap::new(),
        }
    }

    /// Add a column, checking its length against the index.
    pub fn insert_column(
        &mut self,
        name: impl Into<String>,
        values: Vec<Option<f64>>,
    ) -> Result<(), FrameError> {
        let name = name.into();
        if values.len() != self.index.len() {
            return Err(FrameError::LengthMismatch {
                column: name,
                expected: self.index.len(),
                actual: values.len(),
            });
        }
        self.columns.insert(name, values);
        Ok(())
    }

    /// Builder-style variant of [`insert_column`](Self::insert_column).
    pub fn with_column(
        mut self,
        name: impl Into<String>,
        values: Vec<Option<f64>>,
    ) -> Result<Self, FrameError> {
        self.insert_column(name, values)?;
        Ok(self)
    }

    #[must_use]
    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    #[must_use]
    pub fn index(&self) -> &[DateTime<Utc>] {
        &self.index
    }

    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.index.len()
    }

    #[must_use]
    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}
