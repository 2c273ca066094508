//! Datasets are the unfiltered records fetched for one selection.

use serde_json::Value as JsonValue;

use crate::value::describe;
use crate::{Record, Selection, SourceError};

/// The full, unfiltered collection of records for one selection.
///
/// A dataset is never mutated once built: every fetch produces a new one
/// that replaces the previous one wholesale.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    selection: Selection,
    records: Vec<Record>,
}

impl Dataset {
    /// Constructor.
    pub fn new(selection: Selection, records: Vec<Record>) -> Self {
        Self { selection, records }
    }

    pub fn empty(selection: Selection) -> Self {
        Self::new(selection, Vec::new())
    }

    /// Build a dataset from the raw payload returned by a data source.
    ///
    /// The payload must be an array whose elements are all objects.
    pub fn from_payload(selection: Selection, payload: JsonValue) -> Result<Self, SourceError> {
        let items = match payload {
            JsonValue::Array(items) => items,
            other => return Err(SourceError::UnexpectedShape(describe(&other).to_string())),
        };
        let records = items
            .into_iter()
            .enumerate()
            .map(|(i, item)| match item {
                JsonValue::Object(record) => Ok(record),
                other => Err(SourceError::UnexpectedShape(format!(
                    "an array containing {} at index {}",
                    describe(&other),
                    i
                ))),
            })
            .collect::<Result<Vec<Record>, SourceError>>()?;
        Ok(Self::new(selection, records))
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The column universe: the keys of the first record, in order.
    pub fn columns(&self) -> Vec<String> {
        self.records
            .first()
            .map(|r| r.keys().cloned().collect())
            .unwrap_or_default()
    }
}
