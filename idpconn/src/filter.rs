//! Per-column substring filters.

use std::collections::BTreeMap;

use crate::{match_text, Record};

/// The records of a dataset that pass the current filters, in dataset order.
pub type FilteredDataset<'a> = Vec<&'a Record>;

/// One free-text constraint per column.
///
/// Empty constraints are kept, so that an input control can show exactly
/// what was typed, but they never exclude a record. Constraints may refer
/// to columns that are not currently shown; they still apply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet(BTreeMap<String, String>);

impl FilterSet {
    /// Returns a copy of this filter set with the constraint for `column`
    /// set to `text`.
    pub fn set_filter<C, T>(&self, column: C, text: T) -> Self
    where
        C: AsRef<str>,
        T: AsRef<str>,
    {
        let mut next = self.clone();
        next.0.insert(column.as_ref().to_string(), text.as_ref().to_string());
        next
    }

    /// The text stored for the given column, if any.
    pub fn get<C: AsRef<str>>(&self, column: C) -> Option<&str> {
        self.0.get(column.as_ref()).map(String::as_str)
    }

    /// Iterate over the constraints that actually restrict records.
    pub fn active(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .filter(|(_, text)| !text.is_empty())
            .map(|(col, text)| (col.as_str(), text.as_str()))
    }

    pub fn is_active(&self) -> bool {
        self.active().next().is_some()
    }

    pub fn clear(&mut self) {
        self.0.clear()
    }

    /// Whether the given record passes every non-empty constraint, matching
    /// case-insensitively. Absent values match as empty text.
    pub fn matches(&self, record: &Record) -> bool {
        self.active().all(|(column, text)| {
            let haystack = record.get(column).map(match_text).unwrap_or_default();
            haystack.to_lowercase().contains(&text.to_lowercase())
        })
    }

    /// Keep the records that pass every constraint, preserving their order.
    pub fn apply<'a, I>(&self, records: I) -> FilteredDataset<'a>
    where
        I: IntoIterator<Item = &'a Record>,
    {
        records.into_iter().filter(|r| self.matches(r)).collect()
    }
}
