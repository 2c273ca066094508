//! Column projection: which columns are shown, and in which order.

use log::debug;

use crate::{Dataset, ProjectionError};

/// Columns moved to the front of the default projection, in order of
/// precedence. At most one of them is pinned.
const PINNED_COLUMNS: &[&str] = &["appName", "name"];

/// The operator-controlled, ordered subset of a dataset's columns that is
/// shown and exported.
///
/// Never contains the same column twice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnProjection {
    // Every column the projection may show, in default order.
    universe: Vec<String>,
    columns: Vec<String>,
}

impl ColumnProjection {
    /// Derive the default projection for the given dataset.
    ///
    /// Columns are taken from the first record in its key order, except that
    /// `appName` (or, failing that, `name`) is moved to the front.
    pub fn derive_default(dataset: &Dataset) -> Self {
        Self::from_columns(dataset.columns())
    }

    /// Build a default projection from an explicit column universe.
    pub fn from_columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut universe: Vec<String> = Vec::new();
        for col in columns.into_iter().map(Into::into) {
            if !universe.contains(&col) {
                universe.push(col);
            }
        }
        if let Some(pos) = PINNED_COLUMNS
            .iter()
            .find_map(|pinned| universe.iter().position(|c| c == pinned))
        {
            let pinned = universe.remove(pos);
            universe.insert(0, pinned);
        }
        Self {
            columns: universe.clone(),
            universe,
        }
    }

    /// The visible columns, in display order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Every column this projection could show.
    pub fn universe(&self) -> &[String] {
        &self.universe
    }

    /// Columns from the universe that are currently hidden, in default order.
    pub fn hidden(&self) -> Vec<&str> {
        self.universe
            .iter()
            .filter(|c| !self.columns.contains(c))
            .map(String::as_str)
            .collect()
    }

    pub fn contains(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Hide the given column if it is shown, otherwise append it at the end.
    ///
    /// Hiding and then showing a column again moves it to the end; showing
    /// then hiding restores the original projection.
    pub fn toggle(&self, column: &str) -> Result<Self, ProjectionError> {
        let mut next = self.clone();
        if let Some(pos) = next.columns.iter().position(|c| c == column) {
            next.columns.remove(pos);
            debug!("Hid column {}", column);
        } else if next.universe.iter().any(|c| c == column) {
            next.columns.push(column.to_string());
            debug!("Showing column {}", column);
        } else {
            return Err(ProjectionError::UnknownColumn(column.to_string()));
        }
        Ok(next)
    }

    /// Move the column at `from` to position `to`, shifting the columns in
    /// between. Both indices must be less than the number of visible columns.
    pub fn reorder(&self, from: usize, to: usize) -> Result<Self, ProjectionError> {
        let len = self.columns.len();
        if from >= len || to >= len {
            return Err(ProjectionError::IndexOutOfRange { from, to, len });
        }
        let mut next = self.clone();
        let col = next.columns.remove(from);
        next.columns.insert(to, col);
        Ok(next)
    }

    /// Show every column again, in the default order.
    pub fn show_all(&self) -> Self {
        Self {
            universe: self.universe.clone(),
            columns: self.universe.clone(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::Selection;
    use serde_json::json;

    fn dataset(payload: serde_json::Value) -> Dataset {
        Dataset::from_payload(Selection::default(), payload).unwrap()
    }

    #[test]
    fn app_name_is_pinned_first() {
        let p = ColumnProjection::derive_default(&dataset(json!([
            {"id": "1", "appName": "Payroll", "owner": "Alice"}
        ])));
        assert_eq!(p.columns(), ["appName", "id", "owner"]);
    }

    #[test]
    fn name_is_pinned_when_app_name_is_absent() {
        let p = ColumnProjection::derive_default(&dataset(json!([
            {"id": "1", "name": "Wiki", "owner": "Alice"}
        ])));
        assert_eq!(p.columns(), ["name", "id", "owner"]);
    }

    #[test]
    fn app_name_takes_precedence_over_name() {
        let p = ColumnProjection::from_columns(["id", "name", "appName"]);
        assert_eq!(p.columns(), ["appName", "id", "name"]);
    }

    #[test]
    fn key_order_is_kept_without_pinned_columns() {
        let p = ColumnProjection::from_columns(["id", "owner", "status"]);
        assert_eq!(p.columns(), ["id", "owner", "status"]);
    }

    #[test]
    fn empty_dataset_gives_empty_projection() {
        let p = ColumnProjection::derive_default(&dataset(json!([])));
        assert!(p.is_empty());
        assert!(p.universe().is_empty());
    }

    #[test]
    fn toggle_hides_and_appends() {
        let p = ColumnProjection::from_columns(["a", "b", "c"]);
        let hidden = p.toggle("a").unwrap();
        assert_eq!(hidden.columns(), ["b", "c"]);
        assert_eq!(hidden.hidden(), vec!["a"]);

        // Remove-then-append does not restore the original position.
        let shown = hidden.toggle("a").unwrap();
        assert_eq!(shown.columns(), ["b", "c", "a"]);

        // Append-then-remove does.
        assert_eq!(hidden.toggle("a").unwrap().toggle("a").unwrap(), hidden);
    }

    #[test]
    fn toggle_unknown_column_is_an_error() {
        let p = ColumnProjection::from_columns(["a", "b"]);
        assert_eq!(
            p.toggle("zzz"),
            Err(ProjectionError::UnknownColumn("zzz".to_string()))
        );
    }

    #[test]
    fn reorder_moves_and_shifts() {
        let p = ColumnProjection::from_columns(["a", "b", "c", "d"]);
        assert_eq!(p.reorder(0, 2).unwrap().columns(), ["b", "c", "a", "d"]);
        assert_eq!(p.reorder(3, 0).unwrap().columns(), ["d", "a", "b", "c"]);
        assert_eq!(p.reorder(1, 1).unwrap(), p);
    }

    #[test]
    fn reorder_preserves_columns() {
        let p = ColumnProjection::from_columns(["a", "b", "c", "d", "e"]);
        for from in 0..p.len() {
            for to in 0..p.len() {
                let moved = p.reorder(from, to).unwrap();
                assert_eq!(moved.len(), p.len());
                let mut got = moved.columns().to_vec();
                got.sort();
                assert_eq!(got, ["a", "b", "c", "d", "e"]);
            }
        }
    }

    #[test]
    fn reorder_out_of_range_is_an_error() {
        let p = ColumnProjection::from_columns(["a", "b"]);
        assert_eq!(
            p.reorder(0, 2),
            Err(ProjectionError::IndexOutOfRange { from: 0, to: 2, len: 2 })
        );
    }

    #[test]
    fn show_all_restores_default_order() {
        let p = ColumnProjection::from_columns(["appName", "b", "c"]);
        let reshaped = p.toggle("b").unwrap().reorder(1, 0).unwrap();
        assert_eq!(reshaped.columns(), ["c", "appName"]);
        assert_eq!(reshaped.show_all(), p);
    }
}
