//! The materialized view: exactly what is displayed and exported.

use crate::{cell_text, ColumnProjection, Record};

/// A grid of cell text, one row per filtered record and one column per
/// projected column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaterializedView {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl MaterializedView {
    /// The projected column names, in display order.
    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of rows (excluding the header).
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Combine filtered records with a column projection.
///
/// Columns missing from a record produce blank cells.
pub fn materialize<'a, I>(records: I, projection: &ColumnProjection) -> MaterializedView
where
    I: IntoIterator<Item = &'a Record>,
{
    let header = projection.columns().to_vec();
    let rows = records
        .into_iter()
        .map(|record| {
            header
                .iter()
                .map(|col| record.get(col).map(cell_text).unwrap_or_default())
                .collect()
        })
        .collect();
    MaterializedView { header, rows }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::{json, Value as JsonValue};

    fn record(v: JsonValue) -> Record {
        match v {
            JsonValue::Object(o) => o,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn arrays_are_joined() {
        let records = vec![record(json!({"id": "1", "tags": ["a", "b"]}))];
        let view = materialize(&records, &ColumnProjection::from_columns(["id", "tags"]));
        assert_eq!(view.header(), ["id", "tags"]);
        assert_eq!(view.rows(), [vec!["1".to_string(), "a, b".to_string()]]);
    }

    #[test]
    fn cells_follow_projection_order() {
        let records = vec![
            record(json!({"id": "1", "owner": "Alice", "active": true})),
            record(json!({"id": "2", "owner": null})),
        ];
        let projection = ColumnProjection::from_columns(["id", "owner", "active"])
            .reorder(2, 0)
            .unwrap()
            .toggle("id")
            .unwrap();
        let view = materialize(&records, &projection);
        assert_eq!(view.header(), ["active", "owner"]);
        assert_eq!(view.len(), 2);
        assert_eq!(view.rows()[0], ["true", "Alice"]);
        // Missing and null values are blank.
        assert_eq!(view.rows()[1], ["", ""]);
    }

    #[test]
    fn nested_objects_render_as_json() {
        let records = vec![record(json!({"issuanceCriteria": {"conditionalCriteria": []}}))];
        let view = materialize(&records, &ColumnProjection::from_columns(["issuanceCriteria"]));
        assert_eq!(view.rows()[0], [r#"{"conditionalCriteria":[]}"#]);
    }

    #[test]
    fn no_records_gives_header_only() {
        let records: Vec<Record> = Vec::new();
        let view = materialize(&records, &ColumnProjection::from_columns(["id"]));
        assert!(view.is_empty());
        assert_eq!(view.header(), ["id"]);
    }
}
