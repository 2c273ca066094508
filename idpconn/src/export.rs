//! Spreadsheet export of materialized views.

use std::path::{Path, PathBuf};

use handlebars::Handlebars;
use log::{debug, info};
use rust_xlsxwriter::{ColNum, Format, RowNum, Workbook};
use serde_json::json;

use crate::fs::{ensure_parent_path_exists, write_atomic};
use crate::{ExportError, MaterializedView, Selection};

/// Name of the single worksheet in every export.
pub const SHEET_NAME: &str = "Connections";

/// Produces `{type}_connections_{env}.xlsx`.
pub const DEFAULT_FILENAME_PATTERN: &str = "{{connection_type}}_connections_{{environment}}.xlsx";

const FILENAME_TEMPLATE: &str = "filename";

/// Writes materialized views to `.xlsx` files.
///
/// The file name is rendered from a [Handlebars](https://handlebarsjs.com/)
/// pattern which has access to `connection_type` and `environment`. Relative
/// names are resolved against the output directory.
pub struct Exporter<'reg> {
    output_dir: PathBuf,
    pattern: String,
    hb: Handlebars<'reg>,
}

impl<'reg> Exporter<'reg> {
    /// Constructor. Fails if the file name pattern cannot be parsed.
    pub fn new<P, S>(output_dir: P, pattern: S) -> Result<Self, ExportError>
    where
        P: AsRef<Path>,
        S: AsRef<str>,
    {
        let pattern = pattern.as_ref().to_string();
        let mut hb = Handlebars::new();
        hb.set_strict_mode(true);
        hb.register_escape_fn(handlebars::no_escape);
        hb.register_template_string(FILENAME_TEMPLATE, &pattern)
            .map_err(|e| ExportError::Filename(pattern.clone(), e.to_string()))?;
        Ok(Self {
            output_dir: output_dir.as_ref().to_path_buf(),
            pattern,
            hb,
        })
    }

    /// The file name an export for the given selection would be written to.
    pub fn filename(&self, selection: Selection) -> Result<String, ExportError> {
        let data = json!({
            "connection_type": selection.connection_type,
            "environment": selection.environment,
        });
        self.hb
            .render(FILENAME_TEMPLATE, &data)
            .map_err(|e| ExportError::Filename(self.pattern.clone(), e.to_string()))
    }

    /// The full path an export for the given selection would be written to.
    pub fn path_for(&self, selection: Selection) -> Result<PathBuf, ExportError> {
        let name = PathBuf::from(self.filename(selection)?);
        Ok(if name.is_relative() {
            self.output_dir.join(name)
        } else {
            name
        })
    }

    /// Encode the view and write it out for the given selection, returning
    /// the path of the written file.
    ///
    /// The whole workbook is encoded before anything touches the disk, and
    /// the file only appears at its final path once it is complete.
    pub fn export(
        &self,
        view: &MaterializedView,
        selection: Selection,
    ) -> Result<PathBuf, ExportError> {
        let path = self.path_for(selection)?;
        let content = encode(view)?;
        debug!("Encoded {} byte(s) for {}", content.len(), path.display());
        ensure_parent_path_exists(&path).map_err(|e| ExportError::Io(path.clone(), e))?;
        write_atomic(&path, &content).map_err(|e| ExportError::Io(path.clone(), e))?;
        info!("Exported {} row(s) to {}", view.len(), path.display());
        Ok(path)
    }
}

/// Encode the view as an in-memory `.xlsx` workbook with a single sheet whose
/// first row holds the column names. Every cell is written as text.
pub fn encode(view: &MaterializedView) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (i, name) in view.header().iter().enumerate() {
        if !name.is_empty() {
            worksheet.write_string_with_format(0, col_num(i)?, name, &bold)?;
        }
    }
    for (i, row) in view.rows().iter().enumerate() {
        let r = row_num(i + 1)?;
        for (j, cell) in row.iter().enumerate() {
            if !cell.is_empty() {
                worksheet.write_string(r, col_num(j)?, cell)?;
            }
        }
    }
    Ok(workbook.save_to_buffer()?)
}

fn row_num(i: usize) -> Result<RowNum, ExportError> {
    RowNum::try_from(i).map_err(|_| ExportError::EncodingFailed(format!("too many rows: {}", i)))
}

fn col_num(i: usize) -> Result<ColNum, ExportError> {
    ColNum::try_from(i)
        .map_err(|_| ExportError::EncodingFailed(format!("too many columns: {}", i + 1)))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{materialize, ColumnProjection, ConnectionType, Environment, Record};
    use calamine::{open_workbook_from_rs, Reader, Xlsx};
    use serde_json::Value as JsonValue;
    use std::io::Cursor;

    fn view(payload: JsonValue, columns: &[&str]) -> MaterializedView {
        let records = match payload {
            JsonValue::Array(items) => items
                .into_iter()
                .filter_map(|item| match item {
                    JsonValue::Object(o) => Some(o),
                    _ => None,
                })
                .collect::<Vec<Record>>(),
            _ => panic!("expected an array"),
        };
        materialize(&records, &ColumnProjection::from_columns(columns.iter().copied()))
    }

    #[test]
    fn default_filename() {
        let exporter = Exporter::new(".", DEFAULT_FILENAME_PATTERN).unwrap();
        let sel = Selection::new(ConnectionType::Oauth, Environment::Prod);
        assert_eq!(exporter.filename(sel).unwrap(), "oauth_connections_prod.xlsx");
        let sel = Selection::new(ConnectionType::Saml, Environment::Qa);
        assert_eq!(exporter.filename(sel).unwrap(), "saml_connections_qa.xlsx");
    }

    #[test]
    fn custom_pattern_can_nest_directories() {
        let pattern = "{{environment}}/{{connection_type}}.xlsx";
        let exporter = Exporter::new("/exports", pattern).unwrap();
        let sel = Selection::new(ConnectionType::Saml, Environment::Dev);
        assert_eq!(
            exporter.path_for(sel).unwrap(),
            PathBuf::from("/exports/dev/saml.xlsx")
        );
    }

    #[test]
    fn unknown_pattern_variable_is_an_error() {
        let exporter = Exporter::new(".", "{{tenant}}.xlsx").unwrap();
        assert!(matches!(
            exporter.filename(Selection::default()),
            Err(ExportError::Filename(_, _))
        ));
    }

    fn read_back(bytes: Vec<u8>) -> (Vec<String>, Vec<Vec<String>>) {
        let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes)).unwrap();
        let sheets = workbook.sheet_names().to_vec();
        let range = workbook.worksheet_range(SHEET_NAME).unwrap();
        let rows = range
            .rows()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect();
        (sheets, rows)
    }

    #[test]
    fn encode_writes_header_and_cell_text() {
        let v = view(
            serde_json::json!([
                {
                    "appName": "Payroll",
                    "id": 7,
                    "tags": ["a", "b"],
                    "active": false,
                    "meta": {"k": 1}
                },
                {"appName": "Wiki", "owner": "bob"}
            ]),
            &["appName", "id", "tags", "active", "meta", "owner"],
        );
        let bytes = encode(&v).unwrap();
        // xlsx files are zip archives.
        assert_eq!(&bytes[..2], b"PK");

        let (sheets, rows) = read_back(bytes);
        assert_eq!(sheets, vec![SHEET_NAME.to_string()]);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], ["appName", "id", "tags", "active", "meta", "owner"]);
        assert_eq!(rows[1], ["Payroll", "7", "a, b", "false", r#"{"k":1}"#, ""]);
        assert_eq!(rows[2], ["Wiki", "", "", "", "", "bob"]);
    }

    #[test]
    fn export_writes_to_the_selection_filename() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = Exporter::new(dir.path().join("out"), DEFAULT_FILENAME_PATTERN).unwrap();
        let v = view(serde_json::json!([{"id": "1"}]), &["id"]);
        let sel = Selection::new(ConnectionType::Oauth, Environment::Prod);

        let path = exporter.export(&v, sel).unwrap();
        assert_eq!(path, dir.path().join("out").join("oauth_connections_prod.xlsx"));
        assert!(std::fs::read(&path).unwrap().starts_with(b"PK"));
        assert_eq!(std::fs::read_dir(dir.path().join("out")).unwrap().count(), 1);
    }

    #[test]
    fn encoding_failure_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = Exporter::new(dir.path(), DEFAULT_FILENAME_PATTERN).unwrap();
        // Longer than the 32,767 characters a spreadsheet cell can hold.
        let huge = "x".repeat(40_000);
        let v = view(serde_json::json!([{ "id": huge }]), &["id"]);

        let err = exporter.export(&v, Selection::default()).unwrap_err();
        assert!(matches!(err, ExportError::EncodingFailed(_)));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
