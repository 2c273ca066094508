use std::path::PathBuf;

use thiserror::Error;

/// The primary error type that can be produced by `idpconn`.
#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown connection type \"{0}\" (expected one of: saml, oauth)")]
    InvalidConnectionType(String),
    #[error("unknown environment \"{0}\" (expected one of: dev, qa, prod)")]
    InvalidEnvironment(String),
    #[error("I/O error {0}: {1}")]
    Io(String, std::io::Error),
    #[error("unsupported file type: {0}")]
    UnsupportedFileType(String),
    #[error("cannot determine file type of file: {0}")]
    CannotDetermineFileType(PathBuf),
    #[error("failed to load configuration from {0}")]
    FailedToLoadConfig(PathBuf),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Projection(#[from] ProjectionError),
    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Failures while acquiring a dataset. These never escape the session: they
/// are absorbed into an empty dataset and kept as an operator diagnostic.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("expected an array of connection records, but got {0}")]
    UnexpectedShape(String),
    #[error("failed to fetch connections from {0}: {1}")]
    Transport(String, String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProjectionError {
    #[error("cannot move column from index {from} to {to}: projection has {len} column(s)")]
    IndexOutOfRange { from: usize, to: usize, len: usize },
    #[error("no such column: {0}")]
    UnknownColumn(String),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to encode spreadsheet: {0}")]
    EncodingFailed(String),
    #[error("failed to render export file name from pattern \"{0}\": {1}")]
    Filename(String, String),
    #[error("I/O error while writing export to {0}: {1}")]
    Io(PathBuf, std::io::Error),
}

impl From<rust_xlsxwriter::XlsxError> for ExportError {
    fn from(e: rust_xlsxwriter::XlsxError) -> Self {
        Self::EncodingFailed(e.to_string())
    }
}
