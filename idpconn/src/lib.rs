//! `idpconn` lets an operator inspect identity-provider connection records
//! (SAML and OAuth) across environments, filter and reshape the visible
//! columns, and export the resulting view to a spreadsheet.
//!
//! This crate provides the data pipeline and its state container. For the
//! command line interface, see the `idpconn-cli` crate.

mod config;
mod dataset;
mod error;
mod export;
mod filter;
mod fs;
mod projection;
mod selection;
mod session;
mod source;
mod value;
mod view;

pub use config::{Config, SupportedFormat};
pub use dataset::Dataset;
pub use error::{Error, ExportError, ProjectionError, SourceError};
pub use export::{Exporter, DEFAULT_FILENAME_PATTERN, SHEET_NAME};
pub use filter::{FilterSet, FilteredDataset};
pub use projection::ColumnProjection;
pub use selection::{ConnectionType, Environment, Selection};
pub use session::{FetchTicket, Outcome, Session};
pub use source::{load, FileFetcher, HttpFetcher, RecordFetcher};
pub use value::{cell_text, match_text, Record};
pub use view::{materialize, MaterializedView};
