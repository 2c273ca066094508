//! The state container tying the pipeline together.
//!
//! A [`Session`] owns the current selection, dataset, column projection and
//! filters, and keeps the materialized view in sync with them. Every
//! operation recomputes the derived state explicitly before returning.
//!
//! Fetching is split in two so that a fetch can be in flight while the
//! selection keeps changing: [`Session::select`] (or
//! [`Session::begin_fetch`]) hands out a [`FetchTicket`], and the result is
//! handed back with [`Session::complete`]. Results for tickets that have
//! since been superseded are discarded.

use std::path::PathBuf;

use log::{debug, warn};

use crate::{
    load, materialize, ColumnProjection, ConnectionType, Dataset, Environment, ExportError,
    Exporter, FilterSet, FilteredDataset, MaterializedView, ProjectionError, RecordFetcher,
    Selection, SourceError,
};

/// Identifies one requested fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    selection: Selection,
    generation: u64,
}

impl FetchTicket {
    pub fn selection(&self) -> Selection {
        self.selection
    }
}

/// What happened to a fetch result handed to [`Session::complete`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The result replaced the session's dataset.
    Applied,
    /// A newer fetch had been requested in the meantime; nothing changed.
    Stale,
}

#[derive(Debug)]
pub struct Session {
    selection: Selection,
    // Incremented for every requested fetch. Only the latest one may apply.
    generation: u64,
    dataset: Dataset,
    projection: ColumnProjection,
    filters: FilterSet,
    // Why the current dataset is empty, if its fetch failed.
    diagnostic: Option<SourceError>,
    view: MaterializedView,
}

impl Session {
    /// Constructor. The session starts out with an empty dataset; call
    /// [`Self::refresh`] or [`Self::begin_fetch`] to populate it.
    pub fn new(selection: Selection) -> Self {
        Self {
            selection,
            generation: 0,
            dataset: Dataset::empty(selection),
            projection: ColumnProjection::default(),
            filters: FilterSet::default(),
            diagnostic: None,
            view: MaterializedView::default(),
        }
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn projection(&self) -> &ColumnProjection {
        &self.projection
    }

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    /// The error from the most recent applied fetch, if it failed.
    pub fn diagnostic(&self) -> Option<&SourceError> {
        self.diagnostic.as_ref()
    }

    /// The records passing the current filters.
    pub fn filtered(&self) -> FilteredDataset<'_> {
        self.filters.apply(self.dataset.records())
    }

    /// The grid currently displayed and exported.
    pub fn view(&self) -> &MaterializedView {
        &self.view
    }

    /// Request a fetch for the current selection. Any fetch requested
    /// earlier becomes stale.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.generation += 1;
        debug!("Requested fetch #{} for {}", self.generation, self.selection);
        FetchTicket {
            selection: self.selection,
            generation: self.generation,
        }
    }

    /// Change the selection, returning the ticket for the fetch it requires.
    ///
    /// The current dataset stays in place until that fetch completes.
    pub fn select(&mut self, selection: Selection) -> FetchTicket {
        self.selection = selection;
        self.begin_fetch()
    }

    pub fn set_environment(&mut self, environment: Environment) -> FetchTicket {
        self.select(self.selection.with_environment(environment))
    }

    pub fn set_connection_type(&mut self, connection_type: ConnectionType) -> FetchTicket {
        self.select(self.selection.with_connection_type(connection_type))
    }

    /// Hand back the result of the fetch identified by `ticket`.
    ///
    /// If the ticket is still current, the dataset is replaced (with an
    /// empty one on failure), the projection is reset to its default, the
    /// filters are cleared and the view is recomputed.
    pub fn complete(
        &mut self,
        ticket: FetchTicket,
        result: Result<Dataset, SourceError>,
    ) -> Outcome {
        if ticket.generation != self.generation || ticket.selection != self.selection {
            warn!(
                "Discarding stale {} connections (fetch #{}, current is #{} for {})",
                ticket.selection, ticket.generation, self.generation, self.selection
            );
            return Outcome::Stale;
        }
        match result {
            Ok(dataset) => {
                self.dataset = dataset;
                self.diagnostic = None;
            }
            Err(e) => {
                warn!("Failed to load {} connections: {}", ticket.selection, e);
                self.dataset = Dataset::empty(ticket.selection);
                self.diagnostic = Some(e);
            }
        }
        self.projection = ColumnProjection::derive_default(&self.dataset);
        self.filters.clear();
        self.recompute();
        Outcome::Applied
    }

    /// Fetch and apply the dataset for the current selection.
    pub fn refresh<F>(&mut self, fetcher: &F) -> Outcome
    where
        F: RecordFetcher + ?Sized,
    {
        let ticket = self.begin_fetch();
        let result = load(fetcher, ticket.selection());
        self.complete(ticket, result)
    }

    /// Set the filter text for a column. Empty text removes the constraint
    /// but is remembered.
    pub fn set_filter<C, T>(&mut self, column: C, text: T)
    where
        C: AsRef<str>,
        T: AsRef<str>,
    {
        self.filters = self.filters.set_filter(column, text);
        self.recompute();
    }

    pub fn toggle_column(&mut self, column: &str) -> Result<(), ProjectionError> {
        self.projection = self.projection.toggle(column)?;
        let filtered = self.filters.get(column).map_or(false, |t| !t.is_empty());
        if filtered && !self.projection.contains(column) {
            debug!("Column {} is hidden but its filter still applies", column);
        }
        self.recompute();
        Ok(())
    }

    pub fn reorder_column(&mut self, from: usize, to: usize) -> Result<(), ProjectionError> {
        self.projection = self.projection.reorder(from, to)?;
        self.recompute();
        Ok(())
    }

    pub fn show_all_columns(&mut self) {
        self.projection = self.projection.show_all();
        self.recompute();
    }

    /// Active filters on columns that are not currently shown. They still
    /// restrict the view even though no column displays them.
    pub fn hidden_filters(&self) -> Vec<(&str, &str)> {
        self.filters
            .active()
            .filter(|(col, _)| !self.projection.contains(col))
            .collect()
    }

    /// Export the current view, named after the *current* selection.
    pub fn export(&self, exporter: &Exporter<'_>) -> Result<PathBuf, ExportError> {
        if self.dataset.selection() != self.selection {
            debug!(
                "Exporting {} data under the current selection {}",
                self.dataset.selection(),
                self.selection
            );
        }
        exporter.export(&self.view, self.selection)
    }

    fn recompute(&mut self) {
        self.view = materialize(self.filtered(), &self.projection);
    }
}
