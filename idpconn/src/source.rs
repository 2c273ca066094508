//! Record sources: where connection datasets come from.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::debug;
use reqwest::blocking::Client;
use serde_json::Value as JsonValue;

use crate::{Dataset, Selection, SourceError};

/// Anything that can produce the raw payload for a selection.
///
/// Implementations return the payload as-is; checking that it has the shape
/// of a dataset is left to [`load`].
pub trait RecordFetcher {
    fn fetch(&self, selection: Selection) -> Result<JsonValue, SourceError>;
}

impl<F: RecordFetcher + ?Sized> RecordFetcher for &F {
    fn fetch(&self, selection: Selection) -> Result<JsonValue, SourceError> {
        (**self).fetch(selection)
    }
}

impl<F: RecordFetcher + ?Sized> RecordFetcher for Box<F> {
    fn fetch(&self, selection: Selection) -> Result<JsonValue, SourceError> {
        (**self).fetch(selection)
    }
}

/// Fetch the dataset for the given selection.
///
/// No caching and no retries: a failed fetch is only resolved by the next
/// explicit fetch.
pub fn load<F>(fetcher: &F, selection: Selection) -> Result<Dataset, SourceError>
where
    F: RecordFetcher + ?Sized,
{
    debug!("Fetching {} connections", selection);
    let payload = fetcher.fetch(selection)?;
    let dataset = Dataset::from_payload(selection, payload)?;
    debug!("Fetched {} {} connection(s)", dataset.len(), selection);
    Ok(dataset)
}

/// Fetches connections from the HTTP API at
/// `{base_url}/api/{type}-connections?env={env}`.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    base_url: String,
    client: Client,
}

impl HttpFetcher {
    /// Constructor.
    pub fn new<S: AsRef<str>>(base_url: S, timeout: Duration) -> Result<Self, SourceError> {
        let base_url = base_url.as_ref().trim_end_matches('/').to_string();
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SourceError::Transport(base_url.clone(), e.to_string()))?;
        Ok(Self { base_url, client })
    }

    /// The endpoint URL for the given selection, without its query string.
    pub fn endpoint(&self, selection: Selection) -> String {
        format!("{}/api/{}-connections", self.base_url, selection.connection_type)
    }
}

impl RecordFetcher for HttpFetcher {
    fn fetch(&self, selection: Selection) -> Result<JsonValue, SourceError> {
        let url = self.endpoint(selection);
        debug!("GET {}?env={}", url, selection.environment);
        self.client
            .get(&url)
            .query(&[("env", selection.environment.as_str())])
            .send()
            .and_then(|res| res.error_for_status())
            .and_then(|res| res.json::<JsonValue>())
            .map_err(|e| SourceError::Transport(url, e.to_string()))
    }
}

/// Reads connections from JSON files named `{type}-connections-{env}.json`
/// in a directory. Useful for working offline against exported snapshots.
#[derive(Debug, Clone)]
pub struct FileFetcher {
    dir: PathBuf,
}

impl FileFetcher {
    /// Constructor.
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// The path of the file holding the given selection's connections.
    pub fn path_for(&self, selection: Selection) -> PathBuf {
        self.dir.join(format!(
            "{}-connections-{}.json",
            selection.connection_type, selection.environment
        ))
    }
}

impl RecordFetcher for FileFetcher {
    fn fetch(&self, selection: Selection) -> Result<JsonValue, SourceError> {
        let path = self.path_for(selection);
        debug!("Reading {} connections from {}", selection, path.display());
        let content = fs::read_to_string(&path)
            .map_err(|e| SourceError::Transport(path.display().to_string(), e.to_string()))?;
        serde_json::from_str(&content)
            .map_err(|e| SourceError::Transport(path.display().to_string(), e.to_string()))
    }
}
