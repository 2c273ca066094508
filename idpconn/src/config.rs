//! Configuration-related functionality for `idpconn`.

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use eyre::{Result, WrapErr};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::fs::maybe_canonicalize;
use crate::{
    ConnectionType, Environment, Error, ExportError, Exporter, FileFetcher, HttpFetcher,
    RecordFetcher, Selection, SourceError, DEFAULT_FILENAME_PATTERN,
};

/// The file formats configuration can be loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SupportedFormat {
    Json,
    Yaml,
}

impl FromStr for SupportedFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        Ok(match lower.as_ref() {
            "json" => Self::Json,
            "yaml" | "yml" => Self::Yaml,
            _ => return Err(Error::UnsupportedFileType(s.to_string())),
        })
    }
}

/// `idpconn` configuration. Every field has a default, so a configuration
/// file only needs to mention what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the connections API.
    pub api_base_url: String,
    /// When set, connections are read from JSON snapshots in this directory
    /// instead of the API.
    pub fixtures_dir: Option<PathBuf>,
    /// Initial environment.
    pub environment: Environment,
    /// Initial connection type.
    pub connection_type: ConnectionType,
    /// Where exports are written.
    pub output_dir: PathBuf,
    /// Handlebars pattern for export file names.
    pub filename_pattern: String,
    /// HTTP request timeout, in seconds.
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        let selection = Selection::default();
        Self {
            api_base_url: "http://localhost:5000".to_string(),
            fixtures_dir: None,
            environment: selection.environment,
            connection_type: selection.connection_type,
            output_dir: PathBuf::from("."),
            filename_pattern: DEFAULT_FILENAME_PATTERN.to_string(),
            timeout_secs: 30,
        }
    }
}

impl Config {
    /// Parse configuration from a string in the given format.
    pub fn load_as(fmt: SupportedFormat, content: &str) -> Result<Self, Error> {
        Ok(match fmt {
            SupportedFormat::Json => serde_json::from_str(content)?,
            SupportedFormat::Yaml => serde_yaml::from_str(content)?,
        })
    }

    /// Load configuration from the given file, detecting its format from
    /// the file extension.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(OsStr::to_str)
            .ok_or_else(|| Error::CannotDetermineFileType(path.to_path_buf()))?;
        let fmt = SupportedFormat::from_str(ext)?;
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Io(format!("while trying to read from {}", path.display()), e))?;
        Self::load_as(fmt, &content)
    }

    /// Load configuration from the given file if it exists, falling back to
    /// the defaults otherwise.
    pub fn load<P: AsRef<Path>>(maybe_config_file: P) -> Result<Self> {
        let maybe_config_file = maybe_config_file.as_ref();
        debug!(
            "Attempting to load config file: {}",
            maybe_config_file.display()
        );
        match maybe_canonicalize(maybe_config_file)? {
            Some(config_path) => {
                let config = Self::load_from_file(&config_path)
                    .wrap_err_with(|| Error::FailedToLoadConfig(config_path.clone()))?;
                debug!("Loaded configuration from {}", config_path.display());
                Ok(config)
            }
            None => {
                debug!(
                    "No such configuration file, using defaults: {}",
                    maybe_config_file.display()
                );
                Ok(Self::default())
            }
        }
    }

    /// The selection a new session starts with.
    pub fn selection(&self) -> Selection {
        Selection::new(self.connection_type, self.environment)
    }

    /// Build the record source this configuration describes.
    pub fn fetcher(&self) -> Result<Box<dyn RecordFetcher>, SourceError> {
        Ok(match &self.fixtures_dir {
            Some(dir) => {
                debug!("Reading connections from snapshots in {}", dir.display());
                Box::new(FileFetcher::new(dir))
            }
            None => Box::new(HttpFetcher::new(
                &self.api_base_url,
                Duration::from_secs(self.timeout_secs),
            )?),
        })
    }

    pub fn exporter(&self) -> Result<Exporter<'static>, ExportError> {
        Exporter::new(&self.output_dir, &self.filename_pattern)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn partial_yaml_uses_defaults() {
        let config = Config::load_as(
            SupportedFormat::Yaml,
            "environment: prod\nconnection_type: oauth\n",
        )
        .unwrap();
        assert_eq!(
            config.selection(),
            Selection::new(ConnectionType::Oauth, Environment::Prod)
        );
        assert_eq!(config.api_base_url, "http://localhost:5000");
        assert_eq!(config.filename_pattern, DEFAULT_FILENAME_PATTERN);
    }

    #[test]
    fn json_config() {
        let config = Config::load_as(
            SupportedFormat::Json,
            r#"{"api_base_url": "https://pf-admin.example.com", "timeout_secs": 5}"#,
        )
        .unwrap();
        assert_eq!(config.api_base_url, "https://pf-admin.example.com");
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.selection(), Selection::default());
    }

    #[test]
    fn invalid_environment_is_rejected() {
        assert!(Config::load_as(SupportedFormat::Yaml, "environment: staging\n").is_err());
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path().join("idpconn.yaml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn load_from_file_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("idpconn.yml");
        fs::write(&path, "output_dir: exports\nfixtures_dir: snapshots\n").unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(config.output_dir, PathBuf::from("exports"));
        assert_eq!(config.fixtures_dir, Some(PathBuf::from("snapshots")));

        let toml = dir.path().join("idpconn.toml");
        fs::write(&toml, "timeout_secs = 5\n").unwrap();
        assert!(matches!(
            Config::load_from_file(&toml),
            Err(Error::UnsupportedFileType(ext)) if ext == "toml"
        ));
    }
}
