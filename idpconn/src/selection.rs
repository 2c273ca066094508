//! The (connection type, environment) pair that scopes every dataset.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// The kind of identity-provider connection being inspected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionType {
    Saml,
    Oauth,
}

impl ConnectionType {
    pub const ALL: [ConnectionType; 2] = [Self::Saml, Self::Oauth];

    /// The name used on the wire and in export file names.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Saml => "saml",
            Self::Oauth => "oauth",
        }
    }
}

impl std::fmt::Display for ConnectionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ConnectionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_ref() {
            "saml" => Self::Saml,
            "oauth" => Self::Oauth,
            _ => return Err(Error::InvalidConnectionType(s.to_string())),
        })
    }
}

/// The deployment environment whose connections are being inspected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Dev,
    Qa,
    Prod,
}

impl Environment {
    pub const ALL: [Environment; 3] = [Self::Dev, Self::Qa, Self::Prod];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dev => "dev",
            Self::Qa => "qa",
            Self::Prod => "prod",
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Environment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_ref() {
            "dev" => Self::Dev,
            "qa" => Self::Qa,
            "prod" => Self::Prod,
            _ => return Err(Error::InvalidEnvironment(s.to_string())),
        })
    }
}

/// A dataset is always fetched for exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selection {
    pub connection_type: ConnectionType,
    pub environment: Environment,
}

impl Selection {
    pub fn new(connection_type: ConnectionType, environment: Environment) -> Self {
        Self {
            connection_type,
            environment,
        }
    }

    pub fn with_connection_type(self, connection_type: ConnectionType) -> Self {
        Self {
            connection_type,
            ..self
        }
    }

    pub fn with_environment(self, environment: Environment) -> Self {
        Self {
            environment,
            ..self
        }
    }
}

impl Default for Selection {
    fn default() -> Self {
        Self::new(ConnectionType::Saml, Environment::Dev)
    }
}

impl std::fmt::Display for Selection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.connection_type, self.environment)
    }
}
