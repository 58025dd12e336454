use std::io;
use std::net::Ipv4Addr;
use std::path::PathBuf;

use crate::net::{DataRate, NetError, NodeId, ParseDataRateError};
use crate::report::ReportError;
use crate::routing::UnknownProtocol;
use crate::sim::ParseTimeError;

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("cannot read topology file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("topology line {line}: {reason}")]
    Parse { line: usize, reason: String },
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("cannot read settings file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("settings line {line}: expected `key:value`, got `{text}`")]
    Malformed { line: usize, text: String },
}

/// Settings values that were read fine but cannot be used.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Protocol(#[from] UnknownProtocol),
    #[error("invalid delay `{value}`: {source}")]
    Delay {
        value: String,
        #[source]
        source: ParseTimeError,
    },
    #[error("invalid data rate `{value}`: {source}")]
    DataRate {
        value: String,
        #[source]
        source: ParseDataRateError,
    },
    #[error("data rate {0} cannot carry any traffic")]
    ZeroDataRate(DataRate),
    #[error("invalid {field} `{value}`")]
    Address { field: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("node {0} is already bound")]
    NodeBound(NodeId),
    #[error("address {addr} is already bound to node {node}")]
    AddressBound { addr: Ipv4Addr, node: NodeId },
}

#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error("state load failed: {0}")]
    State(#[from] StateError),
    #[error("settings load failed: {0}")]
    Settings(#[from] SettingsError),
    #[error("configuration failed: {0}")]
    Config(#[from] ConfigError),
    #[error("network setup failed: {0}")]
    Net(#[from] NetError),
    #[error("address registry failed: {0}")]
    Registry(#[from] RegistryError),
    #[error("communication #{index} is sent from node {node}, which has no bound endpoint")]
    UnboundNode { index: usize, node: i64 },
    #[error("communication #{index} is addressed to node {node}, which has no address")]
    UnknownDestination { index: usize, node: NodeId },
    #[error("cannot create results file {}: {source}", path.display())]
    ResultsFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("results output failed: {0}")]
    Report(#[from] ReportError),
}

impl From<UnknownProtocol> for ScenarioError {
    fn from(err: UnknownProtocol) -> Self {
        ScenarioError::Config(err.into())
    }
}

impl ScenarioError {
    /// Short name of the stage that failed, for diagnostics.
    pub fn stage(&self) -> &'static str {
        match self {
            ScenarioError::State(_) => "state",
            ScenarioError::Settings(_) => "settings",
            ScenarioError::Config(_) => "configuration",
            ScenarioError::Net(_) | ScenarioError::Registry(_) => "network setup",
            ScenarioError::UnboundNode { .. } | ScenarioError::UnknownDestination { .. } => {
                "communication schedule"
            }
            ScenarioError::ResultsFile { .. } | ScenarioError::Report(_) => "results",
        }
    }
}
