//! Routing-protocol selection.
//!
//! Only the *choice* of routing behaviour lives here; the protocols themselves
//! are opaque to the simulator. OLSR, AODV and DSDV are installed as the single
//! entry of a prioritized list-routing table on every node. DSR takes a
//! different path: it is layered on top of an already installed stack.

mod list;

pub use list::{LIST_PRIORITY, ListEntry, ListRouting};

use std::fmt;

use serde::Serialize;
use tracing::info;

use crate::net::{NetError, Network, NodeId};

/// Routing protocol named in the settings file.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub enum RoutingProtocol {
    Olsr,
    Aodv,
    Dsdv,
    Dsr,
    /// Anything else, kept verbatim for the diagnostic.
    Unknown(String),
    /// No `protocol` key was given.
    #[default]
    Unset,
}

impl RoutingProtocol {
    /// Names are matched exactly (`OLSR`, `AODV`, `DSDV`, `DSR`).
    pub fn from_name(name: &str) -> Self {
        match name {
            "OLSR" => Self::Olsr,
            "AODV" => Self::Aodv,
            "DSDV" => Self::Dsdv,
            "DSR" => Self::Dsr,
            other => Self::Unknown(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Olsr => "OLSR",
            Self::Aodv => "AODV",
            Self::Dsdv => "DSDV",
            Self::Dsr => "DSR",
            Self::Unknown(name) => name,
            Self::Unset => "",
        }
    }
}

impl fmt::Display for RoutingProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no such routing protocol: `{0}`")]
pub struct UnknownProtocol(pub String);

/// How the chosen protocol gets onto the nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallPlan {
    /// Install the internet stack with this list-routing table.
    List(ListRouting),
    /// Install a plain internet stack, then layer DSR on top of it.
    Dsr,
}

/// Map a protocol to its install plan. Unrecognized names are fatal.
pub fn select(protocol: &RoutingProtocol) -> Result<InstallPlan, UnknownProtocol> {
    let entry = match protocol {
        RoutingProtocol::Olsr | RoutingProtocol::Aodv | RoutingProtocol::Dsdv => protocol.clone(),
        RoutingProtocol::Dsr => return Ok(InstallPlan::Dsr),
        RoutingProtocol::Unknown(_) | RoutingProtocol::Unset => {
            return Err(UnknownProtocol(protocol.name().to_string()));
        }
    };
    let mut list = ListRouting::default();
    list.add(entry, LIST_PRIORITY);
    Ok(InstallPlan::List(list))
}

impl InstallPlan {
    pub fn is_dsr(&self) -> bool {
        matches!(self, InstallPlan::Dsr)
    }

    /// Apply the plan uniformly to `nodes`.
    pub fn install(&self, net: &mut Network, nodes: &[NodeId]) -> Result<(), NetError> {
        match self {
            InstallPlan::List(list) => {
                info!(routing = %list, nodes = nodes.len(), "installing list routing");
                net.install_internet(nodes, Some(list))
            }
            InstallPlan::Dsr => {
                info!(nodes = nodes.len(), "installing internet stack with DSR on top");
                net.install_internet(nodes, None)?;
                net.install_dsr(nodes)
            }
        }
    }
}
