use std::collections::HashMap;
use std::net::Ipv4Addr;

use tracing::debug;

use super::error::RegistryError;
use crate::net::{EndpointId, NodeId};

/// Links node identity, assigned address and sending endpoint.
///
/// Both directions are filled by the same `bind` call and never shrink, so a
/// node found in one map is always found in the other.
#[derive(Debug, Default)]
pub struct AddressRegistry {
    by_node: HashMap<NodeId, (EndpointId, Ipv4Addr)>,
    by_addr: HashMap<Ipv4Addr, NodeId>,
}

impl AddressRegistry {
    pub fn bind(
        &mut self,
        node: NodeId,
        addr: Ipv4Addr,
        endpoint: EndpointId,
    ) -> Result<(), RegistryError> {
        if self.by_node.contains_key(&node) {
            return Err(RegistryError::NodeBound(node));
        }
        if let Some(&owner) = self.by_addr.get(&addr) {
            return Err(RegistryError::AddressBound { addr, node: owner });
        }
        self.by_node.insert(node, (endpoint, addr));
        self.by_addr.insert(addr, node);
        debug!(node = node.0, %addr, endpoint = endpoint.0, "bound");
        Ok(())
    }

    /// Node that owns `addr`, or `None` for addresses outside the topology.
    pub fn resolve_sender(&self, addr: Ipv4Addr) -> Option<NodeId> {
        self.by_addr.get(&addr).copied()
    }

    pub fn endpoint_for(&self, node: NodeId) -> Option<EndpointId> {
        self.by_node.get(&node).map(|&(ep, _)| ep)
    }

    pub fn address_of(&self, node: NodeId) -> Option<Ipv4Addr> {
        self.by_node.get(&node).map(|&(_, addr)| addr)
    }

    pub fn len(&self) -> usize {
        self.by_node.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_node.is_empty()
    }
}
