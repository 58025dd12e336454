use std::net::{Ipv4Addr, SocketAddrV4};

use tracing::{debug, info};

use super::error::ScenarioError;
use super::registry::AddressRegistry;
use super::state::{CommunicationEvent, Destination};
use crate::net::{EndpointId, Network, NodeId};
use crate::sim::Simulator;

/// Port every endpoint binds and every message is sent to.
pub const MESSAGE_PORT: u16 = 9;

/// Replays the scripted communications as sends.
///
/// All events are resolved against the registry before the first one is sent,
/// so a malformed script never leaves half of its traffic scheduled.
pub struct CommunicationScheduler<'a> {
    registry: &'a AddressRegistry,
}

struct PlannedSend {
    from: EndpointId,
    dst: SocketAddrV4,
    payload: Vec<u8>,
}

impl<'a> CommunicationScheduler<'a> {
    pub fn new(registry: &'a AddressRegistry) -> Self {
        Self { registry }
    }

    fn resolve(&self, index: usize, ev: &CommunicationEvent) -> Result<PlannedSend, ScenarioError> {
        let unbound = || ScenarioError::UnboundNode {
            index,
            node: ev.from,
        };
        let from_node = usize::try_from(ev.from).map(NodeId).map_err(|_| unbound())?;
        let from = self.registry.endpoint_for(from_node).ok_or_else(unbound)?;

        let dst_ip = match ev.to {
            Destination::Broadcast => Ipv4Addr::BROADCAST,
            Destination::Node(node) => self
                .registry
                .address_of(node)
                .ok_or(ScenarioError::UnknownDestination { index, node })?,
        };
        Ok(PlannedSend {
            from,
            dst: SocketAddrV4::new(dst_ip, MESSAGE_PORT),
            payload: ev.framed(),
        })
    }

    /// Issue every send in file order. Returns the number of sends.
    pub fn schedule_all(
        &self,
        events: &[CommunicationEvent],
        net: &mut Network,
        sim: &mut Simulator,
    ) -> Result<usize, ScenarioError> {
        let planned = events
            .iter()
            .enumerate()
            .map(|(i, ev)| self.resolve(i, ev))
            .collect::<Result<Vec<_>, _>>()?;

        info!(total = planned.len(), "starting communications");
        for (i, send) in planned.into_iter().enumerate() {
            debug!(index = i, from = send.from.0, dst = %send.dst, "sending");
            net.send(send.from, send.dst, send.payload, sim)?;
        }
        Ok(events.len())
    }
}
