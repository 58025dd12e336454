use std::net::{Ipv4Addr, SocketAddrV4};

use crate::net::{DataRate, Ipv4AddressAllocator, Network, NodeId, SharedChannel};
use crate::scenario::{
    AddressRegistry, CommunicationEvent, CommunicationScheduler, Destination, MESSAGE_PORT,
    ScenarioError,
};
use crate::sim::{SimTime, Simulator};

/// Three bound nodes; node `unbound` (if any) gets a stack and address but no
/// registry entry.
fn setup(unbound: Option<usize>) -> (Network, AddressRegistry) {
    let mut net = Network::new(SharedChannel::new(DataRate(1_000_000), SimTime::ZERO));
    let nodes = net.create_nodes(3);
    net.install_internet(&nodes, None).expect("stack");
    let mut alloc =
        Ipv4AddressAllocator::new(Ipv4Addr::new(10, 1, 1, 0), Ipv4Addr::new(255, 255, 255, 0))
            .expect("allocator");
    let ifaces = net.assign_addresses(&nodes, &mut alloc).expect("addresses");

    let mut registry = AddressRegistry::default();
    for (&node, iface) in nodes.iter().zip(&ifaces) {
        let ep = net.create_endpoint(node).expect("endpoint");
        net.bind(ep, SocketAddrV4::new(iface.local, MESSAGE_PORT))
            .expect("bind");
        net.set_allow_broadcast(ep, true).expect("broadcast");
        if Some(node.0) != unbound {
            registry.bind(node, iface.local, ep).expect("registry");
        }
    }
    (net, registry)
}

fn event(from: i64, to: Destination, text: &str) -> CommunicationEvent {
    CommunicationEvent {
        from,
        to,
        payload: text.as_bytes().to_vec(),
    }
}

#[test]
fn every_event_becomes_one_send_in_file_order() {
    let (mut net, registry) = setup(None);
    let mut sim = Simulator::default();
    let events = [
        event(0, Destination::Node(NodeId(1)), "a"),
        event(2, Destination::Node(NodeId(0)), "b"),
        event(1, Destination::Broadcast, "c"),
    ];

    let sent = CommunicationScheduler::new(&registry)
        .schedule_all(&events, &mut net, &mut sim)
        .expect("schedule");
    assert_eq!(sent, 3);
    assert_eq!(net.stats.sent_pkts, 3);
    // Two unicast deliveries plus a broadcast to the two other nodes.
    assert_eq!(sim.pending(), 4);
    // Text plus its terminator, plus per-frame overhead.
    assert_eq!(net.stats.sent_bytes, 3 * (2 + 46));
}

#[test]
fn unbound_sender_is_fatal_and_nothing_is_sent() {
    let (mut net, registry) = setup(Some(2));
    let mut sim = Simulator::default();
    let events = [
        event(0, Destination::Node(NodeId(1)), "fine"),
        event(2, Destination::Node(NodeId(0)), "not fine"),
    ];

    let err = CommunicationScheduler::new(&registry)
        .schedule_all(&events, &mut net, &mut sim)
        .expect_err("unbound sender");
    assert!(matches!(err, ScenarioError::UnboundNode { index: 1, node: 2 }), "{err}");
    assert_eq!(err.stage(), "communication schedule");
    assert_eq!(net.stats.sent_pkts, 0);
    assert_eq!(sim.pending(), 0);
}

#[test]
fn negative_or_unknown_sender_is_fatal() {
    let (mut net, registry) = setup(None);
    let mut sim = Simulator::default();
    for from in [-3, 7] {
        let err = CommunicationScheduler::new(&registry)
            .schedule_all(
                &[event(from, Destination::Broadcast, "x")],
                &mut net,
                &mut sim,
            )
            .expect_err("bad sender");
        assert!(
            matches!(err, ScenarioError::UnboundNode { index: 0, node } if node == from),
            "{err}"
        );
    }
}

#[test]
fn unknown_destination_is_fatal() {
    let (mut net, registry) = setup(None);
    let mut sim = Simulator::default();
    let err = CommunicationScheduler::new(&registry)
        .schedule_all(
            &[event(0, Destination::Node(NodeId(9)), "x")],
            &mut net,
            &mut sim,
        )
        .expect_err("unknown destination");
    assert!(matches!(
        err,
        ScenarioError::UnknownDestination {
            index: 0,
            node: NodeId(9)
        }
    ));
    assert_eq!(sim.pending(), 0);
}

#[test]
fn empty_script_sends_nothing() {
    let (mut net, registry) = setup(None);
    let mut sim = Simulator::default();
    let sent = CommunicationScheduler::new(&registry)
        .schedule_all(&[], &mut net, &mut sim)
        .expect("schedule");
    assert_eq!(sent, 0);
    assert_eq!(sim.pending(), 0);
}
