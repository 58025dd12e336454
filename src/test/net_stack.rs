use std::net::{Ipv4Addr, SocketAddrV4};

use crate::net::{
    DataRate, EndpointId, Ipv4AddressAllocator, NetError, NetWorld, Network, NodeId,
    SharedChannel, WIRE_OVERHEAD_BYTES,
};
use crate::routing::{RoutingProtocol, select};
use crate::sim::{SimTime, Simulator};

use super::support::open_context;

const PORT: u16 = 9;

/// `n` nodes with AODV, addresses from 10.1.1.0/24 and one bound endpoint each.
fn bound_network(n: usize, rate: DataRate, delay: SimTime) -> (Network, Vec<EndpointId>) {
    let mut net = Network::new(SharedChannel::new(rate, delay));
    let nodes = net.create_nodes(n);
    select(&RoutingProtocol::Aodv)
        .expect("aodv")
        .install(&mut net, &nodes)
        .expect("install");
    let mut alloc =
        Ipv4AddressAllocator::new(Ipv4Addr::new(10, 1, 1, 0), Ipv4Addr::new(255, 255, 255, 0))
            .expect("allocator");
    let ifaces = net.assign_addresses(&nodes, &mut alloc).expect("addresses");
    let eps = nodes
        .iter()
        .zip(&ifaces)
        .map(|(&node, iface)| {
            let ep = net.create_endpoint(node).expect("endpoint");
            net.bind(ep, SocketAddrV4::new(iface.local, PORT)).expect("bind");
            net.set_allow_broadcast(ep, true).expect("broadcast");
            ep
        })
        .collect();
    (net, eps)
}

fn host(last: u8) -> SocketAddrV4 {
    SocketAddrV4::new(Ipv4Addr::new(10, 1, 1, last), PORT)
}

#[test]
fn allocator_hands_out_hosts_in_order() {
    let mut alloc =
        Ipv4AddressAllocator::new(Ipv4Addr::new(10, 1, 1, 0), Ipv4Addr::new(255, 255, 255, 0))
            .expect("allocator");
    assert_eq!(alloc.capacity(), 254);
    let first = alloc.allocate().expect("first");
    let second = alloc.allocate().expect("second");
    assert_eq!(first.local, Ipv4Addr::new(10, 1, 1, 1));
    assert_eq!(second.local, Ipv4Addr::new(10, 1, 1, 2));
    assert_eq!(first.broadcast(), Ipv4Addr::new(10, 1, 1, 255));
}

#[test]
fn allocator_rejects_bad_subnets_and_runs_out() {
    assert_eq!(
        Ipv4AddressAllocator::new(Ipv4Addr::new(10, 1, 1, 0), Ipv4Addr::new(255, 0, 255, 0))
            .err(),
        Some(NetError::InvalidMask(Ipv4Addr::new(255, 0, 255, 0)))
    );
    assert!(matches!(
        Ipv4AddressAllocator::new(Ipv4Addr::new(10, 1, 1, 7), Ipv4Addr::new(255, 255, 255, 0)),
        Err(NetError::HostBitsInBase { .. })
    ));

    let mut alloc =
        Ipv4AddressAllocator::new(Ipv4Addr::new(10, 1, 1, 0), Ipv4Addr::new(255, 255, 255, 252))
            .expect("allocator");
    assert_eq!(alloc.capacity(), 2);
    alloc.allocate().expect("first");
    alloc.allocate().expect("second");
    assert!(matches!(
        alloc.allocate(),
        Err(NetError::AddressesExhausted { capacity: 2, .. })
    ));
}

#[test]
fn tx_time_rounds_up_to_whole_nanoseconds() {
    let ch = SharedChannel::new(DataRate(2_000_000), SimTime::from_millis(2));
    // 52 bytes at 2 Mbit/s
    assert_eq!(ch.tx_time(52), SimTime::from_micros(208));
    let ch = SharedChannel::new(DataRate(3), SimTime::ZERO);
    assert_eq!(ch.tx_time(1), SimTime(2_666_666_667));
}

#[test]
fn frames_serialise_on_the_shared_channel() {
    let mut ch = SharedChannel::new(DataRate(8_000_000), SimTime::from_micros(5));
    // 100 bytes = 100us at 8 Mbit/s
    assert_eq!(
        ch.transmit(SimTime::ZERO, 100),
        (SimTime::from_micros(100), SimTime::from_micros(105))
    );
    assert_eq!(
        ch.transmit(SimTime::from_micros(10), 100),
        (SimTime::from_micros(200), SimTime::from_micros(205))
    );
    assert_eq!(
        ch.transmit(SimTime::from_micros(500), 100),
        (SimTime::from_micros(600), SimTime::from_micros(605))
    );
}

#[test]
fn endpoints_need_a_stack_and_a_local_address() {
    let mut net = Network::new(SharedChannel::new(DataRate(1_000), SimTime::ZERO));
    let nodes = net.create_nodes(2);
    assert_eq!(
        net.create_endpoint(nodes[0]),
        Err(NetError::NoInternetStack(nodes[0]))
    );

    net.install_internet(&nodes, None).expect("stack");
    let mut alloc =
        Ipv4AddressAllocator::new(Ipv4Addr::new(10, 1, 1, 0), Ipv4Addr::new(255, 255, 255, 0))
            .expect("allocator");
    net.assign_addresses(&nodes, &mut alloc).expect("addresses");
    assert_eq!(
        net.assign_addresses(&nodes[..1], &mut alloc),
        Err(NetError::AddressAssigned(nodes[0]))
    );

    let ep = net.create_endpoint(nodes[0]).expect("endpoint");
    assert_eq!(
        net.bind(ep, host(2)),
        Err(NetError::AddressNotLocal {
            addr: Ipv4Addr::new(10, 1, 1, 2),
            node: nodes[0]
        })
    );
    net.bind(ep, host(1)).expect("bind");
    assert_eq!(net.bind(ep, host(1)), Err(NetError::AlreadyBound(ep)));

    let other = net.create_endpoint(nodes[0]).expect("second endpoint");
    assert_eq!(net.bind(other, host(1)), Err(NetError::AddressInUse(host(1))));
}

#[test]
fn unicast_reaches_only_the_bound_destination() {
    let (mut net, eps) = bound_network(3, DataRate(2_000_000), SimTime::from_millis(2));
    let mut sim = Simulator::default();
    net.send(eps[0], host(2), b"hello\0".to_vec(), &mut sim)
        .expect("send");
    assert_eq!(sim.pending(), 1);

    let (ctx, _buf) = open_context();
    let mut world = NetWorld::new(net, ctx);
    sim.run(&mut world);
    assert_eq!(sim.now(), SimTime(2_208_000));

    let net = &mut world.net;
    let pkt = net
        .endpoint_mut(eps[1])
        .and_then(|e| e.recv())
        .expect("packet at node 1");
    assert_eq!(pkt.payload, b"hello\0");
    assert_eq!(pkt.sender, Some(host(1)));
    assert_eq!(pkt.wire_bytes(), 6 + WIRE_OVERHEAD_BYTES);
    assert_eq!(net.endpoint(eps[2]).map(|e| e.queued()), Some(0));
    assert_eq!(net.endpoint(eps[0]).map(|e| e.queued()), Some(0));
    assert_eq!(net.stats.delivered_pkts, 1);
}

#[test]
fn broadcast_reaches_every_other_node_at_once() {
    let (mut net, eps) = bound_network(4, DataRate(1_000_000), SimTime::from_millis(1));
    let mut sim = Simulator::default();
    let dst = SocketAddrV4::new(Ipv4Addr::BROADCAST, PORT);
    net.send(eps[1], dst, b"all\0".to_vec(), &mut sim).expect("send");
    assert_eq!(sim.pending(), 3);

    let (ctx, _buf) = open_context();
    let mut world = NetWorld::new(net, ctx);
    sim.run(&mut world);

    let net = &world.net;
    for (i, ep) in eps.iter().enumerate() {
        let expected = if i == 1 { 0 } else { 1 };
        assert_eq!(net.endpoint(*ep).map(|e| e.queued()), Some(expected), "node {i}");
    }
    // One frame on the channel regardless of the number of receivers.
    assert_eq!(net.stats.sent_pkts, 1);
    assert_eq!(net.stats.delivered_pkts, 3);
}

#[test]
fn subnet_directed_broadcast_counts_as_broadcast() {
    let (mut net, eps) = bound_network(2, DataRate(1_000_000), SimTime::ZERO);
    let mut sim = Simulator::default();
    net.send(eps[0], host(255), b"x\0".to_vec(), &mut sim)
        .expect("send");
    assert_eq!(sim.pending(), 1);
}

#[test]
fn broadcast_requires_permission() {
    let (mut net, eps) = bound_network(2, DataRate(1_000_000), SimTime::ZERO);
    net.set_allow_broadcast(eps[0], false).expect("disallow");
    let mut sim = Simulator::default();
    let dst = SocketAddrV4::new(Ipv4Addr::BROADCAST, PORT);
    assert_eq!(
        net.send(eps[0], dst, b"x\0".to_vec(), &mut sim),
        Err(NetError::BroadcastNotAllowed(eps[0]))
    );
    assert_eq!(sim.pending(), 0);
}

#[test]
fn unroutable_unicast_is_counted_and_dropped() {
    let (mut net, eps) = bound_network(2, DataRate(1_000_000), SimTime::ZERO);
    let mut sim = Simulator::default();
    net.send(eps[0], host(77), b"lost\0".to_vec(), &mut sim)
        .expect("send");
    assert_eq!(sim.pending(), 0);
    assert_eq!(net.stats.sent_pkts, 1);
    assert_eq!(net.stats.unroutable_pkts, 1);
}

#[test]
fn unbound_endpoint_cannot_send() {
    let mut net = Network::new(SharedChannel::new(DataRate(1_000), SimTime::ZERO));
    let nodes = net.create_nodes(1);
    net.install_internet(&nodes, None).expect("stack");
    let ep = net.create_endpoint(NodeId(0)).expect("endpoint");
    let mut sim = Simulator::default();
    assert_eq!(
        net.send(ep, host(1), Vec::new(), &mut sim),
        Err(NetError::NotBound(ep))
    );
}
