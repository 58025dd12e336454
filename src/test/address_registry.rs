use std::net::Ipv4Addr;

use crate::net::{EndpointId, NodeId};
use crate::scenario::{AddressRegistry, RegistryError};

#[test]
fn bind_fills_both_directions() {
    let mut reg = AddressRegistry::default();
    assert!(reg.is_empty());
    for i in 0..4u8 {
        let node = NodeId(usize::from(i));
        let addr = Ipv4Addr::new(10, 1, 1, i + 1);
        reg.bind(node, addr, EndpointId(usize::from(i) + 10)).expect("bind");
    }
    assert_eq!(reg.len(), 4);

    for i in 0..4u8 {
        let node = NodeId(usize::from(i));
        let addr = Ipv4Addr::new(10, 1, 1, i + 1);
        assert_eq!(reg.resolve_sender(addr), Some(node));
        assert_eq!(reg.endpoint_for(node), Some(EndpointId(usize::from(i) + 10)));
        assert_eq!(reg.address_of(node), Some(addr));
    }
}

#[test]
fn lookups_for_unknown_entries_return_none() {
    let mut reg = AddressRegistry::default();
    reg.bind(NodeId(0), Ipv4Addr::new(10, 1, 1, 1), EndpointId(0))
        .expect("bind");

    assert_eq!(reg.resolve_sender(Ipv4Addr::new(192, 168, 0, 7)), None);
    assert_eq!(reg.resolve_sender(Ipv4Addr::BROADCAST), None);
    assert_eq!(reg.endpoint_for(NodeId(1)), None);
    assert_eq!(reg.address_of(NodeId(1)), None);
}

#[test]
fn a_node_or_address_is_bound_only_once() {
    let mut reg = AddressRegistry::default();
    let addr = Ipv4Addr::new(10, 1, 1, 1);
    reg.bind(NodeId(0), addr, EndpointId(0)).expect("bind");

    assert_eq!(
        reg.bind(NodeId(0), Ipv4Addr::new(10, 1, 1, 2), EndpointId(1)),
        Err(RegistryError::NodeBound(NodeId(0)))
    );
    assert_eq!(
        reg.bind(NodeId(1), addr, EndpointId(1)),
        Err(RegistryError::AddressBound {
            addr,
            node: NodeId(0)
        })
    );
    // Rejected binds leave no trace.
    assert_eq!(reg.len(), 1);
    assert_eq!(reg.endpoint_for(NodeId(1)), None);
    assert_eq!(reg.resolve_sender(Ipv4Addr::new(10, 1, 1, 2)), None);
}
