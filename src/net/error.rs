//! 网络层错误

use std::net::{Ipv4Addr, SocketAddrV4};

use super::id::{EndpointId, NodeId};

/// 网络搭建与发送过程中的错误
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NetError {
    #[error("node {0:?} does not exist")]
    NoSuchNode(NodeId),
    #[error("endpoint {0:?} does not exist")]
    NoSuchEndpoint(EndpointId),
    #[error("node {0:?} already has an internet stack")]
    StackInstalled(NodeId),
    #[error("node {0:?} has no internet stack installed")]
    NoInternetStack(NodeId),
    #[error("node {0:?} already runs DSR")]
    DsrInstalled(NodeId),
    #[error("node {0:?} already has an address")]
    AddressAssigned(NodeId),
    #[error("subnet mask {0} is not contiguous")]
    InvalidMask(Ipv4Addr),
    #[error("base address {base} has host bits set for mask {mask}")]
    HostBitsInBase { base: Ipv4Addr, mask: Ipv4Addr },
    #[error("subnet {base}/{mask} has no free host address left (capacity {capacity})")]
    AddressesExhausted {
        base: Ipv4Addr,
        mask: Ipv4Addr,
        capacity: u32,
    },
    #[error("address {addr} is not assigned to node {node:?}")]
    AddressNotLocal { addr: Ipv4Addr, node: NodeId },
    #[error("address {0} is already bound")]
    AddressInUse(SocketAddrV4),
    #[error("endpoint {0:?} is already bound")]
    AlreadyBound(EndpointId),
    #[error("endpoint {0:?} is not bound")]
    NotBound(EndpointId),
    #[error("endpoint {0:?} is not allowed to send broadcast")]
    BroadcastNotAllowed(EndpointId),
}
