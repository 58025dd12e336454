//! 网络管理
//!
//! 持有节点、端点和共享信道；负责协议栈安装、地址分配、端点绑定以及数据包发送。

use std::collections::HashMap;
use std::net::{Ipv4Addr, SocketAddrV4};

use super::address::{Ipv4AddressAllocator, Ipv4Interface};
use super::channel::SharedChannel;
use super::deliver_packet::DeliverPacket;
use super::endpoint::Endpoint;
use super::error::NetError;
use super::id::{EndpointId, NodeId};
use super::node::{InternetStack, Node};
use super::packet::Packet;
use super::position::Position;
use super::stats::Stats;
use crate::routing::ListRouting;
use crate::sim::Simulator;
use tracing::{debug, info, trace, warn};

/// 网络：所有节点挂在同一条共享信道上
#[derive(Debug)]
pub struct Network {
    nodes: Vec<Node>,
    endpoints: Vec<Endpoint>,
    bound: HashMap<SocketAddrV4, EndpointId>,
    channel: SharedChannel,
    next_pkt_id: u64,
    pub stats: Stats,
}

impl Network {
    pub fn new(channel: SharedChannel) -> Self {
        Self {
            nodes: Vec::new(),
            endpoints: Vec::new(),
            bound: HashMap::new(),
            channel,
            next_pkt_id: 0,
            stats: Stats::default(),
        }
    }

    /// 批量创建节点，返回新节点的标识符
    pub fn create_nodes(&mut self, count: usize) -> Vec<NodeId> {
        let first = self.nodes.len();
        for idx in first..first + count {
            self.nodes.push(Node::new(NodeId(idx)));
        }
        debug!(count, total = self.nodes.len(), "创建节点");
        (first..first + count).map(NodeId).collect()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, NetError> {
        self.nodes.get_mut(id.0).ok_or(NetError::NoSuchNode(id))
    }

    /// 设置节点位置（常量位置模型）
    pub fn set_position(&mut self, id: NodeId, position: Position) -> Result<(), NetError> {
        self.node_mut(id)?.set_position(position);
        trace!(node = ?id, ?position, "设置节点位置");
        Ok(())
    }

    /// 在节点上安装协议栈；`routing` 为 None 时不带列表路由（DSR 路径）。
    pub fn install_internet(
        &mut self,
        nodes: &[NodeId],
        routing: Option<&ListRouting>,
    ) -> Result<(), NetError> {
        // 先整体校验，避免装了一半
        for &id in nodes {
            if self.node_mut(id)?.stack().is_some() {
                return Err(NetError::StackInstalled(id));
            }
        }
        for &id in nodes {
            self.node_mut(id)?.set_stack(InternetStack {
                routing: routing.cloned(),
                ..InternetStack::default()
            });
        }
        info!(nodes = nodes.len(), with_list_routing = routing.is_some(), "协议栈已安装");
        Ok(())
    }

    /// 在已有协议栈之上叠加 DSR
    pub fn install_dsr(&mut self, nodes: &[NodeId]) -> Result<(), NetError> {
        for &id in nodes {
            match self.node_mut(id)?.stack() {
                None => return Err(NetError::NoInternetStack(id)),
                Some(stack) if stack.dsr => return Err(NetError::DsrInstalled(id)),
                Some(_) => {}
            }
        }
        for &id in nodes {
            if let Some(stack) = self.node_mut(id)?.stack_mut() {
                stack.dsr = true;
            }
        }
        info!(nodes = nodes.len(), "DSR 已安装");
        Ok(())
    }

    /// 按节点顺序分配 IPv4 地址
    pub fn assign_addresses(
        &mut self,
        nodes: &[NodeId],
        allocator: &mut Ipv4AddressAllocator,
    ) -> Result<Vec<Ipv4Interface>, NetError> {
        let mut assigned = Vec::with_capacity(nodes.len());
        for &id in nodes {
            let node = self.node_mut(id)?;
            let Some(stack) = node.stack_mut() else {
                return Err(NetError::NoInternetStack(id));
            };
            if stack.interface.is_some() {
                return Err(NetError::AddressAssigned(id));
            }
            let iface = allocator.allocate()?;
            stack.interface = Some(iface);
            debug!(node = ?id, addr = %iface.local, "分配地址");
            assigned.push(iface);
        }
        Ok(assigned)
    }

    /// 在节点上创建一个端点（需要先安装协议栈）
    pub fn create_endpoint(&mut self, node: NodeId) -> Result<EndpointId, NetError> {
        if self.node_mut(node)?.stack().is_none() {
            return Err(NetError::NoInternetStack(node));
        }
        let id = EndpointId(self.endpoints.len());
        self.endpoints.push(Endpoint::new(id, node));
        trace!(endpoint = ?id, node = ?node, "创建端点");
        Ok(id)
    }

    pub fn endpoint(&self, id: EndpointId) -> Option<&Endpoint> {
        self.endpoints.get(id.0)
    }

    pub fn endpoint_mut(&mut self, id: EndpointId) -> Option<&mut Endpoint> {
        self.endpoints.get_mut(id.0)
    }

    fn endpoint_checked(&mut self, id: EndpointId) -> Result<&mut Endpoint, NetError> {
        self.endpoints
            .get_mut(id.0)
            .ok_or(NetError::NoSuchEndpoint(id))
    }

    /// 绑定端点到本节点的地址和端口
    pub fn bind(&mut self, id: EndpointId, addr: SocketAddrV4) -> Result<(), NetError> {
        let ep = self.endpoint_checked(id)?;
        if ep.local_addr().is_some() {
            return Err(NetError::AlreadyBound(id));
        }
        let node = ep.node();
        let local = self
            .node(node)
            .and_then(Node::interface)
            .map(|iface| iface.local);
        if local != Some(*addr.ip()) {
            return Err(NetError::AddressNotLocal {
                addr: *addr.ip(),
                node,
            });
        }
        if self.bound.contains_key(&addr) {
            return Err(NetError::AddressInUse(addr));
        }
        self.bound.insert(addr, id);
        self.endpoint_checked(id)?.bind(addr);
        debug!(endpoint = ?id, %addr, "端点已绑定");
        Ok(())
    }

    pub fn set_allow_broadcast(&mut self, id: EndpointId, allow: bool) -> Result<(), NetError> {
        self.endpoint_checked(id)?.set_allow_broadcast(allow);
        Ok(())
    }

    /// 注册/取消接收回调：注册后每次有包到达都会通知 `DeliveryHandler`
    pub fn set_recv_notify(&mut self, id: EndpointId, notify: bool) -> Result<(), NetError> {
        self.endpoint_checked(id)?.set_notify(notify);
        Ok(())
    }

    /// 从端点发送数据：单播交给绑定在 `dst` 上的端点；
    /// 广播交给其他节点上所有允许广播、端口相同的端点。
    /// 只占用一次信道，所有接收者在同一时刻收到。
    #[tracing::instrument(skip(self, payload, sim), fields(len = payload.len()))]
    pub fn send(
        &mut self,
        from: EndpointId,
        dst: SocketAddrV4,
        payload: Vec<u8>,
        sim: &mut Simulator,
    ) -> Result<u64, NetError> {
        let ep = self.endpoint_checked(from)?;
        let src_node = ep.node();
        let local = ep.local_addr();
        let allows_broadcast = ep.allows_broadcast();
        let Some(src_addr) = local else {
            return Err(NetError::NotBound(from));
        };
        let broadcast = self.is_broadcast(src_node, *dst.ip());
        if broadcast && !allows_broadcast {
            return Err(NetError::BroadcastNotAllowed(from));
        }

        let receivers: Vec<EndpointId> = if broadcast {
            self.endpoints
                .iter()
                .filter(|e| e.node() != src_node && e.allows_broadcast())
                .filter(|e| e.local_addr().is_some_and(|a| a.port() == dst.port()))
                .map(Endpoint::id)
                .collect()
        } else {
            self.bound.get(&dst).copied().into_iter().collect()
        };

        let id = self.next_pkt_id;
        self.next_pkt_id = self.next_pkt_id.wrapping_add(1);
        let pkt = Packet {
            id,
            payload,
            dst,
            sender: Some(src_addr),
        };

        let (depart, arrive) = self.channel.transmit(sim.now(), pkt.wire_bytes());
        self.stats.sent_pkts += 1;
        self.stats.sent_bytes += u64::from(pkt.wire_bytes());
        debug!(
            pkt_id = id,
            broadcast,
            receivers = receivers.len(),
            depart = %depart,
            arrive = %arrive,
            "🚀 数据包上信道"
        );

        if receivers.is_empty() {
            warn!(pkt_id = id, %dst, "没有可以接收的端点，丢弃");
            self.stats.unroutable_pkts += 1;
            return Ok(id);
        }

        for to in receivers {
            if let Some(rx_node) = self.endpoint(to).and_then(|e| self.node(e.node())) {
                let distance = self
                    .node(src_node)
                    .map(|n| n.position().distance(&rx_node.position()))
                    .unwrap_or_default();
                trace!(pkt_id = id, to = ?to, distance_m = distance, "调度交付");
            }
            sim.schedule(
                arrive,
                DeliverPacket {
                    to,
                    pkt: pkt.clone(),
                },
            );
        }
        Ok(id)
    }

    /// 全 1 广播地址，或发送节点所在子网的定向广播地址
    fn is_broadcast(&self, src: NodeId, ip: Ipv4Addr) -> bool {
        ip.is_broadcast()
            || self
                .node(src)
                .and_then(Node::interface)
                .is_some_and(|iface| iface.broadcast() == ip)
    }

    /// 数据包到达端点：放入接收队列。若端点注册了接收回调则返回它。
    #[tracing::instrument(skip(self, pkt), fields(pkt_id = pkt.id))]
    pub fn deliver(&mut self, to: EndpointId, pkt: Packet) -> Option<&mut Endpoint> {
        let Some(ep) = self.endpoints.get_mut(to.0) else {
            warn!("端点不存在，丢弃");
            return None;
        };
        ep.enqueue(pkt);
        self.stats.delivered_pkts += 1;
        debug!(queued = ep.queued(), "📬 数据包进入接收队列");
        if ep.notifies() { Some(ep) } else { None }
    }
}
