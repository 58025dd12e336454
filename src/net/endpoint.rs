//! 通信端点
//!
//! 类 UDP socket：绑定到节点地址和端口，接收到的数据包进入接收队列，
//! 由接收回调（`DeliveryHandler`）一次性取空。

use std::collections::VecDeque;
use std::net::SocketAddrV4;

use super::id::{EndpointId, NodeId};
use super::packet::Packet;

/// 通信端点
#[derive(Debug)]
pub struct Endpoint {
    id: EndpointId,
    node: NodeId,
    local: Option<SocketAddrV4>,
    allow_broadcast: bool,
    /// 是否注册了接收回调
    notify: bool,
    rx: VecDeque<Packet>,
}

impl Endpoint {
    pub(crate) fn new(id: EndpointId, node: NodeId) -> Self {
        Self {
            id,
            node,
            local: None,
            allow_broadcast: false,
            notify: false,
            rx: VecDeque::new(),
        }
    }

    pub fn id(&self) -> EndpointId {
        self.id
    }

    /// 所属节点
    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn local_addr(&self) -> Option<SocketAddrV4> {
        self.local
    }

    pub fn allows_broadcast(&self) -> bool {
        self.allow_broadcast
    }

    pub fn notifies(&self) -> bool {
        self.notify
    }

    /// 接收队列中等待读取的数据包数
    pub fn queued(&self) -> usize {
        self.rx.len()
    }

    /// 取出下一个已到达的数据包
    pub fn recv(&mut self) -> Option<Packet> {
        self.rx.pop_front()
    }

    pub(crate) fn bind(&mut self, addr: SocketAddrV4) {
        self.local = Some(addr);
    }

    pub(crate) fn set_allow_broadcast(&mut self, allow: bool) {
        self.allow_broadcast = allow;
    }

    pub(crate) fn set_notify(&mut self, notify: bool) {
        self.notify = notify;
    }

    pub(crate) fn enqueue(&mut self, pkt: Packet) {
        self.rx.push_back(pkt);
    }
}
