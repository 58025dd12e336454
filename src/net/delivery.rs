//! 接收回调接口
//!
//! 端点注册接收回调后，每当有数据包到达，引擎都会在该时刻调用 `on_readable`。

use std::net::SocketAddrV4;

use super::endpoint::Endpoint;
use super::id::{EndpointId, NodeId};
use crate::sim::SimTime;

/// 一个已经到达端点的数据包
#[derive(Debug, Clone, Copy)]
pub struct Delivery<'a> {
    pub endpoint: EndpointId,
    /// 端点所属节点
    pub receiver: NodeId,
    pub payload: &'a [u8],
    /// 地址标签；没有标签时为 None
    pub sender: Option<SocketAddrV4>,
}

/// 接收回调
pub trait DeliveryHandler {
    /// 处理单个数据包
    fn on_packet(&mut self, now: SimTime, delivery: Delivery<'_>);

    /// 端点可读：取空接收队列，逐个交给 `on_packet`
    fn on_readable(&mut self, now: SimTime, socket: &mut Endpoint) {
        while let Some(pkt) = socket.recv() {
            self.on_packet(
                now,
                Delivery {
                    endpoint: socket.id(),
                    receiver: socket.node(),
                    payload: &pkt.payload,
                    sender: pkt.sender,
                },
            );
        }
    }
}
