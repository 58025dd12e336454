//! 数据包交付事件
//!
//! 定义把数据包交给目标端点的仿真事件。

use super::id::EndpointId;
use super::net_world::NetWorld;
use super::packet::Packet;
use crate::net::DeliveryHandler;
use crate::scenario::ReceiveRecorder;
use crate::sim::{Event, Simulator, World};
use tracing::{debug, info, trace};

/// 事件：把一个 packet 交给某个端点。
#[derive(Debug)]
pub struct DeliverPacket {
    pub to: EndpointId,
    pub pkt: Packet,
}

impl Event for DeliverPacket {
    #[tracing::instrument(skip(self, sim, world), fields(pkt_id = self.pkt.id, to = ?self.to))]
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World) {
        let DeliverPacket { to, pkt } = *self;
        let now = sim.now();

        info!("📨 数据包到达事件执行");
        debug!(
            size_bytes = pkt.size(),
            dst = %pkt.dst,
            sender = ?pkt.sender,
            now = %now,
            "数据包到达端点"
        );

        let w = world
            .as_any_mut()
            .downcast_mut::<NetWorld>()
            .expect("world must be NetWorld");
        if let Some(socket) = w.net.deliver(to, pkt) {
            ReceiveRecorder::new(&mut w.ctx).on_readable(now, socket);
        }

        trace!("DeliverPacket::execute 完成");
    }
}
