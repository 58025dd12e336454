//! 网络模拟模块
//!
//! 此模块包含网状网络模拟的组件：节点、共享信道、地址分配、端点、
//! 数据包交付事件以及接收回调接口。

// 子模块声明
mod address;
mod channel;
mod deliver_packet;
mod delivery;
mod endpoint;
mod error;
mod id;
mod net_world;
mod network;
mod node;
mod packet;
mod position;
mod stats;

// 重新导出公共接口
pub use address::{Ipv4AddressAllocator, Ipv4Interface};
pub use channel::{DataRate, ParseDataRateError, SharedChannel};
pub use deliver_packet::DeliverPacket;
pub use delivery::{Delivery, DeliveryHandler};
pub use endpoint::Endpoint;
pub use error::NetError;
pub use id::{EndpointId, NodeId};
pub use net_world::NetWorld;
pub use network::Network;
pub use node::{InternetStack, Node};
pub use packet::{Packet, WIRE_OVERHEAD_BYTES};
pub use position::Position;
pub use stats::Stats;
