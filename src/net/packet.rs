//! 数据包类型
//!
//! 定义在共享信道上传输的 UDP 数据包。

use std::net::SocketAddrV4;

/// UDP 头 + IPv4 头 + 以太网头/FCS 的开销（bytes）
pub const WIRE_OVERHEAD_BYTES: u32 = 8 + 20 + 18;

/// 网络数据包
#[derive(Debug, Clone)]
pub struct Packet {
    pub id: u64,
    pub payload: Vec<u8>,
    pub dst: SocketAddrV4,
    /// 发送端地址标签。没有标签时接收方无法确定发送者。
    pub sender: Option<SocketAddrV4>,
}

impl Packet {
    /// 应用层负载大小（接收端看到的 bytes）
    pub fn size(&self) -> u32 {
        u32::try_from(self.payload.len()).unwrap_or(u32::MAX)
    }

    /// 在信道上占用的字节数
    pub fn wire_bytes(&self) -> u32 {
        self.size().saturating_add(WIRE_OVERHEAD_BYTES)
    }
}
