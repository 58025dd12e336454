//! 统计信息
//!
//! 定义网络层（信道侧）的统计数据结构。

/// 网络统计信息
#[derive(Debug, Default, Clone, Copy)]
pub struct Stats {
    /// 信道上发出的帧数（一次广播算一帧）
    pub sent_pkts: u64,
    pub sent_bytes: u64,
    /// 交付到端点接收队列的副本数
    pub delivered_pkts: u64,
    /// 没有任何端点可以接收的数据包
    pub unroutable_pkts: u64,
}
