//! 共享信道
//!
//! 所有节点挂在同一条有线共享信道上：同一时刻只有一个发送者，
//! 传输时延 = 序列化时间 + 传播时延。

use std::fmt;
use std::str::FromStr;

use crate::sim::{SimTime, scaled_decimal, split_number_unit};

/// 数据速率（bit/s）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct DataRate(pub u64);

impl DataRate {
    /// 未配置速率时信道使用的默认值
    pub const UNLIMITED: DataRate = DataRate(u32::MAX as u64);

    pub fn bps(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for DataRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}bps", self.0)
    }
}

/// 速率字符串解析错误
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseDataRateError {
    #[error("empty data rate")]
    Empty,
    #[error("unknown data rate unit `{unit}` in `{value}`")]
    UnknownUnit { value: String, unit: String },
    #[error("invalid number in data rate `{0}`")]
    InvalidNumber(String),
}

fn unit_bps(unit: &str) -> Option<u128> {
    let factor = match unit {
        "bps" | "b/s" => 1,
        "kbps" | "Kbps" | "kb/s" | "Kb/s" => 1_000,
        "Mbps" | "Mb/s" => 1_000_000,
        "Gbps" | "Gb/s" => 1_000_000_000,
        "Bps" | "B/s" => 8,
        "kBps" | "KBps" | "kB/s" | "KB/s" => 8_000,
        "MBps" | "MB/s" => 8_000_000,
        "GBps" | "GB/s" => 8_000_000_000,
        _ => return None,
    };
    Some(factor)
}

impl FromStr for DataRate {
    type Err = ParseDataRateError;

    /// 解析 `2Mbps`、`500kbps`、`1.5Gbps`、`10KBps` 等写法。
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();
        if value.is_empty() {
            return Err(ParseDataRateError::Empty);
        }
        let (number, unit) = split_number_unit(value);
        let factor = unit_bps(unit).ok_or_else(|| ParseDataRateError::UnknownUnit {
            value: value.to_string(),
            unit: unit.to_string(),
        })?;
        scaled_decimal(number, factor)
            .and_then(|bps| u64::try_from(bps).ok())
            .map(DataRate)
            .ok_or_else(|| ParseDataRateError::InvalidNumber(value.to_string()))
    }
}

/// 共享有线信道
#[derive(Debug)]
pub struct SharedChannel {
    pub data_rate: DataRate,
    pub delay: SimTime,
    pub busy_until: SimTime,
}

impl SharedChannel {
    pub fn new(data_rate: DataRate, delay: SimTime) -> Self {
        Self {
            data_rate,
            delay,
            busy_until: SimTime::ZERO,
        }
    }

    /// 计算传输指定字节数所需的时间
    pub(crate) fn tx_time(&self, bytes: u32) -> SimTime {
        // ceil(bytes*8 / bps) 秒 -> 纳秒
        let bps = self.data_rate.bps();
        if bps == 0 {
            return SimTime(u64::MAX / 4);
        }
        let bits = (bytes as u128).saturating_mul(8);
        let nanos = (bits.saturating_mul(1_000_000_000u128) + (bps as u128 - 1)) / bps as u128;
        SimTime(nanos.min(u64::MAX as u128) as u64)
    }

    /// 占用信道发送一帧，返回 (发送完成时刻, 到达时刻)。
    pub(crate) fn transmit(&mut self, now: SimTime, wire_bytes: u32) -> (SimTime, SimTime) {
        let start = now.max(self.busy_until);
        let depart = start.saturating_add(self.tx_time(wire_bytes));
        self.busy_until = depart;
        (depart, depart.saturating_add(self.delay))
    }
}
