//! 仿真时间类型
//!
//! 定义仿真时间、单位转换，以及 `2ms` / `1.5s` 这类时间字符串的解析。

use std::fmt;
use std::str::FromStr;

const NANOS_PER_SEC: u64 = 1_000_000_000;

/// 仿真时间（纳秒）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct SimTime(pub u64);

impl SimTime {
    pub const ZERO: SimTime = SimTime(0);

    pub fn from_micros(us: u64) -> SimTime {
        SimTime(us.saturating_mul(1_000))
    }
    pub fn from_millis(ms: u64) -> SimTime {
        SimTime(ms.saturating_mul(1_000_000))
    }
    pub fn from_secs(s: u64) -> SimTime {
        SimTime(s.saturating_mul(NANOS_PER_SEC))
    }

    pub fn saturating_add(self, other: SimTime) -> SimTime {
        SimTime(self.0.saturating_add(other.0))
    }

    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / NANOS_PER_SEC as f64
    }

    /// 精确的十进制秒表示（去掉小数末尾的 0），例如 `0.002208`、`2`。
    pub fn secs_string(self) -> String {
        let secs = self.0 / NANOS_PER_SEC;
        let frac = self.0 % NANOS_PER_SEC;
        if frac == 0 {
            return secs.to_string();
        }
        let frac = format!("{frac:09}");
        format!("{secs}.{}", frac.trim_end_matches('0'))
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.secs_string())
    }
}

/// 时间字符串解析错误
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseTimeError {
    #[error("empty time value")]
    Empty,
    #[error("invalid number in time value `{0}`")]
    InvalidNumber(String),
    #[error("unknown time unit `{unit}` in `{value}` (expected s, ms, us, ns, min or h)")]
    UnknownUnit { value: String, unit: String },
    #[error("time value `{0}` overflows")]
    Overflow(String),
}

fn unit_nanos(unit: &str) -> Option<u128> {
    let n = match unit {
        "h" => 3_600 * NANOS_PER_SEC as u128,
        "min" => 60 * NANOS_PER_SEC as u128,
        "s" => NANOS_PER_SEC as u128,
        "ms" => 1_000_000,
        "us" => 1_000,
        "ns" => 1,
        _ => return None,
    };
    Some(n)
}

impl FromStr for SimTime {
    type Err = ParseTimeError;

    /// 解析 `<数字><单位>`；数字可以带小数（按纳秒截断）。
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();
        if value.is_empty() {
            return Err(ParseTimeError::Empty);
        }
        let (number, unit) = split_number_unit(value);
        let factor = unit_nanos(unit).ok_or_else(|| ParseTimeError::UnknownUnit {
            value: value.to_string(),
            unit: unit.to_string(),
        })?;
        let nanos = scaled_decimal(number, factor)
            .ok_or_else(|| ParseTimeError::InvalidNumber(value.to_string()))?;
        u64::try_from(nanos)
            .map(SimTime)
            .map_err(|_| ParseTimeError::Overflow(value.to_string()))
    }
}

/// 把 `2.5ms` 拆成 (`2.5`, `ms`)。
pub(crate) fn split_number_unit(value: &str) -> (&str, &str) {
    let split = value
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(value.len());
    let (number, unit) = value.split_at(split);
    (number, unit.trim())
}

/// 十进制数乘以整数倍率（小数部分截断）；格式错误或溢出返回 None。
pub(crate) fn scaled_decimal(number: &str, factor: u128) -> Option<u128> {
    let (int_part, frac_part) = number.split_once('.').unwrap_or((number, ""));
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(int_part) || !all_digits(frac_part) || frac_part.len() > 18 {
        return None;
    }
    let whole: u128 = if int_part.is_empty() {
        0
    } else {
        int_part.parse().ok()?
    };
    let mut scaled = whole.checked_mul(factor)?;
    if !frac_part.is_empty() {
        let digits: u128 = frac_part.parse().ok()?;
        let scale = 10u128.pow(frac_part.len() as u32);
        scaled = scaled.checked_add(digits.checked_mul(factor)? / scale)?;
    }
    Some(scaled)
}
