//! 世界 trait
//!
//! 定义仿真世界接口。

use super::simulator::Simulator;
use std::any::Any;

/// 仿真世界：由上层实现（例如 `NetWorld` 持有网络与一次运行的上下文）。
/// 事件通过 `as_any_mut` 向下转型拿到具体世界。
pub trait World: Any {
    fn as_any_mut(&mut self) -> &mut dyn Any;
    /// 每个事件执行完之后回调一次
    fn on_tick(&mut self, _sim: &mut Simulator) {}
}
