//! 事件 trait
//!
//! 定义仿真事件接口：普通调度事件与销毁钩子共用同一接口。

use super::simulator::Simulator;
use super::world::World;

/// 事件：可被调度执行，也可作为 `Simulator::schedule_destroy` 的销毁钩子。
/// 使用 `self: Box<Self>` 以支持 move/所有权转移。
pub trait Event: Send + 'static {
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World);
}
