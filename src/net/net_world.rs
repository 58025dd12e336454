//! 网络世界实现
//!
//! 定义网络仿真的世界（World）实现：网络本身 + 本次运行的上下文。

use super::network::Network;
use crate::scenario::RunContext;
use crate::sim::World;
use std::any::Any;

/// 网络世界：事件通过向下转型拿到网络和运行上下文。
pub struct NetWorld {
    pub net: Network,
    pub ctx: RunContext,
}

impl NetWorld {
    pub fn new(net: Network, ctx: RunContext) -> Self {
        Self { net, ctx }
    }
}

impl World for NetWorld {
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
