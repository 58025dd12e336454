//! 节点类型
//!
//! 仿真中的无线节点：常量位置 + 可选的协议栈（路由、DSR、IPv4 接口）。

use super::address::Ipv4Interface;
use super::id::NodeId;
use super::position::Position;
use crate::routing::ListRouting;

/// 节点上安装的协议栈
#[derive(Debug, Clone, Default)]
pub struct InternetStack {
    /// 列表路由；DSR 路径下为 None
    pub routing: Option<ListRouting>,
    /// 是否在协议栈之上叠加了 DSR
    pub dsr: bool,
    pub interface: Option<Ipv4Interface>,
}

/// 网络节点
#[derive(Debug)]
pub struct Node {
    id: NodeId,
    position: Position,
    stack: Option<InternetStack>,
}

impl Node {
    /// 创建新节点（位于原点，未安装协议栈）
    pub fn new(id: NodeId) -> Self {
        Self {
            id,
            position: Position::default(),
            stack: None,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub(crate) fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    pub fn stack(&self) -> Option<&InternetStack> {
        self.stack.as_ref()
    }

    pub(crate) fn stack_mut(&mut self) -> Option<&mut InternetStack> {
        self.stack.as_mut()
    }

    pub(crate) fn set_stack(&mut self, stack: InternetStack) {
        self.stack = Some(stack);
    }

    /// 已分配的 IPv4 接口
    pub fn interface(&self) -> Option<Ipv4Interface> {
        self.stack.as_ref().and_then(|s| s.interface)
    }
}
