//! 仿真器
//!
//! 定义事件驱动仿真器，维护当前时间、事件队列、全局截止时间与销毁钩子。

use super::event::Event;
use super::scheduled_event::ScheduledEvent;
use super::time::SimTime;
use super::world::World;
use std::collections::BinaryHeap;
use tracing::{debug, info, trace};

/// 事件驱动仿真器：维护当前时间与事件队列。
#[derive(Default)]
pub struct Simulator {
    now: SimTime,
    next_seq: u64,
    q: BinaryHeap<ScheduledEvent>,
    /// `stop_at` 设置的全局截止时间
    stop: Option<SimTime>,
    /// `destroy` 时按注册顺序执行的钩子
    on_destroy: Vec<Box<dyn Event>>,
    destroyed: bool,
}

impl Simulator {
    /// 获取当前仿真时间
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// 队列中尚未执行的事件数
    pub fn pending(&self) -> usize {
        self.q.len()
    }

    /// 调度事件在指定时间执行
    #[tracing::instrument(skip(self, ev), fields(event_type = std::any::type_name::<E>(), schedule_at = ?at))]
    pub fn schedule<E: Event>(&mut self, at: SimTime, ev: E) {
        let seq = self.next_seq;
        trace!(now = ?self.now, seq, "调度事件");

        self.next_seq = self.next_seq.wrapping_add(1);
        self.q.push(ScheduledEvent {
            at,
            seq,
            kind: std::any::type_name::<E>(),
            ev: Box::new(ev),
        });

        debug!(queue_size = self.q.len(), "事件已加入队列");
    }

    /// 设置全局截止时间：晚于 `at` 的事件永远不会执行，`run` 结束时时钟停在 `at`。
    pub fn stop_at(&mut self, at: SimTime) {
        debug!(stop_at = %at, "设置仿真截止时间");
        self.stop = Some(at);
    }

    /// 注册销毁钩子（在 `destroy` 时执行一次）。
    pub fn schedule_destroy<E: Event>(&mut self, ev: E) {
        trace!(event_type = std::any::type_name::<E>(), "注册销毁钩子");
        self.on_destroy.push(Box::new(ev));
    }

    /// 运行直到事件队列为空或到达 `until`（同时受 `stop_at` 限制）。
    pub fn run_until(&mut self, until: SimTime, world: &mut dyn World) {
        let until = match self.stop {
            Some(stop) => until.min(stop),
            None => until,
        };
        self.drain(Some(until), world);
        self.now = self.now.max(until);
    }

    /// 运行所有事件，直到队列为空或到达 `stop_at` 设置的截止时间。
    #[tracing::instrument(skip(self, world))]
    pub fn run(&mut self, world: &mut dyn World) {
        info!("▶️  开始运行仿真");
        debug!(now = ?self.now, queue_size = self.q.len(), stop = ?self.stop, "初始状态");

        let event_count = self.drain(self.stop, world);
        if let Some(stop) = self.stop {
            self.now = self.now.max(stop);
        }

        info!(
            total_events = event_count,
            final_time = %self.now,
            left_in_queue = self.q.len(),
            "✅ 仿真完成"
        );
    }

    /// 执行销毁钩子并丢弃所有未执行事件。重复调用不会再次执行钩子。
    pub fn destroy(&mut self, world: &mut dyn World) {
        if self.destroyed {
            debug!("仿真器已销毁，忽略");
            return;
        }
        self.destroyed = true;

        let discarded = self.q.len();
        self.q.clear();
        let hooks = std::mem::take(&mut self.on_destroy);
        info!(hooks = hooks.len(), discarded, "🧹 销毁仿真器");
        for hook in hooks {
            hook.execute(self, world);
        }
    }

    fn drain(&mut self, limit: Option<SimTime>, world: &mut dyn World) -> u64 {
        let mut event_count = 0u64;
        while let Some(top) = self.q.peek() {
            if limit.is_some_and(|limit| top.at > limit) {
                break;
            }
            let Some(item) = self.q.pop() else { break };
            event_count += 1;
            self.now = item.at;

            debug!(
                event_num = event_count,
                now = ?self.now,
                seq = item.seq,
                event_type = item.kind,
                remaining_queue = self.q.len(),
                "执行事件"
            );

            item.ev.execute(self, world);
            world.on_tick(self);
        }
        event_count
    }
}
