use std::hash::Hash;

use tracing::debug;

use super::active_set::ActiveSet;
use super::channel_registry::ChannelRegistry;
use crate::packet_context::PacketContext;
use crate::qdisc::Qdisc;

// ==========================================
// 加权公平队列 (虚拟时间 + 完成时间标签)
// ==========================================
pub struct WfqQdisc<K> {
    channels: ChannelRegistry<K>,
    active: ActiveSet,

    // 全局虚拟时间，只会前进到刚发出去的包的完成时间
    virtual_time: f64,
    backlog: usize,
}

impl<K> WfqQdisc<K>
where
    K: Hash + Eq + Clone,
{
    pub fn new() -> Self {
        Self {
            channels: ChannelRegistry::new(),
            active: ActiveSet::new(),
            virtual_time: 0.0,
            backlog: 0,
        }
    }
}

impl<K> Qdisc<K> for WfqQdisc<K>
where
    K: Hash + Eq + Clone,
{
    fn enqueue(&mut self, ctx: PacketContext<K>) -> Result<(), PacketContext<K>> {
        let index = self.channels.get_or_create(&ctx.key);
        let queued = self.channels.enqueue(index, ctx);
        self.backlog += 1;

        // 空 -> 非空 的那一刻才入活跃集合，这是唯一的入口
        if queued == 1 {
            self.active
                .activate(self.channels.get_mut(index), self.virtual_time);
        }
        debug!(
            channel = index,
            queued,
            channels = self.channels.len(),
            "packet admitted"
        );
        Ok(())
    }

    fn peek(&self) -> Option<&PacketContext<K>> {
        let entry = self.active.peek()?;
        self.channels.get(entry.channel).queue.front()
    }

    fn dequeue(&mut self) -> Option<PacketContext<K>> {
        let entry = self.active.pop_highest_priority()?;
        let channel = self.channels.get_mut(entry.channel);
        let ctx = channel.queue.pop_front()?;
        self.backlog -= 1;

        self.virtual_time = self.virtual_time.max(entry.finish);
        debug!(
            channel = entry.channel,
            finish = entry.finish,
            virtual_time = self.virtual_time,
            active = self.active.len(),
            "dispatching head packet"
        );

        // 队列里还有包：新的队头立刻算完成时间，重新进活跃集合
        if !channel.queue.is_empty() {
            self.active.activate(channel, self.virtual_time);
        }
        Some(ctx)
    }

    fn len(&self) -> usize {
        self.backlog
    }
}
