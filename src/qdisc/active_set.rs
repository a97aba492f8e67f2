use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use tracing::debug;

use super::channel_registry::Channel;

// 入堆时拍下的完成时间快照，排序只看快照，不看 channel 的实时状态
#[derive(Debug, Clone, Copy)]
pub struct ActiveEntry {
    pub finish: f64,
    pub channel: usize,
}

impl PartialEq for ActiveEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ActiveEntry {}

impl Ord for ActiveEntry {
    // 完成时间小的优先，相同就比 channel index
    fn cmp(&self, other: &Self) -> Ordering {
        self.finish
            .total_cmp(&other.finish)
            .then(self.channel.cmp(&other.channel))
    }
}

impl PartialOrd for ActiveEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// ==========================================
// 活跃集合：队列非空且队头已算好完成时间的 channel
// ==========================================
pub struct ActiveSet {
    heap: BinaryHeap<Reverse<ActiveEntry>>,
}

impl ActiveSet {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
        }
    }

    // 给队头算完成时间并放进活跃集合；每次换队头只能调用一次
    pub fn activate<K>(&mut self, channel: &mut Channel<K>, virtual_time: f64) -> Option<f64> {
        let head = channel.queue.front()?;

        let start = virtual_time.max(channel.last_finish_time);
        let finish = start + head.pkt_len as f64 / channel.weight;
        channel.last_finish_time = finish;

        debug!(
            channel = channel.index,
            start,
            finish,
            weight = channel.weight,
            "channel activated"
        );
        self.heap.push(Reverse(ActiveEntry {
            finish,
            channel: channel.index,
        }));
        Some(finish)
    }

    pub fn pop_highest_priority(&mut self) -> Option<ActiveEntry> {
        self.heap.pop().map(|Reverse(entry)| entry)
    }

    pub fn peek(&self) -> Option<&ActiveEntry> {
        self.heap.peek().map(|Reverse(entry)| entry)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet_context::PacketContext;
    use crate::qdisc::channel_registry::ChannelRegistry;

    fn channel_with(
        registry: &mut ChannelRegistry<&'static str>,
        key: &'static str,
        len: u64,
        weight: Option<f64>,
    ) -> usize {
        let idx = registry.get_or_create(&key);
        registry.enqueue(idx, PacketContext::new(key, 0, len, weight));
        idx
    }

    #[test]
    fn activate_requires_a_head_packet() {
        let mut registry = ChannelRegistry::<&str>::new();
        let idx = registry.get_or_create(&"a");
        let mut active = ActiveSet::new();

        assert_eq!(active.activate(registry.get_mut(idx), 0.0), None);
        assert_eq!(active.len(), 0);
        assert_eq!(registry.get(idx).last_finish_time, 0.0);
    }

    #[test]
    fn finish_tag_is_start_plus_length_over_weight() {
        let mut registry = ChannelRegistry::new();
        let idx = channel_with(&mut registry, "a", 20, Some(2.0));
        let mut active = ActiveSet::new();

        assert_eq!(active.activate(registry.get_mut(idx), 5.0), Some(15.0));
        assert_eq!(registry.get(idx).last_finish_time, 15.0);
    }

    #[test]
    fn start_uses_remembered_finish_when_larger_than_virtual_time() {
        let mut registry = ChannelRegistry::new();
        let idx = channel_with(&mut registry, "a", 10, None);
        registry.get_mut(idx).last_finish_time = 40.0;
        let mut active = ActiveSet::new();

        assert_eq!(active.activate(registry.get_mut(idx), 25.0), Some(50.0));
    }

    #[test]
    fn pops_smallest_finish_then_smallest_index() {
        let mut registry = ChannelRegistry::new();
        let x = channel_with(&mut registry, "x", 20, Some(2.0)); // 10
        let y = channel_with(&mut registry, "y", 10, None); // 10
        let z = channel_with(&mut registry, "z", 5, None); // 5
        let mut active = ActiveSet::new();

        active.activate(registry.get_mut(y), 0.0);
        active.activate(registry.get_mut(x), 0.0);
        active.activate(registry.get_mut(z), 0.0);
        assert_eq!(active.len(), 3);
        assert_eq!(active.peek().map(|e| e.channel), Some(z));

        let order: Vec<usize> = std::iter::from_fn(|| active.pop_highest_priority())
            .map(|e| e.channel)
            .collect();
        assert_eq!(order, vec![z, x, y]);
        assert!(active.pop_highest_priority().is_none());
    }
}
