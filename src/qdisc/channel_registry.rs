use std::collections::hash_map::Entry;
use std::collections::{HashMap, VecDeque};
use std::hash::Hash;

use crate::packet_context::PacketContext;

pub const DEFAULT_WEIGHT: f64 = 1.0;

// 每个流一个 channel，第一次见到就创建，之后整个仿真期间都不销毁
// (last_finish_time 必须跨空闲期保留，否则回来的流会插队)
#[derive(Debug)]
pub struct Channel<K> {
    pub index: usize,
    pub weight: f64,
    pub queue: VecDeque<PacketContext<K>>,
    pub last_finish_time: f64,
}

impl<K> Channel<K> {
    fn new(index: usize) -> Self {
        Self {
            index,
            weight: DEFAULT_WEIGHT,
            queue: VecDeque::new(),
            last_finish_time: 0.0,
        }
    }
}

// 流标识 -> channel 下标
// channel 按创建顺序放在连续数组里，活跃集合只存下标就够了
pub struct ChannelRegistry<K> {
    index_of: HashMap<K, usize>,
    channels: Vec<Channel<K>>,
}

impl<K> ChannelRegistry<K>
where
    K: Hash + Eq + Clone,
{
    pub fn new() -> Self {
        Self {
            index_of: HashMap::new(),
            channels: Vec::new(),
        }
    }

    // 找不到就新建，index = 当前 channel 数量
    pub fn get_or_create(&mut self, key: &K) -> usize {
        match self.index_of.entry(key.clone()) {
            Entry::Occupied(entry) => *entry.get(),
            Entry::Vacant(entry) => {
                let index = self.channels.len();
                self.channels.push(Channel::new(index));
                entry.insert(index);
                index
            }
        }
    }

    // 入队；显式权重必须在任何完成时间计算之前生效 (包括这个包自己)
    // 返回入队后的队列长度
    pub fn enqueue(&mut self, index: usize, ctx: PacketContext<K>) -> usize {
        let channel = &mut self.channels[index];
        if let Some(weight) = ctx.weight {
            channel.weight = weight;
        }
        channel.queue.push_back(ctx);
        channel.queue.len()
    }

    pub fn get(&self, index: usize) -> &Channel<K> {
        &self.channels[index]
    }

    pub fn get_mut(&mut self, index: usize) -> &mut Channel<K> {
        &mut self.channels[index]
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    #[cfg(test)]
    pub fn index_of_key(&self, key: &K) -> Option<&usize> {
        self.index_of.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pkt(key: &'static str, len: u64, weight: Option<f64>) -> PacketContext<&'static str> {
        PacketContext::new(key, 0, len, weight)
    }

    #[test]
    fn indices_are_dense_and_follow_first_appearance() {
        let mut registry = ChannelRegistry::new();
        assert_eq!(registry.get_or_create(&"b"), 0);
        assert_eq!(registry.get_or_create(&"a"), 1);
        assert_eq!(registry.get_or_create(&"b"), 0);
        assert_eq!(registry.get_or_create(&"c"), 2);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn new_channel_starts_with_defaults() {
        let mut registry = ChannelRegistry::<&str>::new();
        let idx = registry.get_or_create(&"a");
        let channel = registry.get(idx);
        assert_eq!(channel.weight, DEFAULT_WEIGHT);
        assert_eq!(channel.last_finish_time, 0.0);
        assert!(channel.queue.is_empty());
    }

    #[test]
    fn explicit_weight_sticks_until_overridden() {
        let mut registry = ChannelRegistry::new();
        let idx = registry.get_or_create(&"a");

        assert_eq!(registry.enqueue(idx, pkt("a", 10, Some(4.0))), 1);
        assert_eq!(registry.get(idx).weight, 4.0);

        assert_eq!(registry.enqueue(idx, pkt("a", 10, None)), 2);
        assert_eq!(registry.get(idx).weight, 4.0);

        registry.enqueue(idx, pkt("a", 10, Some(0.5)));
        assert_eq!(registry.get(idx).weight, 0.5);
        assert_eq!(registry.get(idx).queue.len(), 3);
    }
}
