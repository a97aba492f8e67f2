use std::collections::VecDeque;

use crate::{packet_context::PacketContext, qdisc::Qdisc};

// ==========================================
// 按到达顺序发送的 FIFO，对照组用，忽略权重
// ==========================================
pub struct FifoQdisc<K> {
    queue: VecDeque<PacketContext<K>>,
}

impl<K> FifoQdisc<K> {
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
        }
    }
}

impl<K> Qdisc<K> for FifoQdisc<K> {
    fn enqueue(&mut self, ctx: PacketContext<K>) -> Result<(), PacketContext<K>> {
        self.queue.push_back(ctx);
        Ok(())
    }

    fn peek(&self) -> Option<&PacketContext<K>> {
        self.queue.front()
    }

    fn dequeue(&mut self) -> Option<PacketContext<K>> {
        self.queue.pop_front()
    }

    fn len(&self) -> usize {
        self.queue.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serves_in_admission_order_regardless_of_weight() {
        let mut q = FifoQdisc::new();
        q.enqueue(PacketContext::new("x", 0, 100, None)).unwrap();
        q.enqueue(PacketContext::new("y", 0, 1, Some(50.0))).unwrap();
        assert_eq!(q.len(), 2);
        assert_eq!(q.peek().map(|c| c.key), Some("x"));

        assert_eq!(q.dequeue().map(|c| c.key), Some("x"));
        assert_eq!(q.dequeue().map(|c| c.key), Some("y"));
        assert!(q.dequeue().is_none());
        assert!(q.is_empty());
    }
}
