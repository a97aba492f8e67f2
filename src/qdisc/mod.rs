use crate::packet_context::PacketContext;

mod active_set;
mod channel_registry;
mod fifo_qdisc;
mod monitor_qdisc;
mod wfq_qdisc;

pub use fifo_qdisc::FifoQdisc;
pub use monitor_qdisc::MonitorQdisc;
pub use wfq_qdisc::WfqQdisc;

pub trait Qdisc<K> {
    // Err 把被拒绝的包原样退回给调用方
    fn enqueue(&mut self, ctx: PacketContext<K>) -> Result<(), PacketContext<K>>;
    fn peek(&self) -> Option<&PacketContext<K>>;
    fn dequeue(&mut self) -> Option<PacketContext<K>>;
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
