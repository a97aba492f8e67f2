use std::fmt;

// 一条解析好的输入记录，解析完就不再修改
#[derive(Debug, Clone, PartialEq)]
pub struct PacketContext<K> {
    pub key: K, // 流标识 (用于找到所属 channel)

    pub arrival_time: u64, // 仿真时间轴上的到达时刻
    pub pkt_len: u64,      // 发送代价，必须 > 0

    // 只有输入行显式带了权重才有值；输出时也只有它才打印权重
    pub weight: Option<f64>,
}

impl<K> PacketContext<K> {
    pub fn new(key: K, arrival_time: u64, pkt_len: u64, weight: Option<f64>) -> Self {
        Self {
            key,
            arrival_time,
            pkt_len,
            weight,
        }
    }
}

// <arrival_time> <flow_key> <length>[ <weight 两位小数>]
impl<K: fmt::Display> fmt::Display for PacketContext<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.arrival_time, self.key, self.pkt_len)?;
        if let Some(weight) = self.weight {
            write!(f, " {:.2}", weight)?;
        }
        Ok(())
    }
}
