use chrono::Local;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use crate::packet_context::PacketContext;
use crate::qdisc::Qdisc;

// ==========================================
// 1. 每个流的统计表 (进出量 + 积压水位)
// ==========================================
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FlowStats {
    pub in_pkts: u64,
    pub in_bytes: u64,
    pub out_pkts: u64,
    pub out_bytes: u64,

    // 实时积压水位和峰值
    pub backlog_pkts: u64,
    pub backlog_bytes: u64,
    pub peak_backlog_pkts: u64,
}

// ==========================================
// 2. 监控外壳：只记账，不影响内部调度决策
// ==========================================
pub struct MonitorQdisc<K> {
    name: String,
    pub inner: Box<dyn Qdisc<K>>,
    index_of: HashMap<K, usize>,
    flows: Vec<(K, FlowStats)>, // 按第一次出现的顺序
}

impl<K> MonitorQdisc<K>
where
    K: Hash + Eq + Clone,
{
    pub fn new(name: &str, inner: Box<dyn Qdisc<K>>) -> Self {
        Self {
            name: name.to_string(),
            inner,
            index_of: HashMap::new(),
            flows: Vec::new(),
        }
    }

    fn stat_mut(&mut self, key: &K) -> &mut FlowStats {
        let idx = match self.index_of.get(key) {
            Some(&idx) => idx,
            None => {
                let idx = self.flows.len();
                self.flows.push((key.clone(), FlowStats::default()));
                self.index_of.insert(key.clone(), idx);
                idx
            }
        };
        &mut self.flows[idx].1
    }

    pub fn flow_count(&self) -> usize {
        self.flows.len()
    }
}

impl<K> MonitorQdisc<K>
where
    K: Hash + Eq + Clone + fmt::Display,
{
    // 最终报表 (调用方写到 stderr，别和调度结果混在一起)
    pub fn report(&self) -> FlowReport<'_, K> {
        FlowReport { monitor: self }
    }
}

impl FlowStats {
    // 汇总行；超大流量就封顶，不回绕
    fn accumulate(&mut self, other: &FlowStats) {
        self.in_pkts = self.in_pkts.saturating_add(other.in_pkts);
        self.in_bytes = self.in_bytes.saturating_add(other.in_bytes);
        self.out_pkts = self.out_pkts.saturating_add(other.out_pkts);
        self.out_bytes = self.out_bytes.saturating_add(other.out_bytes);
        self.backlog_pkts = self.backlog_pkts.saturating_add(other.backlog_pkts);
        self.backlog_bytes = self.backlog_bytes.saturating_add(other.backlog_bytes);
        self.peak_backlog_pkts = self.peak_backlog_pkts.max(other.peak_backlog_pkts);
    }
}

pub struct FlowReport<'a, K> {
    monitor: &'a MonitorQdisc<K>,
}

fn write_row(f: &mut fmt::Formatter<'_>, label: &str, stat: &FlowStats) -> fmt::Result {
    writeln!(
        f,
        "{:<32} | {:>8} | {:>10} | {:>8} | {:>10} | {:>6} | {:>8} | {:>6}",
        label,
        stat.in_pkts,
        stat.in_bytes,
        stat.out_pkts,
        stat.out_bytes,
        stat.backlog_pkts,
        stat.backlog_bytes,
        stat.peak_backlog_pkts
    )
}

impl<K> fmt::Display for FlowReport<'_, K>
where
    K: Hash + Eq + Clone + fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let monitor = self.monitor;
        let now_str = Local::now().format("%Y-%m-%d %H:%M:%S");
        let rule = "-".repeat(107);

        writeln!(
            f,
            "[{}] flow report: {} ({} flows)",
            now_str,
            monitor.name,
            monitor.flow_count()
        )?;
        writeln!(f, "{rule}")?;
        writeln!(
            f,
            "{:<32} | {:>8} | {:>10} | {:>8} | {:>10} | {:>6} | {:>8} | {:>6}",
            "Flow", "InPkts", "InBytes", "OutPkts", "OutBytes", "Queued", "QBytes", "Peak"
        )?;
        writeln!(f, "{rule}")?;

        let mut total = FlowStats::default();
        for (key, stat) in &monitor.flows {
            write_row(f, &key.to_string(), stat)?;
            total.accumulate(stat);
        }

        writeln!(f, "{rule}")?;
        write_row(f, "TOTAL", &total)
    }
}

// ==========================================
// 3. 实现 Qdisc 接口 (拦截、更新、平账)
// ==========================================
impl<K> Qdisc<K> for MonitorQdisc<K>
where
    K: Hash + Eq + Clone,
{
    fn enqueue(&mut self, ctx: PacketContext<K>) -> Result<(), PacketContext<K>> {
        let key = ctx.key.clone();
        let cost = ctx.pkt_len;

        let result = self.inner.enqueue(ctx);
        if result.is_ok() {
            let stat = self.stat_mut(&key);
            stat.in_pkts = stat.in_pkts.saturating_add(1);
            stat.in_bytes = stat.in_bytes.saturating_add(cost);
            stat.backlog_pkts = stat.backlog_pkts.saturating_add(1);
            stat.backlog_bytes = stat.backlog_bytes.saturating_add(cost);
            stat.peak_backlog_pkts = stat.peak_backlog_pkts.max(stat.backlog_pkts);
        }
        result
    }

    fn peek(&self) -> Option<&PacketContext<K>> {
        self.inner.peek()
    }

    fn dequeue(&mut self) -> Option<PacketContext<K>> {
        let ctx = self.inner.dequeue()?;

        let stat = self.stat_mut(&ctx.key);
        stat.out_pkts = stat.out_pkts.saturating_add(1);
        stat.out_bytes = stat.out_bytes.saturating_add(ctx.pkt_len);
        // 正常出队，核销积压水位
        stat.backlog_pkts = stat.backlog_pkts.saturating_sub(1);
        stat.backlog_bytes = stat.backlog_bytes.saturating_sub(ctx.pkt_len);

        Some(ctx)
    }

    fn len(&self) -> usize {
        self.inner.len()
    }
}
