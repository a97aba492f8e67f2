use std::fmt;

use tracing::debug;

use crate::{
    error::WfqError, packet_context::PacketContext, qdisc::Qdisc, source::RecordSource,
};

// ==========================================
// 准入控制：只把到达时间 <= 上界的记录放进调度器
// 最多预读一条记录，读多了就先扣在手里
// ==========================================
pub struct Admission<S, K> {
    source: S,
    lookahead: Option<PacketContext<K>>,
    admitted: u64,
}

impl<S, K> Admission<S, K>
where
    S: RecordSource<K>,
    K: fmt::Display,
{
    pub fn new(source: S) -> Self {
        Self {
            source,
            lookahead: None,
            admitted: 0,
        }
    }

    // 预读区为空时补一条；None 表示输入已经耗尽
    fn fill(&mut self) -> Result<Option<&PacketContext<K>>, WfqError> {
        if self.lookahead.is_none() {
            self.lookahead = self.source.next_record()?;
        }
        Ok(self.lookahead.as_ref())
    }

    // 偷看下一条记录的到达时间，不消费
    pub fn next_arrival(&mut self) -> Result<Option<u64>, WfqError> {
        Ok(self.fill()?.map(|ctx| ctx.arrival_time))
    }

    // 收一批：到达时间 <= 上界，上界会收紧到本批第一条的到达时间
    pub fn admit_up_to<Q>(&mut self, qdisc: &mut Q, time_bound: u64) -> Result<usize, WfqError>
    where
        Q: Qdisc<K> + ?Sized,
    {
        let mut bound = time_bound;
        let mut count = 0;

        loop {
            match self.fill()? {
                Some(next) if next.arrival_time <= bound => bound = next.arrival_time,
                _ => break,
            }
            let Some(ctx) = self.lookahead.take() else {
                break;
            };

            if let Err(rejected) = qdisc.enqueue(ctx) {
                return Err(WfqError::Rejected {
                    key: rejected.key.to_string(),
                });
            }
            count += 1;
        }

        if count > 0 {
            self.admitted += count as u64;
            debug!(count, batch_time = bound, "admitted batch");
        }
        Ok(count)
    }

    // 一批一批收，直到 time_bound 之前到达的全部入队
    pub fn admit_all_due<Q>(&mut self, qdisc: &mut Q, time_bound: u64) -> Result<usize, WfqError>
    where
        Q: Qdisc<K> + ?Sized,
    {
        let mut total = 0;
        loop {
            let count = self.admit_up_to(qdisc, time_bound)?;
            if count == 0 {
                return Ok(total);
            }
            total += count;
        }
    }

    pub fn admitted(&self) -> u64 {
        self.admitted
    }
}
