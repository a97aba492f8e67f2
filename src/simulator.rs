use std::fmt;
use std::io::Write;

use tracing::{debug, info};

use crate::{admission::Admission, error::WfqError, qdisc::Qdisc, source::RecordSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    // 活跃集合为空，等新输入
    Idle,
    // 还有可以发送的 channel
    Draining,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub dispatched: u64,
    pub final_time: u64,
}

// ==========================================
// 调度主循环：发一个包 -> 时间前进 -> 把这段时间里到达的包全部收进来
// ==========================================
pub struct Simulator<S, K, Q> {
    admission: Admission<S, K>,
    qdisc: Q,
    physical_time: u64,
}

impl<S, K, Q> Simulator<S, K, Q>
where
    S: RecordSource<K>,
    K: fmt::Display,
    Q: Qdisc<K>,
{
    pub fn new(source: S, qdisc: Q) -> Self {
        Self {
            admission: Admission::new(source),
            qdisc,
            physical_time: 0,
        }
    }

    // 跑到输入耗尽且所有包都发完；每发一个包往 out 写一行 `<time>: <packet>`
    pub fn run<W: Write>(&mut self, out: &mut W) -> Result<RunSummary, WfqError> {
        let mut state = State::Idle;
        let mut dispatched = 0;

        loop {
            match state {
                State::Idle => {
                    // 链路空闲：时钟直接跳到下一批到达时刻
                    let Some(start) = self.admission.next_arrival()? else {
                        break;
                    };
                    if self.admission.admit_up_to(&mut self.qdisc, u64::MAX)? == 0 {
                        break;
                    }
                    debug!(from = self.physical_time, to = start, "link idle, clock jumps");
                    self.physical_time = start;
                    state = State::Draining;
                }
                State::Draining => {
                    let Some(ctx) = self.qdisc.dequeue() else {
                        state = State::Idle;
                        continue;
                    };
                    // 先算结束时刻，溢出就整批作废，不输出这一行
                    let end = self.physical_time.checked_add(ctx.pkt_len).ok_or(
                        WfqError::ClockOverflow {
                            arrival: ctx.arrival_time,
                            len: ctx.pkt_len,
                        },
                    )?;
                    writeln!(out, "{}: {}", self.physical_time, ctx)?;
                    dispatched += 1;
                    self.physical_time = end;

                    // 发送期间到达的包必须在下一次决策之前全部入队
                    self.admission
                        .admit_all_due(&mut self.qdisc, self.physical_time)?;
                    if self.qdisc.is_empty() {
                        state = State::Idle;
                    }
                }
            }
        }

        let summary = RunSummary {
            dispatched,
            final_time: self.physical_time,
        };
        info!(
            dispatched = summary.dispatched,
            admitted = self.admission.admitted(),
            final_time = summary.final_time,
            "simulation finished"
        );
        Ok(summary)
    }

    pub fn into_qdisc(self) -> Q {
        self.qdisc
    }
}
