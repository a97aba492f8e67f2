use thiserror::Error;

// ==========================================
// 统一错误类型：任何一种都意味着本次仿真作废
// ==========================================
#[derive(Debug, Error)]
pub enum WfqError {
    #[error("bad input line {line}: {reason}: {input:?}")]
    MalformedRecord {
        line: usize,
        input: String,
        reason: String,
    },

    #[error("clock overflow: packet arriving at {arrival} with length {len} would end past u64::MAX")]
    ClockOverflow { arrival: u64, len: u64 },

    #[error("queueing discipline rejected a packet of flow {key}")]
    Rejected { key: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl WfqError {
    pub fn malformed(line: usize, input: &str, reason: impl Into<String>) -> Self {
        WfqError::MalformedRecord {
            line,
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}
