use std::io::BufRead;

use tracing::trace;

use crate::{error::WfqError, four_tuple::FourTuple, packet_context::PacketContext};

// 记录来源：按到达时间有序地吐出解析好的记录，None 表示输入耗尽
pub trait RecordSource<K> {
    fn next_record(&mut self) -> Result<Option<PacketContext<K>>, WfqError>;
}

// ==========================================
// 逐行读取的记录来源 (stdin / 文件 / 内存都行)
// ==========================================
pub struct LineSource<R> {
    reader: R,
    line_no: usize,
    buf: String,
}

impl<R: BufRead> LineSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line_no: 0,
            buf: String::new(),
        }
    }
}

impl<R: BufRead> RecordSource<FourTuple> for LineSource<R> {
    fn next_record(&mut self) -> Result<Option<PacketContext<FourTuple>>, WfqError> {
        self.buf.clear();
        if self.reader.read_line(&mut self.buf)? == 0 {
            return Ok(None);
        }
        self.line_no += 1;

        let line = self.buf.trim_end_matches(['\n', '\r']);
        let ctx = parse_line(self.line_no, line)?;
        trace!(line = self.line_no, arrival = ctx.arrival_time, len = ctx.pkt_len, "parsed record");
        Ok(Some(ctx))
    }
}

// <arrival_time> <src_addr> <src_port> <dst_addr> <dst_port> <length> [<weight>]
pub fn parse_line(line_no: usize, line: &str) -> Result<PacketContext<FourTuple>, WfqError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != 6 && fields.len() != 7 {
        return Err(WfqError::malformed(
            line_no,
            line,
            format!("expected 6 or 7 fields, found {}", fields.len()),
        ));
    }

    let arrival_time: u64 = fields[0]
        .parse()
        .map_err(|e| WfqError::malformed(line_no, line, format!("arrival time: {e}")))?;

    let pkt_len: u64 = fields[5]
        .parse()
        .map_err(|e| WfqError::malformed(line_no, line, format!("length: {e}")))?;
    if pkt_len == 0 {
        return Err(WfqError::malformed(line_no, line, "length must be positive"));
    }

    let weight = match fields.get(6) {
        Some(raw) => {
            let w: f64 = raw
                .parse()
                .map_err(|e| WfqError::malformed(line_no, line, format!("weight: {e}")))?;
            // NaN / inf / <= 0 都会把虚拟完成时间算坏
            if !w.is_finite() || w <= 0.0 {
                return Err(WfqError::malformed(
                    line_no,
                    line,
                    "weight must be a positive finite number",
                ));
            }
            Some(w)
        }
        None => None,
    };

    let key = FourTuple::from([fields[1], fields[2], fields[3], fields[4]]);
    Ok(PacketContext::new(key, arrival_time, pkt_len, weight))
}
