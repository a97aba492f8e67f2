use std::{
    fs::File,
    io::{self, BufRead, BufReader, BufWriter, Write},
    path::PathBuf,
};
// 引入模块
mod admission;
mod error;
mod four_tuple;
mod packet_context;
mod qdisc;
mod simulator;
mod source;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use crate::{
    four_tuple::FourTuple,
    qdisc::{FifoQdisc, MonitorQdisc, Qdisc, WfqQdisc},
    simulator::Simulator,
    source::LineSource,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Discipline {
    /// Weighted fair queueing (virtual finish tags).
    Wfq,
    /// Plain arrival order, ignores weights.
    Fifo,
}

/// Replays a packet arrival trace through a single-link scheduler and prints
/// the transmission start time of every packet.
#[derive(Parser, Debug)]
#[command(name = "wfq_sim", version, about)]
struct Cli {
    /// Trace file, one `<time> <src> <sport> <dst> <dport> <len> [<weight>]`
    /// record per line, sorted by time. Reads stdin when omitted.
    input: Option<PathBuf>,

    /// Queueing discipline for the link.
    #[arg(long, value_enum, default_value_t = Discipline::Wfq)]
    discipline: Discipline,

    /// Print a per-flow accounting table to stderr after the run.
    #[arg(long, default_value_t = false)]
    stats: bool,
}

fn open_input(path: Option<&PathBuf>) -> anyhow::Result<Box<dyn BufRead>> {
    Ok(match path {
        Some(path) => {
            let file =
                File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(io::stdin().lock()),
    })
}

fn main() -> anyhow::Result<()> {
    // 日志一律走 stderr，stdout 只放调度结果
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    tracing::info!(discipline = ?cli.discipline, input = ?cli.input, "wfq_sim starting");

    let reader = open_input(cli.input.as_ref())?;

    // 调度器外面套一层监控，只记账不改顺序
    let inner: Box<dyn Qdisc<FourTuple>> = match cli.discipline {
        Discipline::Wfq => Box::new(WfqQdisc::new()),
        Discipline::Fifo => Box::new(FifoQdisc::new()),
    };
    let pipeline = MonitorQdisc::new("link", inner);

    let mut sim = Simulator::new(LineSource::new(reader), pipeline);
    let mut out = BufWriter::new(io::stdout().lock());

    // 出错前已经发出去的行要先刷出去，再报错退出
    let result = sim.run(&mut out);
    out.flush().context("cannot write schedule")?;
    let summary = result.with_context(|| match &cli.input {
        Some(path) => format!("simulation aborted while reading {}", path.display()),
        None => "simulation aborted while reading stdin".to_string(),
    })?;

    tracing::info!(
        dispatched = summary.dispatched,
        final_time = summary.final_time,
        "schedule written"
    );

    if cli.stats {
        let monitor = sim.into_qdisc();
        eprint!("{}", monitor.report());
    }
    Ok(())
}
