pub mod history;
pub mod ranker;
pub mod rate;
pub mod sampler;
pub mod series;
pub mod source;

pub use history::MetricHistory;
pub use ranker::rank;
pub use rate::{rate, CounterRates, RateError};
pub use sampler::{Renderer, Sampler, SamplerHandle, SnapshotSlot, TickError};
pub use series::{RollingSeries, MAX_HISTORY};
pub use source::{DiskCounters, MetricSource, NetCounters, SourceError, SysinfoSource};

use std::time::SystemTime;

/// One row of the process listing, as read during a single tick.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessInfo {
    pub pid: u32,
    pub name: String,
    /// `None` when the OS would not report it.
    pub cpu_percent: Option<f32>,
    pub mem_percent: f32,
}

/// Cumulative byte counters captured in one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterSample {
    pub read_bytes: u64,
    pub write_bytes: u64,
    pub sent_bytes: u64,
    pub recv_bytes: u64,
}

impl CounterSample {
    pub fn new(disk: DiskCounters, net: NetCounters) -> Self {
        Self {
            read_bytes: disk.read_bytes,
            write_bytes: disk.write_bytes,
            sent_bytes: net.sent_bytes,
            recv_bytes: net.recv_bytes,
        }
    }
}

/// Everything the display needs for one frame. Histories are copies, oldest
/// sample first.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub timestamp: SystemTime,
    pub top_processes: Vec<ProcessInfo>,
    pub memory_percent: f64,
    pub memory_history: Vec<f64>,
    pub disk_read_history: Vec<f64>,
    pub disk_write_history: Vec<f64>,
    pub net_sent_history: Vec<f64>,
    pub net_recv_history: Vec<f64>,
}
