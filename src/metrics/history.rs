use super::{CounterRates, RollingSeries};

/// Rolling histories for every system-wide metric the monitor tracks.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct MetricHistory {
    pub memory: RollingSeries,
    pub disk_read: RollingSeries,
    pub disk_write: RollingSeries,
    pub net_sent: RollingSeries,
    pub net_recv: RollingSeries,
}

impl MetricHistory {
    pub fn new(history_len: usize) -> Self {
        Self {
            memory: RollingSeries::new(history_len),
            disk_read: RollingSeries::new(history_len),
            disk_write: RollingSeries::new(history_len),
            net_sent: RollingSeries::new(history_len),
            net_recv: RollingSeries::new(history_len),
        }
    }

    /// Appends one tick's worth of values to every series at once, so the
    /// series always stay the same length.
    pub fn push(&mut self, memory_percent: f64, rates: CounterRates) {
        self.memory.append(memory_percent);
        self.disk_read.append(rates.disk_read);
        self.disk_write.append(rates.disk_write);
        self.net_sent.append(rates.net_sent);
        self.net_recv.append(rates.net_recv);
    }

    pub fn len(&self) -> usize {
        self.memory.len()
    }

    pub fn is_empty(&self) -> bool {
        self.memory.is_empty()
    }
}
