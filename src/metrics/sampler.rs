use super::{
    rank, CounterRates, CounterSample, MetricHistory, MetricSource, ProcessInfo, RateError,
    Snapshot, SourceError, MAX_HISTORY,
};
use crate::config::SharedConfig;
use log::{debug, info, warn};
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant, SystemTime};
use thiserror::Error;

/// Lower bound on how long a tick waits for the OS.
const MIN_COLLECT_TIMEOUT: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TickError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Rate(#[from] RateError),
}

/// Receives every snapshot the sampler emits. Implementations must return
/// quickly; the sampler calls this on its own thread between ticks.
pub trait Renderer: Send + Sync {
    fn on_snapshot(&self, snapshot: Snapshot);
}

/// Latest-wins mailbox between the sampler and a UI thread. Publishing
/// replaces whatever the UI has not picked up yet.
#[derive(Clone, Default)]
pub struct SnapshotSlot {
    latest: Arc<Mutex<Option<Snapshot>>>,
    waker: Option<Arc<dyn Fn() + Send + Sync>>,
}

impl SnapshotSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// `waker` runs after each publish, e.g. to request a repaint.
    pub fn with_waker(waker: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            latest: Arc::default(),
            waker: Some(Arc::new(waker)),
        }
    }

    pub fn take(&self) -> Option<Snapshot> {
        self.latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

impl Renderer for SnapshotSlot {
    fn on_snapshot(&self, snapshot: Snapshot) {
        *self.latest.lock().unwrap_or_else(PoisonError::into_inner) = Some(snapshot);
        if let Some(waker) = &self.waker {
            waker();
        }
    }
}

/// Raw readings gathered for one tick.
struct Reading {
    processes: Vec<ProcessInfo>,
    memory_percent: f64,
    counters: CounterSample,
}

fn read_source(source: &dyn MetricSource) -> Result<Reading, SourceError> {
    source.refresh()?;
    let processes = source.list_processes()?;
    let memory_percent = source.virtual_memory_percent()?;
    if !(0.0..=100.0).contains(&memory_percent) {
        return Err(SourceError::OutOfRange {
            what: "memory percent",
            value: memory_percent,
        });
    }
    let counters = CounterSample::new(source.disk_counters()?, source.net_counters()?);
    Ok(Reading {
        processes,
        memory_percent,
        counters,
    })
}

/// Runs source queries on a worker thread so a hung OS call costs the
/// sampler one timeout instead of the whole loop. A panicking source fails
/// that tick only.
struct Collector {
    requests: Sender<()>,
    replies: Receiver<Result<Reading, SourceError>>,
    in_flight: bool,
}

impl Collector {
    fn spawn(source: Arc<dyn MetricSource>) -> Self {
        let (requests, request_rx) = mpsc::channel::<()>();
        let (reply_tx, replies) = mpsc::channel();

        let worker = thread::Builder::new()
            .name("metric-collector".into())
            .spawn(move || {
                for () in request_rx {
                    let reply = panic::catch_unwind(AssertUnwindSafe(|| {
                        read_source(source.as_ref())
                    }))
                    .unwrap_or(Err(SourceError::Panicked));
                    if reply_tx.send(reply).is_err() {
                        break;
                    }
                }
            });
        // Without a worker every request fails with `Disconnected`.
        if let Err(e) = worker {
            warn!("Could not start metric collector: {e}");
        }

        Self {
            requests,
            replies,
            in_flight: false,
        }
    }

    fn collect(&mut self, timeout: Duration) -> Result<Reading, SourceError> {
        let deadline = Instant::now() + timeout;
        let mut requested = false;
        loop {
            if !self.in_flight {
                self.requests
                    .send(())
                    .map_err(|_| SourceError::Disconnected)?;
                self.in_flight = true;
                requested = true;
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.replies.recv_timeout(remaining) {
                Ok(reply) => {
                    self.in_flight = false;
                    if requested {
                        return reply;
                    }
                    debug!("Discarding reply to a timed-out collection");
                }
                Err(RecvTimeoutError::Timeout) => return Err(SourceError::Timeout),
                Err(RecvTimeoutError::Disconnected) => return Err(SourceError::Disconnected),
            }
        }
    }
}

/// Owns the rolling histories and produces one [`Snapshot`] per tick.
pub struct Sampler {
    config: SharedConfig,
    collector: Collector,
    history: MetricHistory,
    baseline: Option<(CounterSample, Instant)>,
    collect_timeout: Option<Duration>,
    ticks_emitted: u64,
    ticks_skipped: u64,
}

impl Sampler {
    pub fn new(source: Arc<dyn MetricSource>, config: SharedConfig) -> Self {
        Self {
            config,
            collector: Collector::spawn(source),
            history: MetricHistory::new(MAX_HISTORY),
            baseline: None,
            collect_timeout: None,
            ticks_emitted: 0,
            ticks_skipped: 0,
        }
    }

    /// Fixed collection timeout. By default a tick waits for one sampling
    /// interval, but never less than 250 ms.
    pub fn with_collect_timeout(mut self, timeout: Duration) -> Self {
        self.collect_timeout = Some(timeout);
        self
    }

    pub fn history(&self) -> &MetricHistory {
        &self.history
    }

    pub fn ticks_emitted(&self) -> u64 {
        self.ticks_emitted
    }

    pub fn ticks_skipped(&self) -> u64 {
        self.ticks_skipped
    }

    /// Runs one sampling cycle. On error nothing is recorded and the
    /// previous histories stay as they were.
    pub fn tick(&mut self) -> Result<Snapshot, TickError> {
        let config = self.config.get();
        let timeout = self
            .collect_timeout
            .unwrap_or_else(|| config.sampling_interval.max(MIN_COLLECT_TIMEOUT));

        let result = self
            .collector
            .collect(timeout)
            .map_err(TickError::from)
            .and_then(|reading| self.record(reading, config.process_limit, Instant::now()));

        match &result {
            Ok(snapshot) => {
                self.ticks_emitted += 1;
                debug!(
                    "Tick {}: {} top processes, memory {:.1}%",
                    self.ticks_emitted,
                    snapshot.top_processes.len(),
                    snapshot.memory_percent
                );
            }
            Err(e) => {
                self.ticks_skipped += 1;
                warn!("Skipping tick: {e}");
            }
        }
        result
    }

    fn record(
        &mut self,
        reading: Reading,
        process_limit: usize,
        now: Instant,
    ) -> Result<Snapshot, TickError> {
        let rates = match self.baseline {
            Some((prev, at)) => CounterRates::between(
                &prev,
                &reading.counters,
                now.saturating_duration_since(at).as_secs_f64(),
            )?,
            None => CounterRates::default(),
        };

        self.history.push(reading.memory_percent, rates);
        self.baseline = Some((reading.counters, now));

        Ok(Snapshot {
            timestamp: SystemTime::now(),
            top_processes: rank(reading.processes, process_limit),
            memory_percent: reading.memory_percent,
            memory_history: self.history.memory.values(),
            disk_read_history: self.history.disk_read.values(),
            disk_write_history: self.history.disk_write.values(),
            net_sent_history: self.history.net_sent.values(),
            net_recv_history: self.history.net_recv.values(),
        })
    }

    /// Ticks at the configured cadence until `stop` fires or its sender is
    /// dropped.
    pub fn run(&mut self, renderer: &dyn Renderer, stop: &Receiver<()>) {
        loop {
            let started = Instant::now();
            if let Ok(snapshot) = self.tick() {
                renderer.on_snapshot(snapshot);
            }

            let wait = self
                .config
                .get()
                .sampling_interval
                .saturating_sub(started.elapsed());
            match stop.recv_timeout(wait) {
                Err(RecvTimeoutError::Timeout) => continue,
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        info!(
            "Sampler stopped after {} ticks ({} skipped)",
            self.ticks_emitted, self.ticks_skipped
        );
    }
}

/// A [`Sampler`] running on its own thread.
pub struct SamplerHandle {
    stop: Option<Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl SamplerHandle {
    pub fn spawn(mut sampler: Sampler, renderer: Arc<dyn Renderer>) -> std::io::Result<Self> {
        let (stop, stop_rx) = mpsc::channel();
        let thread = thread::Builder::new()
            .name("sampler".into())
            .spawn(move || sampler.run(renderer.as_ref(), &stop_rx))?;
        Ok(Self {
            stop: Some(stop),
            thread: Some(thread),
        })
    }

    pub fn shutdown(mut self) {
        self.stop_and_join();
    }

    fn stop_and_join(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("Sampler thread panicked");
            }
        }
    }
}

impl Drop for SamplerHandle {
    fn drop(&mut self) {
        self.stop_and_join();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Configuration;
    use crate::control::KillError;
    use crate::metrics::{DiskCounters, NetCounters};

    struct FixedSource;

    impl MetricSource for FixedSource {
        fn list_processes(&self) -> Result<Vec<ProcessInfo>, SourceError> {
            Ok(Vec::new())
        }

        fn virtual_memory_percent(&self) -> Result<f64, SourceError> {
            Ok(50.0)
        }

        fn disk_counters(&self) -> Result<DiskCounters, SourceError> {
            Ok(DiskCounters::default())
        }

        fn net_counters(&self) -> Result<NetCounters, SourceError> {
            Ok(NetCounters::default())
        }

        fn terminate(&self, pid: u32) -> Result<(), KillError> {
            Err(KillError::NoSuchProcess(pid))
        }
    }

    fn sampler() -> Sampler {
        Sampler::new(Arc::new(FixedSource), SharedConfig::new(Configuration::default()))
    }

    fn reading(memory_percent: f64, counters: CounterSample) -> Reading {
        Reading {
            processes: Vec::new(),
            memory_percent,
            counters,
        }
    }

    #[test]
    fn first_tick_reports_zero_rates() {
        let mut sampler = sampler();
        let counters = CounterSample {
            read_bytes: 10 << 20,
            write_bytes: 20 << 20,
            sent_bytes: 30 << 20,
            recv_bytes: 40 << 20,
        };
        let snapshot = sampler.record(reading(12.0, counters), 5, Instant::now()).unwrap();

        assert_eq!(snapshot.memory_history, vec![12.0]);
        assert_eq!(snapshot.disk_read_history, vec![0.0]);
        assert_eq!(snapshot.disk_write_history, vec![0.0]);
        assert_eq!(snapshot.net_sent_history, vec![0.0]);
        assert_eq!(snapshot.net_recv_history, vec![0.0]);
    }

    #[test]
    fn rates_use_measured_elapsed_time() {
        let mut sampler = sampler();
        let t0 = Instant::now();
        sampler
            .record(reading(1.0, CounterSample::default()), 5, t0)
            .unwrap();

        let counters = CounterSample {
            read_bytes: 4 << 20,
            write_bytes: 2 << 20,
            sent_bytes: 1 << 20,
            recv_bytes: 0,
        };
        let snapshot = sampler
            .record(reading(2.0, counters), 5, t0 + Duration::from_secs(2))
            .unwrap();

        assert_eq!(snapshot.disk_read_history, vec![0.0, 2.0]);
        assert_eq!(snapshot.disk_write_history, vec![0.0, 1.0]);
        assert_eq!(snapshot.net_sent_history, vec![0.0, 0.5]);
        assert_eq!(snapshot.net_recv_history, vec![0.0, 0.0]);
    }

    #[test]
    fn counter_reset_records_zero() {
        let mut sampler = sampler();
        let t0 = Instant::now();
        let high = CounterSample {
            read_bytes: 100,
            write_bytes: 100,
            sent_bytes: 100,
            recv_bytes: 100,
        };
        sampler.record(reading(1.0, high), 5, t0).unwrap();
        let snapshot = sampler
            .record(
                reading(1.0, CounterSample::default()),
                5,
                t0 + Duration::from_secs(1),
            )
            .unwrap();
        assert_eq!(snapshot.disk_read_history, vec![0.0, 0.0]);
    }

    #[test]
    fn zero_elapsed_leaves_history_untouched() {
        let mut sampler = sampler();
        let t0 = Instant::now();
        sampler
            .record(reading(1.0, CounterSample::default()), 5, t0)
            .unwrap();
        let before = sampler.history().clone();

        let err = sampler
            .record(reading(2.0, CounterSample::default()), 5, t0)
            .unwrap_err();
        assert!(matches!(err, TickError::Rate(RateError::InvalidInterval(_))));
        assert_eq!(sampler.history(), &before);
    }

    #[test]
    fn slot_keeps_only_latest_snapshot() {
        let slot = SnapshotSlot::new();
        assert!(slot.take().is_none());

        let mut sampler = sampler();
        let first = sampler.tick().unwrap();
        let second = sampler.tick().unwrap();
        slot.on_snapshot(first);
        slot.on_snapshot(second.clone());

        assert_eq!(slot.take(), Some(second));
        assert!(slot.take().is_none());
    }
}
