use super::ProcessInfo;
use crate::control::KillError;
use std::sync::{Mutex, MutexGuard, PoisonError};
use sysinfo::{Networks, ProcessRefreshKind, ProcessesToUpdate, System};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SourceError {
    #[error("{0} is unavailable")]
    Unavailable(&'static str),
    #[error("{what} reading out of range: {value}")]
    OutOfRange { what: &'static str, value: f64 },
    #[error("metric collection timed out")]
    Timeout,
    #[error("metric collector stopped")]
    Disconnected,
    #[error("metric source panicked")]
    Panicked,
    #[error("OS query failed: {0}")]
    Os(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiskCounters {
    pub read_bytes: u64,
    pub write_bytes: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NetCounters {
    pub sent_bytes: u64,
    pub recv_bytes: u64,
}

/// Access to OS process and resource counters.
///
/// Calls within one tick happen in order: `refresh`, `list_processes`,
/// `virtual_memory_percent`, `disk_counters`, `net_counters`. `terminate` may
/// be called from any thread at any time.
pub trait MetricSource: Send + Sync {
    /// Pulls fresh readings from the OS ahead of a tick.
    fn refresh(&self) -> Result<(), SourceError> {
        Ok(())
    }

    fn list_processes(&self) -> Result<Vec<ProcessInfo>, SourceError>;

    /// Used physical memory, 0..=100.
    fn virtual_memory_percent(&self) -> Result<f64, SourceError>;

    /// Bytes read and written since boot.
    fn disk_counters(&self) -> Result<DiskCounters, SourceError>;

    /// Bytes sent and received since boot.
    fn net_counters(&self) -> Result<NetCounters, SourceError>;

    fn terminate(&self, pid: u32) -> Result<(), KillError>;
}

struct SysinfoState {
    system: System,
    networks: Networks,
}

/// [`MetricSource`] backed by `sysinfo`.
pub struct SysinfoSource {
    state: Mutex<SysinfoState>,
}

impl Default for SysinfoSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SysinfoSource {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SysinfoState {
                system: System::new_all(),
                networks: Networks::new_with_refreshed_list(),
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, SysinfoState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl MetricSource for SysinfoSource {
    fn refresh(&self) -> Result<(), SourceError> {
        let mut state = self.state();
        state.system.refresh_memory();
        state.system.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::nothing()
                .with_cpu()
                .with_memory()
                .with_disk_usage(),
        );
        state.networks.refresh(true);
        Ok(())
    }

    fn list_processes(&self) -> Result<Vec<ProcessInfo>, SourceError> {
        let state = self.state();
        let total_memory = state.system.total_memory();
        if total_memory == 0 {
            return Err(SourceError::Unavailable("total memory"));
        }

        let mut processes: Vec<_> = state
            .system
            .processes()
            .values()
            .filter(|p| p.thread_kind().is_none())
            .map(|p| {
                let cpu = p.cpu_usage();
                ProcessInfo {
                    pid: p.pid().as_u32(),
                    name: p.name().to_string_lossy().into_owned(),
                    cpu_percent: cpu.is_finite().then_some(cpu),
                    mem_percent: (p.memory() as f64 / total_memory as f64 * 100.0) as f32,
                }
            })
            .collect();
        // The process table is a hash map; pid order gives a stable enumeration.
        processes.sort_by_key(|p| p.pid);
        Ok(processes)
    }

    fn virtual_memory_percent(&self) -> Result<f64, SourceError> {
        let state = self.state();
        let total = state.system.total_memory();
        if total == 0 {
            return Err(SourceError::Unavailable("total memory"));
        }
        Ok(state.system.used_memory() as f64 / total as f64 * 100.0)
    }

    fn disk_counters(&self) -> Result<DiskCounters, SourceError> {
        let state = self.state();
        Ok(state
            .system
            .processes()
            .values()
            .filter(|p| p.thread_kind().is_none())
            .map(|p| p.disk_usage())
            .fold(DiskCounters::default(), |acc, usage| DiskCounters {
                read_bytes: acc.read_bytes.saturating_add(usage.total_read_bytes),
                write_bytes: acc.write_bytes.saturating_add(usage.total_written_bytes),
            }))
    }

    fn net_counters(&self) -> Result<NetCounters, SourceError> {
        let state = self.state();
        Ok(state
            .networks
            .list()
            .values()
            .fold(NetCounters::default(), |acc, data| NetCounters {
                sent_bytes: acc.sent_bytes.saturating_add(data.total_transmitted()),
                recv_bytes: acc.recv_bytes.saturating_add(data.total_received()),
            }))
    }

    #[cfg(unix)]
    fn terminate(&self, pid: u32) -> Result<(), KillError> {
        use nix::errno::Errno;
        use nix::sys::signal::{self, Signal};

        // 0 and anything past i32::MAX would address a process group.
        let raw = match i32::try_from(pid) {
            Ok(raw) if raw > 0 => raw,
            _ => return Err(KillError::NoSuchProcess(pid)),
        };

        signal::kill(nix::unistd::Pid::from_raw(raw), Signal::SIGTERM).map_err(|errno| {
            match errno {
                Errno::ESRCH => KillError::NoSuchProcess(pid),
                Errno::EPERM => KillError::PermissionDenied(pid),
                other => KillError::Other(format!("failed to send SIGTERM to PID {pid}: {other}")),
            }
        })
    }

    #[cfg(not(unix))]
    fn terminate(&self, pid: u32) -> Result<(), KillError> {
        let mut state = self.state();
        let sys_pid = sysinfo::Pid::from_u32(pid);
        state
            .system
            .refresh_processes(ProcessesToUpdate::Some(&[sys_pid]), true);
        let process = state
            .system
            .process(sys_pid)
            .ok_or(KillError::NoSuchProcess(pid))?;
        if process.kill() {
            Ok(())
        } else {
            Err(KillError::PermissionDenied(pid))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_the_local_machine() {
        let source = SysinfoSource::new();
        source.refresh().unwrap();

        let memory = source.virtual_memory_percent().unwrap();
        assert!((0.0..=100.0).contains(&memory));

        let processes = source.list_processes().unwrap();
        let own_pid = std::process::id();
        assert!(processes.iter().any(|p| p.pid == own_pid));
        assert!(processes.windows(2).all(|w| w[0].pid < w[1].pid));

        source.disk_counters().unwrap();
        source.net_counters().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn terminate_rejects_process_group_pids() {
        let source = SysinfoSource::new();
        assert_eq!(source.terminate(0), Err(KillError::NoSuchProcess(0)));
        assert_eq!(
            source.terminate(u32::MAX),
            Err(KillError::NoSuchProcess(u32::MAX))
        );
    }
}
