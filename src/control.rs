use crate::config::{Configuration, SharedConfig, PROCESS_LIMIT_RANGE};
use crate::metrics::MetricSource;
use log::{info, warn};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("'{0}' is not a number")]
    NotANumber(String),
    #[error("process limit must be between {min} and {max}, got {value}")]
    OutOfRange { value: i64, min: usize, max: usize },
    #[error("sampling interval must be positive")]
    InvalidInterval,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KillError {
    #[error("'{0}' is not a valid PID")]
    NotANumber(String),
    #[error("no process with PID {0}")]
    NoSuchProcess(u32),
    #[error("permission denied to terminate PID {0}")]
    PermissionDenied(u32),
    #[error("{0}")]
    Other(String),
}

/// Entry point for commands coming from the input widgets.
///
/// Cloning is cheap; every clone talks to the same configuration and source.
#[derive(Clone)]
pub struct ControlChannel {
    config: SharedConfig,
    source: Arc<dyn MetricSource>,
}

impl ControlChannel {
    pub fn new(config: SharedConfig, source: Arc<dyn MetricSource>) -> Self {
        Self { config, source }
    }

    pub fn configuration(&self) -> Configuration {
        self.config.get()
    }

    /// Last accepted process limit, for redisplay after a rejected edit.
    pub fn process_limit(&self) -> usize {
        self.config.get().process_limit
    }

    pub fn set_process_limit(&self, raw: &str) -> Result<(), ConfigError> {
        let trimmed = raw.trim();
        let value: i64 = trimmed
            .parse()
            .map_err(|_| ConfigError::NotANumber(trimmed.to_string()))?;

        let limit = usize::try_from(value)
            .ok()
            .filter(|limit| PROCESS_LIMIT_RANGE.contains(limit))
            .ok_or(ConfigError::OutOfRange {
                value,
                min: *PROCESS_LIMIT_RANGE.start(),
                max: *PROCESS_LIMIT_RANGE.end(),
            })?;

        self.config.update(|c| c.process_limit = limit);
        info!("Process limit set to {limit}");
        Ok(())
    }

    pub fn set_sampling_interval(&self, interval: Duration) -> Result<(), ConfigError> {
        if interval.is_zero() {
            return Err(ConfigError::InvalidInterval);
        }
        self.config.update(|c| c.sampling_interval = interval);
        info!("Sampling interval set to {interval:?}");
        Ok(())
    }

    /// Asks the OS to terminate `raw`. The process disappears from the
    /// listing on a later tick.
    pub fn terminate_pid(&self, raw: &str) -> Result<(), KillError> {
        let trimmed = raw.trim();
        let pid: u32 = trimmed
            .parse()
            .map_err(|_| KillError::NotANumber(trimmed.to_string()))?;

        match self.source.terminate(pid) {
            Ok(()) => {
                info!("Sent termination request to PID {pid}");
                Ok(())
            }
            Err(e) => {
                warn!("Terminating PID {pid} failed: {e}");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{DiskCounters, NetCounters, ProcessInfo, SourceError};
    use std::sync::Mutex;

    #[derive(Default)]
    struct KillRecorder {
        killed: Mutex<Vec<u32>>,
    }

    impl MetricSource for KillRecorder {
        fn list_processes(&self) -> Result<Vec<ProcessInfo>, SourceError> {
            Ok(Vec::new())
        }

        fn virtual_memory_percent(&self) -> Result<f64, SourceError> {
            Ok(0.0)
        }

        fn disk_counters(&self) -> Result<DiskCounters, SourceError> {
            Ok(DiskCounters::default())
        }

        fn net_counters(&self) -> Result<NetCounters, SourceError> {
            Ok(NetCounters::default())
        }

        fn terminate(&self, pid: u32) -> Result<(), KillError> {
            match pid {
                1 => Err(KillError::PermissionDenied(pid)),
                100..=199 => {
                    self.killed.lock().unwrap().push(pid);
                    Ok(())
                }
                _ => Err(KillError::NoSuchProcess(pid)),
            }
        }
    }

    fn channel() -> (ControlChannel, Arc<KillRecorder>) {
        let source = Arc::new(KillRecorder::default());
        let control = ControlChannel::new(SharedConfig::default(), source.clone());
        (control, source)
    }

    #[test]
    fn accepts_limit_in_range() {
        let (control, _) = channel();
        control.set_process_limit("5").unwrap();
        assert_eq!(control.process_limit(), 5);
        control.set_process_limit(" 9\n").unwrap();
        assert_eq!(control.process_limit(), 9);
        control.set_process_limit("2").unwrap();
        assert_eq!(control.process_limit(), 2);
    }

    #[test]
    fn out_of_range_keeps_previous_limit() {
        let (control, _) = channel();
        control.set_process_limit("7").unwrap();

        for raw in ["1", "10", "-3", "0"] {
            assert!(matches!(
                control.set_process_limit(raw),
                Err(ConfigError::OutOfRange { min: 2, max: 9, .. })
            ));
            assert_eq!(control.process_limit(), 7);
        }
    }

    #[test]
    fn non_numeric_limit_keeps_previous_limit() {
        let (control, _) = channel();
        assert_eq!(
            control.set_process_limit("abc"),
            Err(ConfigError::NotANumber("abc".into()))
        );
        assert_eq!(
            control.set_process_limit("4.5"),
            Err(ConfigError::NotANumber("4.5".into()))
        );
        assert_eq!(control.process_limit(), 5);
    }

    #[test]
    fn zero_interval_is_rejected() {
        let (control, _) = channel();
        assert_eq!(
            control.set_sampling_interval(Duration::ZERO),
            Err(ConfigError::InvalidInterval)
        );
        control
            .set_sampling_interval(Duration::from_millis(250))
            .unwrap();
        assert_eq!(
            control.configuration().sampling_interval,
            Duration::from_millis(250)
        );
    }

    #[test]
    fn terminate_reports_each_outcome() {
        let (control, source) = channel();
        assert_eq!(control.terminate_pid("150"), Ok(()));
        assert_eq!(
            control.terminate_pid("notapid"),
            Err(KillError::NotANumber("notapid".into()))
        );
        assert_eq!(control.terminate_pid("-4"), Err(KillError::NotANumber("-4".into())));
        assert_eq!(control.terminate_pid("999"), Err(KillError::NoSuchProcess(999)));
        assert_eq!(control.terminate_pid("1"), Err(KillError::PermissionDenied(1)));
        assert_eq!(*source.killed.lock().unwrap(), vec![150]);
    }

    #[test]
    fn terminate_leaves_configuration_alone() {
        let (control, _) = channel();
        let before = control.configuration();
        let _ = control.terminate_pid("150");
        let _ = control.terminate_pid("999");
        assert_eq!(control.configuration(), before);
    }
}
