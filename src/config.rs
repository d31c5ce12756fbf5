use std::ops::RangeInclusive;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

pub const DEFAULT_PROCESS_LIMIT: usize = 5;
pub const PROCESS_LIMIT_RANGE: RangeInclusive<usize> = 2..=9;
pub const DEFAULT_SAMPLING_INTERVAL: Duration = Duration::from_secs(1);

/// Live sampler settings. Always read and written as a whole value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Configuration {
    pub process_limit: usize,
    pub sampling_interval: Duration,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            process_limit: DEFAULT_PROCESS_LIMIT,
            sampling_interval: DEFAULT_SAMPLING_INTERVAL,
        }
    }
}

/// Handle to the configuration shared by the sampler and the control layer.
#[derive(Debug, Clone, Default)]
pub struct SharedConfig(Arc<RwLock<Configuration>>);

impl SharedConfig {
    pub fn new(config: Configuration) -> Self {
        Self(Arc::new(RwLock::new(config)))
    }

    pub fn get(&self) -> Configuration {
        *self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn update(&self, f: impl FnOnce(&mut Configuration)) {
        let mut guard = self.0.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard);
    }
}
