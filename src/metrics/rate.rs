use super::CounterSample;
use thiserror::Error;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum RateError {
    #[error("sampling interval must be positive, got {0}s")]
    InvalidInterval(f64),
}

/// Bytes per second between two readings of a cumulative counter.
///
/// A counter that went backwards (reset or wrap) yields `0.0` for that
/// interval.
pub fn rate(prev: u64, curr: u64, elapsed_secs: f64) -> Result<f64, RateError> {
    if !elapsed_secs.is_finite() || elapsed_secs <= 0.0 {
        return Err(RateError::InvalidInterval(elapsed_secs));
    }
    if curr < prev {
        return Ok(0.0);
    }
    Ok((curr - prev) as f64 / elapsed_secs)
}

/// Throughput of every counter in a [`CounterSample`], in MB/s.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CounterRates {
    pub disk_read: f64,
    pub disk_write: f64,
    pub net_sent: f64,
    pub net_recv: f64,
}

impl CounterRates {
    pub fn between(
        prev: &CounterSample,
        curr: &CounterSample,
        elapsed_secs: f64,
    ) -> Result<Self, RateError> {
        let mb = |p, c| rate(p, c, elapsed_secs).map(|bytes| bytes / BYTES_PER_MB);
        Ok(Self {
            disk_read: mb(prev.read_bytes, curr.read_bytes)?,
            disk_write: mb(prev.write_bytes, curr.write_bytes)?,
            net_sent: mb(prev.sent_bytes, curr.sent_bytes)?,
            net_recv: mb(prev.recv_bytes, curr.recv_bytes)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difference_over_elapsed() {
        assert_eq!(rate(100, 150, 1.0), Ok(50.0));
        assert_eq!(rate(100, 200, 0.5), Ok(200.0));
    }

    #[test]
    fn unchanged_counter_is_zero() {
        assert_eq!(rate(42, 42, 1.0), Ok(0.0));
    }

    #[test]
    fn counter_reset_clamps_to_zero() {
        assert_eq!(rate(150, 100, 1.0), Ok(0.0));
        assert_eq!(rate(u64::MAX, 3, 1.0), Ok(0.0));
    }

    #[test]
    fn non_positive_interval_is_rejected() {
        assert_eq!(rate(0, 10, 0.0), Err(RateError::InvalidInterval(0.0)));
        assert_eq!(rate(0, 10, -1.0), Err(RateError::InvalidInterval(-1.0)));
        assert!(rate(0, 10, f64::NAN).is_err());
    }

    #[test]
    fn counter_rates_scale_to_megabytes() {
        let prev = CounterSample::default();
        let curr = CounterSample {
            read_bytes: 2 * 1024 * 1024,
            write_bytes: 1024 * 1024,
            sent_bytes: 512 * 1024,
            recv_bytes: 0,
        };
        let rates = CounterRates::between(&prev, &curr, 2.0).unwrap();
        assert_eq!(rates.disk_read, 1.0);
        assert_eq!(rates.disk_write, 0.5);
        assert_eq!(rates.net_sent, 0.25);
        assert_eq!(rates.net_recv, 0.0);
    }
}
