//! Point-in-time OS metric sources.

use super::cpu;
use super::error::ProbeResult;
use super::memory;

/// Source of the raw samples the capacity probes decide on.
///
/// [`OsMetrics`] reads the live host; tests substitute their own source.
pub trait MetricsSource: Send + Sync {
    /// 1-minute system load average.
    fn load_average(&self) -> ProbeResult<f64>;

    /// CPU utilization of the calling process in percent (100 = one core).
    fn process_cpu_percent(&self) -> ProbeResult<f64>;

    /// Available system memory in bytes.
    fn available_memory(&self) -> ProbeResult<u64>;
}

/// Samples the running host.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsMetrics;

impl MetricsSource for OsMetrics {
    #[inline]
    fn load_average(&self) -> ProbeResult<f64> {
        cpu::load_average()
    }

    #[inline]
    fn process_cpu_percent(&self) -> ProbeResult<f64> {
        cpu::process_cpu_percent()
    }

    #[inline]
    fn available_memory(&self) -> ProbeResult<u64> {
        memory::available_memory()
    }
}

impl<S: MetricsSource + ?Sized> MetricsSource for std::sync::Arc<S> {
    fn load_average(&self) -> ProbeResult<f64> {
        (**self).load_average()
    }

    fn process_cpu_percent(&self) -> ProbeResult<f64> {
        (**self).process_cpu_percent()
    }

    fn available_memory(&self) -> ProbeResult<u64> {
        (**self).available_memory()
    }
}
