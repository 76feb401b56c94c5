//! Capacity probes: "is it safe to add a PHP thread right now?"
//!
//! Two strategies answer the question from different vantage points:
//!
//! - [`SystemLoadProbe`] looks at host-wide contention (1-minute load average)
//! - [`ProcessLoadProbe`] looks at load this process inflicts on itself
//!
//! Both fail closed: if the metric cannot be sampled the answer is `false`.
//! A scaling decision always needs a definite answer, and an unreadable
//! metric is treated as "busy".

use std::fmt;
use std::str::FromStr;

use tracing::{debug, trace};

use super::cpu::logical_cpu_count;
use super::metrics::{MetricsSource, OsMetrics};

/// Admission check consulted before the thread pool grows.
pub trait CapacityProbe: Send + Sync {
    /// Returns `true` when the sampled metric is strictly below
    /// `logical CPUs * max_load_factor`.
    ///
    /// `max_load_factor` is a fraction of total CPU capacity (0.7 = 70%).
    fn has_capacity(&self, max_load_factor: f64) -> bool;

    /// Short name used in logs.
    fn name(&self) -> &'static str;
}

/// Compares the host's 1-minute load average to the CPU count.
#[derive(Debug, Clone)]
pub struct SystemLoadProbe<S = OsMetrics> {
    source: S,
    cpu_count: usize,
}

impl SystemLoadProbe<OsMetrics> {
    /// Probe the live host.
    pub fn new() -> Self {
        Self::with_source(OsMetrics, logical_cpu_count())
    }
}

impl Default for SystemLoadProbe<OsMetrics> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: MetricsSource> SystemLoadProbe<S> {
    /// Probe a custom metric source with a fixed CPU count.
    pub fn with_source(source: S, cpu_count: usize) -> Self {
        Self { source, cpu_count }
    }

    /// Load average at or above which scaling is refused.
    #[inline]
    pub fn max_load(&self, max_load_factor: f64) -> f64 {
        self.cpu_count as f64 * max_load_factor
    }
}

impl<S: MetricsSource> CapacityProbe for SystemLoadProbe<S> {
    fn has_capacity(&self, max_load_factor: f64) -> bool {
        let load1 = match self.source.load_average() {
            Ok(load) => load,
            Err(e) => {
                debug!(probe = self.name(), error = %e, "load sample unavailable, refusing to scale");
                return false;
            }
        };

        let max_load = self.max_load(max_load_factor);
        trace!(probe = self.name(), load1, max_load, "load sampled");
        load1 < max_load
    }

    fn name(&self) -> &'static str {
        "system"
    }
}

/// Compares this process's own CPU usage to the CPU count.
#[derive(Debug, Clone)]
pub struct ProcessLoadProbe<S = OsMetrics> {
    source: S,
    cpu_count: usize,
}

impl ProcessLoadProbe<OsMetrics> {
    /// Probe the current process.
    pub fn new() -> Self {
        Self::with_source(OsMetrics, logical_cpu_count())
    }
}

impl Default for ProcessLoadProbe<OsMetrics> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: MetricsSource> ProcessLoadProbe<S> {
    /// Probe a custom metric source with a fixed CPU count.
    pub fn with_source(source: S, cpu_count: usize) -> Self {
        Self { source, cpu_count }
    }

    /// CPU percentage at or above which scaling is refused.
    #[inline]
    pub fn max_percent(&self, max_load_factor: f64) -> f64 {
        self.cpu_count as f64 * 100.0 * max_load_factor
    }
}

impl<S: MetricsSource> CapacityProbe for ProcessLoadProbe<S> {
    fn has_capacity(&self, max_load_factor: f64) -> bool {
        let percent = match self.source.process_cpu_percent() {
            Ok(p) => p,
            Err(e) => {
                debug!(probe = self.name(), error = %e, "process CPU sample unavailable, refusing to scale");
                return false;
            }
        };

        let max_percent = self.max_percent(max_load_factor);
        trace!(probe = self.name(), percent, max_percent, "process CPU sampled");
        percent < max_percent
    }

    fn name(&self) -> &'static str {
        "process"
    }
}

/// Permits scaling only when every inner probe does.
///
/// Probes are consulted in order and evaluation stops at the first refusal.
pub struct CombinedProbe {
    probes: Vec<Box<dyn CapacityProbe>>,
}

impl CombinedProbe {
    pub fn new(probes: Vec<Box<dyn CapacityProbe>>) -> Self {
        Self { probes }
    }
}

impl CapacityProbe for CombinedProbe {
    fn has_capacity(&self, max_load_factor: f64) -> bool {
        // An empty set has nothing to vouch for capacity.
        !self.probes.is_empty()
            && self.probes.iter().all(|p| p.has_capacity(max_load_factor))
    }

    fn name(&self) -> &'static str {
        "combined"
    }
}

/// Which probe the scaling controller consults.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ProbeStrategy {
    /// Host-wide load average.
    #[default]
    System,
    /// This process's own CPU usage.
    Process,
    /// Both must agree.
    Combined,
}

impl ProbeStrategy {
    /// Build the probe for this strategy against the live host.
    pub fn build(self) -> Box<dyn CapacityProbe> {
        self.build_with(OsMetrics, logical_cpu_count())
    }

    /// Build the probe for this strategy against a custom source.
    pub fn build_with<S>(self, source: S, cpu_count: usize) -> Box<dyn CapacityProbe>
    where
        S: MetricsSource + Clone + 'static,
    {
        match self {
            ProbeStrategy::System => Box::new(SystemLoadProbe::with_source(source, cpu_count)),
            ProbeStrategy::Process => Box::new(ProcessLoadProbe::with_source(source, cpu_count)),
            ProbeStrategy::Combined => Box::new(CombinedProbe::new(vec![
                Box::new(SystemLoadProbe::with_source(source.clone(), cpu_count)),
                Box::new(ProcessLoadProbe::with_source(source, cpu_count)),
            ])),
        }
    }
}

impl FromStr for ProbeStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "system" | "load" => Ok(ProbeStrategy::System),
            "process" | "self" => Ok(ProbeStrategy::Process),
            "combined" | "both" => Ok(ProbeStrategy::Combined),
            other => Err(format!(
                "unknown probe '{}', expected: system, process, combined",
                other
            )),
        }
    }
}

impl fmt::Display for ProbeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::System => write!(f, "system"),
            Self::Process => write!(f, "process"),
            Self::Combined => write!(f, "combined"),
        }
    }
}
