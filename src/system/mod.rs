//! System resource sampling and capacity probes.
//!
//! The scaling controller asks a [`CapacityProbe`] before adding a PHP
//! thread. Probes take single, synchronous, point-in-time samples; there is
//! no background monitoring.
//!
//! # Example
//!
//! ```rust,ignore
//! use php_gate::system::{CapacityProbe, ProbeStrategy};
//!
//! let probe = ProbeStrategy::System.build();
//! if probe.has_capacity(0.7) {
//!     pool.add_thread();
//! }
//! ```

mod cpu;
mod error;
mod memory;
mod metrics;
mod probe;

pub use cpu::{load_average, logical_cpu_count, process_cpu_percent};
pub use error::{ProbeError, ProbeResult};
pub use memory::{available_memory, format_bytes};
pub use metrics::{MetricsSource, OsMetrics};
pub use probe::{CapacityProbe, CombinedProbe, ProbeStrategy, ProcessLoadProbe, SystemLoadProbe};
