//! php_gate - resource-aware admission gate for a PHP thread pool.
//!
//! Before a PHP server grows its thread pool it asks a capacity probe
//! whether the host (or the process itself) has room for another thread.
//! This crate provides those probes and the configuration layer that sizes
//! the pool, defines workers and resolves the document root.
//!
//! # Features
//!
//! - **Capacity probes**: system load average or process CPU usage behind
//!   one [`system::CapacityProbe`] trait, failing closed on sampling errors
//! - **Memory accessor**: available system memory, errors propagated
//! - **Option-based configuration**: ordered, fail-fast assembly of an
//!   immutable [`config::PhpConfig`]
//! - **Document root cache**: bounded, append-only, shared per process
//!
//! # Example
//!
//! ```rust,ignore
//! use php_gate::config::ConfigBuilder;
//! use php_gate::system::{CapacityProbe, ProbeStrategy};
//! use php_gate::ProcessContext;
//!
//! let config = ConfigBuilder::new()
//!     .with_num_threads(4)
//!     .with_max_threads(16)
//!     .with_document_root("/var/www/html", true)
//!     .build(ProcessContext::global())?;
//!
//! let probe = ProbeStrategy::System.build();
//! if probe.has_capacity(0.7) {
//!     // grow the pool towards config.max_threads()
//! }
//! ```

/// Package version from Cargo.toml
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Git commit hash (8 chars) with optional "-dirty" suffix
pub const BUILD_VERSION: &str = env!("BUILD_VERSION");

/// Full version string: "0.1.0 (abc12345)" or "0.1.0 (abc12345-dirty)"
pub const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("BUILD_VERSION"), ")");

pub mod config;
pub mod context;
pub mod logging;
pub mod metrics;
pub mod system;

// Re-exports for convenience
pub use config::{ConfigBuilder, ConfigError, ConfigOption, PhpConfig};
pub use context::ProcessContext;
pub use system::{CapacityProbe, ProbeStrategy};
