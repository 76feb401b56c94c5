//! Configuration for the PHP thread pool and its admission gate.
//!
//! Two layers:
//!
//! - [`ConfigBuilder`] / [`ConfigOption`] assemble an immutable
//!   [`PhpConfig`] from ordered options (library API)
//! - [`AppConfig::from_env`] reads environment variables and turns them
//!   into those options (binary entry point)
//!
//! # Example
//!
//! ```rust,ignore
//! use php_gate::config::AppConfig;
//! use php_gate::ProcessContext;
//!
//! let app = AppConfig::from_env()?;
//! let php = app.pool.to_builder().build(ProcessContext::global())?;
//! println!("Threads: {}", php.num_threads());
//! ```

mod document_root;
mod error;
mod gate;
mod logging;
mod options;
mod parse;
mod pool;
mod worker;

pub use document_root::{absolute_path, DocumentRootCache, DOCUMENT_ROOT_CACHE_CAPACITY};
pub use error::ConfigError;
pub use gate::{GateConfig, DEFAULT_MAX_LOAD_FACTOR};
pub use logging::{LogFormat, LoggingConfig};
pub use options::{ConfigBuilder, ConfigOption, ConfigSummary, PhpConfig};
pub use parse::parse_duration;
pub use pool::PoolConfig;
pub use worker::{PreparedEnv, WorkerConfig, WorkerOption};

/// Complete application configuration.
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Admission gate configuration.
    pub gate: GateConfig,
    /// Thread pool configuration.
    pub pool: PoolConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            gate: GateConfig::from_env()?,
            pool: PoolConfig::from_env()?,
            logging: LoggingConfig::from_env()?,
        })
    }

    /// Print configuration summary to log.
    pub fn log_summary(&self) {
        use tracing::info;

        info!("Configuration loaded:");
        info!("  Capacity probe: {}", self.gate.strategy);
        info!("  Max load factor: {}", self.gate.max_load_factor);
        info!("  Document root: {}", self.pool.document_root);

        if self.pool.num_threads == 0 {
            info!("  Threads: auto");
        } else {
            info!("  Threads: {}", self.pool.num_threads);
        }

        if let Some(max) = self.pool.max_threads {
            info!("  Max threads: {}", max);
        }

        if self.pool.resolve_symlinks {
            info!("  Symlink resolution: enabled");
        }
    }
}
