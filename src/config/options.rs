//! PHP thread-pool configuration assembled from ordered options.
//!
//! Options are applied in order to a private accumulator. The first option
//! that fails aborts assembly: the accumulator is dropped, later options
//! never run, and no partially built [`PhpConfig`] is ever returned.
//!
//! # Example
//!
//! ```rust,ignore
//! use php_gate::config::{ConfigBuilder, WorkerOption};
//! use php_gate::ProcessContext;
//!
//! let config = ConfigBuilder::new()
//!     .with_num_threads(4)
//!     .with_max_threads(8)
//!     .with_worker(WorkerOption::new("w1", "/app/worker.php", 2))
//!     .with_document_root("/var/www/html", true)
//!     .build(ProcessContext::global())?;
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, Dispatch};

use super::worker::{WorkerConfig, WorkerOption};
use super::ConfigError;
use crate::context::ProcessContext;
use crate::metrics::MetricsSink;

/// A single configuration mutation.
#[derive(Clone, Debug)]
pub enum ConfigOption {
    /// Target PHP thread count (0 = logical CPU count).
    NumThreads(usize),
    /// Upper bound the pool may scale to.
    MaxThreads(usize),
    /// Metrics sink handle.
    Metrics(Arc<dyn MetricsSink>),
    /// Append a worker definition.
    Worker(WorkerOption),
    /// Logger handle.
    Logger(Dispatch),
    /// PHP ini overrides, replacing any earlier set.
    PhpIni(HashMap<String, String>),
    /// Longest a request may wait for a free thread.
    MaxWaitTime(Duration),
    /// Document root, made absolute through the process cache.
    DocumentRoot {
        path: String,
        resolve_symlinks: bool,
    },
    /// Document root the caller already canonicalized; stored verbatim.
    ResolvedDocumentRoot(PathBuf),
}

impl ConfigOption {
    /// Shorthand for a worker with environment and watch paths.
    pub fn worker<E, K, V, W, P>(
        name: impl Into<String>,
        file_name: impl Into<PathBuf>,
        num: usize,
        env: E,
        watch: W,
    ) -> Self
    where
        E: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
        W: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        ConfigOption::Worker(
            WorkerOption::new(name, file_name, num)
                .with_env(env)
                .with_watch(watch),
        )
    }

    fn apply(self, opts: &mut Options, ctx: &ProcessContext) -> Result<(), ConfigError> {
        match self {
            ConfigOption::NumThreads(n) => opts.num_threads = n,
            ConfigOption::MaxThreads(n) => opts.max_threads = Some(n),
            ConfigOption::Metrics(sink) => opts.metrics = Some(sink),
            ConfigOption::Worker(worker) => {
                if opts.workers.iter().any(|w| w.name == worker.name) {
                    return Err(ConfigError::DuplicateWorker { name: worker.name });
                }
                opts.workers.push(worker);
            }
            ConfigOption::Logger(dispatch) => opts.logger = Some(dispatch),
            ConfigOption::PhpIni(overrides) => opts.php_ini = overrides,
            ConfigOption::MaxWaitTime(d) => opts.max_wait_time = Some(d),
            ConfigOption::DocumentRoot {
                path,
                resolve_symlinks,
            } => {
                let resolved = ctx.document_roots().resolve(&path, resolve_symlinks)?;
                debug!(raw = %path, resolved = %resolved.display(), "document root resolved");
                opts.document_root = Some(resolved);
            }
            ConfigOption::ResolvedDocumentRoot(path) => opts.document_root = Some(path),
        }
        Ok(())
    }
}

/// Mutable accumulator, never visible outside assembly.
#[derive(Default)]
struct Options {
    num_threads: usize,
    max_threads: Option<usize>,
    workers: Vec<WorkerOption>,
    logger: Option<Dispatch>,
    metrics: Option<Arc<dyn MetricsSink>>,
    php_ini: HashMap<String, String>,
    max_wait_time: Option<Duration>,
    document_root: Option<PathBuf>,
}

impl Options {
    fn finish(self, ctx: &ProcessContext) -> Result<PhpConfig, ConfigError> {
        let num_threads = if self.num_threads == 0 {
            ctx.cpu_count()
        } else {
            self.num_threads
        };

        if let Some(max) = self.max_threads {
            if max < num_threads {
                return Err(ConfigError::Invalid {
                    key: "max_threads".into(),
                    message: format!(
                        "max threads ({}) must be >= num threads ({})",
                        max, num_threads
                    ),
                });
            }
        }

        let document_root = self.document_root;
        let workers = self
            .workers
            .into_iter()
            .map(|w| w.finish(document_root.as_deref()))
            .collect();

        Ok(PhpConfig {
            num_threads,
            max_threads: self.max_threads,
            workers,
            logger: self.logger,
            metrics: self.metrics,
            php_ini: self.php_ini,
            max_wait_time: self.max_wait_time,
            document_root,
        })
    }
}

/// Ordered list of options, applied by [`ConfigBuilder::build`].
#[derive(Clone, Debug, Default)]
pub struct ConfigBuilder {
    options: Vec<ConfigOption>,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an arbitrary option.
    pub fn option(mut self, option: ConfigOption) -> Self {
        self.options.push(option);
        self
    }

    pub fn with_num_threads(self, num_threads: usize) -> Self {
        self.option(ConfigOption::NumThreads(num_threads))
    }

    pub fn with_max_threads(self, max_threads: usize) -> Self {
        self.option(ConfigOption::MaxThreads(max_threads))
    }

    pub fn with_metrics(self, sink: Arc<dyn MetricsSink>) -> Self {
        self.option(ConfigOption::Metrics(sink))
    }

    pub fn with_worker(self, worker: WorkerOption) -> Self {
        self.option(ConfigOption::Worker(worker))
    }

    pub fn with_logger(self, dispatch: Dispatch) -> Self {
        self.option(ConfigOption::Logger(dispatch))
    }

    pub fn with_php_ini(self, overrides: HashMap<String, String>) -> Self {
        self.option(ConfigOption::PhpIni(overrides))
    }

    pub fn with_max_wait_time(self, max_wait_time: Duration) -> Self {
        self.option(ConfigOption::MaxWaitTime(max_wait_time))
    }

    /// Resolve `path` through the process cache, optionally following
    /// symlinks so `$_SERVER['DOCUMENT_ROOT']` is the real directory.
    pub fn with_document_root(self, path: impl Into<String>, resolve_symlinks: bool) -> Self {
        self.option(ConfigOption::DocumentRoot {
            path: path.into(),
            resolve_symlinks,
        })
    }

    /// Store an already canonical document root without any checks.
    pub fn with_resolved_document_root(self, path: impl Into<PathBuf>) -> Self {
        self.option(ConfigOption::ResolvedDocumentRoot(path.into()))
    }

    /// Number of queued options.
    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Apply all options in order and validate the result.
    pub fn build(self, ctx: &ProcessContext) -> Result<PhpConfig, ConfigError> {
        let mut opts = Options::default();
        for option in self.options {
            option.apply(&mut opts, ctx)?;
        }
        opts.finish(ctx)
    }
}

impl FromIterator<ConfigOption> for ConfigBuilder {
    fn from_iter<I: IntoIterator<Item = ConfigOption>>(iter: I) -> Self {
        Self {
            options: iter.into_iter().collect(),
        }
    }
}

impl Extend<ConfigOption> for ConfigBuilder {
    fn extend<I: IntoIterator<Item = ConfigOption>>(&mut self, iter: I) {
        self.options.extend(iter);
    }
}

/// Immutable PHP thread-pool configuration.
#[derive(Clone, Debug)]
pub struct PhpConfig {
    num_threads: usize,
    max_threads: Option<usize>,
    workers: Vec<WorkerConfig>,
    logger: Option<Dispatch>,
    metrics: Option<Arc<dyn MetricsSink>>,
    php_ini: HashMap<String, String>,
    max_wait_time: Option<Duration>,
    document_root: Option<PathBuf>,
}

impl PhpConfig {
    /// Assemble a configuration from an ordered option list.
    pub fn assemble<I>(ctx: &ProcessContext, options: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = ConfigOption>,
    {
        options.into_iter().collect::<ConfigBuilder>().build(ctx)
    }

    /// Target thread count.
    #[inline]
    pub fn num_threads(&self) -> usize {
        self.num_threads
    }

    /// Upper bound on thread count, if set.
    #[inline]
    pub fn max_threads(&self) -> Option<usize> {
        self.max_threads
    }

    /// Workers in registration order.
    pub fn workers(&self) -> &[WorkerConfig] {
        &self.workers
    }

    pub fn worker(&self, name: &str) -> Option<&WorkerConfig> {
        self.workers.iter().find(|w| w.name() == name)
    }

    pub fn logger(&self) -> Option<&Dispatch> {
        self.logger.as_ref()
    }

    pub fn metrics(&self) -> Option<&Arc<dyn MetricsSink>> {
        self.metrics.as_ref()
    }

    pub fn php_ini(&self) -> &HashMap<String, String> {
        &self.php_ini
    }

    /// Carried to the thread pool; not enforced here.
    #[inline]
    pub fn max_wait_time(&self) -> Option<Duration> {
        self.max_wait_time
    }

    pub fn document_root(&self) -> Option<&Path> {
        self.document_root.as_deref()
    }

    /// Serializable snapshot for logs and reports.
    pub fn summary(&self) -> ConfigSummary<'_> {
        ConfigSummary {
            num_threads: self.num_threads,
            max_threads: self.max_threads,
            workers: &self.workers,
            php_ini: &self.php_ini,
            max_wait_time_ms: self.max_wait_time.map(|d| d.as_millis() as u64),
            document_root: self.document_root.as_deref(),
            logger: self.logger.is_some(),
            metrics: self.metrics.is_some(),
        }
    }

    /// Print configuration summary to log.
    pub fn log_summary(&self) {
        info!("PHP configuration assembled:");
        info!("  Threads: {}", self.num_threads);
        match self.max_threads {
            Some(max) => info!("  Max threads: {}", max),
            None => info!("  Max threads: unset"),
        }
        if let Some(ref root) = self.document_root {
            info!("  Document root: {}", root.display());
        }
        if let Some(wait) = self.max_wait_time {
            info!("  Max wait time: {}ms", wait.as_millis());
        }
        if !self.php_ini.is_empty() {
            info!("  PHP ini overrides: {}", self.php_ini.len());
        }
        for worker in &self.workers {
            info!(
                "  Worker {}: {} x{}",
                worker.name(),
                worker.file_name().display(),
                worker.num()
            );
        }
    }
}

/// See [`PhpConfig::summary`].
#[derive(Debug, Serialize)]
pub struct ConfigSummary<'a> {
    pub num_threads: usize,
    pub max_threads: Option<usize>,
    pub workers: &'a [WorkerConfig],
    pub php_ini: &'a HashMap<String, String>,
    pub max_wait_time_ms: Option<u64>,
    pub document_root: Option<&'a Path>,
    pub logger: bool,
    pub metrics: bool,
}
