//! PHP thread-pool settings read from the environment.
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `PHP_THREADS` | `0` | Target threads (0 = logical CPUs) |
//! | `PHP_MAX_THREADS` | _(unset)_ | Upper bound for scaling |
//! | `PHP_MAX_WAIT_TIME` | `off` | Max wait for a free thread (`500ms`, `30s`) |
//! | `DOCUMENT_ROOT` | `/var/www/html` | Web root directory |
//! | `DOCUMENT_ROOT_RESOLVE_SYMLINKS` | `false` | Follow symlinks in the root |
//! | `PHP_INI` | _(empty)_ | `key=value;key=value` overrides |
//! | `PHP_WORKERS_DEF` | _(empty)_ | `name=script[:count];...` workers |

use std::collections::HashMap;
use std::time::Duration;

use super::options::ConfigBuilder;
use super::parse::{env_bool, env_duration, env_opt, env_or, env_parse, parse_pairs};
use super::worker::WorkerOption;
use super::ConfigError;

/// Raw pool settings, converted to options by [`PoolConfig::to_builder`].
#[derive(Clone, Debug, Default)]
pub struct PoolConfig {
    pub num_threads: usize,
    pub max_threads: Option<usize>,
    pub max_wait_time: Option<Duration>,
    pub document_root: String,
    pub resolve_symlinks: bool,
    pub php_ini: HashMap<String, String>,
    pub workers: Vec<WorkerOption>,
}

impl PoolConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let max_threads = env_opt("PHP_MAX_THREADS")
            .map(|raw| {
                raw.trim().parse::<usize>().map_err(|e| ConfigError::Parse {
                    key: "PHP_MAX_THREADS".into(),
                    value: raw,
                    error: e.to_string(),
                })
            })
            .transpose()?;

        let php_ini = match env_opt("PHP_INI") {
            Some(raw) => parse_pairs("PHP_INI", &raw)?.into_iter().collect(),
            None => HashMap::new(),
        };

        let workers = match env_opt("PHP_WORKERS_DEF") {
            Some(raw) => parse_workers(&raw)?,
            None => Vec::new(),
        };

        Ok(Self {
            num_threads: env_parse("PHP_THREADS", 0)?,
            max_threads,
            max_wait_time: env_duration("PHP_MAX_WAIT_TIME", "off")?,
            document_root: env_or("DOCUMENT_ROOT", "/var/www/html"),
            resolve_symlinks: env_bool("DOCUMENT_ROOT_RESOLVE_SYMLINKS", false),
            php_ini,
            workers,
        })
    }

    /// Options in the order the server applies them.
    pub fn to_builder(&self) -> ConfigBuilder {
        let mut builder = ConfigBuilder::new().with_num_threads(self.num_threads);

        if let Some(max) = self.max_threads {
            builder = builder.with_max_threads(max);
        }
        if let Some(wait) = self.max_wait_time {
            builder = builder.with_max_wait_time(wait);
        }
        if !self.php_ini.is_empty() {
            builder = builder.with_php_ini(self.php_ini.clone());
        }

        builder = builder.with_document_root(self.document_root.clone(), self.resolve_symlinks);

        for worker in &self.workers {
            builder = builder.with_worker(worker.clone());
        }
        builder
    }
}

/// Parse `name=script[:count]` entries separated by `;`. Count defaults to 1.
fn parse_workers(raw: &str) -> Result<Vec<WorkerOption>, ConfigError> {
    parse_pairs("PHP_WORKERS_DEF", raw)?
        .into_iter()
        .map(|(name, target)| {
            let (script, num) = match target.rsplit_once(':') {
                Some((script, count)) => {
                    let num = count.parse::<usize>().map_err(|e| ConfigError::Parse {
                        key: "PHP_WORKERS_DEF".into(),
                        value: target.clone(),
                        error: e.to_string(),
                    })?;
                    (script.to_string(), num)
                }
                None => (target, 1),
            };

            if script.is_empty() {
                return Err(ConfigError::Invalid {
                    key: "PHP_WORKERS_DEF".into(),
                    message: format!("worker '{}' has no script", name),
                });
            }

            Ok(WorkerOption::new(name, script, num))
        })
        .collect()
}
