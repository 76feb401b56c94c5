//! Document root resolution with a bounded, append-only cache.
//!
//! Making a path absolute is filesystem-independent and only costs a
//! working-directory lookup, so the result is cached per raw string for
//! the lifetime of the cache. Symlink resolution reflects the live
//! filesystem and is redone on every call.
//!
//! The cache never evicts. Once it holds [`DOCUMENT_ROOT_CACHE_CAPACITY`]
//! entries, new raw paths are still resolved but no longer stored.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};

use tracing::{debug, trace};

use super::ConfigError;

/// Maximum number of distinct raw paths kept in the cache.
pub const DOCUMENT_ROOT_CACHE_CAPACITY: usize = 1024;

type Absolutizer = dyn Fn(&str) -> io::Result<PathBuf> + Send + Sync;

/// Process-wide cache of raw document root -> absolute path.
///
/// Lookup, compute and insert are not atomic as a whole. Two callers
/// missing on the same key both compute the (identical) path and the first
/// insert wins; the size counter may overshoot the cap by the number of
/// racing inserters.
pub struct DocumentRootCache {
    entries: RwLock<HashMap<Box<str>, PathBuf>>,
    len: AtomicUsize,
    capacity: usize,
    absolutize: Box<Absolutizer>,
}

impl DocumentRootCache {
    /// Cache with the default capacity and the lexical absolutizer.
    pub fn new() -> Self {
        Self::with_absolutizer(DOCUMENT_ROOT_CACHE_CAPACITY, absolute_path)
    }

    /// Cache with a custom capacity and absolute-path function.
    pub fn with_absolutizer<F>(capacity: usize, absolutize: F) -> Self
    where
        F: Fn(&str) -> io::Result<PathBuf> + Send + Sync + 'static,
    {
        Self {
            entries: RwLock::new(HashMap::new()),
            len: AtomicUsize::new(0),
            capacity,
            absolutize: Box::new(absolutize),
        }
    }

    /// Resolve `raw` to an absolute path, optionally following symlinks.
    pub fn resolve(&self, raw: &str, resolve_symlinks: bool) -> Result<PathBuf, ConfigError> {
        let path = match self.get(raw) {
            Some(path) => {
                trace!(raw, "document root cache hit");
                path
            }
            None => self.compute(raw)?,
        };

        if !resolve_symlinks {
            return Ok(path);
        }

        fs::canonicalize(&path).map_err(|error| ConfigError::DocumentRoot {
            path: path.display().to_string(),
            error,
        })
    }

    /// Cached absolute path for `raw`, without computing it.
    pub fn get(&self, raw: &str) -> Option<PathBuf> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(raw).cloned()
    }

    /// Number of cached entries as counted on insert.
    #[inline]
    pub fn len(&self) -> usize {
        self.len.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn compute(&self, raw: &str) -> Result<PathBuf, ConfigError> {
        let path = (self.absolutize)(raw).map_err(|error| ConfigError::DocumentRoot {
            path: raw.to_string(),
            error,
        })?;

        if self.len.load(Ordering::Relaxed) < self.capacity {
            let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
            if !entries.contains_key(raw) {
                entries.insert(raw.into(), path.clone());
                self.len.fetch_add(1, Ordering::Relaxed);
            }
        } else {
            debug!(raw, capacity = self.capacity, "document root cache full, not caching");
        }

        Ok(path)
    }
}

impl Default for DocumentRootCache {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DocumentRootCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentRootCache")
            .field("len", &self.len())
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

/// Make `raw` absolute against the current directory and normalize `.`
/// and `..` lexically. Symlinks are not touched.
pub fn absolute_path(raw: &str) -> io::Result<PathBuf> {
    if raw.is_empty() {
        return Err(io::Error::new(io::ErrorKind::InvalidInput, "empty path"));
    }
    if raw.contains('\0') {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "path contains a NUL byte",
        ));
    }

    let path = Path::new(raw);
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };

    Ok(normalize(&joined))
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                // `..` at the root stays at the root
                out.pop();
            }
            Component::Normal(part) => out.push(part),
        }
    }
    out
}
