//! Test helpers and utilities

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use php_gate::config::{absolute_path, DocumentRootCache};
use php_gate::system::{MetricsSource, ProbeError, ProbeResult};
use php_gate::ProcessContext;

/// Metric source whose samples tests can change between calls.
///
/// `None` makes the corresponding sample fail.
#[derive(Default)]
pub struct StubMetrics {
    load: Mutex<Option<f64>>,
    cpu_percent: Mutex<Option<f64>>,
    memory: Mutex<Option<u64>>,
}

#[allow(dead_code)]
impl StubMetrics {
    pub fn new(load: f64, cpu_percent: f64) -> Arc<Self> {
        Arc::new(Self {
            load: Mutex::new(Some(load)),
            cpu_percent: Mutex::new(Some(cpu_percent)),
            memory: Mutex::new(Some(1 << 30)),
        })
    }

    /// Every sample fails.
    pub fn broken() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_load(&self, load: Option<f64>) {
        *self.load.lock().unwrap() = load;
    }

    pub fn set_cpu_percent(&self, percent: Option<f64>) {
        *self.cpu_percent.lock().unwrap() = percent;
    }
}

impl MetricsSource for StubMetrics {
    fn load_average(&self) -> ProbeResult<f64> {
        self.load
            .lock()
            .unwrap()
            .ok_or(ProbeError::Unsupported("stub load average"))
    }

    fn process_cpu_percent(&self) -> ProbeResult<f64> {
        self.cpu_percent
            .lock()
            .unwrap()
            .ok_or(ProbeError::Unsupported("stub process CPU"))
    }

    fn available_memory(&self) -> ProbeResult<u64> {
        self.memory
            .lock()
            .unwrap()
            .ok_or(ProbeError::Unsupported("stub memory"))
    }
}

/// Context whose document root cache counts absolute-path computations.
pub struct CountingContext {
    pub ctx: ProcessContext,
    calls: Arc<AtomicUsize>,
}

#[allow(dead_code)]
impl CountingContext {
    pub fn new(capacity: usize) -> Self {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let cache = DocumentRootCache::with_absolutizer(capacity, move |raw| {
            counter.fetch_add(1, Ordering::SeqCst);
            absolute_path(raw)
        });

        Self {
            ctx: ProcessContext::with_parts(cache, 4),
            calls,
        }
    }

    /// Number of times the absolute-path step ran.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn cache(&self) -> &DocumentRootCache {
        self.ctx.document_roots()
    }
}

/// A temp directory with two release directories and a `current` symlink.
#[cfg(unix)]
pub struct Releases {
    _dir: tempfile::TempDir,
    pub blue: PathBuf,
    pub green: PathBuf,
    pub current: PathBuf,
}

#[cfg(unix)]
#[allow(dead_code)]
impl Releases {
    pub fn new() -> Self {
        let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let blue = dir.path().join("release-blue");
        let green = dir.path().join("release-green");
        std::fs::create_dir(&blue).unwrap();
        std::fs::create_dir(&green).unwrap();

        let current = dir.path().join("current");
        std::os::unix::fs::symlink(&blue, &current).unwrap();

        Self {
            _dir: dir,
            blue,
            green,
            current,
        }
    }

    /// Repoint `current` at `target`.
    pub fn switch_to(&self, target: &std::path::Path) {
        std::fs::remove_file(&self.current).unwrap();
        std::os::unix::fs::symlink(target, &self.current).unwrap();
    }

    pub fn current_str(&self) -> &str {
        self.current.to_str().expect("temp path is UTF-8")
    }
}
