//! Process-scoped state shared by configuration assembly.

use std::sync::OnceLock;

use crate::config::DocumentRootCache;
use crate::system::logical_cpu_count;

static GLOBAL: OnceLock<ProcessContext> = OnceLock::new();

/// State that lives as long as the process: the document root cache and
/// the logical CPU count sampled at startup.
///
/// Servers use [`ProcessContext::global`]; tests build isolated contexts.
#[derive(Debug)]
pub struct ProcessContext {
    document_roots: DocumentRootCache,
    cpu_count: usize,
}

impl ProcessContext {
    /// Fresh context with an empty cache.
    pub fn new() -> Self {
        Self::with_parts(DocumentRootCache::new(), logical_cpu_count())
    }

    pub fn with_parts(document_roots: DocumentRootCache, cpu_count: usize) -> Self {
        Self {
            document_roots,
            cpu_count: cpu_count.max(1),
        }
    }

    /// The process-wide context, created on first use.
    pub fn global() -> &'static ProcessContext {
        GLOBAL.get_or_init(ProcessContext::new)
    }

    #[inline]
    pub fn document_roots(&self) -> &DocumentRootCache {
        &self.document_roots
    }

    #[inline]
    pub fn cpu_count(&self) -> usize {
        self.cpu_count
    }
}

impl Default for ProcessContext {
    fn default() -> Self {
        Self::new()
    }
}
