//! PHP worker definitions.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// Environment passed to a worker's PHP scripts.
///
/// Keys are case-sensitive; when the same key is supplied twice the last
/// value wins.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PreparedEnv(HashMap<String, String>);

impl PreparedEnv {
    /// Prepare an environment from key/value pairs.
    pub fn new<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut env = HashMap::new();
        for (k, v) in vars {
            env.insert(k.into(), v.into());
        }
        Self(env)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// A worker as requested by a configuration option, before assembly.
#[derive(Clone, Debug)]
pub struct WorkerOption {
    pub(crate) name: String,
    pub(crate) file_name: PathBuf,
    pub(crate) num: usize,
    pub(crate) env: PreparedEnv,
    pub(crate) watch: Vec<PathBuf>,
    pub(crate) document_root: Option<PathBuf>,
}

impl WorkerOption {
    /// A worker running `file_name` in `num` instances.
    pub fn new(name: impl Into<String>, file_name: impl Into<PathBuf>, num: usize) -> Self {
        Self {
            name: name.into(),
            file_name: file_name.into(),
            num,
            env: PreparedEnv::default(),
            watch: Vec::new(),
            document_root: None,
        }
    }

    pub fn with_env<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env = PreparedEnv::new(vars);
        self
    }

    /// Paths whose changes trigger a worker reload.
    pub fn with_watch<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.watch = paths.into_iter().map(Into::into).collect();
        self
    }

    /// Document root for this worker only. Stored as given, without resolution.
    pub fn with_document_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.document_root = Some(root.into());
        self
    }

    /// Finalize against the configuration's document root.
    pub(crate) fn finish(self, default_root: Option<&Path>) -> WorkerConfig {
        WorkerConfig {
            document_root: self
                .document_root
                .or_else(|| default_root.map(Path::to_path_buf)),
            name: self.name,
            file_name: self.file_name,
            num: self.num,
            env: self.env,
            watch: self.watch,
        }
    }
}

/// An assembled, immutable worker definition.
#[derive(Clone, Debug, Serialize)]
pub struct WorkerConfig {
    name: String,
    file_name: PathBuf,
    num: usize,
    env: PreparedEnv,
    watch: Vec<PathBuf>,
    document_root: Option<PathBuf>,
}

impl WorkerConfig {
    /// Unique worker name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Worker script path.
    pub fn file_name(&self) -> &Path {
        &self.file_name
    }

    /// Desired instance count.
    pub fn num(&self) -> usize {
        self.num
    }

    pub fn env(&self) -> &PreparedEnv {
        &self.env
    }

    pub fn watch(&self) -> &[PathBuf] {
        &self.watch
    }

    /// Worker document root, falling back to the configuration's.
    pub fn document_root(&self) -> Option<&Path> {
        self.document_root.as_deref()
    }
}
