//! Option-based configuration assembly

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use php_gate::config::{ConfigBuilder, ConfigOption, WorkerOption};
use php_gate::metrics::{MetricsSink, NullMetrics};
use php_gate::{ConfigError, PhpConfig, ProcessContext};

use crate::helpers::CountingContext;

#[test]
fn test_threads_and_single_worker() {
    let ctx = ProcessContext::new();
    let config = PhpConfig::assemble(
        &ctx,
        [
            ConfigOption::NumThreads(4),
            ConfigOption::MaxThreads(8),
            ConfigOption::worker(
                "w1",
                "/s.php",
                2,
                HashMap::<String, String>::new(),
                Vec::<PathBuf>::new(),
            ),
        ],
    )
    .expect("Should assemble");

    assert_eq!(config.num_threads(), 4);
    assert_eq!(config.max_threads(), Some(8));
    assert_eq!(config.workers().len(), 1);

    let worker = &config.workers()[0];
    assert_eq!(worker.name(), "w1");
    assert_eq!(worker.num(), 2);
    assert_eq!(worker.file_name(), Path::new("/s.php"));
    assert!(worker.env().is_empty());
    assert!(worker.watch().is_empty());
}

#[test]
fn test_failing_middle_option_aborts() {
    let counting = CountingContext::new(1024);
    let missing = tempfile::TempDir::new().unwrap().path().join("gone");

    let result = PhpConfig::assemble(
        &counting.ctx,
        [
            ConfigOption::NumThreads(4),
            ConfigOption::DocumentRoot {
                path: missing.to_str().unwrap().to_string(),
                resolve_symlinks: true,
            },
            ConfigOption::DocumentRoot {
                path: "/third/option".into(),
                resolve_symlinks: false,
            },
        ],
    );

    assert!(matches!(result, Err(ConfigError::DocumentRoot { .. })));
    // Only the failing option reached the cache
    assert_eq!(counting.calls(), 1);
    assert!(counting.cache().get("/third/option").is_none());
}

#[test]
fn test_duplicate_worker_names_rejected() {
    let ctx = ProcessContext::new();
    let err = ConfigBuilder::new()
        .with_worker(WorkerOption::new("api", "/app/api.php", 2))
        .with_worker(WorkerOption::new("api", "/app/other.php", 1))
        .build(&ctx)
        .unwrap_err();

    assert_eq!(err.to_string(), "duplicate worker name: api");
}

#[test]
fn test_max_threads_below_target_rejected() {
    let ctx = ProcessContext::new();
    let err = ConfigBuilder::new()
        .with_num_threads(16)
        .with_max_threads(8)
        .build(&ctx)
        .unwrap_err();

    assert!(err.to_string().contains("max threads (8)"));
}

#[test]
fn test_full_configuration() {
    let counting = CountingContext::new(1024);
    let sink: Arc<dyn MetricsSink> = Arc::new(NullMetrics);

    let config = ConfigBuilder::new()
        .with_num_threads(8)
        .with_max_threads(32)
        .with_metrics(Arc::clone(&sink))
        .with_logger(tracing::Dispatch::none())
        .with_php_ini(HashMap::from([
            ("memory_limit".to_string(), "512M".to_string()),
            ("opcache.enable".to_string(), "1".to_string()),
        ]))
        .with_max_wait_time(Duration::from_millis(750))
        .with_document_root("/srv/shop/./public", false)
        .with_worker(
            WorkerOption::new("queue", "/srv/shop/bin/queue.php", 3)
                .with_env([("QUEUE", "default"), ("QUEUE", "high")])
                .with_watch(["/srv/shop/src"]),
        )
        .with_worker(
            WorkerOption::new("admin", "/srv/admin/index.php", 1).with_document_root("/srv/admin"),
        )
        .build(&counting.ctx)
        .expect("Should assemble");

    assert_eq!(config.num_threads(), 8);
    assert_eq!(config.max_threads(), Some(32));
    assert!(config.metrics().is_some());
    assert!(config.logger().is_some());
    assert_eq!(config.php_ini().len(), 2);
    assert_eq!(config.max_wait_time(), Some(Duration::from_millis(750)));
    assert_eq!(config.document_root(), Some(Path::new("/srv/shop/public")));

    let queue = config.worker("queue").unwrap();
    assert_eq!(queue.env().get("QUEUE"), Some("high"));
    assert_eq!(queue.watch(), [PathBuf::from("/srv/shop/src")]);
    assert_eq!(queue.document_root(), Some(Path::new("/srv/shop/public")));

    let admin = config.worker("admin").unwrap();
    assert_eq!(admin.document_root(), Some(Path::new("/srv/admin")));

    // Only the document root option touched the cache
    assert_eq!(counting.calls(), 1);
    assert_eq!(counting.cache().len(), 1);
}

#[test]
fn test_configs_share_process_cache() {
    let counting = CountingContext::new(1024);

    for _ in 0..3 {
        let config = ConfigBuilder::new()
            .with_document_root("/var/www/html", false)
            .build(&counting.ctx)
            .unwrap();
        assert_eq!(config.document_root(), Some(Path::new("/var/www/html")));
    }

    assert_eq!(counting.calls(), 1);
}

#[test]
fn test_builder_from_iterator() {
    let ctx = ProcessContext::new();
    let mut builder: ConfigBuilder = [ConfigOption::NumThreads(2)].into_iter().collect();
    builder.extend([ConfigOption::MaxThreads(4)]);
    assert_eq!(builder.len(), 2);

    let config = builder.build(&ctx).unwrap();
    assert_eq!((config.num_threads(), config.max_threads()), (2, Some(4)));
}
