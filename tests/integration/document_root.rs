//! Document root resolution and the bounded cache

use std::path::PathBuf;

use php_gate::config::{ConfigBuilder, DocumentRootCache, DOCUMENT_ROOT_CACHE_CAPACITY};

use crate::helpers::CountingContext;

#[test]
fn test_repeat_resolution_is_cached() {
    let counting = CountingContext::new(DOCUMENT_ROOT_CACHE_CAPACITY);
    let cache = counting.cache();

    let first = cache.resolve("/var/www/../www/html", false).unwrap();
    let second = cache.resolve("/var/www/../www/html", false).unwrap();

    assert_eq!(first, second);
    assert_eq!(first, PathBuf::from("/var/www/html"));
    assert_eq!(counting.calls(), 1);
}

#[test]
fn test_paths_past_capacity_are_recomputed() {
    let counting = CountingContext::new(DOCUMENT_ROOT_CACHE_CAPACITY);
    let cache = counting.cache();
    let distinct = DOCUMENT_ROOT_CACHE_CAPACITY + 6;
    let raw = |i: usize| format!("/srv/site-{}/public", i);

    for i in 0..distinct {
        assert_eq!(cache.resolve(&raw(i), false).unwrap(), PathBuf::from(raw(i)));
    }
    assert_eq!(counting.calls(), distinct);
    assert_eq!(cache.len(), DOCUMENT_ROOT_CACHE_CAPACITY);

    // Second pass: the first 1024 hit, the overflow is computed again
    for i in 0..distinct {
        assert_eq!(cache.resolve(&raw(i), false).unwrap(), PathBuf::from(raw(i)));
    }
    let requests = distinct * 2;
    assert_eq!(counting.calls(), requests - DOCUMENT_ROOT_CACHE_CAPACITY);

    assert!(cache.get(&raw(0)).is_some());
    assert!(cache.get(&raw(DOCUMENT_ROOT_CACHE_CAPACITY - 1)).is_some());
    assert!(cache.get(&raw(DOCUMENT_ROOT_CACHE_CAPACITY)).is_none());
}

#[test]
fn test_relative_root_uses_working_directory() {
    let cache = DocumentRootCache::new();
    let cwd = std::env::current_dir().unwrap();
    assert_eq!(cache.resolve("public", false).unwrap(), cwd.join("public"));
}

#[test]
fn test_empty_root_rejected() {
    let cache = DocumentRootCache::new();
    let err = cache.resolve("", false).unwrap_err();
    assert!(err.to_string().contains("cannot resolve document root"));
}

#[cfg(unix)]
mod symlinks {
    use std::fs;

    use php_gate::config::ConfigBuilder;

    use crate::helpers::{CountingContext, Releases};

    #[test]
    fn test_retargeted_symlink_is_followed() {
        let releases = Releases::new();
        let counting = CountingContext::new(16);

        let first = counting
            .cache()
            .resolve(releases.current_str(), true)
            .unwrap();
        releases.switch_to(&releases.green);
        let second = counting
            .cache()
            .resolve(releases.current_str(), true)
            .unwrap();

        assert_eq!(first, fs::canonicalize(&releases.blue).unwrap());
        assert_eq!(second, fs::canonicalize(&releases.green).unwrap());
        assert_ne!(first, second);
        assert_eq!(counting.calls(), 1);
    }

    #[test]
    fn test_without_symlink_resolution_keeps_link_path() {
        let releases = Releases::new();
        let counting = CountingContext::new(16);

        let config = ConfigBuilder::new()
            .with_document_root(releases.current_str(), false)
            .build(&counting.ctx)
            .unwrap();
        assert_eq!(config.document_root(), Some(releases.current.as_path()));

        let config = ConfigBuilder::new()
            .with_document_root(releases.current_str(), true)
            .build(&counting.ctx)
            .unwrap();
        assert_eq!(
            config.document_root(),
            Some(fs::canonicalize(&releases.blue).unwrap().as_path())
        );
    }

    #[test]
    fn test_dangling_symlink_fails_assembly() {
        let releases = Releases::new();
        fs::remove_dir(&releases.green).unwrap();
        releases.switch_to(&releases.green);

        let counting = CountingContext::new(16);
        let result = ConfigBuilder::new()
            .with_num_threads(2)
            .with_document_root(releases.current_str(), true)
            .build(&counting.ctx);

        assert!(result.is_err());
    }
}

#[test]
fn test_builder_resolution_matches_cache() {
    let counting = CountingContext::new(8);
    let config = ConfigBuilder::new()
        .with_document_root("/opt/app/./web", false)
        .build(&counting.ctx)
        .unwrap();

    assert_eq!(
        config.document_root().map(PathBuf::from),
        counting.cache().get("/opt/app/./web")
    );
}
