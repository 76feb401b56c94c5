//! Capacity probe behavior against stub metric sources

use std::sync::Arc;

use php_gate::system::{
    available_memory, CapacityProbe, MetricsSource, OsMetrics, ProbeStrategy, ProcessLoadProbe,
    SystemLoadProbe,
};
#[cfg(not(target_os = "linux"))]
use php_gate::system::ProbeError;

use crate::helpers::StubMetrics;

const FACTORS: [f64; 6] = [0.001, 0.25, 0.7, 1.0, 2.5, 100.0];
const CPU_COUNTS: [usize; 4] = [1, 2, 8, 64];

#[test]
fn test_idle_host_always_permits() {
    for cpus in CPU_COUNTS {
        let probe = SystemLoadProbe::with_source(StubMetrics::new(0.0, 0.0), cpus);
        for factor in FACTORS {
            assert!(probe.has_capacity(factor), "cpus={} factor={}", cpus, factor);
        }
    }
}

#[test]
fn test_load_at_or_above_threshold_denies() {
    for cpus in CPU_COUNTS {
        for factor in FACTORS {
            let threshold = cpus as f64 * factor;
            for load in [threshold, threshold * 1.01, threshold + 10.0] {
                let probe = SystemLoadProbe::with_source(StubMetrics::new(load, 0.0), cpus);
                assert!(
                    !probe.has_capacity(factor),
                    "cpus={} factor={} load={}",
                    cpus,
                    factor,
                    load
                );
            }
        }
    }
}

#[test]
fn test_sample_errors_fail_closed() {
    let stub = StubMetrics::broken();
    let system = SystemLoadProbe::with_source(Arc::clone(&stub), 16);
    let process = ProcessLoadProbe::with_source(Arc::clone(&stub), 16);

    for factor in [0.0, 0.5, 1.0, 1e12] {
        assert!(!system.has_capacity(factor));
        assert!(!process.has_capacity(factor));
    }
}

#[test]
fn test_recovers_after_transient_error() {
    let stub = StubMetrics::new(0.5, 0.0);
    let probe = SystemLoadProbe::with_source(Arc::clone(&stub), 2);
    assert!(probe.has_capacity(0.7));

    stub.set_load(None);
    assert!(!probe.has_capacity(0.7));

    stub.set_load(Some(0.5));
    assert!(probe.has_capacity(0.7));
}

#[test]
fn test_process_probe_uses_percent_scale() {
    let stub = StubMetrics::new(0.0, 150.0);
    let probe = ProcessLoadProbe::with_source(Arc::clone(&stub), 2);

    // 2 CPUs * 100 * 0.7 = 140%
    assert!(!probe.has_capacity(0.7));
    // 2 CPUs * 100 * 0.8 = 160%
    assert!(probe.has_capacity(0.8));

    stub.set_cpu_percent(None);
    assert!(!probe.has_capacity(0.8));
}

#[test]
fn test_strategies_disagree_on_vantage_point() {
    // Busy host, idle process
    let stub = StubMetrics::new(7.9, 5.0);

    let system = ProbeStrategy::System.build_with(Arc::clone(&stub), 8);
    let process = ProbeStrategy::Process.build_with(Arc::clone(&stub), 8);
    let combined = ProbeStrategy::Combined.build_with(Arc::clone(&stub), 8);

    assert!(!system.has_capacity(0.5));
    assert!(process.has_capacity(0.5));
    assert!(!combined.has_capacity(0.5));
}

#[test]
fn test_probes_are_object_safe() {
    let probes: Vec<Box<dyn CapacityProbe>> = vec![
        Box::new(SystemLoadProbe::with_source(StubMetrics::new(0.0, 0.0), 1)),
        Box::new(ProcessLoadProbe::with_source(StubMetrics::new(0.0, 0.0), 1)),
    ];
    let names: Vec<_> = probes.iter().map(|p| p.name()).collect();
    assert_eq!(names, ["system", "process"]);
    assert!(probes.iter().all(|p| p.has_capacity(0.5)));
}

#[cfg(target_os = "linux")]
#[test]
fn test_available_memory_matches_meminfo() {
    let sampled = available_memory().unwrap();
    let meminfo = std::fs::read_to_string("/proc/meminfo").unwrap();
    let kb: u64 = meminfo
        .lines()
        .find_map(|l| l.strip_prefix("MemAvailable:"))
        .and_then(|rest| rest.split_whitespace().next())
        .and_then(|v| v.parse().ok())
        .unwrap();
    // Both reads race the kernel; allow 25% drift.
    let expected = kb * 1024;
    assert!(sampled.abs_diff(expected) <= expected / 4);
}

#[cfg(not(target_os = "linux"))]
#[test]
fn test_available_memory_is_an_error_without_procfs() {
    let err = available_memory().unwrap_err();
    assert!(matches!(err, ProbeError::Unsupported(_)));
}

#[cfg(target_os = "linux")]
#[test]
fn test_live_host_samples() {
    let os = OsMetrics;
    assert!(os.load_average().unwrap() >= 0.0);
    assert!(os.process_cpu_percent().unwrap() >= 0.0);
    assert!(os.available_memory().unwrap() > 0);

    // A factor this large leaves headroom on any host
    assert!(SystemLoadProbe::new().has_capacity(1e9));
    assert!(ProcessLoadProbe::new().has_capacity(1e9));
}
