//! CPU accounting: logical CPU count, load average and per-process CPU usage.

use std::sync::OnceLock;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use sysinfo::{ProcessRefreshKind, ProcessesToUpdate, System};

use super::error::{ProbeError, ProbeResult};

static LOGICAL_CPUS: OnceLock<usize> = OnceLock::new();

/// Number of logical CPUs available to this process.
///
/// Sampled once on first call and cached for the lifetime of the process.
/// If the CPU allowance changes later (container resize, affinity change)
/// the probes keep using the stale value.
pub fn logical_cpu_count() -> usize {
    *LOGICAL_CPUS.get_or_init(|| num_cpus::get().max(1))
}

/// Sample the 1-minute system load average.
#[cfg(unix)]
pub fn load_average() -> ProbeResult<f64> {
    let mut loads = [0f64; 3];
    // SAFETY: `loads` has room for the 3 samples requested.
    let n = unsafe { libc::getloadavg(loads.as_mut_ptr(), 3) };
    // getloadavg does not set errno.
    if n < 1 {
        return Err(ProbeError::Unavailable(
            "getloadavg returned no samples".into(),
        ));
    }
    Ok(loads[0])
}

#[cfg(not(unix))]
pub fn load_average() -> ProbeResult<f64> {
    Err(ProbeError::Unsupported("load average"))
}

/// Lifetime-average CPU utilization of this process, in percent.
///
/// Total CPU time consumed since the process started, divided by the wall
/// time since it started. One fully busy core is 100%, so the value can
/// exceed 100 on multi-core hosts.
pub fn process_cpu_percent() -> ProbeResult<f64> {
    let pid = sysinfo::get_current_pid()
        .map_err(|e| ProbeError::Unavailable(format!("current pid: {}", e)))?;

    let mut sys = System::new();
    sys.refresh_processes_specifics(
        ProcessesToUpdate::Some(&[pid]),
        true,
        ProcessRefreshKind::nothing().with_cpu(),
    );

    let process = sys
        .process(pid)
        .ok_or_else(|| ProbeError::Unavailable(format!("process {} not found", pid)))?;

    Ok(lifetime_cpu_percent(
        Duration::from_millis(process.accumulated_cpu_time()),
        process.start_time(),
        SystemTime::now(),
    ))
}

/// CPU time as a percentage of the wall time between `started_at`
/// (seconds since the epoch) and `now`.
pub(crate) fn lifetime_cpu_percent(cpu: Duration, started_at: u64, now: SystemTime) -> f64 {
    let now = now
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0);
    cpu_percent(cpu, now - started_at as f64)
}

fn cpu_percent(cpu: Duration, wall_secs: f64) -> f64 {
    if wall_secs <= 0.0 {
        return 0.0;
    }
    cpu.as_secs_f64() / wall_secs * 100.0
}
