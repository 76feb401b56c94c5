//! Available system memory.
//!
//! A plain accessor: unlike the load probes it has no safe default, so
//! sampling errors are returned to the caller.

use std::fs;
use std::path::Path;

use super::error::{ProbeError, ProbeResult};

#[cfg(target_os = "linux")]
const MEMINFO: &str = "/proc/meminfo";

/// Currently available (not total) system memory in bytes.
#[cfg(target_os = "linux")]
pub fn available_memory() -> ProbeResult<u64> {
    read_available_memory(Path::new(MEMINFO))
}

#[cfg(not(target_os = "linux"))]
pub fn available_memory() -> ProbeResult<u64> {
    Err(ProbeError::Unsupported("available memory"))
}

/// Read a meminfo-formatted file and return its `MemAvailable` in bytes.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
pub(crate) fn read_available_memory(path: &Path) -> ProbeResult<u64> {
    let content = fs::read_to_string(path).map_err(|error| ProbeError::Io {
        path: path.display().to_string(),
        error,
    })?;
    parse_mem_available(&content)
}

/// Extract `MemAvailable` (reported in kB) from `/proc/meminfo` content.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
pub(crate) fn parse_mem_available(content: &str) -> ProbeResult<u64> {
    let line = content
        .lines()
        .find(|l| l.starts_with("MemAvailable:"))
        .ok_or_else(|| ProbeError::Parse {
            source: "/proc/meminfo",
            message: "MemAvailable not found".into(),
        })?;

    let mut parts = line.split_whitespace().skip(1);
    let value: u64 = parts
        .next()
        .ok_or_else(|| ProbeError::Parse {
            source: "/proc/meminfo",
            message: "MemAvailable has no value".into(),
        })?
        .parse()
        .map_err(|e| ProbeError::Parse {
            source: "/proc/meminfo",
            message: format!("MemAvailable: {}", e),
        })?;

    let multiplier = match parts.next() {
        Some("kB") => 1024,
        None => 1,
        Some(unit) => {
            return Err(ProbeError::Parse {
                source: "/proc/meminfo",
                message: format!("unexpected unit '{}'", unit),
            })
        }
    };

    value.checked_mul(multiplier).ok_or_else(|| ProbeError::Parse {
        source: "/proc/meminfo",
        message: format!("MemAvailable out of range: {}", value),
    })
}

/// Format a byte count for log output.
pub fn format_bytes(bytes: u64) -> String {
    if bytes >= 1_073_741_824 {
        format!("{:.1} GB", bytes as f64 / 1_073_741_824.0)
    } else if bytes >= 1_048_576 {
        format!("{:.1} MB", bytes as f64 / 1_048_576.0)
    } else {
        format!("{} bytes", bytes)
    }
}
