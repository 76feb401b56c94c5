use std::process::ExitCode;

use serde::Serialize;
use tracing::{error, info, warn};

use php_gate::config::{AppConfig, ConfigSummary};
use php_gate::system::{self, format_bytes};
use php_gate::{logging, ProcessContext, VERSION};

/// Exit code when the probe refuses to scale.
const EXIT_NO_CAPACITY: u8 = 2;

/// One-shot admission report printed to stdout.
#[derive(Serialize)]
struct Report<'a> {
    version: &'static str,
    probe: &'static str,
    max_load_factor: f64,
    logical_cpus: usize,
    can_scale: bool,
    available_memory: Option<u64>,
    config: ConfigSummary<'a>,
}

fn main() -> ExitCode {
    match run() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(EXIT_NO_CAPACITY),
        Err(e) => {
            eprintln!("php_gate: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
    let config = AppConfig::from_env()?;

    if let Err(e) = logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    info!("Starting php_gate {}", VERSION);
    config.log_summary();

    let ctx = ProcessContext::global();
    let php = config.pool.to_builder().build(ctx).map_err(|e| {
        error!(error = %e, "configuration assembly failed");
        e
    })?;
    php.log_summary();

    let probe = config.gate.strategy.build();
    let can_scale = probe.has_capacity(config.gate.max_load_factor);
    info!(
        probe = probe.name(),
        max_load_factor = config.gate.max_load_factor,
        can_scale,
        "capacity probed"
    );

    let available_memory = match system::available_memory() {
        Ok(bytes) => {
            info!("Available memory: {}", format_bytes(bytes));
            Some(bytes)
        }
        Err(e) => {
            warn!(error = %e, "available memory unknown");
            None
        }
    };

    let report = Report {
        version: VERSION,
        probe: probe.name(),
        max_load_factor: config.gate.max_load_factor,
        logical_cpus: ctx.cpu_count(),
        can_scale,
        available_memory,
        config: php.summary(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(can_scale)
}
