//! Structured observability hooks for the per-device report lifecycle.
//!
//! Events are emitted at `info!` level unless noted (filter with
//! `CFGDIFF_LOG`/`RUST_LOG`). For JSON output pass `--json` to the CLI.

use std::path::Path;

use tracing::{info, warn, Span};

/// Span covering all work for one device file.
///
/// Attach it to the device task with `Instrument::instrument` so every
/// event below carries `file`.
pub fn device_span(file: &str) -> Span {
    tracing::info_span!("cfgdiff.device", file = %file)
}

/// Emit event: diff text obtained, normalization starting.
pub fn emit_device_started(file: &str, diff_bytes: usize) {
    info!(event = "device.started", file = %file, diff_bytes = diff_bytes);
}

/// Emit event: device has real changes and goes into the report.
pub fn emit_device_changed(file: &str, hostname: &str, lines: usize) {
    info!(
        event = "device.changed",
        file = %file,
        hostname = %hostname,
        lines = lines,
    );
}

/// Emit event: diff contained only noise or unchanged context (warning level,
/// matching how the daily job flags skipped devices).
pub fn emit_device_skipped(file: &str, reason: &str) {
    warn!(event = "device.skipped", file = %file, reason = %reason);
}

/// Emit event: diff acquisition or normalization failed (warning level).
pub fn emit_device_failed(file: &str, error: &dyn std::fmt::Display) {
    warn!(event = "device.failed", file = %file, error = %error);
}

/// Emit event: report files written.
pub fn emit_report_written(path: &Path, devices: usize) {
    info!(
        event = "report.written",
        path = %path.display(),
        devices = devices,
    );
}
