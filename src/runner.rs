//! Toolchain invocation and result classification.

use std::path::Path;
use std::process::Command;
use std::time::{Duration, Instant};

use tracing::{error, info, warn};

use crate::config::HarnessConfig;

/// Outcome of building and running one provisioned project.
///
/// Immutable once produced. Success means exactly "exit code zero"; build
/// failures, tool crashes, and the program's own runtime failures are all
/// classified the same way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub name: String,
    pub success: bool,
    /// Wall-clock time from just before invocation to completion.
    pub duration: Duration,
    pub stdout: String,
    pub stderr: String,
}

impl ExecutionResult {
    /// A failure produced by the harness itself (source read or provisioning
    /// errors), classified exactly like a failing program under test.
    pub fn harness_failure(name: &str, duration: Duration, message: String) -> Self {
        Self {
            name: name.to_string(),
            success: false,
            duration,
            stdout: String::new(),
            stderr: message,
        }
    }
}

/// Build and run the provisioned project, blocking until it completes.
///
/// Captures both output streams in full. On failure the captured output is
/// replayed into the log for diagnostics; on success only a pass marker and
/// the duration are emitted.
pub fn execute(config: &HarnessConfig, name: &str, crate_dir: &Path) -> ExecutionResult {
    info!("running test \"{name}\"");
    let start = Instant::now();

    let mut cmd = Command::new(&config.toolchain);
    cmd.arg("run").current_dir(crate_dir);
    if config.debug {
        cmd.arg("--verbose");
    }

    let result = match cmd.output() {
        Ok(output) => ExecutionResult {
            name: name.to_string(),
            success: output.status.success(),
            duration: start.elapsed(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        },
        Err(e) => ExecutionResult::harness_failure(
            name,
            start.elapsed(),
            format!("failed to invoke the toolchain: {e}"),
        ),
    };

    let pretty = human_readable(result.duration);
    if result.success {
        info!("{name:<20}\t✔\t({pretty})");
    } else {
        error!("{name:<20}\t✘\t({pretty})");
        replay_output(name, &result.stdout, &result.stderr);
    }

    result
}

/// Replay captured toolchain output line by line, prefixed with the test
/// name so interleaved worker logs stay attributable.
pub fn replay_output(name: &str, stdout: &str, stderr: &str) {
    if !stdout.is_empty() {
        warn!("stdout:");
        for line in stdout.lines() {
            warn!("({name}) {line}");
        }
    }
    if !stderr.is_empty() {
        warn!("stderr:");
        for line in stderr.lines() {
            warn!("({name}) {line}");
        }
    }
}

// Calendar spans, largest first. Years and months use fixed 365- and 30-day
// spans.
const UNITS: &[(&str, u64)] = &[
    ("year", 365 * 24 * 60 * 60),
    ("month", 30 * 24 * 60 * 60),
    ("day", 24 * 60 * 60),
    ("hour", 60 * 60),
    ("minute", 60),
    ("second", 1),
];

/// Format a duration as a calendar breakdown, omitting zero-valued units and
/// pluralizing the rest. A zero duration formats to an empty string.
pub fn human_readable(duration: Duration) -> String {
    let mut remaining = duration.as_secs();
    let mut parts = Vec::new();

    for (unit, span) in UNITS {
        let value = remaining / span;
        remaining %= span;
        if value == 0 {
            continue;
        }
        if value > 1 {
            parts.push(format!("{value} {unit}s"));
        } else {
            parts.push(format!("{value} {unit}"));
        }
    }

    parts.join(" and ")
}
