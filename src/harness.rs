//! Test discovery, scheduling, and result aggregation.
//!
//! Discovery resolves glob patterns against the test-unit directory into an
//! ordered set of units. Each unit then runs the same pipeline: read source,
//! analyze directives, provision an isolated project, build and run it. In
//! concurrent mode the units are spread over a fixed pool of OS threads,
//! each worker blocked on its own subprocesses; nothing a unit does can
//! affect its siblings.

use std::collections::{BTreeSet, VecDeque};
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use crate::config::HarnessConfig;
use crate::directives;
use crate::project;
use crate::runner::{self, ExecutionResult, human_readable};

/// One discovered test scenario: a source file plus its derived short name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestUnit {
    pub source: PathBuf,
    pub name: String,
}

impl TestUnit {
    pub fn from_path(source: PathBuf) -> Self {
        let name = source
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "unnamed".to_string());
        Self { source, name }
    }
}

/// Combined outcome of one harness run.
#[derive(Debug)]
pub struct AggregateReport {
    pub results: Vec<ExecutionResult>,
    /// Total wall-clock time for the whole run.
    pub total: Duration,
}

impl AggregateReport {
    /// True iff at least one test ran and every test passed. An empty run
    /// is not a passing run.
    pub fn success(&self) -> bool {
        !self.results.is_empty() && self.results.iter().all(|r| r.success)
    }

    pub fn passed_count(&self) -> usize {
        self.results.iter().filter(|r| r.success).count()
    }

    pub fn failed_count(&self) -> usize {
        self.results.iter().filter(|r| !r.success).count()
    }
}

/// Resolve glob patterns against the test-unit directory.
///
/// Matches from every pattern merge into an ordered set keyed by path, so a
/// file matched by several patterns yields exactly one unit and discovery
/// order is deterministic (sorted by path). No patterns means every unit.
pub fn discover(config: &HarnessConfig, patterns: &[String]) -> io::Result<Vec<TestUnit>> {
    let default = vec!["*.rs".to_string()];
    let patterns = if patterns.is_empty() { &default[..] } else { patterns };

    let mut matched = BTreeSet::new();
    for entry in fs::read_dir(&config.test_dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if patterns.iter().any(|pattern| glob_match(pattern, file_name)) {
            matched.insert(path);
        }
    }

    debug!("discovered {} test unit(s)", matched.len());
    Ok(matched.into_iter().map(TestUnit::from_path).collect())
}

/// Minimal glob matcher over file names: `*` matches any run of characters,
/// `?` matches exactly one, everything else is literal.
pub fn glob_match(pattern: &str, name: &str) -> bool {
    fn matches(pattern: &[char], name: &[char]) -> bool {
        match pattern.split_first() {
            None => name.is_empty(),
            Some((&'*', rest)) => {
                matches(rest, name) || (!name.is_empty() && matches(pattern, &name[1..]))
            }
            Some((&'?', rest)) => !name.is_empty() && matches(rest, &name[1..]),
            Some((ch, rest)) => name.first() == Some(ch) && matches(rest, &name[1..]),
        }
    }

    let pattern: Vec<char> = pattern.chars().collect();
    let name: Vec<char> = name.chars().collect();
    matches(&pattern, &name)
}

/// The full pipeline for one unit: read, analyze, provision, execute.
///
/// Every failure inside the pipeline, including source read and provisioning
/// errors, comes back as a failed result, so a worker can never take down
/// the pool or abort sibling tests.
pub fn run_unit(config: &HarnessConfig, unit: &TestUnit) -> ExecutionResult {
    let start = Instant::now();

    let source = match fs::read_to_string(&unit.source) {
        Ok(source) => source,
        Err(e) => {
            error!("({}) failed to read {}: {e}", unit.name, unit.source.display());
            return ExecutionResult::harness_failure(
                &unit.name,
                start.elapsed(),
                format!("failed to read {}: {e}", unit.source.display()),
            );
        }
    };

    let analysis = directives::analyze(&unit.name, &source, &config.default_root());

    match project::provision(config, unit, &analysis) {
        Ok(provisioned) => runner::execute(config, &provisioned.name, &provisioned.crate_dir),
        Err(e) => {
            error!("({}) provisioning failed: {e}", unit.name);
            ExecutionResult::harness_failure(&unit.name, start.elapsed(), e.to_string())
        }
    }
}

/// Drive every matching test unit to completion and aggregate the outcome.
pub fn run(config: &HarnessConfig, patterns: &[String]) -> io::Result<AggregateReport> {
    let start = Instant::now();

    let units = discover(config, patterns)?;
    if units.is_empty() {
        warn!("no test units match the provided patterns");
    }

    let results = if config.sequential {
        units.iter().map(|unit| run_unit(config, unit)).collect()
    } else {
        run_pool(config, units)
    };

    let total = start.elapsed();
    info!("tests completed in {}", human_readable(total));

    Ok(AggregateReport { results, total })
}

/// Fan the units out over a fixed pool of OS threads sized to the hardware.
///
/// Workers pull from a shared queue and block on their own subprocesses;
/// completion order is unspecified.
fn run_pool(config: &HarnessConfig, units: Vec<TestUnit>) -> Vec<ExecutionResult> {
    let workers = thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .min(units.len().max(1));

    let queue = Mutex::new(VecDeque::from(units));
    let results = Mutex::new(Vec::new());

    thread::scope(|scope| {
        for _ in 0..workers {
            scope.spawn(|| {
                loop {
                    let Some(unit) = queue.lock().ok().and_then(|mut q| q.pop_front()) else {
                        break;
                    };
                    let result = run_unit(config, &unit);
                    if let Ok(mut all) = results.lock() {
                        all.push(result);
                    }
                }
            });
        }
    });

    results.into_inner().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::time::Duration;

    fn result(name: &str, success: bool) -> ExecutionResult {
        ExecutionResult {
            name: name.to_string(),
            success,
            duration: Duration::from_millis(10),
            stdout: String::new(),
            stderr: String::new(),
        }
    }

    #[test]
    fn test_unit_name_is_the_file_stem() {
        let unit = TestUnit::from_path(PathBuf::from("/tests/basic_access.rs"));
        assert_eq!(unit.name, "basic_access");
    }

    #[test]
    fn test_glob_match_literals_and_wildcards() {
        assert!(glob_match("*.rs", "walk.rs"));
        assert!(glob_match("walk.rs", "walk.rs"));
        assert!(glob_match("w?lk.rs", "walk.rs"));
        assert!(glob_match("*", "anything at all"));
        assert!(!glob_match("*.rs", "walk.py"));
        assert!(!glob_match("walk.rs", "talk.rs"));
        assert!(!glob_match("?", ""));
    }

    #[test]
    fn test_glob_star_matches_empty_run() {
        assert!(glob_match("walk*.rs", "walk.rs"));
        assert!(glob_match("*", ""));
    }

    #[test]
    fn test_aggregate_success_requires_all_passing() {
        let report = AggregateReport {
            results: vec![result("a", true), result("b", true)],
            total: Duration::from_secs(1),
        };
        assert!(report.success());
        assert_eq!(report.passed_count(), 2);
        assert_eq!(report.failed_count(), 0);
    }

    #[test]
    fn test_single_failure_fails_the_aggregate() {
        let report = AggregateReport {
            results: vec![result("a", true), result("b", false)],
            total: Duration::from_secs(1),
        };
        assert!(!report.success());
        assert_eq!(report.passed_count(), 1);
        assert_eq!(report.failed_count(), 1);
    }

    #[test]
    fn test_empty_run_is_not_a_passing_run() {
        let report = AggregateReport {
            results: Vec::new(),
            total: Duration::ZERO,
        };
        assert!(!report.success());
    }

    #[test]
    fn test_discovery_deduplicates_overlapping_patterns() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("walk.rs"), "fn main() {}").unwrap();
        std::fs::write(dir.path().join("globs.rs"), "fn main() {}").unwrap();
        let config = HarnessConfig::rooted_at(dir.path().to_path_buf(), false, true)
            .with_test_dir(dir.path());

        let patterns = vec!["*.rs".to_string(), "walk*".to_string(), "w?lk.rs".to_string()];
        let units = discover(&config, &patterns).unwrap();
        assert_eq!(units.len(), 2);
        // BTreeSet keying makes discovery order sorted by path.
        assert_eq!(units[0].name, "globs");
        assert_eq!(units[1].name, "walk");
    }

    #[test]
    fn test_discovery_defaults_to_every_unit() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.rs"), "").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "").unwrap();
        let config = HarnessConfig::rooted_at(dir.path().to_path_buf(), false, true)
            .with_test_dir(dir.path());

        let units = discover(&config, &[]).unwrap();
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].name, "a");
    }

    #[test]
    fn test_unreadable_unit_becomes_a_failed_result() {
        let config = HarnessConfig::rooted_at(PathBuf::from("/nonexistent"), false, true);
        let unit = TestUnit::from_path(PathBuf::from("/nonexistent/unit.rs"));
        let result = run_unit(&config, &unit);
        assert!(!result.success);
        assert!(result.stderr.contains("failed to read"));
    }

    proptest! {
        #[test]
        fn prop_star_matches_any_name(name in "\\PC{0,40}") {
            prop_assert!(glob_match("*", &name));
        }

        #[test]
        fn prop_literal_pattern_matches_only_itself(name in "[a-z]{1,12}\\.rs") {
            prop_assert!(glob_match(&name, &name));
            let prefixed = format!("x{name}");
            prop_assert!(!glob_match(&name, &prefixed));
        }
    }
}
