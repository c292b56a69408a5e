//! Directive extraction from test unit source text.
//!
//! Test units steer their own build through marker comments:
//!
//! ```text
//! // ROOT: ../some/asset/tree
//! // FEATURE: globs
//! // IGNORE: .git target
//! ```
//!
//! `ROOT` selects the directory tree the generated build script embeds,
//! `FEATURE` lists feature flags for the embedding library, and `IGNORE`
//! lists patterns excluded from the embedded tree. Each keyword is scanned
//! on every line and a later occurrence overwrites an earlier one.
//!
//! Separately, every `extern crate <name>` line declares a dependency the
//! generated manifest must carry. Unlike the directives, these accumulate
//! across the whole file, preserving order and duplicates.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

static DIRECTIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"// (ROOT|FEATURE|IGNORE):((?:[ \t]+\S+)+)")
        .expect("INVARIANT: directive pattern compiles")
});

static EXTERN_CRATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"extern crate ([A-Za-z0-9_]+)").expect("INVARIANT: reference pattern compiles")
});

/// Configuration extracted from one test unit's source text.
///
/// `root` is always present: when no `ROOT` directive is found it falls back
/// to the harness's own source tree, even if the resolved path does not
/// exist on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveAnalysis {
    /// Directory tree the generated build script embeds.
    pub root: PathBuf,
    /// Exclusion patterns, in directive order.
    pub ignores: Vec<String>,
    /// Feature flags for the embedding library.
    pub features: Vec<String>,
    /// `extern crate` names, in source order, duplicates preserved.
    pub dependencies: Vec<String>,
}

/// Scan `source` line by line and produce the unit's build configuration.
///
/// Pure apart from logging: identical input always yields an identical
/// analysis. A `ROOT` pointing at a missing path is a warning, not a
/// failure; provisioning proceeds regardless.
pub fn analyze(name: &str, source: &str, default_root: &Path) -> DirectiveAnalysis {
    let mut root: Option<PathBuf> = None;
    let mut ignores = Vec::new();
    let mut features = Vec::new();
    let mut dependencies = Vec::new();

    for line in source.lines() {
        if let Some(caps) = DIRECTIVE_RE.captures(line) {
            let tokens: Vec<String> = caps[2].split_whitespace().map(str::to_string).collect();
            match &caps[1] {
                // Root is a single path; extra tokens are ignored.
                "ROOT" => root = tokens.into_iter().next().map(PathBuf::from),
                "FEATURE" => features = tokens,
                "IGNORE" => ignores = tokens,
                _ => {}
            }
        }

        for caps in EXTERN_CRATE_RE.captures_iter(line) {
            dependencies.push(caps[1].to_string());
        }
    }

    let root = root.unwrap_or_else(|| default_root.to_path_buf());

    if !root.exists() {
        warn!(
            "({name}) embedded directory doesn't exist, \"{}\"",
            root.display()
        );
    }

    let analysis = DirectiveAnalysis {
        root,
        ignores,
        features,
        dependencies,
    };
    debug!("({name}) analysis: {analysis:?}");
    analysis
}
