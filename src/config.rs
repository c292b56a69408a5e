//! Harness configuration, threaded explicitly through every component.

use std::path::PathBuf;

/// Explicit configuration for one harness invocation.
///
/// Constructed once by the CLI and passed by reference into every component
/// that needs verbosity control or a shared path. There is no process-global
/// state; workers only share the read-only fields of this value.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Verbose output; also propagates `--verbose` to toolchain invocations.
    pub debug: bool,

    /// Run test units one at a time instead of over the worker pool.
    pub sequential: bool,

    /// Root of the embedding library checkout the harness belongs to.
    pub project_root: PathBuf,

    /// Directory holding the test units.
    pub test_dir: PathBuf,

    /// Location of the embedding library, rendered into generated manifests.
    pub library_path: PathBuf,

    /// Pre-built artifact cache seeded into each provisioned project.
    pub cache_dir: PathBuf,

    /// Toolchain program invoked for scaffolding and build-and-run.
    /// Overridable so tests can substitute a stub.
    pub toolchain: PathBuf,
}

impl HarnessConfig {
    /// Configuration rooted at the harness's own checkout.
    pub fn new(debug: bool, sequential: bool) -> Self {
        Self::rooted_at(PathBuf::from(env!("CARGO_MANIFEST_DIR")), debug, sequential)
    }

    /// Configuration rooted at an arbitrary checkout directory.
    pub fn rooted_at(project_root: PathBuf, debug: bool, sequential: bool) -> Self {
        Self {
            debug,
            sequential,
            test_dir: project_root.join("integration_tests"),
            library_path: project_root.clone(),
            cache_dir: project_root.join("target"),
            toolchain: PathBuf::from("cargo"),
            project_root,
        }
    }

    /// Fallback embed root used when a test unit has no root directive: the
    /// harness's own primary source tree.
    pub fn default_root(&self) -> PathBuf {
        self.project_root.join("src")
    }

    /// Substitute the toolchain program.
    pub fn with_toolchain(mut self, toolchain: impl Into<PathBuf>) -> Self {
        self.toolchain = toolchain.into();
        self
    }

    /// Point the harness at a different test-unit directory.
    pub fn with_test_dir(mut self, test_dir: impl Into<PathBuf>) -> Self {
        self.test_dir = test_dir.into();
        self
    }

    /// Seed provisioned projects from a different cache directory.
    pub fn with_cache_dir(mut self, cache_dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = cache_dir.into();
        self
    }

    /// Render a different embedding-library location into manifests.
    pub fn with_library_path(mut self, library_path: impl Into<PathBuf>) -> Self {
        self.library_path = library_path.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_derive_from_project_root() {
        let config = HarnessConfig::rooted_at(PathBuf::from("/checkout"), false, false);
        assert_eq!(config.test_dir, PathBuf::from("/checkout/integration_tests"));
        assert_eq!(config.library_path, PathBuf::from("/checkout"));
        assert_eq!(config.cache_dir, PathBuf::from("/checkout/target"));
        assert_eq!(config.default_root(), PathBuf::from("/checkout/src"));
        assert_eq!(config.toolchain, PathBuf::from("cargo"));
    }

    #[test]
    fn test_builder_overrides() {
        let config = HarnessConfig::rooted_at(PathBuf::from("/checkout"), true, true)
            .with_toolchain("/stub/cargo")
            .with_test_dir("/elsewhere/units")
            .with_cache_dir("/elsewhere/cache");
        assert!(config.debug);
        assert!(config.sequential);
        assert_eq!(config.toolchain, PathBuf::from("/stub/cargo"));
        assert_eq!(config.test_dir, PathBuf::from("/elsewhere/units"));
        assert_eq!(config.cache_dir, PathBuf::from("/elsewhere/cache"));
    }

}
