//! Isolated project provisioning.
//!
//! Each test unit gets a disposable cargo project of its own: a skeleton
//! scaffolded by the toolchain, the unit source copied in as `src/main.rs`,
//! plus a generated `build.rs` and `Cargo.toml` wired to the embedding
//! library. No two units ever share a mutable directory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;
use thiserror::Error;
use tracing::{debug, error};

use crate::config::HarnessConfig;
use crate::directives::DirectiveAnalysis;
use crate::harness::TestUnit;
use crate::runner;

/// Provisioning failure for a single test unit.
///
/// Contained per test: the scheduler classifies it as that test failing and
/// carries on with the rest of the run.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("i/o error while provisioning: {0}")]
    Io(#[from] io::Error),

    #[error("project scaffolding failed: {stderr}")]
    Scaffold { stdout: String, stderr: String },
}

/// A fully provisioned, buildable project for one test unit.
///
/// Owns its temporary directory; dropping the value is the best-effort
/// cleanup of the isolated tree.
pub struct TestProject {
    pub name: String,
    pub crate_dir: PathBuf,
    _temp: TempDir,
}

/// Provision an isolated project for `unit` according to its analysis.
pub fn provision(
    config: &HarnessConfig,
    unit: &TestUnit,
    analysis: &DirectiveAnalysis,
) -> Result<TestProject, ProvisionError> {
    let temp = tempfile::Builder::new().prefix("embed-harness-").tempdir()?;
    debug!(
        "({}) initializing test crate in {}",
        unit.name,
        temp.path().display()
    );

    scaffold(config, &unit.name, temp.path())?;
    let crate_dir = temp.path().join(&unit.name);

    fs::copy(&unit.source, crate_dir.join("src").join("main.rs"))?;
    fs::write(crate_dir.join("build.rs"), render_build_script(analysis))?;
    fs::write(
        crate_dir.join("Cargo.toml"),
        render_manifest(&unit.name, &config.library_path, analysis),
    )?;
    seed_cache(config, &unit.name, &crate_dir);

    Ok(TestProject {
        name: unit.name.clone(),
        crate_dir,
        _temp: temp,
    })
}

/// Ask the toolchain for a fresh binary-crate skeleton in `cwd`.
fn scaffold(config: &HarnessConfig, name: &str, cwd: &Path) -> Result<(), ProvisionError> {
    let mut cmd = Command::new(&config.toolchain);
    cmd.arg("new").arg("--bin").arg(name).current_dir(cwd);
    if config.debug {
        cmd.arg("--verbose");
    }

    let output = cmd.output()?;
    if !output.status.success() {
        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        error!("({name}) unable to create a new crate");
        runner::replay_output(name, &stdout, &stderr);
        return Err(ProvisionError::Scaffold { stdout, stderr });
    }
    Ok(())
}

/// Render the build script that compiles the embedded tree into the test
/// program: one embed invocation naming the root, then one exclude clause
/// per ignore pattern.
fn render_build_script(analysis: &DirectiveAnalysis) -> String {
    let mut ignores = String::new();
    for pattern in &analysis.ignores {
        ignores.push_str(&format!("        .ignore(\"{pattern}\")\n"));
    }

    format!(
        r#"extern crate include_dir;

use std::env;
use std::path::Path;
use include_dir::include_dir;

fn main() {{
    let outdir = env::var("OUT_DIR").unwrap();
    let dest_path = Path::new(&outdir).join("assets.rs");

    include_dir("{root}")
        .as_variable("ASSETS")
{ignores}        .to_file(dest_path)
        .unwrap();
}}
"#,
        root = analysis.root.display(),
    )
}

/// Render the project manifest: the embedding library pinned by path (with
/// the feature list omitted entirely when empty) and every accumulated
/// dependency declared at any version.
fn render_manifest(name: &str, library_path: &Path, analysis: &DirectiveAnalysis) -> String {
    let mut manifest = format!(
        r#"[package]
name = "{name}"
version = "0.1.0"
edition = "2021"

[build-dependencies.include_dir]
path = "{path}"
"#,
        path = library_path.display(),
    );

    if !analysis.features.is_empty() {
        let quoted: Vec<String> = analysis
            .features
            .iter()
            .map(|feature| format!("\"{feature}\""))
            .collect();
        manifest.push_str(&format!("features = [{}]\n", quoted.join(", ")));
    }

    manifest.push_str("\n[dependencies]\n");
    for dependency in &analysis.dependencies {
        manifest.push_str(&format!("{dependency} = \"*\"\n"));
    }

    manifest
}

/// Copy the harness's own build cache into the fresh crate. Purely a build
/// speed optimization: any failure is a cache miss, never a test failure.
fn seed_cache(config: &HarnessConfig, name: &str, crate_dir: &Path) {
    debug!(
        "({name}) seeding build cache from {}",
        config.cache_dir.display()
    );
    if let Err(e) = copy_dir_all(&config.cache_dir, &crate_dir.join("target")) {
        debug!("({name}) cache seed skipped: {e}");
    }
}

fn copy_dir_all(src: &Path, dst: &Path) -> io::Result<()> {
    fs::create_dir_all(dst)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let target = dst.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir_all(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}
