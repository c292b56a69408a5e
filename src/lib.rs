#![forbid(unsafe_code)]
//! End-to-end test harness for the directory embedding library.
//!
//! Most of the embedding library's behavior only shows up in generated code,
//! so it is easiest to test from the point of view of an end user. Every test
//! unit in `integration_tests/` is a small program that gets its own
//! disposable cargo project, a generated `build.rs` that embeds a directory
//! tree, and a generated manifest pointing back at the library. The harness
//! compiles and runs each one and fails the whole run if any program exits
//! non-zero.
//!
//! Pipeline per unit: directive analysis ([`directives`]) → isolated project
//! provisioning ([`project`]) → toolchain execution ([`runner`]). The
//! [`harness`] module discovers units and drives them sequentially or over a
//! worker pool; [`cli`] maps the aggregate outcome onto the process exit
//! status.
//!
//! ## Panic Policy
//!
//! Production code propagates errors with `Result`; a failure anywhere inside
//! a test unit's pipeline is classified as that test failing, never as a
//! harness crash. `.expect("INVARIANT: ...")` is reserved for genuine logic
//! errors. Test code may unwrap freely.

pub mod cli;
pub mod config;
pub mod directives;
pub mod harness;
pub mod project;
pub mod runner;

pub use config::HarnessConfig;
pub use directives::DirectiveAnalysis;
pub use harness::{AggregateReport, TestUnit};
pub use project::TestProject;
pub use runner::ExecutionResult;
