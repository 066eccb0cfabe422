//! # protolint_core
//!
//! Core engine for the protolint CodeClimate engine.
//!
//! This crate provides:
//! - Configuration loading
//! - Include path resolution and `.proto` discovery
//! - Compiler command construction and invocation
//! - Classification of compiler and lint plugin output into issues
//! - The `Linter` run orchestrator
//!
//! ## Example
//!
//! ```rust,ignore
//! use protolint_core::{ExternalIssue, IssueRecord, Linter, LinterConfig, LinterError, ProcessInvoker};
//!
//! let config = LinterConfig::from_file("/config.json", "/code")?;
//! let linter = Linter::new(config);
//!
//! let mut sink = |record: &IssueRecord, issue: &ExternalIssue<'_>| -> Result<(), LinterError> {
//!     println!("{} -> {}", record, issue.fingerprint);
//!     Ok(())
//! };
//! linter.run(&ProcessInvoker, &mut sink)?;
//! ```

pub mod classifier;
mod command;
mod config;
pub mod diagnostic;
mod error;
mod invoke;
pub mod issue;
mod linter;
mod path_resolver;

pub use classifier::{Classifier, classify_line};
pub use command::{CompilerCommand, DEFAULT_COMPILER, LINT_OUT_FLAG};
pub use config::{EngineConfig, LinterConfig};
pub use diagnostic::{
    Category, CompilerError, DiagnosticKind, DiagnosticSource, KindSpec, Severity, StyleWarning,
};
pub use error::{ClassifyError, LinterError};
pub use invoke::{CapturedOutput, PLUGIN_FAILED_MARKER, ProcessInvoker, ToolInvoker, ToolOutput};
pub use issue::{ExternalIssue, IssueRecord, render};
pub use linter::{
    IssueSink, Linter, Reconciliation, RunOutcome, RunPhase, RunSummary, reconcile,
};
pub use path_resolver::{PROTO_EXTENSION, PathResolver, ResolvedPaths};
