//! Run orchestration.

use std::fmt;

use tracing::{debug, error, info, warn};

use crate::classifier::Classifier;
use crate::command::DEFAULT_COMPILER;
use crate::diagnostic::DiagnosticSource;
use crate::issue::ExternalIssue;
use crate::{
    CapturedOutput, CompilerCommand, IssueRecord, LinterConfig, LinterError, PathResolver,
    ToolInvoker,
};

/// Receives every issue that survives suppression, in discovery order.
pub trait IssueSink {
    fn emit(&mut self, record: &IssueRecord, issue: &ExternalIssue<'_>) -> Result<(), LinterError>;
}

impl<F> IssueSink for F
where
    F: FnMut(&IssueRecord, &ExternalIssue<'_>) -> Result<(), LinterError>,
{
    fn emit(&mut self, record: &IssueRecord, issue: &ExternalIssue<'_>) -> Result<(), LinterError> {
        self(record, issue)
    }
}

/// Stages of a single run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    PathsResolved,
    CommandBuilt,
    Invoked,
    Classified,
    CrashedNoOutput,
    Emitted,
    Done,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunPhase::Idle => "idle",
            RunPhase::PathsResolved => "paths resolved",
            RunPhase::CommandBuilt => "command built",
            RunPhase::Invoked => "invoked",
            RunPhase::Classified => "classified",
            RunPhase::CrashedNoOutput => "crashed without output",
            RunPhase::Emitted => "emitted",
            RunPhase::Done => "done",
        };
        f.write_str(name)
    }
}

/// How the plugin's self-reported issue count compares to what was parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciliation {
    /// The counts agree.
    Matched,
    /// The plugin printed no count.
    Unreported,
    /// The counts disagree.
    Mismatch { reported: usize, parsed: usize },
}

/// Compares the plugin's reported count with the number of records parsed
/// from plugin lines. Internal compiler warnings never enter either count.
pub fn reconcile(reported: Option<usize>, parsed: usize) -> Reconciliation {
    match reported {
        None => Reconciliation::Unreported,
        Some(reported) if reported == parsed => Reconciliation::Matched,
        Some(reported) => Reconciliation::Mismatch { reported, parsed },
    }
}

/// Counters for a completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Schema files handed to the compiler.
    pub files: usize,
    /// Records classified from the captured output.
    pub classified: usize,
    /// Records handed to the sink.
    pub emitted: usize,
    /// Records kept out of the issue stream.
    pub suppressed: usize,
    pub reconciliation: Reconciliation,
}

/// Result of [`Linter::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Path resolution found no schema files; the compiler was not run.
    NoFiles,
    /// The compiler ran and its output was classified.
    Completed(RunSummary),
}

/// Drives one lint run over a workspace.
#[derive(Debug, Clone)]
pub struct Linter {
    config: LinterConfig,
    compiler: String,
}

impl Linter {
    pub fn new(config: LinterConfig) -> Self {
        Self {
            config,
            compiler: DEFAULT_COMPILER.to_string(),
        }
    }

    /// Uses `program` as the compiler executable.
    pub fn with_compiler(mut self, program: impl Into<String>) -> Self {
        self.compiler = program.into();
        self
    }

    pub fn config(&self) -> &LinterConfig {
        &self.config
    }

    pub fn compiler(&self) -> &str {
        &self.compiler
    }

    /// Resolves paths, runs the compiler and hands each emitted issue to
    /// `sink`.
    ///
    /// A clean compiler exit means there are no issues. A failed exit with
    /// captured output is how the lint plugin signals that it found some; a
    /// failed exit without output is a crash.
    pub fn run(
        &self,
        invoker: &dyn ToolInvoker,
        sink: &mut dyn IssueSink,
    ) -> Result<RunOutcome, LinterError> {
        let mut phase = RunPhase::Idle;
        debug!("Run phase: {}", phase);

        let paths = PathResolver::new(&self.config).resolve()?;
        advance(&mut phase, RunPhase::PathsResolved);
        if paths.is_empty() {
            info!("No files to analyze. Exiting.");
            return Ok(RunOutcome::NoFiles);
        }

        let command = CompilerCommand::build(&self.compiler, &paths);
        advance(&mut phase, RunPhase::CommandBuilt);

        let output = invoker.invoke(&command)?;
        advance(&mut phase, RunPhase::Invoked);

        let captured = if output.success {
            if !output.is_silent() {
                debug!(
                    "Ignoring {} lines printed by a clean exit",
                    output.lines.len()
                );
            }
            info!("No issues found.");
            CapturedOutput::default()
        } else if output.is_silent() {
            advance(&mut phase, RunPhase::CrashedNoOutput);
            error!("Protoc crashed but we got no output.");
            return Err(LinterError::Crashed {
                program: self.compiler.clone(),
                status: output.status,
            });
        } else {
            CapturedOutput::from_lines(&output.lines)
        };

        let mut classified = 0;
        let mut from_plugin = 0;
        let mut internal_warnings = 0;
        let mut emitted = 0;
        let mut suppressed = 0;

        for record in Classifier::new(&captured.diagnostics) {
            let record = record.inspect_err(|e| {
                debug!(
                    "Classification stopped after {} issues at: {}",
                    classified,
                    e.line()
                )
            })?;
            classified += 1;
            match record.source() {
                DiagnosticSource::LintPlugin => from_plugin += 1,
                DiagnosticSource::CompilerWarning => internal_warnings += 1,
                DiagnosticSource::Compiler => {}
            }

            debug!(
                "Reporting issue: {} (remediation: {})",
                record,
                record.kind().spec().remediation
            );
            match record.to_external_form(&paths)? {
                Some(issue) => {
                    sink.emit(&record, &issue)?;
                    emitted += 1;
                }
                None => {
                    debug!("Suppressed {} for {}", record.kind(), record.file());
                    suppressed += 1;
                }
            }
        }
        advance(&mut phase, RunPhase::Classified);

        let reconciliation = reconcile(captured.reported_count, from_plugin);
        if let Reconciliation::Mismatch { reported, parsed } = reconciliation {
            warn!(
                "Number of reported issues from plugin ({}) does not match number of issues parsed ({}).",
                reported, parsed
            );
        }
        if internal_warnings > 0 {
            debug!(
                "{} internal compiler warnings reported alongside plugin output",
                internal_warnings
            );
        }
        if classified > 0 {
            info!("Reporting {} issues.", emitted);
        }
        advance(&mut phase, RunPhase::Emitted);

        let summary = RunSummary {
            files: paths.files.len(),
            classified,
            emitted,
            suppressed,
            reconciliation,
        };
        advance(&mut phase, RunPhase::Done);
        Ok(RunOutcome::Completed(summary))
    }
}

fn advance(phase: &mut RunPhase, next: RunPhase) {
    debug!("Run phase: {} -> {}", phase, next);
    *phase = next;
}
