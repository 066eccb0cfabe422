//! Compiler invocation and output capture.

use std::process::{Command, Output};

use tracing::debug;

use crate::{CompilerCommand, LinterError};

/// Status line the lint plugin prints when it reports issues, e.g.
/// `--lint_out: protoc-gen-lint: Plugin failed with status code 3.`
pub const PLUGIN_FAILED_MARKER: &str = "--lint_out: protoc-gen-lint: Plugin failed";

/// Everything a finished tool invocation printed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    /// Whether the tool exited cleanly.
    pub success: bool,
    /// Human-readable exit status.
    pub status: String,
    /// Captured lines, stdout first and then stderr. The two streams are
    /// concatenated, not interleaved, so the order is not temporal.
    pub lines: Vec<String>,
}

impl ToolOutput {
    /// Builds a `ToolOutput` from a finished process.
    pub fn from_output(output: &Output) -> Self {
        let mut lines: Vec<String> = String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::to_string)
            .collect();
        lines.extend(
            String::from_utf8_lossy(&output.stderr)
                .lines()
                .map(str::to_string),
        );

        Self {
            success: output.status.success(),
            status: output.status.to_string(),
            lines,
        }
    }

    /// Returns `true` when no non-blank line was captured.
    pub fn is_silent(&self) -> bool {
        self.lines.iter().all(|line| line.trim().is_empty())
    }
}

/// Runs a compiler command.
///
/// The run orchestrator only talks to the outside world through this trait.
pub trait ToolInvoker {
    fn invoke(&self, command: &CompilerCommand) -> Result<ToolOutput, LinterError>;
}

/// Invokes the compiler as a child process and blocks until it exits.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessInvoker;

impl ToolInvoker for ProcessInvoker {
    fn invoke(&self, command: &CompilerCommand) -> Result<ToolOutput, LinterError> {
        debug!("Running: {}", command);
        let output = Command::new(command.program())
            .args(command.args())
            .output()
            .map_err(|source| LinterError::Process {
                program: command.program().to_string(),
                source,
            })?;

        let output = ToolOutput::from_output(&output);
        debug!(
            "`{}` exited with {} ({} lines captured)",
            command.program(),
            output.status,
            output.lines.len()
        );
        Ok(output)
    }
}

/// Tool output split into diagnostics and the plugin's own status report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedOutput {
    /// Non-empty lines due to be classified, in capture order.
    pub diagnostics: Vec<String>,
    /// Issue count the plugin reported in its failure status line.
    pub reported_count: Option<usize>,
}

impl CapturedOutput {
    /// Separates the plugin status line from the diagnostic lines.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut captured = Self::default();
        for line in lines {
            let line = line.as_ref();
            if line.trim().is_empty() {
                continue;
            }
            if line.contains(PLUGIN_FAILED_MARKER) {
                captured.reported_count = parse_reported_count(line);
            } else {
                captured.diagnostics.push(line.to_string());
            }
        }
        captured
    }
}

/// Reads the trailing integer from the plugin status line.
fn parse_reported_count(line: &str) -> Option<usize> {
    line.split_whitespace()
        .last()
        .map(|token| token.replace('.', ""))
        .and_then(|token| token.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_captured_output_splits_status_line() {
        let captured = CapturedOutput::from_lines([
            "A.proto:19:9: 'lameTitle' - Use CamelCase (with an initial capital) for message names.",
            "",
            "A.proto:25:10: 'camelField' - Use underscore_separated_names for field names.",
            "--lint_out: protoc-gen-lint: Plugin failed with status code 2.",
        ]);

        assert_eq!(captured.diagnostics.len(), 2);
        assert_eq!(captured.reported_count, Some(2));
    }

    #[test]
    fn test_unparsable_count_is_ignored() {
        let captured = CapturedOutput::from_lines([
            "--lint_out: protoc-gen-lint: Plugin failed with status code unknown.",
        ]);

        assert!(captured.diagnostics.is_empty());
        assert_eq!(captured.reported_count, None);
    }

    #[test]
    fn test_no_status_line() {
        let captured = CapturedOutput::from_lines(["base/TestMessage.proto: File not found."]);

        assert_eq!(captured.diagnostics, ["base/TestMessage.proto: File not found."]);
        assert_eq!(captured.reported_count, None);
    }

    #[test]
    fn test_tool_output_silence() {
        let silent = ToolOutput {
            success: false,
            status: "exit status: 1".to_string(),
            lines: vec![String::new(), "  ".to_string()],
        };
        assert!(silent.is_silent());

        let chatty = ToolOutput {
            lines: vec!["something".to_string()],
            ..silent
        };
        assert!(!chatty.is_silent());
    }

    #[cfg(unix)]
    #[test]
    fn test_process_invoker_captures_both_streams() {
        let command =
            CompilerCommand::with_args("sh", ["-c", "echo out; echo err 1>&2; exit 3"]);

        let output = ProcessInvoker.invoke(&command).unwrap();
        assert!(!output.success);
        assert_eq!(output.lines, ["out", "err"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_process_invoker_puts_stdout_before_stderr() {
        let command = CompilerCommand::with_args("sh", ["-c", "echo err 1>&2; echo out"]);

        let output = ProcessInvoker.invoke(&command).unwrap();
        assert!(output.success);
        assert_eq!(output.lines, ["out", "err"]);
    }

    #[test]
    fn test_process_invoker_missing_binary() {
        let command = CompilerCommand::with_args("protolint-no-such-compiler", ["--version"]);

        let err = ProcessInvoker.invoke(&command).unwrap_err();
        assert!(matches!(err, LinterError::Process { .. }));
    }
}
