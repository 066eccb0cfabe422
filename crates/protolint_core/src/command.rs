//! Compiler command line construction.

use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;

use crate::ResolvedPaths;

/// Compiler executable used when none is configured.
pub const DEFAULT_COMPILER: &str = "protoc";

/// Output directive that routes the compiler through the lint plugin.
pub const LINT_OUT_FLAG: &str = "--lint_out=/.linter";

/// A fully-assembled compiler invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerCommand {
    program: String,
    args: Vec<String>,
}

impl CompilerCommand {
    /// Builds the invocation for `resolved`.
    ///
    /// Arguments are one `--proto_path` per include directory, then every
    /// discovered file once, then [`LINT_OUT_FLAG`].
    pub fn build(program: impl Into<String>, resolved: &ResolvedPaths) -> Self {
        let mut args: Vec<String> = resolved
            .include_dirs
            .iter()
            .map(|dir| format!("--proto_path={}", dir.display()))
            .collect();

        let mut seen: HashSet<&PathBuf> = HashSet::new();
        args.extend(
            resolved
                .files
                .iter()
                .filter(|file| seen.insert(*file))
                .map(|file| file.display().to_string()),
        );

        args.push(LINT_OUT_FLAG.to_string());

        Self {
            program: program.into(),
            args,
        }
    }

    /// Wraps an explicit argument list.
    #[cfg(test)]
    pub(crate) fn with_args<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// The executable to run.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments passed to the executable, in order.
    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl fmt::Display for CompilerCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}
