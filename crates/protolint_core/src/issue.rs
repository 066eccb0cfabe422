//! Classified issue records and their CodeClimate representation.

use std::fmt;
use std::path::{Component, Path};

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::diagnostic::{Category, DiagnosticKind, DiagnosticSource, Severity};
use crate::{LinterError, ResolvedPaths};

/// Version tag mixed into every fingerprint.
const FINGERPRINT_VERSION: &str = "v1";

/// Values available to a message template.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub kind: DiagnosticKind,
    pub raw: &'a str,
    pub file: &'a str,
    pub line: u32,
    pub column: u32,
    pub context: Option<&'a str>,
}

/// Populates a message template.
///
/// Recognised placeholders are `%file%`, `%line%`, `%column%`, `%context%`,
/// `%type%` and `%raw%`. A missing context renders as an empty string.
pub fn render(template: &str, values: &RenderContext<'_>) -> String {
    if !template.contains('%') {
        return template.to_string();
    }
    template
        .replace("%file%", values.file)
        .replace("%line%", &values.line.to_string())
        .replace("%column%", &values.column.to_string())
        .replace("%context%", values.context.unwrap_or_default())
        .replace("%type%", values.kind.name())
        .replace("%raw%", values.raw)
}

/// One diagnostic reported by the compiler or the lint plugin.
///
/// Records are immutable once classified. `line` and `column` are 1-based
/// and default to 1 when the tool reported no position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueRecord {
    kind: DiagnosticKind,
    source: DiagnosticSource,
    raw: String,
    message: String,
    file: String,
    line: u32,
    column: u32,
    context: Option<String>,
}

impl IssueRecord {
    /// Creates a record, rendering its message from the kind's template.
    pub fn new(
        kind: DiagnosticKind,
        source: DiagnosticSource,
        raw: impl Into<String>,
        file: impl Into<String>,
        line: u32,
        column: u32,
        context: Option<String>,
    ) -> Self {
        let raw = raw.into();
        let file = file.into();
        let message = render(
            kind.spec().template,
            &RenderContext {
                kind,
                raw: &raw,
                file: &file,
                line,
                column,
                context: context.as_deref(),
            },
        );

        Self {
            kind,
            source,
            raw,
            message,
            file,
            line,
            column,
            context,
        }
    }

    pub fn kind(&self) -> DiagnosticKind {
        self.kind
    }

    pub fn source(&self) -> DiagnosticSource {
        self.source
    }

    /// The line exactly as the tool printed it.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The rendered description.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The file as reported by the tool, relative to a search path.
    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn column(&self) -> u32 {
        self.column
    }

    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    pub fn severity(&self) -> Severity {
        self.kind.severity()
    }

    /// Whether this record is kept out of the issue stream.
    pub fn is_suppressed(&self) -> bool {
        self.kind.is_suppressed()
    }

    /// Deterministic SHA-256 hex digest identifying this issue.
    ///
    /// `file-not-found` carries no reliable position, so line and column are
    /// left out of its digest.
    pub fn fingerprint(&self) -> String {
        let line = self.line.to_string();
        let column = self.column.to_string();
        let context = self.context.as_deref().unwrap_or_default();

        let mut parts: Vec<&str> = vec![
            FINGERPRINT_VERSION,
            self.kind.name(),
            self.message.as_str(),
            self.file.as_str(),
        ];
        if !self.is_suppressed() {
            parts.push(&line);
            parts.push(&column);
        }
        parts.push(context);

        let mut hasher = Sha256::new();
        hasher.update(parts.join("::").as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Workspace-relative path of the file this issue points at.
    ///
    /// Fails when the file was not discovered during path resolution.
    pub fn location_path(&self, paths: &ResolvedPaths) -> Result<String, LinterError> {
        let resolved = paths
            .find(&self.file)
            .ok_or_else(|| LinterError::resolve(&self.file))?;

        let relative = resolved
            .strip_prefix(&paths.workspace_root)
            .unwrap_or(resolved);
        Ok(join_components(relative))
    }

    /// Builds the CodeClimate issue, or `None` when emission is suppressed.
    pub fn to_external_form(
        &self,
        paths: &ResolvedPaths,
    ) -> Result<Option<ExternalIssue<'_>>, LinterError> {
        if self.is_suppressed() {
            return Ok(None);
        }

        let spec = self.kind.spec();
        let position = Position {
            line: self.line,
            column: self.column,
        };

        Ok(Some(ExternalIssue {
            kind: "issue",
            check_name: spec.check_name,
            description: &self.message,
            categories: spec.categories,
            severity: spec.severity,
            fingerprint: self.fingerprint(),
            location: Location {
                path: self.location_path(paths)?,
                positions: Positions {
                    begin: position,
                    end: position,
                },
            },
        }))
    }

    fn format_location(&self) -> String {
        format!("{}:{}:{}", self.file, self.line, self.column)
    }
}

/// Joins normal path components with `/`, dropping any root or prefix.
fn join_components(path: &Path) -> String {
    path.components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

impl fmt::Display for IssueRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.kind {
            DiagnosticKind::Style(_) => "Issue",
            DiagnosticKind::Compiler(_) => "Error",
        };
        write!(f, "{}(location={}, ", label, self.format_location())?;
        if let Some(context) = &self.context {
            write!(f, "context='{}', ", context)?;
        }
        write!(f, "message='{}')", self.message)
    }
}

/// A CodeClimate issue document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExternalIssue<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub check_name: &'static str,
    pub description: &'a str,
    pub categories: &'static [Category],
    pub severity: Severity,
    pub fingerprint: String,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    pub path: String,
    pub positions: Positions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Positions {
    pub begin: Position,
    pub end: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}
