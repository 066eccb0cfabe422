//! Diagnostic kinds and their fixed attributes.
//!
//! Every kind maps to exactly one [`KindSpec`] through an exhaustive `match`,
//! so adding a variant without describing it does not compile.

use std::fmt;

use serde::Serialize;

/// Severity level reported to CodeClimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Should be reviewed.
    Minor,
    /// Must be fixed.
    Major,
    /// The schema does not compile.
    Critical,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Minor => "minor",
            Severity::Major => "major",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// CodeClimate issue category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Category {
    Compatibility,
    Style,
    #[serde(rename = "Bug Risk")]
    BugRisk,
}

/// Naming and syntax warnings reported by the lint plugin, plus the
/// compiler's own missing-syntax warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StyleWarning {
    MessageCase,
    FieldCase,
    EnumTypeCase,
    EnumValueCase,
    ServiceCase,
    RpcMethodCase,
    SyntaxUnspecified,
}

/// Errors reported by the schema compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CompilerError {
    FileNotFound,
    ImportUnresolved,
    SymbolNotDefined,
    MissingFieldNumber,
    UnexpectedToken,
    UnexpectedEndOfInput,
}

/// Any classified diagnostic kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DiagnosticKind {
    Style(StyleWarning),
    Compiler(CompilerError),
}

/// Fixed attributes of one diagnostic kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindSpec {
    /// Stable identifier, used in fingerprints and log lines.
    pub name: &'static str,
    /// CodeClimate `check_name`.
    pub check_name: &'static str,
    pub severity: Severity,
    pub categories: &'static [Category],
    /// Description template; see [`crate::issue::render`] for placeholders.
    pub template: &'static str,
    /// CodeClimate remediation points.
    pub remediation: u32,
}

const STYLE: &[Category] = &[Category::Compatibility, Category::Style];
const SYNTAX: &[Category] = &[Category::Compatibility, Category::BugRisk];
const BUG_RISK: &[Category] = &[Category::BugRisk];

impl StyleWarning {
    /// All style warnings, in resolution order.
    pub const ALL: [StyleWarning; 7] = [
        StyleWarning::MessageCase,
        StyleWarning::FieldCase,
        StyleWarning::EnumTypeCase,
        StyleWarning::EnumValueCase,
        StyleWarning::ServiceCase,
        StyleWarning::RpcMethodCase,
        StyleWarning::SyntaxUnspecified,
    ];

    pub const fn spec(self) -> &'static KindSpec {
        match self {
            StyleWarning::MessageCase => &KindSpec {
                name: "message-case",
                check_name: "Style/Message Name Case",
                severity: Severity::Major,
                categories: STYLE,
                template: "Use CamelCase (with an initial capital) for message names.",
                remediation: 50_000,
            },
            StyleWarning::FieldCase => &KindSpec {
                name: "field-case",
                check_name: "Style/Field Name Case",
                severity: Severity::Minor,
                categories: STYLE,
                template: "Use underscore_separated_names for field names.",
                remediation: 50_000,
            },
            StyleWarning::EnumTypeCase => &KindSpec {
                name: "enum-type-case",
                check_name: "Style/Enum Type Case",
                severity: Severity::Major,
                categories: STYLE,
                template: "Use CamelCase (with an initial capital) for enum type names.",
                remediation: 50_000,
            },
            StyleWarning::EnumValueCase => &KindSpec {
                name: "enum-value-case",
                check_name: "Style/Enum Value Case",
                severity: Severity::Minor,
                categories: STYLE,
                template: "Use CAPITALS_WITH_UNDERSCORES for enum value names.",
                remediation: 50_000,
            },
            StyleWarning::ServiceCase => &KindSpec {
                name: "service-case",
                check_name: "Style/Service Name Case",
                severity: Severity::Major,
                categories: STYLE,
                template: "Use CamelCase (with an initial capital) for service names.",
                remediation: 50_000,
            },
            StyleWarning::RpcMethodCase => &KindSpec {
                name: "rpc-method-case",
                check_name: "Style/RPC Method Case",
                severity: Severity::Minor,
                categories: STYLE,
                template: "Use CamelCase (with an initial capital) for RPC method names.",
                remediation: 50_000,
            },
            StyleWarning::SyntaxUnspecified => &KindSpec {
                name: "syntax-unspecified",
                check_name: "Compatibility/Syntax Unspecified",
                severity: Severity::Minor,
                categories: SYNTAX,
                template: "No syntax specified for %file%, defaulting to proto2.",
                remediation: 50_000,
            },
        }
    }

    /// Substring of the lowercased message that identifies this warning.
    pub const fn marker(self) -> &'static str {
        match self {
            StyleWarning::MessageCase => "message names",
            StyleWarning::FieldCase => "field names",
            StyleWarning::EnumTypeCase => "enum type names",
            StyleWarning::EnumValueCase => "enum value names",
            StyleWarning::ServiceCase => "service names",
            StyleWarning::RpcMethodCase => "method names",
            StyleWarning::SyntaxUnspecified => "no syntax specified",
        }
    }
}

impl CompilerError {
    /// All compiler errors, in resolution order.
    pub const ALL: [CompilerError; 6] = [
        CompilerError::FileNotFound,
        CompilerError::ImportUnresolved,
        CompilerError::SymbolNotDefined,
        CompilerError::MissingFieldNumber,
        CompilerError::UnexpectedToken,
        CompilerError::UnexpectedEndOfInput,
    ];

    pub const fn spec(self) -> &'static KindSpec {
        match self {
            CompilerError::FileNotFound => &KindSpec {
                name: "file-not-found",
                check_name: "Bug Risk/File Not Found",
                severity: Severity::Critical,
                categories: BUG_RISK,
                template: "File not found: %file%.",
                remediation: 70_000,
            },
            CompilerError::ImportUnresolved => &KindSpec {
                name: "import-unresolved",
                check_name: "Bug Risk/Import Unresolved",
                severity: Severity::Critical,
                categories: BUG_RISK,
                template: "Import was not found or had errors: %context%.",
                remediation: 70_000,
            },
            CompilerError::SymbolNotDefined => &KindSpec {
                name: "symbol-not-defined",
                check_name: "Bug Risk/Symbol Undefined",
                severity: Severity::Critical,
                categories: BUG_RISK,
                template: "Symbol \"%context%\" was not defined.",
                remediation: 70_000,
            },
            CompilerError::MissingFieldNumber => &KindSpec {
                name: "missing-field-number",
                check_name: "Bug Risk/Missing Field Number",
                severity: Severity::Critical,
                categories: BUG_RISK,
                template: "Missing field number.",
                remediation: 50_000,
            },
            CompilerError::UnexpectedToken => &KindSpec {
                name: "unexpected-token",
                check_name: "Bug Risk/Unexpected Token",
                severity: Severity::Critical,
                categories: BUG_RISK,
                template: "Expected token: \"%context%\".",
                remediation: 50_000,
            },
            CompilerError::UnexpectedEndOfInput => &KindSpec {
                name: "unexpected-end-of-input",
                check_name: "Bug Risk/Unexpected End of Input",
                severity: Severity::Critical,
                categories: BUG_RISK,
                template: "Unexpected end of input, missing '}'.",
                remediation: 50_000,
            },
        }
    }

    /// Substring of the lowercased message that identifies this error.
    pub const fn marker(self) -> &'static str {
        match self {
            CompilerError::FileNotFound => "file not found",
            CompilerError::ImportUnresolved => "was not found or had errors",
            CompilerError::SymbolNotDefined => "is not defined",
            CompilerError::MissingFieldNumber => "missing field number",
            CompilerError::UnexpectedToken => "expected",
            CompilerError::UnexpectedEndOfInput => "reached end of input",
        }
    }
}

impl DiagnosticKind {
    /// Every kind, style warnings first.
    pub fn all() -> impl Iterator<Item = DiagnosticKind> {
        StyleWarning::ALL
            .into_iter()
            .map(DiagnosticKind::Style)
            .chain(CompilerError::ALL.into_iter().map(DiagnosticKind::Compiler))
    }

    pub const fn spec(self) -> &'static KindSpec {
        match self {
            DiagnosticKind::Style(warning) => warning.spec(),
            DiagnosticKind::Compiler(error) => error.spec(),
        }
    }

    pub const fn name(self) -> &'static str {
        self.spec().name
    }

    pub const fn severity(self) -> Severity {
        self.spec().severity
    }

    /// Whether records of this kind are kept out of the issue stream.
    pub const fn is_suppressed(self) -> bool {
        matches!(self, DiagnosticKind::Compiler(CompilerError::FileNotFound))
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which tool produced a diagnostic line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticSource {
    /// A `file:line:column: 'context' - message` line from the lint plugin.
    LintPlugin,
    /// A `file[:line[:column]]: message` error from the compiler.
    Compiler,
    /// A `[libprotobuf WARNING ...] message` line from the compiler.
    CompilerWarning,
}
