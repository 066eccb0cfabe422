//! Classification of raw compiler and plugin output lines.
//!
//! Each line is tried against three shapes, in order:
//!
//! 1. a lint plugin style issue, `file:line:column: 'context' - message`
//! 2. a compiler error, `file[:line[:column]]: message`
//! 3. an internal compiler warning, `[libprotobuf WARNING ...] message`
//!
//! Every shape test is a pure function returning `Ok(None)` when the line does
//! not have that shape, and an error when it does but cannot be parsed. A line
//! no shape accepts is an error too: unknown output means the upstream tools
//! changed format and must not be dropped silently.

use std::iter::FusedIterator;

use tracing::debug;

use crate::diagnostic::{CompilerError, DiagnosticKind, DiagnosticSource, StyleWarning};
use crate::{ClassifyError, IssueRecord};

/// Substring identifying the compiler's own warning lines.
pub const INTERNAL_WARNING_MARKER: &str = "[libprotobuf WARNING";

const STYLE_DELIMITER: &str = " - ";
const COMPILER_DELIMITER: &str = ": ";
const PROTO_SUFFIX: &str = ".proto";

/// Classifies a single non-empty line.
pub fn classify_line(line: &str) -> Result<IssueRecord, ClassifyError> {
    if let Some(record) = parse_style_issue(line)? {
        return Ok(record);
    }
    if let Some(record) = parse_compiler_error(line)? {
        return Ok(record);
    }
    if let Some(record) = parse_internal_warning(line)? {
        return Ok(record);
    }
    Err(ClassifyError::UnrecognizedOutput {
        line: line.to_string(),
    })
}

/// Returns `true` for internal compiler warning lines.
pub fn is_internal_warning(line: &str) -> bool {
    line.contains(INTERNAL_WARNING_MARKER)
}

/// Parses a style issue printed by the lint plugin.
pub fn parse_style_issue(line: &str) -> Result<Option<IssueRecord>, ClassifyError> {
    if is_internal_warning(line) {
        return Ok(None);
    }
    let mut parts = line.split(STYLE_DELIMITER);
    let (Some(head), Some(message), None) = (parts.next(), parts.next(), parts.next()) else {
        return Ok(None);
    };

    let (locator, remainder) = head.split_once(' ').unwrap_or((head, ""));
    let context = remainder
        .trim()
        .trim_matches(|c: char| c == '\'' || c == '"')
        .to_string();

    let Some(file_end) = locator.find(PROTO_SUFFIX).map(|at| at + PROTO_SUFFIX.len()) else {
        return Err(ClassifyError::MissingFileName {
            line: line.to_string(),
        });
    };
    let (file, position) = locator.split_at(file_end);

    // position is ":line:column:", so the numbers sit at fixed indices
    let position: Vec<&str> = position.split(':').collect();
    let line_number = parse_position(position.get(1).copied(), line)?;
    let column = parse_position(position.get(2).copied(), line)?;
    let warning = resolve_style_kind(message, line)?;

    Ok(Some(IssueRecord::new(
        DiagnosticKind::Style(warning),
        DiagnosticSource::LintPlugin,
        line,
        file,
        line_number,
        column,
        (!context.is_empty()).then_some(context),
    )))
}

/// Parses an error printed by the compiler.
///
/// Lines with the right shape but an unknown message yield `Ok(None)`, so the
/// remaining shape tests still get a chance.
pub fn parse_compiler_error(line: &str) -> Result<Option<IssueRecord>, ClassifyError> {
    let mut parts = line.split(COMPILER_DELIMITER);
    let (Some(locator), Some(message), None) = (parts.next(), parts.next(), parts.next()) else {
        return Ok(None);
    };
    let message = message.trim();

    let Some(error) = resolve_error_kind(message) else {
        return Ok(None);
    };
    let context = extract_context(error, message, line)?;

    let mut locator = locator.trim().splitn(3, ':');
    let file = locator.next().unwrap_or_default().trim();
    let line_number = match locator.next() {
        Some(value) => parse_position(Some(value), line)?,
        None => 1,
    };
    let column = match locator.next() {
        Some(value) => parse_position(Some(value), line)?,
        None => 1,
    };

    Ok(Some(IssueRecord::new(
        DiagnosticKind::Compiler(error),
        DiagnosticSource::Compiler,
        line,
        file,
        line_number,
        column,
        context,
    )))
}

/// Parses one of the compiler's internal warnings.
///
/// These carry no position, so line and column default to 1.
pub fn parse_internal_warning(line: &str) -> Result<Option<IssueRecord>, ClassifyError> {
    if !is_internal_warning(line) {
        return Ok(None);
    }
    let mut parts = line.split(']');
    let (Some(_), Some(message), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(ClassifyError::MalformedInternalWarning {
            line: line.to_string(),
        });
    };
    let message = message.trim();

    let Some(file) = message
        .split_whitespace()
        .find(|token| token.contains(PROTO_SUFFIX))
        .map(|token| token.strip_suffix('.').unwrap_or(token))
    else {
        return Err(ClassifyError::MissingFileName {
            line: line.to_string(),
        });
    };
    let warning = resolve_style_kind(message, line)?;

    Ok(Some(IssueRecord::new(
        DiagnosticKind::Style(warning),
        DiagnosticSource::CompilerWarning,
        line,
        file,
        1,
        1,
        None,
    )))
}

/// Resolves a style message to its warning kind. First match wins.
pub fn resolve_style_kind(message: &str, line: &str) -> Result<StyleWarning, ClassifyError> {
    let message = message.to_lowercase();
    StyleWarning::ALL
        .into_iter()
        .find(|warning| message.contains(warning.marker()))
        .ok_or_else(|| ClassifyError::UnknownStyleMessage {
            line: line.to_string(),
        })
}

/// Resolves a compiler message to its error kind. First match wins.
pub fn resolve_error_kind(message: &str) -> Option<CompilerError> {
    let message = message.to_lowercase();
    CompilerError::ALL
        .into_iter()
        .find(|error| message.contains(error.marker()))
}

/// Extracts the context a compiler error carries in its message.
pub fn extract_context(
    error: CompilerError,
    message: &str,
    line: &str,
) -> Result<Option<String>, ClassifyError> {
    let context = match error {
        CompilerError::FileNotFound
        | CompilerError::UnexpectedEndOfInput
        | CompilerError::MissingFieldNumber => return Ok(None),
        CompilerError::ImportUnresolved => {
            first_quoted(message).filter(|quoted| quoted.contains(PROTO_SUFFIX))
        }
        CompilerError::UnexpectedToken | CompilerError::SymbolNotDefined => first_quoted(message),
    };

    match context {
        Some(context) => Ok(Some(context.to_string())),
        None => Err(ClassifyError::MissingContext {
            kind: error.spec().name,
            line: line.to_string(),
        }),
    }
}

/// Text between the first pair of double quotes.
fn first_quoted(message: &str) -> Option<&str> {
    let (_, rest) = message.split_once('"')?;
    let (quoted, _) = rest.split_once('"')?;
    Some(quoted)
}

fn parse_position(value: Option<&str>, line: &str) -> Result<u32, ClassifyError> {
    let value = value.unwrap_or_default().trim();
    match value.parse::<u32>() {
        Ok(position) if position > 0 => Ok(position),
        _ => Err(ClassifyError::InvalidPosition {
            value: value.to_string(),
            line: line.to_string(),
        }),
    }
}

/// Lazily classifies captured output lines.
///
/// Blank lines are skipped. The iterator stops after yielding the first
/// error.
#[derive(Debug)]
pub struct Classifier<I> {
    lines: I,
    failed: bool,
}

impl<I> Classifier<I> {
    pub fn new<T>(lines: T) -> Self
    where
        T: IntoIterator<IntoIter = I>,
    {
        Self {
            lines: lines.into_iter(),
            failed: false,
        }
    }
}

impl<I, S> Iterator for Classifier<I>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    type Item = Result<IssueRecord, ClassifyError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let line = self.lines.by_ref().find(|line| !line.as_ref().trim().is_empty())?;

        let result = classify_line(line.as_ref());
        match &result {
            Ok(record) => debug!("Classified {} as {}", record.file(), record.kind()),
            Err(_) => self.failed = true,
        }
        Some(result)
    }
}

impl<I, S> FusedIterator for Classifier<I>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    const MESSAGE_CASE_LINE: &str = "TestMessageProto3.proto:19:9: 'sampleLameMessageTitle' - Use CamelCase (with an initial capital) for message names.";
    const IMPORT_LINE: &str = "invalid_import/sample/Sample.proto: Import \"base/TestMessage.proto\" was not found or had errors.";
    const NOT_DEFINED_LINE: &str =
        "invalid_import/sample/Sample.proto:13:3: \"testMessage\" is not defined.";
    const SYNTAX_WARNING_LINE: &str = "[libprotobuf WARNING google/protobuf/compiler/parser.cc:562] No syntax specified for the proto file: TestMessage.proto. Please use 'syntax = \"proto2\";' or 'syntax = \"proto3\";' to specify a syntax version. (Defaulted to proto2 syntax.)";

    #[test]
    fn test_style_issue() {
        let record = classify_line(MESSAGE_CASE_LINE).unwrap();

        assert_eq!(
            record.kind(),
            DiagnosticKind::Style(StyleWarning::MessageCase)
        );
        assert_eq!(record.source(), DiagnosticSource::LintPlugin);
        assert_eq!(record.file(), "TestMessageProto3.proto");
        assert_eq!(record.line(), 19);
        assert_eq!(record.column(), 9);
        assert_eq!(record.context(), Some("sampleLameMessageTitle"));
        assert_eq!(record.raw(), MESSAGE_CASE_LINE);
        assert_eq!(
            record.message(),
            "Use CamelCase (with an initial capital) for message names."
        );
    }

    #[rstest]
    #[case::message("Use CamelCase (with an initial capital) for message names.", StyleWarning::MessageCase)]
    #[case::field("Use underscore_separated_names for field names.", StyleWarning::FieldCase)]
    #[case::enum_type("Use CamelCase (with an initial capital) for enum type names.", StyleWarning::EnumTypeCase)]
    #[case::enum_value("Use CAPITALS_WITH_UNDERSCORES  for enum value names.", StyleWarning::EnumValueCase)]
    #[case::service("Use CamelCase (with an initial capital) for service names.", StyleWarning::ServiceCase)]
    #[case::rpc_method("Use CamelCase (with an initial capital) for RPC method names.", StyleWarning::RpcMethodCase)]
    #[case::syntax("No syntax specified for the proto file: A.proto.", StyleWarning::SyntaxUnspecified)]
    fn test_resolve_style_kind(#[case] message: &str, #[case] expected: StyleWarning) {
        assert_eq!(resolve_style_kind(message, message).unwrap(), expected);
    }

    #[test]
    fn test_unknown_style_message_fails() {
        let line = "A.proto:1:1: 'x' - Use something new for widget names.";
        assert_eq!(
            classify_line(line).unwrap_err(),
            ClassifyError::UnknownStyleMessage {
                line: line.to_string()
            }
        );
    }

    #[rstest]
    #[case::file_not_found("File not found.", Some(CompilerError::FileNotFound))]
    #[case::import("Import \"a.proto\" was not found or had errors.", Some(CompilerError::ImportUnresolved))]
    #[case::not_defined("\"Foo\" is not defined.", Some(CompilerError::SymbolNotDefined))]
    #[case::field_number("Missing field number.", Some(CompilerError::MissingFieldNumber))]
    #[case::token("Expected \";\".", Some(CompilerError::UnexpectedToken))]
    #[case::end_of_input("Reached end of input in message definition (missing '}').", Some(CompilerError::UnexpectedEndOfInput))]
    // "file not found" outranks "expected"
    #[case::priority("Expected file not found.", Some(CompilerError::FileNotFound))]
    #[case::unknown("Something else went wrong.", None)]
    fn test_resolve_error_kind(#[case] message: &str, #[case] expected: Option<CompilerError>) {
        assert_eq!(resolve_error_kind(message), expected);
    }

    #[rstest]
    #[case::import(IMPORT_LINE, CompilerError::ImportUnresolved, "invalid_import/sample/Sample.proto", 1, 1, Some("base/TestMessage.proto"))]
    #[case::not_defined(NOT_DEFINED_LINE, CompilerError::SymbolNotDefined, "invalid_import/sample/Sample.proto", 13, 3, Some("testMessage"))]
    #[case::field_number("set2/TestMessage2Proto2.proto:10:37: Missing field number.", CompilerError::MissingFieldNumber, "set2/TestMessage2Proto2.proto", 10, 37, None)]
    #[case::token("TotallyBorked.proto:9:3: Expected \";\".", CompilerError::UnexpectedToken, "TotallyBorked.proto", 9, 3, Some(";"))]
    #[case::end_of_input("TotallyBorked.proto:10:1: Reached end of input in message definition (missing '}').", CompilerError::UnexpectedEndOfInput, "TotallyBorked.proto", 10, 1, None)]
    #[case::file_not_found("base/TestMessage.proto: File not found.", CompilerError::FileNotFound, "base/TestMessage.proto", 1, 1, None)]
    #[case::line_only("A.proto:7: Missing field number.", CompilerError::MissingFieldNumber, "A.proto", 7, 1, None)]
    fn test_compiler_errors(
        #[case] line: &str,
        #[case] expected: CompilerError,
        #[case] file: &str,
        #[case] line_number: u32,
        #[case] column: u32,
        #[case] context: Option<&str>,
    ) {
        let record = classify_line(line).unwrap();

        assert_eq!(record.kind(), DiagnosticKind::Compiler(expected));
        assert_eq!(record.source(), DiagnosticSource::Compiler);
        assert_eq!(record.file(), file);
        assert_eq!(record.line(), line_number);
        assert_eq!(record.column(), column);
        assert_eq!(record.context(), context);
    }

    #[test]
    fn test_import_message_rendering() {
        let record = classify_line(IMPORT_LINE).unwrap();
        assert_eq!(
            record.message(),
            "Import was not found or had errors: base/TestMessage.proto."
        );
    }

    #[test]
    fn test_internal_warning() {
        let record = classify_line(SYNTAX_WARNING_LINE).unwrap();

        assert_eq!(
            record.kind(),
            DiagnosticKind::Style(StyleWarning::SyntaxUnspecified)
        );
        assert_eq!(record.source(), DiagnosticSource::CompilerWarning);
        assert_eq!(record.file(), "TestMessage.proto");
        assert_eq!((record.line(), record.column()), (1, 1));
        assert_eq!(record.context(), None);
        assert_eq!(
            record.message(),
            "No syntax specified for TestMessage.proto, defaulting to proto2."
        );
    }

    #[test]
    fn test_internal_warning_is_not_a_style_issue() {
        let line = "[libprotobuf WARNING parser.cc:1] No syntax specified - for the proto file: A.proto.";
        assert_eq!(parse_style_issue(line).unwrap(), None);
    }

    #[test]
    fn test_internal_warning_without_file_fails() {
        let line = "[libprotobuf WARNING parser.cc:562] No syntax specified anywhere.";
        assert_eq!(
            classify_line(line).unwrap_err(),
            ClassifyError::MissingFileName {
                line: line.to_string()
            }
        );
    }

    #[test]
    fn test_malformed_internal_warning_fails() {
        let line = "[libprotobuf WARNING parser.cc:562] No syntax ] specified for A.proto.";
        assert_eq!(
            classify_line(line).unwrap_err(),
            ClassifyError::MalformedInternalWarning {
                line: line.to_string()
            }
        );
    }

    #[rstest]
    #[case::import_without_quotes("a.proto: Import base/B.proto was not found or had errors.", "import-unresolved")]
    #[case::import_not_a_proto("a.proto: Import \"base\" was not found or had errors.", "import-unresolved")]
    #[case::token_without_quotes("a.proto:1:2: Expected identifier.", "unexpected-token")]
    #[case::symbol_without_quotes("a.proto:1:2: testMessage is not defined.", "symbol-not-defined")]
    fn test_missing_context_fails(#[case] line: &str, #[case] kind: &'static str) {
        assert_eq!(
            classify_line(line).unwrap_err(),
            ClassifyError::MissingContext {
                kind,
                line: line.to_string(),
            }
        );
    }

    #[rstest]
    #[case::zero_line("A.proto:0:3: 'x' - Use underscore_separated_names for field names.", "0")]
    #[case::no_column("A.proto:3: 'x' - Use underscore_separated_names for field names.", "")]
    #[case::compiler_text_line("A.proto:abc:3: Missing field number.", "abc")]
    fn test_invalid_positions(#[case] line: &str, #[case] value: &str) {
        assert_eq!(
            classify_line(line).unwrap_err(),
            ClassifyError::InvalidPosition {
                value: value.to_string(),
                line: line.to_string()
            }
        );
    }

    #[rstest]
    #[case::prose("protoc is thinking really hard")]
    #[case::unknown_compiler_message("A.proto:1:1: Something unheard of happened.")]
    #[case::too_many_delimiters("A.proto:1:1: Expected \";\": got \"}\".")]
    fn test_unrecognized_output(#[case] line: &str) {
        assert_eq!(
            classify_line(line).unwrap_err(),
            ClassifyError::UnrecognizedOutput {
                line: line.to_string()
            }
        );
    }

    #[test]
    fn test_classifier_preserves_order_and_skips_blanks() {
        let lines = [
            MESSAGE_CASE_LINE,
            "",
            "   ",
            NOT_DEFINED_LINE,
            SYNTAX_WARNING_LINE,
        ];

        let kinds: Vec<_> = Classifier::new(lines)
            .map(|result| result.unwrap().kind())
            .collect();

        assert_eq!(
            kinds,
            [
                DiagnosticKind::Style(StyleWarning::MessageCase),
                DiagnosticKind::Compiler(CompilerError::SymbolNotDefined),
                DiagnosticKind::Style(StyleWarning::SyntaxUnspecified),
            ]
        );
    }

    #[test]
    fn test_classifier_stops_after_first_error() {
        let lines = vec![
            MESSAGE_CASE_LINE.to_string(),
            "garbage".to_string(),
            NOT_DEFINED_LINE.to_string(),
        ];
        let mut classifier = Classifier::new(lines);

        assert!(classifier.next().unwrap().is_ok());
        assert!(classifier.next().unwrap().is_err());
        assert!(classifier.next().is_none());
        assert!(classifier.next().is_none());
    }

    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_style_line_recovery(
            file in "[A-Za-z][A-Za-z0-9_]{0,8}(/[A-Za-z0-9_]{1,8}){0,2}",
            line_number in 1u32..100_000,
            column in 1u32..1_000,
            context in "[A-Za-z_][A-Za-z0-9_]{0,20}",
            warning in prop::sample::select(StyleWarning::ALL[..6].to_vec()),
        ) {
            let file = format!("{}.proto", file);
            let line = format!(
                "{}:{}:{}: '{}' - {}",
                file, line_number, column, context, warning.spec().template
            );

            let record = classify_line(&line).unwrap();
            prop_assert_eq!(record.kind(), DiagnosticKind::Style(warning));
            prop_assert_eq!(record.file(), file.as_str());
            prop_assert_eq!(record.line(), line_number);
            prop_assert_eq!(record.column(), column);
            prop_assert_eq!(record.context(), Some(context.as_str()));
        }
    }
}
