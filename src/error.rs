//! Error type for template compilation

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// Raised when a template body cannot be compiled: a malformed directive,
/// an unterminated block comment or a bad condition expression. Carries the
/// underlying diagnostic so callers can show it to the user; rendering a
/// broken template never panics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("syntax error at line {line}: {message}")]
pub struct SyntaxError {
    /// Byte range of the offending text
    pub span: Span,
    /// 1-based line of the offending text
    pub line: usize,
    /// Diagnostic text from the template parser
    pub message: String,
}

impl SyntaxError {
    pub(crate) fn new(span: Span, line: usize, message: impl Into<String>) -> Self {
        Self {
            span,
            line,
            message: message.into(),
        }
    }

    /// Format the error with source context using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        let mut buf = Vec::new();
        Report::build(ReportKind::Error, filename, self.span.start)
            .with_message(&self.message)
            .with_label(
                Label::new((filename, self.span.clone()))
                    .with_message(&self.message)
                    .with_color(Color::Red),
            )
            .finish()
            .write((filename, Source::from(source)), &mut buf)
            .unwrap();
        String::from_utf8(buf).unwrap()
    }
}
