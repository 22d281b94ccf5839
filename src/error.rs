//! Error types for template source validation

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SourceError {
    #[error("Source error at {span:?}: {message}")]
    Syntax {
        span: Span,
        message: String,
        expected: Vec<String>,
    },
}

impl SourceError {
    /// Create a syntax error with no expectation list
    pub fn syntax(span: Span, message: impl Into<String>) -> Self {
        Self::Syntax {
            span,
            message: message.into(),
            expected: Vec::new(),
        }
    }

    /// Create a syntax error naming what was expected instead
    pub fn expected(span: Span, message: impl Into<String>, expected: &[&str]) -> Self {
        Self::Syntax {
            span,
            message: message.into(),
            expected: expected.iter().map(|e| e.to_string()).collect(),
        }
    }

    /// Byte range the error points at
    pub fn span(&self) -> &Span {
        match self {
            SourceError::Syntax { span, .. } => span,
        }
    }

    /// Format the error with source context using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        let mut buf = Vec::new();
        match self {
            SourceError::Syntax {
                span,
                message,
                expected,
            } => {
                let expected_str = if expected.is_empty() {
                    String::new()
                } else {
                    format!("\nExpected: {}", expected.join(", "))
                };

                let written = Report::build(ReportKind::Error, filename, span.start)
                    .with_message(message)
                    .with_label(
                        Label::new((filename, span.clone()))
                            .with_message(format!("{}{}", message, expected_str))
                            .with_color(Color::Red),
                    )
                    .finish()
                    .write((filename, Source::from(source)), &mut buf);
                if written.is_err() {
                    return self.to_string();
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_message() {
        let err = SourceError::syntax(4..5, "unexpected character '`'");
        assert!(err.to_string().contains("unexpected character"));
        assert_eq!(err.span(), &(4..5));
    }

    #[test]
    fn test_format_mentions_filename_and_expectation() {
        let source = "package main\n\nfunc f() {\n";
        let err = SourceError::expected(23..24, "unclosed '{'", &["'}'"]);
        let report = err.format(source, "queue.go");
        assert!(report.contains("queue.go"));
        assert!(report.contains("unclosed '{'"));
        assert!(report.contains("Expected: '}'"));
    }
}
