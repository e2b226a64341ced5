//! Compile-time error types for template parsing

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

use crate::parser::lexer::Token;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// Errors raised while compiling a template source string
///
/// Compilation never executes the template, so everything here is a grammar
/// problem: a placeholder that is never closed, holds nothing, or holds an
/// expression the placeholder grammar rejects.
#[derive(Error, Debug)]
pub enum CompileError {
    #[error("syntax error at {}..{}: {message}", span.start, span.end)]
    Syntax {
        span: Span,
        message: String,
        expected: Vec<String>,
    },

    #[error("unterminated placeholder starting at byte {}", span.start)]
    UnterminatedPlaceholder { span: Span },

    #[error("empty placeholder at byte {}", span.start)]
    EmptyPlaceholder { span: Span },
}

impl CompileError {
    /// The byte range of the offending piece of template source
    pub fn span(&self) -> &Span {
        match self {
            CompileError::Syntax { span, .. }
            | CompileError::UnterminatedPlaceholder { span }
            | CompileError::EmptyPlaceholder { span } => span,
        }
    }

    /// Format the error with source context using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        let (span, message, expected) = match self {
            CompileError::Syntax {
                span,
                message,
                expected,
            } => (span, message.clone(), expected.clone()),
            CompileError::UnterminatedPlaceholder { span } => (
                span,
                "placeholder is never closed".to_string(),
                vec!["'}'".to_string()],
            ),
            CompileError::EmptyPlaceholder { span } => (
                span,
                "placeholder contains no expression".to_string(),
                Vec::new(),
            ),
        };

        let expected_str = if expected.is_empty() {
            String::new()
        } else {
            format!("\nExpected: {}", expected.join(", "))
        };

        let mut buf = Vec::new();
        Report::build(ReportKind::Error, filename, span.start)
            .with_message(&message)
            .with_label(
                Label::new((filename, span.clone()))
                    .with_message(format!("{}{}", message, expected_str))
                    .with_color(Color::Red),
            )
            .finish()
            .write((filename, Source::from(source)), &mut buf)
            .unwrap();
        String::from_utf8(buf).unwrap()
    }
}

impl<'a> From<chumsky::error::Rich<'a, Token>> for CompileError {
    fn from(err: chumsky::error::Rich<'a, Token>) -> Self {
        use chumsky::error::RichReason;

        let message = match err.reason() {
            RichReason::ExpectedFound { found, .. } => {
                let found_str = match found {
                    Some(tok) => format_token(tok),
                    None => "end of placeholder".to_string(),
                };
                format!("Unexpected {}", found_str)
            }
            RichReason::Custom(msg) => msg.to_string(),
        };

        // Format expected tokens nicely
        let expected: Vec<String> = err
            .expected()
            .filter_map(|e| match e {
                chumsky::error::RichPattern::Token(tok) => Some(format_token(tok)),
                chumsky::error::RichPattern::Label(label) => Some(label.to_string()),
                chumsky::error::RichPattern::EndOfInput => Some("end of placeholder".to_string()),
                chumsky::error::RichPattern::Identifier(s) => Some(format!("identifier '{}'", s)),
                chumsky::error::RichPattern::Any => Some("any token".to_string()),
                chumsky::error::RichPattern::SomethingElse => None, // Skip "something else"
            })
            .collect();

        CompileError::Syntax {
            span: err.span().into_range(),
            message,
            expected,
        }
    }
}

/// Format a token for human-readable error messages
fn format_token(tok: &Token) -> String {
    match tok {
        Token::Ident(s) => format!("identifier '{}'", s),
        Token::Str(s) => format!("string \"{}\"", s),
        Token::Number(n) => format!("number {}", n),
        Token::True | Token::False | Token::Null | Token::Undefined => {
            format!("keyword '{}'", tok)
        }
        other => format!("'{}'", other),
    }
}
