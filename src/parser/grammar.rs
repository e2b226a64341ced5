//! Template and expression parsing
//!
//! Parsing happens in two layers. A hand-rolled scanner splits the template
//! source into literal text and `${...}` placeholders, honoring `\$` escapes,
//! nested braces, and quoted strings. Each placeholder body is then lexed with
//! logos and parsed into an [`Expr`] tree with chumsky. All spans are byte
//! ranges into the full template source, so compile errors point at the right
//! spot of the original string.

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;

use crate::error::CompileError;
use crate::parser::ast::*;
use crate::parser::lexer::{self, Token};

/// Parse template source into segments
///
/// This is the compile step: it never evaluates anything, it only builds the
/// segment list a [`crate::Template`] replays per render call.
pub fn parse_template(source: &str) -> Result<Vec<Segment>, CompileError> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut i = 0;

    while i < source.len() {
        let c = source[i..].chars().next().unwrap();
        match c {
            '\\' => match source[i + 1..].chars().next() {
                // \$ and \\ produce the escaped character; any other
                // backslash passes through verbatim
                Some(next @ ('$' | '\\')) => {
                    literal.push(next);
                    i += 1 + next.len_utf8();
                }
                _ => {
                    literal.push('\\');
                    i += 1;
                }
            },
            '$' if source[i + 1..].starts_with('{') => {
                let body_start = i + 2;
                let body_end = find_placeholder_end(source, body_start).ok_or(
                    CompileError::UnterminatedPlaceholder {
                        span: i..source.len(),
                    },
                )?;
                let body = &source[body_start..body_end];
                if body.trim().is_empty() {
                    return Err(CompileError::EmptyPlaceholder {
                        span: i..body_end + 1,
                    });
                }
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Placeholder(parse_expression(body, body_start)?));
                i = body_end + 1;
            }
            _ => {
                literal.push(c);
                i += c.len_utf8();
            }
        }
    }

    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}

/// Find the byte offset of the `}` closing a placeholder body
///
/// Braces nest and quoted strings may contain unbalanced braces, so this
/// tracks both before committing to a terminator.
fn find_placeholder_end(source: &str, start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (offset, c) in source[start..].char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '{' => depth += 1,
            '}' if depth == 0 => return Some(start + offset),
            '}' => depth -= 1,
            _ => {}
        }
    }
    None
}

/// Parse one placeholder body into an expression tree
///
/// `offset` is the byte position of the body within the full template source;
/// every span in the result is shifted by it.
fn parse_expression(body: &str, offset: usize) -> Result<Spanned<Expr>, CompileError> {
    let end = offset + body.len();

    // Create a logos lexer and convert to a token stream in template coordinates
    let token_iter = lexer::lex(body)
        .map(move |(tok, span)| (tok, SimpleSpan::from(span.start + offset..span.end + offset)));

    let token_stream = Stream::from_iter(token_iter)
        // Split (Token, SimpleSpan) into token and span parts
        .map((end..end).into(), |(t, s): (_, _)| (t, s));

    expression_parser()
        .parse(token_stream)
        .into_result()
        .map_err(|mut errs| CompileError::from(errs.remove(0)))
}

/// Helper to extract span range from chumsky's span type
fn span_range(e: &impl chumsky::span::Span<Offset = usize>) -> std::ops::Range<usize> {
    e.start()..e.end()
}

/// Postfix operation collected while folding a member/call/index chain
enum Postfix {
    Member(String, Span),
    Call(Vec<Spanned<Expr>>, Span),
    Index(Spanned<Expr>, Span),
}

fn expression_parser<'a, I>(
) -> impl Parser<'a, I, Spanned<Expr>, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    recursive(|expr| {
        let atom = select! {
            Token::Undefined => Expr::Undefined,
            Token::Null => Expr::Null,
            Token::True => Expr::Bool(true),
            Token::False => Expr::Bool(false),
            Token::Number(n) => Expr::Number(n),
            Token::Str(s) => Expr::Str(s),
            Token::Ident(s) => Expr::Ident(s),
        }
        .map_with(|node, e| Spanned::new(node, span_range(&e.span())))
        .or(expr
            .clone()
            .delimited_by(just(Token::ParenOpen), just(Token::ParenClose)));

        let member = just(Token::Dot)
            .ignore_then(select! { Token::Ident(s) => s })
            .map_with(|name, e| Postfix::Member(name, span_range(&e.span())));

        let call = expr
            .clone()
            .separated_by(just(Token::Comma))
            .collect::<Vec<_>>()
            .delimited_by(just(Token::ParenOpen), just(Token::ParenClose))
            .map_with(|args, e| Postfix::Call(args, span_range(&e.span())));

        let index = expr
            .clone()
            .delimited_by(just(Token::BracketOpen), just(Token::BracketClose))
            .map_with(|idx, e| Postfix::Index(idx, span_range(&e.span())));

        // Member access, calls, and subscripts bind tightest and left-fold
        // onto their base: helpers.lower(name) is ((helpers.lower))(name)
        let postfix = atom.foldl(
            choice((member, call, index)).repeated(),
            |object, op| match op {
                Postfix::Member(property, span) => {
                    let span = object.span.start..span.end;
                    Spanned::new(
                        Expr::Member {
                            object: Box::new(object),
                            property,
                        },
                        span,
                    )
                }
                Postfix::Call(args, span) => {
                    let span = object.span.start..span.end;
                    Spanned::new(
                        Expr::Call {
                            callee: Box::new(object),
                            args,
                        },
                        span,
                    )
                }
                Postfix::Index(idx, span) => {
                    let span = object.span.start..span.end;
                    Spanned::new(
                        Expr::Index {
                            object: Box::new(object),
                            index: Box::new(idx),
                        },
                        span,
                    )
                }
            },
        );

        let additive = postfix.clone().foldl(
            just(Token::Plus).ignore_then(postfix).repeated(),
            |left, right| {
                let span = left.span.start..right.span.end;
                Spanned::new(
                    Expr::Binary {
                        op: BinaryOp::Add,
                        left: Box::new(left),
                        right: Box::new(right),
                    },
                    span,
                )
            },
        );

        let equality_op = choice((
            just(Token::EqEq).to(BinaryOp::Eq),
            just(Token::NotEq).to(BinaryOp::Ne),
        ));
        let equality = additive.clone().foldl(
            equality_op.then(additive).repeated(),
            |left, (op, right)| {
                let span = left.span.start..right.span.end;
                Spanned::new(
                    Expr::Binary {
                        op,
                        left: Box::new(left),
                        right: Box::new(right),
                    },
                    span,
                )
            },
        );

        equality
            .then(
                just(Token::Question)
                    .ignore_then(expr.clone())
                    .then_ignore(just(Token::Colon))
                    .then(expr)
                    .or_not(),
            )
            .map(|(condition, branches)| match branches {
                Some((then_branch, else_branch)) => {
                    let span = condition.span.start..else_branch.span.end;
                    Spanned::new(
                        Expr::Ternary {
                            condition: Box::new(condition),
                            then_branch: Box::new(then_branch),
                            else_branch: Box::new(else_branch),
                        },
                        span,
                    )
                }
                None => condition,
            })
    })
}
