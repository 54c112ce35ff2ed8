//! Template structure parser
//!
//! Block comments are removed first, then the source is processed line by
//! line: comment lines are dropped, `%` lines are lexed with logos and
//! parsed with chumsky into directives, everything else becomes literal
//! text with `${ name }` placeholders. Directives are assembled into a
//! nested conditional tree.
//!
//! Comment removal shifts byte positions, so every position is mapped back
//! through the removed ranges before it reaches a [`SyntaxError`]: spans
//! and line numbers always point into the template as the user wrote it.

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;

use crate::error::{Span, SyntaxError};
use crate::parser::ast::{Branch, Condition, Conditional, Directive, Node, Segment, TemplateAst};
use crate::parser::config::SyntaxConfig;
use crate::parser::discover::PLACEHOLDER;
use crate::parser::lexer::{self, Token};

/// Parse template source into a renderable tree
pub fn parse_template(source: &str, syntax: &SyntaxConfig) -> Result<TemplateAst, SyntaxError> {
    let stripped = strip_block_comments(source, syntax)?;

    let mut builder = AstBuilder::default();
    let mut offset = 0usize;

    for raw_line in stripped.text.split('\n') {
        let trimmed = raw_line.trim_start();
        let indent = raw_line.len() - trimmed.len();

        if trimmed.starts_with(&syntax.line_comment) {
            // comment lines vanish without leaving an output line
        } else if let Some(rest) = trimmed.strip_prefix("%%") {
            // escaped control character, emits a literal line starting with '%'
            let mut text = String::with_capacity(raw_line.len() - 1);
            text.push_str(&raw_line[..indent]);
            text.push('%');
            text.push_str(rest);
            builder.push_text(split_segments(&text));
        } else if let Some(rest) = trimmed.strip_prefix('%') {
            let span = offset + indent..offset + raw_line.len();
            let directive = parse_directive(rest, offset + indent + 1)
                .map_err(|diagnostic| diagnostic.into_syntax_error(source, &stripped))?;
            builder
                .apply(directive, span)
                .map_err(|diagnostic| diagnostic.into_syntax_error(source, &stripped))?;
        } else {
            builder.push_text(split_segments(raw_line));
        }

        offset += raw_line.len() + 1;
    }

    builder
        .finish()
        .map_err(|diagnostic| diagnostic.into_syntax_error(source, &stripped))
}

/// Template text with the block comments cut out, plus the bookkeeping
/// needed to map positions back to the text as the user wrote it.
struct Stripped {
    text: String,
    /// (offset in `text`, total bytes removed before that offset)
    cuts: Vec<(usize, usize)>,
}

impl Stripped {
    fn map_offset(&self, offset: usize) -> usize {
        let removed = self
            .cuts
            .iter()
            .take_while(|(at, _)| *at <= offset)
            .last()
            .map(|(_, removed)| *removed)
            .unwrap_or(0);
        offset + removed
    }

    /// Map a span back to source coordinates. The end is mapped through
    /// its last included byte so a span bordering a cut does not swallow
    /// the removed text.
    fn map_span(&self, span: Span) -> Span {
        let start = self.map_offset(span.start);
        if span.end > span.start {
            start..self.map_offset(span.end - 1) + 1
        } else {
            start..start
        }
    }
}

/// A parse problem in stripped-text coordinates, before mapping back to
/// the source as written
struct Diagnostic {
    span: Span,
    message: String,
}

impl Diagnostic {
    fn new(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
        }
    }

    fn into_syntax_error(self, source: &str, stripped: &Stripped) -> SyntaxError {
        let span = stripped.map_span(self.span);
        let line = line_number(source, span.start);
        SyntaxError::new(span, line, self.message)
    }
}

/// 1-based line number of a byte offset in `source`
fn line_number(source: &str, offset: usize) -> usize {
    source[..offset.min(source.len())].matches('\n').count() + 1
}

/// Remove every block comment, including the markers. The text before and
/// after a block is joined, so a block spanning several lines collapses
/// them into one output line. Each removal is recorded so later errors can
/// be mapped back to original positions.
fn strip_block_comments(source: &str, syntax: &SyntaxConfig) -> Result<Stripped, SyntaxError> {
    let mut text = String::with_capacity(source.len());
    let mut cuts = Vec::new();
    let mut removed = 0usize;
    let mut rest = source;
    let mut consumed = 0usize;

    while let Some(start) = rest.find(&syntax.block_comment_open) {
        text.push_str(&rest[..start]);
        let after_open = start + syntax.block_comment_open.len();
        match rest[after_open..].find(&syntax.block_comment_close) {
            Some(close) => {
                let resume = after_open + close + syntax.block_comment_close.len();
                removed += resume - start;
                cuts.push((text.len(), removed));
                consumed += resume;
                rest = &rest[resume..];
            }
            None => {
                // this error never leaves `strip_block_comments`, so it is
                // built in source coordinates directly
                let opened_at = consumed + start;
                return Err(SyntaxError::new(
                    opened_at..opened_at + syntax.block_comment_open.len(),
                    line_number(source, opened_at),
                    format!(
                        "'{}' block comment is never closed",
                        syntax.block_comment_open
                    ),
                ));
            }
        }
    }

    text.push_str(rest);
    Ok(Stripped { text, cuts })
}

/// Split one text line into literal and placeholder segments
fn split_segments(line: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut cursor = 0usize;

    for captures in PLACEHOLDER.captures_iter(line) {
        let (Some(whole), Some(name)) = (captures.get(0), captures.get(1)) else {
            continue;
        };
        if whole.start() > cursor {
            segments.push(Segment::Literal(line[cursor..whole.start()].to_string()));
        }
        segments.push(Segment::Placeholder(name.as_str().to_string()));
        cursor = whole.end();
    }

    if cursor < line.len() || segments.is_empty() {
        segments.push(Segment::Literal(line[cursor..].to_string()));
    }

    segments
}

/// Parse the text after the leading `%` of a control line. `offset` is the
/// byte position of that text within the stripped template, used to anchor
/// errors.
fn parse_directive(text: &str, offset: usize) -> Result<Directive, Diagnostic> {
    let tokens = match lexer::lex(text) {
        Ok(tokens) => tokens,
        Err(span) => {
            let found = &text[span.clone()];
            return Err(Diagnostic::new(
                offset + span.start..offset + span.end,
                format!("unexpected character '{}' in directive", found),
            ));
        }
    };

    let len = text.len();
    let token_iter = tokens.into_iter().map(|(tok, span)| (tok, span.into()));

    // Turn the token list into a stream that chumsky can use
    let token_stream = Stream::from_iter(token_iter)
        // Split (Token, SimpleSpan) into token and span parts
        .map((len..len).into(), |(t, s): (_, _)| (t, s));

    directive_parser()
        .parse(token_stream)
        .into_result()
        .map_err(|errors| rich_to_diagnostic(errors, text, offset))
}

fn directive_parser<'a, I>() -> impl Parser<'a, I, Directive, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    let variable = select! {
        Token::Ident(name) => name,
    };

    let condition = just(Token::Not)
        .or_not()
        .then(variable)
        .map(|(negation, variable)| Condition {
            negated: negation.is_some(),
            variable,
        });

    choice((
        just(Token::If)
            .ignore_then(condition.clone())
            .then_ignore(just(Token::Colon))
            .map(Directive::If),
        just(Token::Elif)
            .ignore_then(condition)
            .then_ignore(just(Token::Colon))
            .map(Directive::Elif),
        just(Token::Else)
            .then_ignore(just(Token::Colon))
            .to(Directive::Else),
        just(Token::EndIf).to(Directive::EndIf),
    ))
    .then_ignore(end())
}

fn rich_to_diagnostic(errors: Vec<Rich<'_, Token>>, text: &str, offset: usize) -> Diagnostic {
    use chumsky::error::{RichPattern, RichReason};

    let Some(err) = errors.into_iter().next() else {
        return Diagnostic::new(offset..offset + text.len(), "invalid directive");
    };

    let message = match err.reason() {
        RichReason::ExpectedFound { found, .. } => {
            let found_str = match found {
                Some(token) => format_token(token),
                None => "end of line".to_string(),
            };

            // Format expected tokens nicely
            let expected: Vec<String> = err
                .expected()
                .filter_map(|pattern| match pattern {
                    RichPattern::Token(token) => Some(format_token(token)),
                    RichPattern::Label(label) => Some(label.to_string()),
                    RichPattern::EndOfInput => Some("end of line".to_string()),
                    RichPattern::Identifier(name) => Some(format!("identifier '{}'", name)),
                    RichPattern::Any => Some("any token".to_string()),
                    RichPattern::SomethingElse => None,
                })
                .collect();

            if expected.is_empty() {
                format!("unexpected {} in directive", found_str)
            } else {
                format!(
                    "unexpected {} in directive, expected {}",
                    found_str,
                    expected.join(" or ")
                )
            }
        }
        RichReason::Custom(msg) => msg.to_string(),
    };

    let range = err.span().into_range();
    Diagnostic::new(offset + range.start..offset + range.end, message)
}

/// Format a token for human-readable error messages
fn format_token(token: &Token) -> String {
    match token {
        Token::Ident(name) => format!("identifier '{}'", name),
        Token::If => "keyword 'if'".to_string(),
        Token::Elif => "keyword 'elif'".to_string(),
        Token::Else => "keyword 'else'".to_string(),
        Token::EndIf => "keyword 'endif'".to_string(),
        Token::Not => "keyword 'not'".to_string(),
        Token::Colon => "':'".to_string(),
    }
}

#[derive(Default)]
struct AstBuilder {
    root: Vec<Node>,
    open: Vec<OpenConditional>,
}

/// A conditional block whose `endif` has not been seen yet. `condition`
/// and `body` belong to the branch currently being collected; once `else`
/// has been seen, new nodes go to `else_body` instead.
struct OpenConditional {
    branches: Vec<Branch>,
    condition: Condition,
    body: Vec<Node>,
    else_body: Option<Vec<Node>>,
    span: Span,
}

impl AstBuilder {
    fn push_text(&mut self, segments: Vec<Segment>) {
        self.push_node(Node::Text(segments));
    }

    fn push_node(&mut self, node: Node) {
        let target = match self.open.last_mut() {
            Some(conditional) => match conditional.else_body.as_mut() {
                Some(else_body) => else_body,
                None => &mut conditional.body,
            },
            None => &mut self.root,
        };
        target.push(node);
    }

    fn apply(&mut self, directive: Directive, span: Span) -> Result<(), Diagnostic> {
        match directive {
            Directive::If(condition) => {
                self.open.push(OpenConditional {
                    branches: Vec::new(),
                    condition,
                    body: Vec::new(),
                    else_body: None,
                    span,
                });
            }
            Directive::Elif(condition) => {
                let Some(top) = self.open.last_mut() else {
                    return Err(Diagnostic::new(span, "'elif' without a matching 'if'"));
                };
                if top.else_body.is_some() {
                    return Err(Diagnostic::new(span, "'elif' is not allowed after 'else'"));
                }
                let finished = std::mem::replace(&mut top.condition, condition);
                let body = std::mem::take(&mut top.body);
                top.branches.push(Branch {
                    condition: finished,
                    body,
                });
            }
            Directive::Else => {
                let Some(top) = self.open.last_mut() else {
                    return Err(Diagnostic::new(span, "'else' without a matching 'if'"));
                };
                if top.else_body.is_some() {
                    return Err(Diagnostic::new(span, "duplicate 'else' in conditional block"));
                }
                let body = std::mem::take(&mut top.body);
                top.branches.push(Branch {
                    condition: top.condition.clone(),
                    body,
                });
                top.else_body = Some(Vec::new());
            }
            Directive::EndIf => {
                let Some(mut top) = self.open.pop() else {
                    return Err(Diagnostic::new(span, "'endif' without a matching 'if'"));
                };
                if top.else_body.is_none() {
                    let body = std::mem::take(&mut top.body);
                    top.branches.push(Branch {
                        condition: top.condition.clone(),
                        body,
                    });
                }
                self.push_node(Node::Conditional(Conditional {
                    branches: top.branches,
                    fallback: top.else_body,
                }));
            }
        }
        Ok(())
    }

    fn finish(mut self) -> Result<TemplateAst, Diagnostic> {
        if let Some(open) = self.open.pop() {
            return Err(Diagnostic::new(
                open.span,
                "conditional block is never closed, missing 'endif'",
            ));
        }
        Ok(TemplateAst { nodes: self.root })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> TemplateAst {
        parse_template(source, &SyntaxConfig::default()).expect("Should parse")
    }

    fn parse_err(source: &str) -> SyntaxError {
        parse_template(source, &SyntaxConfig::default()).expect_err("Should fail")
    }

    #[test]
    fn test_text_lines() {
        let ast = parse("hostname ${ name }\nno ip domain-lookup");
        assert_eq!(ast.nodes.len(), 2);
        assert_eq!(
            ast.nodes[0],
            Node::Text(vec![
                Segment::Literal("hostname ".to_string()),
                Segment::Placeholder("name".to_string()),
            ])
        );
    }

    #[test]
    fn test_empty_line_keeps_a_node() {
        let ast = parse("a\n\nb");
        assert_eq!(ast.nodes.len(), 3);
        assert_eq!(ast.nodes[1], Node::Text(vec![Segment::Literal(String::new())]));
    }

    #[test]
    fn test_malformed_placeholder_stays_literal() {
        let ast = parse("${ not-a-variable }");
        assert_eq!(
            ast.nodes[0],
            Node::Text(vec![Segment::Literal("${ not-a-variable }".to_string())])
        );
    }

    #[test]
    fn test_if_else_block() {
        let ast = parse("% if v:\nYES\n% else:\nNO\n% endif");
        assert_eq!(ast.nodes.len(), 1);
        let Node::Conditional(conditional) = &ast.nodes[0] else {
            panic!("expected a conditional node");
        };
        assert_eq!(conditional.branches.len(), 1);
        assert_eq!(
            conditional.branches[0].condition,
            Condition {
                negated: false,
                variable: "v".to_string()
            }
        );
        assert!(conditional.fallback.is_some());
    }

    #[test]
    fn test_elif_chain() {
        let ast = parse("% if a:\nA\n% elif not b:\nB\n% endif");
        let Node::Conditional(conditional) = &ast.nodes[0] else {
            panic!("expected a conditional node");
        };
        assert_eq!(conditional.branches.len(), 2);
        assert!(conditional.branches[1].condition.negated);
        assert!(conditional.fallback.is_none());
    }

    #[test]
    fn test_nested_conditionals() {
        let ast = parse("% if a:\n% if b:\nx\n% endif\n% endif");
        let Node::Conditional(outer) = &ast.nodes[0] else {
            panic!("expected a conditional node");
        };
        assert!(matches!(
            outer.branches[0].body[0],
            Node::Conditional(_)
        ));
    }

    #[test]
    fn test_comment_lines_dropped() {
        let ast = parse("## a comment\ntext");
        assert_eq!(ast.nodes.len(), 1);
        assert_eq!(
            ast.nodes[0],
            Node::Text(vec![Segment::Literal("text".to_string())])
        );
    }

    #[test]
    fn test_indented_comment_line_dropped() {
        let ast = parse("  ## indented comment");
        assert!(ast.nodes.is_empty());
    }

    #[test]
    fn test_block_comment_joins_lines() {
        let ast = parse("a <%doc>\nhidden\n</%doc> b");
        assert_eq!(ast.nodes.len(), 1);
        assert_eq!(
            ast.nodes[0],
            Node::Text(vec![Segment::Literal("a  b".to_string())])
        );
    }

    #[test]
    fn test_escaped_percent_line() {
        let ast = parse("  %% not a directive");
        assert_eq!(
            ast.nodes[0],
            Node::Text(vec![Segment::Literal("  % not a directive".to_string())])
        );
    }

    #[test]
    fn test_unterminated_block_comment() {
        let err = parse_err("a\n<%doc>\nnever closed");
        assert_eq!(err.line, 2);
        assert_eq!(err.span, 2..8);
        assert!(err.message.contains("never closed"));
    }

    #[test]
    fn test_endif_without_if() {
        let err = parse_err("% endif");
        assert!(err.message.contains("'endif' without a matching 'if'"));
    }

    #[test]
    fn test_else_without_if() {
        let err = parse_err("% else:");
        assert!(err.message.contains("'else' without a matching 'if'"));
    }

    #[test]
    fn test_elif_after_else() {
        let err = parse_err("% if a:\n% else:\n% elif b:\n% endif");
        assert_eq!(err.line, 3);
    }

    #[test]
    fn test_missing_endif() {
        let err = parse_err("% if a:\ntext");
        assert_eq!(err.line, 1);
        assert!(err.message.contains("missing 'endif'"));
    }

    #[test]
    fn test_missing_colon() {
        let err = parse_err("% if a\nx\n% endif");
        assert_eq!(err.line, 1);
    }

    #[test]
    fn test_unknown_directive() {
        let err = parse_err("% for x:\nx\n% endfor");
        assert_eq!(err.line, 1);
    }

    #[test]
    fn test_bad_character_in_directive() {
        let err = parse_err("% if a == b:\nx\n% endif");
        assert!(err.message.contains("unexpected character"));
    }

    #[test]
    fn test_error_position_survives_block_comment_removal() {
        // the stray endif sits on line 5 of the written template even
        // though comment removal collapses it onto line 3
        let source = "line1\n<%doc>\nc\n</%doc>\n% endif";
        let err = parse_err(source);
        assert_eq!(err.line, 5);
        assert_eq!(err.span, 23..30);
        assert_eq!(&source[err.span.clone()], "% endif");
    }

    #[test]
    fn test_error_position_survives_multiple_block_comments() {
        let source = "<%doc>a</%doc>\n<%doc>b</%doc>\nok\n% else:";
        let err = parse_err(source);
        assert_eq!(err.line, 4);
        assert_eq!(&source[err.span.clone()], "% else:");
    }

    #[test]
    fn test_error_inside_line_joined_by_block_comment() {
        // the cut sits in the middle of the directive line itself
        let err = parse_err("% if <%doc>x</%doc> a\ny\n% endif");
        assert_eq!(err.line, 1);
    }
}
