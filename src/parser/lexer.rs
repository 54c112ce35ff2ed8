//! Lexer for `%` control lines using logos

use logos::Logos;

use crate::error::Span;

/// Token of a directive line, the text after the leading `%`
#[derive(Logos, Debug, Clone, PartialEq, Eq)]
#[logos(skip r"[ \t\r]+")]
pub enum Token {
    // Directive keywords
    #[token("if")]
    If,
    #[token("elif")]
    Elif,
    #[token("else")]
    Else,
    #[token("endif")]
    EndIf,

    // Condition negation
    #[token("not")]
    Not,

    #[token(":")]
    Colon,

    // Variable names - identifiers must come after keywords
    #[regex(r"[a-zA-Z0-9_]+", |lex| lex.slice().to_string(), priority = 1)]
    Ident(String),
}

/// Lex a directive line into tokens with spans. Returns the span of the
/// first unlexable character on failure so the caller can point at it.
pub fn lex(input: &str) -> Result<Vec<(Token, Span)>, Span> {
    let mut tokens = Vec::new();
    for (token, span) in Token::lexer(input).spanned() {
        match token {
            Ok(token) => tokens.push((token, span)),
            Err(()) => return Err(span),
        }
    }
    Ok(tokens)
}
