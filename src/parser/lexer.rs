//! Lexer for Go template sources using logos
//!
//! Only as much of Go's lexical grammar as the generator needs: keywords that
//! open declarations, identifiers, literals (so their contents never count as
//! code), and delimiters for balance checking. Everything else collapses into
//! `Operator`.

use logos::Logos;

use crate::error::SourceError;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum Token {
    // Declaration keywords
    #[token("package")]
    Package,
    #[token("import")]
    Import,
    #[token("type")]
    Type,

    // Delimiters
    #[token("(")]
    ParenOpen,
    #[token(")")]
    ParenClose,
    #[token("{")]
    BraceOpen,
    #[token("}")]
    BraceClose,
    #[token("[")]
    BracketOpen,
    #[token("]")]
    BracketClose,
    #[token(".")]
    Dot,
    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,
    #[token("=")]
    Assign,

    #[regex(r"[+\-*/%&|^<>=!:~?]+", priority = 1)]
    Operator,

    // Literals - identifiers must come after keywords
    #[regex(r"[\p{L}_][\p{L}\p{N}_]*", |lex| lex.slice().to_string(), priority = 1)]
    Ident(String),

    #[regex(r#""([^"\\\n]|\\.)*""#, |lex| {
        let s = lex.slice();
        s[1..s.len()-1].to_string()
    })]
    String(String),

    #[regex(r"`[^`]*`", |lex| {
        let s = lex.slice();
        s[1..s.len()-1].to_string()
    })]
    RawString(String),

    #[regex(r"'([^'\\\n]|\\[^\n])+'")]
    Rune,

    #[regex(r"[0-9][0-9a-zA-Z_]*(\.[0-9a-zA-Z_]*)?")]
    Number,

    // Comments (skip)
    #[regex(r"//[^\n]*", logos::skip)]
    LineComment,

    #[regex(r"/\*([^*]|\*+[^*/])*\*+/", logos::skip)]
    BlockComment,
}

impl Token {
    /// Closing delimiter matching an opening one
    pub fn closer(&self) -> Option<Token> {
        match self {
            Token::ParenOpen => Some(Token::ParenClose),
            Token::BraceOpen => Some(Token::BraceClose),
            Token::BracketOpen => Some(Token::BracketClose),
            _ => None,
        }
    }

    pub fn is_closer(&self) -> bool {
        matches!(
            self,
            Token::ParenClose | Token::BraceClose | Token::BracketClose
        )
    }
}

/// Lex input string into tokens with spans, skipping anything unrecognised
pub fn lex(input: &str) -> impl Iterator<Item = (Token, Span)> + '_ {
    Token::lexer(input)
        .spanned()
        .filter_map(|(tok, span)| tok.ok().map(|t| (t, span)))
}

/// Lex input string, failing on the first unrecognised character
pub fn lex_checked(input: &str) -> Result<Vec<(Token, Span)>, SourceError> {
    let mut tokens = Vec::new();
    for (tok, span) in Token::lexer(input).spanned() {
        match tok {
            Ok(t) => tokens.push((t, span)),
            Err(_) => {
                let text = &input[span.clone()];
                return Err(SourceError::syntax(
                    span,
                    format!("unexpected input {:?}", text),
                ));
            }
        }
    }
    Ok(tokens)
}

/// Verify that every `(`, `{` and `[` is closed by its matching delimiter
pub fn check_balance(tokens: &[(Token, Span)]) -> Result<(), SourceError> {
    let mut stack: Vec<(Token, Span)> = Vec::new();
    for (tok, span) in tokens {
        if let Some(closer) = tok.closer() {
            stack.push((closer, span.clone()));
        } else if tok.is_closer() {
            match stack.pop() {
                Some((expected, _)) if &expected == tok => {}
                Some((expected, _)) => {
                    return Err(SourceError::expected(
                        span.clone(),
                        format!("mismatched {}", describe(tok)),
                        &[describe(&expected)],
                    ));
                }
                None => {
                    return Err(SourceError::syntax(
                        span.clone(),
                        format!("unexpected {}", describe(tok)),
                    ));
                }
            }
        }
    }
    match stack.pop() {
        Some((expected, span)) => Err(SourceError::expected(
            span,
            "unclosed delimiter",
            &[describe(&expected)],
        )),
        None => Ok(()),
    }
}

/// Format a token for human-readable error messages
fn describe(tok: &Token) -> &'static str {
    match tok {
        Token::ParenOpen => "'('",
        Token::ParenClose => "')'",
        Token::BraceOpen => "'{'",
        Token::BraceClose => "'}'",
        Token::BracketOpen => "'['",
        Token::BracketClose => "']'",
        Token::Package => "keyword 'package'",
        Token::Import => "keyword 'import'",
        Token::Type => "keyword 'type'",
        Token::Ident(_) => "identifier",
        _ => "token",
    }
}
