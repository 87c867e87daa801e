use logos::Logos;
use miette::SourceSpan;

use crate::error::LexWarning;

/// A token spans `span` within the original source; `lexeme` is that slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub lexeme: &'a str,
    pub span: SourceSpan,
}

/// All tokens of the language. Whitespace and comments are real tokens so the
/// stream covers the whole input; the parser's cursor skips them.
#[derive(Debug, Logos, PartialEq, Eq, Clone, Copy, Hash)]
pub enum TokenKind {
    // Symbols
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LCurly,
    #[token("}")]
    RCurly,
    #[token("::")]
    DoubleColon,
    #[token(":")]
    Colon,
    #[token("*")]
    Star,
    #[token("|")]
    Pipe,
    #[token("=")]
    Eq,
    #[token(",")]
    Comma,

    // Keywords. Literal tokens outrank the identifier regex on equal length,
    // and longest match turns `user` or `define` into identifiers.
    #[token("use")]
    Use,
    #[token("def")]
    Def,
    #[token("let")]
    Let,
    #[token("as")]
    As,
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("null")]
    Null,

    // Literals. Closing quotes are optional so unterminated literals still
    // form a single token.
    #[regex(r#""[^"]*"?"#)]
    String,
    #[regex(r"'(\\[^\n]|[^'\\\n])?'?")]
    Char,
    #[regex(r"[0-9]+(\.[0-9]*)?")]
    Number,
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident,

    // Trivia
    #[regex(r"[ \t\r\n\f]+")]
    Whitespace,
    #[regex(r"//[^\n]*")]
    Comment,

    // Any character no other rule accepts
    #[error]
    Unknown,

    /// Appended once by [`lex`](super::lex); never produced by logos.
    Eof,
}

impl TokenKind {
    pub fn is_trivia(self) -> bool {
        matches!(self, TokenKind::Whitespace | TokenKind::Comment)
    }

    /// Human readable name used in diagnostics.
    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::LBracket => "`[`",
            TokenKind::RBracket => "`]`",
            TokenKind::LCurly => "`{`",
            TokenKind::RCurly => "`}`",
            TokenKind::DoubleColon => "`::`",
            TokenKind::Colon => "`:`",
            TokenKind::Star => "`*`",
            TokenKind::Pipe => "`|`",
            TokenKind::Eq => "`=`",
            TokenKind::Comma => "`,`",
            TokenKind::Use => "`use`",
            TokenKind::Def => "`def`",
            TokenKind::Let => "`let`",
            TokenKind::As => "`as`",
            TokenKind::True => "`true`",
            TokenKind::False => "`false`",
            TokenKind::Null => "`null`",
            TokenKind::String => "string literal",
            TokenKind::Char => "char literal",
            TokenKind::Number => "number",
            TokenKind::Ident => "identifier",
            TokenKind::Whitespace => "whitespace",
            TokenKind::Comment => "comment",
            TokenKind::Unknown => "unknown character",
            TokenKind::Eof => "end of input",
        }
    }
}

impl<'a> Token<'a> {
    /// Lexical problem carried by this token, if any. Tokens are produced
    /// regardless; the warning only describes what was tolerated.
    pub fn warning(&self) -> Option<LexWarning> {
        let span = self.span;
        match self.kind {
            TokenKind::Unknown => Some(LexWarning::UnknownCharacter {
                character: self.lexeme.to_string(),
                span,
            }),
            TokenKind::String if self.lexeme.len() < 2 || !self.lexeme.ends_with('"') => {
                Some(LexWarning::UnterminatedString { span })
            }
            TokenKind::Char if !char_is_closed(self.lexeme) => {
                Some(LexWarning::UnterminatedChar { span })
            }
            TokenKind::Number if self.lexeme.ends_with('.') => {
                Some(LexWarning::MissingDecimals { span })
            }
            _ => None,
        }
    }

    /// Contents of a string literal without its quotes.
    pub fn string_value(&self) -> &'a str {
        let inner = self.lexeme.strip_prefix('"').unwrap_or(self.lexeme);
        inner.strip_suffix('"').unwrap_or(inner)
    }

    /// Decoded contents of a char literal. Empty for `''` or a lone `'`.
    pub fn char_value(&self) -> String {
        let inner = self.lexeme.strip_prefix('\'').unwrap_or(self.lexeme);
        let mut chars = inner.chars();
        match chars.next() {
            Some('\\') => match chars.next() {
                Some('n') => "\n".to_string(),
                Some('t') => "\t".to_string(),
                Some('r') => "\r".to_string(),
                Some('0') => "\0".to_string(),
                Some(other) => other.to_string(),
                None => "\\".to_string(),
            },
            Some('\'') | None => String::new(),
            Some(c) => c.to_string(),
        }
    }
}

/// `'a'`, `'\n'` and `''` are closed; `'`, `'a` and `'\n` are not.
fn char_is_closed(lexeme: &str) -> bool {
    let inner = match lexeme.strip_prefix('\'') {
        Some(inner) => inner,
        None => return false,
    };
    let body_len = match inner.chars().next() {
        Some('\\') => 1 + inner[1..].chars().next().map_or(0, char::len_utf8),
        Some('\'') | None => 0,
        Some(c) => c.len_utf8(),
    };
    inner[body_len..].starts_with('\'')
}
