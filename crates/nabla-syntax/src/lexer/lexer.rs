use super::token::*;
use crate::error::LexWarning;
use logos::Logos;
use miette::SourceSpan;

/// Lexes the input string into a vector of tokens ending with `Eof`.
///
/// Lexing is total: characters no rule accepts become `Unknown` tokens and
/// unterminated literals run to the end of input. Concatenating every
/// lexeme reproduces `input` exactly.
pub fn lex(input: &str) -> Vec<Token<'_>> {
    let mut lexer = TokenKind::lexer(input);
    let mut tokens = Vec::new();
    // Byte offset up to which tokens have been emitted. Error spans may end
    // inside a multi-byte character; they are widened to the next boundary.
    let mut covered = 0;

    while let Some(kind) = lexer.next() {
        let range = lexer.span();
        if range.end <= covered {
            continue;
        }
        let start = range.start.max(covered);
        let end = (range.end..=input.len())
            .find(|&idx| input.is_char_boundary(idx))
            .unwrap_or(input.len());
        covered = end;

        tokens.push(Token {
            kind,
            lexeme: &input[start..end],
            span: SourceSpan::new(start.into(), end - start),
        });
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        lexeme: "",
        span: SourceSpan::new(input.len().into(), 0),
    });
    tokens
}

/// Collects the warnings carried by a token stream, in source order.
pub fn lex_warnings(tokens: &[Token<'_>]) -> Vec<LexWarning> {
    tokens.iter().filter_map(Token::warning).collect()
}
