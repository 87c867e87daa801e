//! Fault-tolerant recursive-descent parser.
//!
//! One method per nonterminal. A method either consumes tokens matching its
//! production and returns the node, or returns `None` without consuming so
//! the caller can try a sibling alternative. When nothing matches, the
//! caller skips tokens into an `Error` node until the current token is in
//! the [`SyncSet`] of its context. Every skip consumes at least one token,
//! so parsing is linear in the input and always terminates.

mod expr;
mod items;
pub mod sync;

pub use sync::SyncSet;

use crate::ast::{ErrorNode, Ident, Program};
use crate::error::{ParseDiagnostic, SyntaxError, SyntaxResult};
use crate::lexer::{lex, lex_warnings, Token, TokenKind};
use miette::{Diagnostic, SourceSpan};
use nabla_source::Limits;

/// A syntax tree and everything reported while building it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parse {
    pub program: Program,
    /// Lexer warnings and recovered syntax errors, ordered by position
    pub diagnostics: Vec<ParseDiagnostic>,
}

impl Parse {
    pub fn syntax_errors(&self) -> impl Iterator<Item = &SyntaxError> {
        self.diagnostics.iter().filter_map(|diagnostic| match diagnostic {
            ParseDiagnostic::Syntax(err) => Some(err),
            ParseDiagnostic::Lex(_) => None,
        })
    }

    /// Whether any syntax error was recovered from. Lexer warnings alone do
    /// not count.
    pub fn has_errors(&self) -> bool {
        self.syntax_errors().next().is_some()
    }
}

/// Parses a document with the default [`Limits`].
pub fn parse(source: &str) -> SyntaxResult<Parse> {
    parse_with_limits(source, Limits::default())
}

/// Parses a document.
///
/// Only the structural bounds in `limits` can make this fail; every other
/// problem is recovered from and reported in [`Parse::diagnostics`].
pub fn parse_with_limits(source: &str, limits: Limits) -> SyntaxResult<Parse> {
    let tokens = lex(source);
    let significant: Vec<Token<'_>> = tokens
        .iter()
        .copied()
        .filter(|token| !token.kind.is_trivia())
        .collect();

    let count = significant.len() - 1;
    if count > limits.max_tokens {
        return Err(SyntaxError::TokenLimitExceeded {
            limit: limits.max_tokens,
            found: count,
        });
    }

    let mut parser = Parser::new(&significant, limits);
    let program = parser.parse_program();
    if let Some(fatal) = parser.fatal {
        return Err(fatal);
    }

    let mut diagnostics: Vec<ParseDiagnostic> = lex_warnings(&tokens)
        .into_iter()
        .map(ParseDiagnostic::from)
        .chain(parser.errors.into_iter().map(ParseDiagnostic::from))
        .collect();
    diagnostics.sort_by_key(first_offset);
    log::debug!(
        "parsed {} global(s) with {} diagnostic(s)",
        program.globals.len(),
        diagnostics.len()
    );

    Ok(Parse {
        program,
        diagnostics,
    })
}

fn first_offset(diagnostic: &ParseDiagnostic) -> usize {
    diagnostic
        .labels()
        .and_then(|mut labels| labels.next())
        .map_or(0, |label| label.offset())
}

/// Our hand-rolled parser structure. `tokens` holds only significant tokens
/// and always ends with `Eof`.
pub(crate) struct Parser<'t, 'src> {
    tokens: &'t [Token<'src>],
    pos: usize,
    depth: usize,
    limits: Limits,
    errors: Vec<SyntaxError>,
    fatal: Option<SyntaxError>,
}

impl<'t, 'src> Parser<'t, 'src> {
    pub(crate) fn new(tokens: &'t [Token<'src>], limits: Limits) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
            limits,
            errors: Vec::new(),
            fatal: None,
        }
    }

    /// Peek at the current token without consuming it. Past the end this
    /// keeps returning `Eof`.
    fn peek(&self) -> Token<'src> {
        match self.tokens.get(self.pos).or_else(|| self.tokens.last()) {
            Some(token) => *token,
            None => Token {
                kind: TokenKind::Eof,
                lexeme: "",
                span: SourceSpan::new(0.into(), 0),
            },
        }
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    /// Consume and return the current token. `Eof` is never consumed.
    fn next(&mut self) -> Token<'src> {
        let token = self.peek();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    /// Consume the current token if it is of kind `kind`.
    fn eat(&mut self, kind: TokenKind) -> Option<Token<'src>> {
        if self.at(kind) {
            Some(self.next())
        } else {
            None
        }
    }

    fn eat_ident(&mut self) -> Option<Ident> {
        self.eat(TokenKind::Ident).map(|token| Ident {
            name: token.lexeme.to_string(),
            span: token.span,
        })
    }

    /// Like `eat_ident`, but reports `ExpectedIdent` when missing.
    fn expect_ident(&mut self) -> Option<Ident> {
        let ident = self.eat_ident();
        if ident.is_none() {
            let found = self.peek();
            self.error(SyntaxError::ExpectedIdent {
                found: found.kind.describe().to_string(),
                span: point(found.span),
            });
        }
        ident
    }

    fn error(&mut self, err: SyntaxError) {
        log::trace!("syntax error: {err}");
        self.errors.push(err);
    }

    /// End offset of the last consumed token.
    fn prev_end(&self) -> usize {
        match self.pos.checked_sub(1).and_then(|idx| self.tokens.get(idx)) {
            Some(token) => token.span.offset() + token.span.len(),
            None => 0,
        }
    }

    /// Span from `start` to the end of the last consumed token.
    fn span_from(&self, start: usize) -> SourceSpan {
        let end = self.prev_end().max(start);
        SourceSpan::new(start.into(), end - start)
    }

    /// Ordered choice: runs `f` and, if it fails, restores the cursor and
    /// drops anything it reported.
    fn attempt<T>(&mut self, f: impl FnOnce(&mut Self) -> Option<T>) -> Option<T> {
        let pos = self.pos;
        let errors = self.errors.len();
        let result = f(self);
        if result.is_none() && self.fatal.is_none() {
            self.pos = pos;
            self.errors.truncate(errors);
        }
        result
    }

    /// Runs `f` one nesting level deeper. Exceeding the depth limit records a
    /// fatal error and moves the cursor to `Eof`, which unwinds every caller.
    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Option<T>) -> Option<T> {
        if self.fatal.is_some() {
            return None;
        }
        if self.depth >= self.limits.max_depth {
            let span = self.peek().span;
            log::debug!("nesting limit {} exceeded at offset {}", self.limits.max_depth, span.offset());
            self.fatal = Some(SyntaxError::DepthLimitExceeded {
                limit: self.limits.max_depth,
                span,
            });
            self.pos = self.tokens.len().saturating_sub(1);
            return None;
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    /// Error step inside a loop: consumes at least one token, then keeps
    /// consuming until the current token is in `sync`. At `Eof` nothing is
    /// consumed and the caller's loop ends on its own.
    fn skip_until(&mut self, sync: SyncSet) -> ErrorNode {
        let start = self.peek().span.offset();
        self.next();
        self.recover_until(sync);
        ErrorNode {
            span: self.span_from(start),
        }
    }

    /// Error step in place of a required construct: consumes tokens until the
    /// current one is in `sync`, possibly none.
    fn recover_until(&mut self, sync: SyncSet) -> ErrorNode {
        let start = self.peek().span.offset();
        loop {
            let kind = self.peek().kind;
            if kind == TokenKind::Eof || sync.contains(kind) {
                break;
            }
            self.next();
        }
        let span = self.span_from(start);
        if span.len() > 0 {
            log::trace!("recovered by skipping {}..{}", start, start + span.len());
        }
        ErrorNode { span }
    }

    //--------------------------------------------------------------------------
    // <Program> ::= <Global>*
    //--------------------------------------------------------------------------

    pub(crate) fn parse_program(&mut self) -> Program {
        let mut globals = Vec::new();
        while !self.at(TokenKind::Eof) {
            match self.parse_global() {
                Some(global) => globals.push(global),
                None => {
                    if self.fatal.is_some() {
                        break;
                    }
                    let found = self.peek().kind.describe().to_string();
                    let node = self.skip_until(sync::GLOBAL);
                    log::debug!("skipped unexpected tokens at {:?}", node.span);
                    self.error(SyntaxError::UnexpectedTokens {
                        found,
                        span: node.span,
                    });
                    globals.push(crate::ast::Global::Error(node));
                }
            }
        }
        let end = self.peek().span.offset();
        Program {
            globals,
            span: SourceSpan::new(0.into(), end),
        }
    }
}

/// Zero-length span at the start of `span`.
fn point(span: SourceSpan) -> SourceSpan {
    SourceSpan::new(span.offset().into(), 0)
}
