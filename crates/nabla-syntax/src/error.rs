use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

/// Problems the lexer tolerates. The offending text still becomes a token.
#[derive(Debug, Clone, Error, Diagnostic, PartialEq, Eq)]
pub enum LexWarning {
    #[error("Unknown character `{character}`")]
    #[diagnostic(code(nabla_syntax::unknown_character), severity(Warning))]
    UnknownCharacter {
        character: String,
        #[label("not part of any token")]
        span: SourceSpan,
    },

    #[error("Unterminated string literal")]
    #[diagnostic(
        code(nabla_syntax::unterminated_string),
        severity(Warning),
        help("add a closing `\"`")
    )]
    UnterminatedString {
        #[label("string starts here and runs to the end of input")]
        span: SourceSpan,
    },

    #[error("Unterminated char literal")]
    #[diagnostic(
        code(nabla_syntax::unterminated_char),
        severity(Warning),
        help("add a closing `'`")
    )]
    UnterminatedChar {
        #[label("missing closing quote")]
        span: SourceSpan,
    },

    #[error("Number is missing its decimals")]
    #[diagnostic(
        code(nabla_syntax::missing_decimals),
        severity(Warning),
        help("write `1.0` instead of `1.`")
    )]
    MissingDecimals {
        #[label("expected digits after `.`")]
        span: SourceSpan,
    },
}

/// Production mismatches found while parsing.
///
/// All variants except `DepthLimitExceeded` and `TokenLimitExceeded` are
/// recovered from and collected; those two abort the parse.
#[derive(Debug, Clone, Error, Diagnostic, PartialEq, Eq)]
pub enum SyntaxError {
    #[error("Expected an identifier, found {found}")]
    #[diagnostic(code(nabla_syntax::expected_ident))]
    ExpectedIdent {
        found: String,
        #[label("identifier expected here")]
        span: SourceSpan,
    },

    #[error("Expected an expression, found {found}")]
    #[diagnostic(code(nabla_syntax::expected_expr))]
    ExpectedExpr {
        found: String,
        #[label("expression expected here")]
        span: SourceSpan,
    },

    #[error("Expected a type expression after `:`, found {found}")]
    #[diagnostic(code(nabla_syntax::expected_type))]
    ExpectedType {
        found: String,
        #[label("type expected here")]
        span: SourceSpan,
    },

    #[error("Expected `*`, an identifier or `{{` after `::`, found {found}")]
    #[diagnostic(code(nabla_syntax::expected_use_item))]
    ExpectedUseItem {
        found: String,
        #[label("import item expected here")]
        span: SourceSpan,
    },

    #[error("Expected a name after `as`, found {found}")]
    #[diagnostic(
        code(nabla_syntax::expected_alias_name),
        help("aliases are identifiers in `use` and strings on struct fields")
    )]
    ExpectedAliasName {
        found: String,
        #[label("alias name expected here")]
        span: SourceSpan,
    },

    #[error("Expected another union alternative after `|`")]
    #[diagnostic(code(nabla_syntax::missing_union_alternative))]
    MissingUnionAlternative {
        #[label("trailing `|`")]
        span: SourceSpan,
    },

    #[error("Missing closing `}}`")]
    #[diagnostic(code(nabla_syntax::missing_closing_curly))]
    MissingClosingCurly {
        #[label("this `{{` is never closed")]
        open: SourceSpan,
        #[label("expected `}}` here")]
        span: SourceSpan,
    },

    #[error("Missing closing `]`")]
    #[diagnostic(code(nabla_syntax::missing_closing_bracket))]
    MissingClosingBracket {
        #[label("this `[` is never closed")]
        open: SourceSpan,
        #[label("expected `]` here")]
        span: SourceSpan,
    },

    #[error("Unexpected {found}")]
    #[diagnostic(code(nabla_syntax::unexpected_tokens))]
    UnexpectedTokens {
        found: String,
        #[label("skipped while recovering")]
        span: SourceSpan,
    },

    #[error("Nesting deeper than the configured limit of {limit}")]
    #[diagnostic(
        code(nabla_syntax::depth_limit),
        help("raise `limits.max_depth` in nabla.toml if this nesting is intended")
    )]
    DepthLimitExceeded {
        limit: usize,
        #[label("limit exceeded here")]
        span: SourceSpan,
    },

    #[error("Document has {found} tokens, more than the configured limit of {limit}")]
    #[diagnostic(
        code(nabla_syntax::token_limit),
        help("raise `limits.max_tokens` in nabla.toml or split the document")
    )]
    TokenLimitExceeded { limit: usize, found: usize },
}

impl SyntaxError {
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SyntaxError::DepthLimitExceeded { .. } | SyntaxError::TokenLimitExceeded { .. }
        )
    }
}

/// Anything reported while turning text into a syntax tree.
#[derive(Debug, Clone, Error, Diagnostic, PartialEq, Eq)]
pub enum ParseDiagnostic {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Lex(#[from] LexWarning),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Syntax(#[from] SyntaxError),
}

pub type SyntaxResult<T> = std::result::Result<T, SyntaxError>;
