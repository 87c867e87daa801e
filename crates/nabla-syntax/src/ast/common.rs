use miette::SourceSpan;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ident {
    pub name: String,
    pub span: SourceSpan,
}

/// Tokens skipped during error recovery. May be empty when a required
/// construct was missing and nothing had to be skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorNode {
    pub span: SourceSpan,
}

/// `as <name>`: an external-facing rename on a use item or struct field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alias {
    /// `None` when `as` was not followed by a name
    pub name: Option<AliasName>,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AliasName {
    String { value: String, span: SourceSpan },
    Ident(Ident),
}

impl AliasName {
    pub fn text(&self) -> &str {
        match self {
            AliasName::String { value, .. } => value,
            AliasName::Ident(ident) => &ident.name,
        }
    }

    pub fn span(&self) -> SourceSpan {
        match self {
            AliasName::String { span, .. } => *span,
            AliasName::Ident(ident) => ident.span,
        }
    }
}
