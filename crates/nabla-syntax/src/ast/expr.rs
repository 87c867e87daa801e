use miette::SourceSpan;

use super::{Alias, AliasName, ErrorNode, Ident};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Union(Union),
    Single(Single),
    Error(ErrorNode),
}

impl Expr {
    pub fn span(&self) -> SourceSpan {
        match self {
            Expr::Union(union) => union.span,
            Expr::Single(single) => single.span(),
            Expr::Error(error) => error.span,
        }
    }
}

/// `a | b | c`. Always holds at least two alternatives; a lone single with a
/// trailing `|` is kept as `Expr::Single`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Union {
    pub alternatives: Vec<Single>,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Single {
    Struct(Struct),
    List(List),
    Named(Named),
    Primitive(Primitive),
}

impl Single {
    pub fn span(&self) -> SourceSpan {
        match self {
            Single::Struct(s) => s.span,
            Single::List(list) => list.span,
            Single::Named(named) => named.span,
            Single::Primitive(primitive) => primitive.span(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Struct {
    pub fields: Vec<FieldEntry>,
    /// Whether the closing `}` was found
    pub closed: bool,
    pub span: SourceSpan,
}

impl Struct {
    /// Well-formed fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &StructField> {
        self.fields.iter().filter_map(|entry| match entry {
            FieldEntry::Field(field) => Some(field),
            FieldEntry::Error(_) => None,
        })
    }

    pub fn field(&self, name: &str) -> Option<&StructField> {
        self.fields().find(|field| field.name.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldEntry {
    Field(StructField),
    Error(ErrorNode),
}

/// `name: Type = Expr as "alias"`; in a schema the expression is the default,
/// in an instance it is the value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructField {
    pub name: Ident,
    pub type_expr: Option<Expr>,
    pub expr: Option<Expr>,
    pub alias: Option<Alias>,
    pub span: SourceSpan,
}

impl StructField {
    /// Key used when the field is exported: the string alias if present.
    pub fn emit_name(&self) -> &str {
        match self.alias.as_ref().and_then(|alias| alias.name.as_ref()) {
            Some(AliasName::String { value, .. }) => value,
            _ => &self.name.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct List {
    pub exprs: Vec<Expr>,
    /// Whether the closing `]` was found
    pub closed: bool,
    pub span: SourceSpan,
}

/// `a::b::C` with an optional struct or list body.
///
/// Without a body this is a reference to a schema or binding; with one it
/// instantiates the referenced schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Named {
    /// Never empty
    pub path: Vec<Ident>,
    pub body: Option<StructOrList>,
    pub span: SourceSpan,
}

impl Named {
    /// The path joined with `::`.
    pub fn name(&self) -> String {
        self.path
            .iter()
            .map(|ident| ident.name.as_str())
            .collect::<Vec<_>>()
            .join("::")
    }

    /// Span of the path alone, without the body.
    pub fn path_span(&self) -> SourceSpan {
        match (self.path.first(), self.path.last()) {
            (Some(first), Some(last)) => {
                let start = first.span.offset();
                SourceSpan::new(start.into(), last.span.offset() + last.span.len() - start)
            }
            _ => self.span,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructOrList {
    Struct(Struct),
    List(List),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Primitive {
    String { value: String, span: SourceSpan },
    /// Decoded char, empty for `''`
    Char { value: String, span: SourceSpan },
    /// Literal text, e.g. `2` or `2.50`
    Number { value: String, span: SourceSpan },
    Bool { value: bool, span: SourceSpan },
    Null { span: SourceSpan },
}

impl Primitive {
    pub fn span(&self) -> SourceSpan {
        match self {
            Primitive::String { span, .. }
            | Primitive::Char { span, .. }
            | Primitive::Number { span, .. }
            | Primitive::Bool { span, .. }
            | Primitive::Null { span } => *span,
        }
    }
}
