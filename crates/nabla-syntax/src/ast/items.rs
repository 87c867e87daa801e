use miette::SourceSpan;

use super::{Alias, ErrorNode, Expr, Ident};

/// `use root::body as alias`
///
/// The alias sits on the innermost item it renames, so `use a::b as c`
/// stores it on the item `b`. `alias` here is only set for `use a as c` or
/// when an alias trails a wildcard or item list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Use {
    pub root: Option<Ident>,
    pub body: Option<UseBody>,
    pub alias: Option<Alias>,
    pub span: SourceSpan,
}

/// What follows a `::` in an import path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UseBody {
    /// `*`
    All(SourceSpan),
    /// `name` with its own optional body and alias
    Single(Box<UseItem>),
    /// `{ item item ... }`
    Multiple(UseItems),
    Error(ErrorNode),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UseItem {
    pub name: Ident,
    pub body: Option<UseBody>,
    pub alias: Option<Alias>,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UseItems {
    pub items: Vec<UseEntry>,
    /// Whether the closing `}` was found
    pub closed: bool,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UseEntry {
    Item(UseItem),
    Error(ErrorNode),
}

/// `def Name: Type = Expr`, both parts optional.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Def {
    pub name: Option<Ident>,
    pub type_expr: Option<Expr>,
    pub expr: Option<Expr>,
    pub span: SourceSpan,
}

/// `let name: Type = Expr`, both parts optional.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Let {
    pub name: Option<Ident>,
    pub type_expr: Option<Expr>,
    pub expr: Option<Expr>,
    pub span: SourceSpan,
}
