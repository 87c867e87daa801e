//! Syntax tree produced by the parser.
//!
//! The tree is total: every nesting level that can fail to match has an
//! `Error` variant holding the skipped span, so malformed input still
//! yields a tree. `Display` prints a compact, whitespace-normalised form of
//! the source that tests and tooling use to inspect the shape.

pub mod common;
pub mod display;
pub mod expr;
pub mod items;

pub use common::*;
pub use expr::*;
pub use items::*;

use miette::SourceSpan;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    pub globals: Vec<Global>,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Global {
    Use(Use),
    Def(Def),
    Let(Let),
    /// A bare expression: an instantiation to compile
    Init(Expr),
    Error(ErrorNode),
}

impl Global {
    pub fn span(&self) -> SourceSpan {
        match self {
            Global::Use(u) => u.span,
            Global::Def(def) => def.span,
            Global::Let(l) => l.span,
            Global::Init(expr) => expr.span(),
            Global::Error(error) => error.span,
        }
    }
}

impl Program {
    pub fn defs(&self) -> impl Iterator<Item = &Def> {
        self.globals.iter().filter_map(|global| match global {
            Global::Def(def) => Some(def),
            _ => None,
        })
    }

    pub fn lets(&self) -> impl Iterator<Item = &Let> {
        self.globals.iter().filter_map(|global| match global {
            Global::Let(l) => Some(l),
            _ => None,
        })
    }

    pub fn uses(&self) -> impl Iterator<Item = &Use> {
        self.globals.iter().filter_map(|global| match global {
            Global::Use(u) => Some(u),
            _ => None,
        })
    }

    pub fn inits(&self) -> impl Iterator<Item = &Expr> {
        self.globals.iter().filter_map(|global| match global {
            Global::Init(expr) => Some(expr),
            _ => None,
        })
    }

    /// Spans of every `Error` node anywhere in the tree, in source order.
    pub fn error_spans(&self) -> Vec<SourceSpan> {
        let mut spans = Vec::new();
        for global in &self.globals {
            match global {
                Global::Use(u) => {
                    if let Some(body) = &u.body {
                        use_body_errors(body, &mut spans);
                    }
                }
                Global::Def(Def { type_expr, expr, .. }) | Global::Let(Let { type_expr, expr, .. }) => {
                    type_expr.iter().chain(expr).for_each(|e| expr_errors(e, &mut spans));
                }
                Global::Init(expr) => expr_errors(expr, &mut spans),
                Global::Error(error) => spans.push(error.span),
            }
        }
        spans.sort_by_key(|span| span.offset());
        spans
    }
}

fn use_body_errors(body: &UseBody, spans: &mut Vec<SourceSpan>) {
    match body {
        UseBody::All(_) => {}
        UseBody::Single(item) => {
            if let Some(body) = &item.body {
                use_body_errors(body, spans);
            }
        }
        UseBody::Multiple(items) => {
            for entry in &items.items {
                match entry {
                    UseEntry::Item(item) => {
                        if let Some(body) = &item.body {
                            use_body_errors(body, spans);
                        }
                    }
                    UseEntry::Error(error) => spans.push(error.span),
                }
            }
        }
        UseBody::Error(error) => spans.push(error.span),
    }
}

fn expr_errors(expr: &Expr, spans: &mut Vec<SourceSpan>) {
    match expr {
        Expr::Union(union) => union
            .alternatives
            .iter()
            .for_each(|single| single_errors(single, spans)),
        Expr::Single(single) => single_errors(single, spans),
        Expr::Error(error) => spans.push(error.span),
    }
}

fn single_errors(single: &Single, spans: &mut Vec<SourceSpan>) {
    match single {
        Single::Struct(s) => struct_errors(s, spans),
        Single::List(list) => list.exprs.iter().for_each(|e| expr_errors(e, spans)),
        Single::Named(Named { body: Some(StructOrList::Struct(s)), .. }) => struct_errors(s, spans),
        Single::Named(Named { body: Some(StructOrList::List(list)), .. }) => {
            list.exprs.iter().for_each(|e| expr_errors(e, spans))
        }
        Single::Named(_) | Single::Primitive(_) => {}
    }
}

fn struct_errors(s: &Struct, spans: &mut Vec<SourceSpan>) {
    for entry in &s.fields {
        match entry {
            FieldEntry::Field(field) => field
                .type_expr
                .iter()
                .chain(&field.expr)
                .for_each(|e| expr_errors(e, spans)),
            FieldEntry::Error(error) => spans.push(error.span),
        }
    }
}
