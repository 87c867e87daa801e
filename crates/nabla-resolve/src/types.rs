//! Schemas as the resolver sees them.
//!
//! Type expressions are turned into [`Ty`] one level at a time: a reference
//! to a def stays a [`Ty::Def`] until something needs to look inside it, which
//! is what lets struct fields refer back to their own schema.

use crate::core::Resolver;
use crate::error::ResolutionError;
use crate::symbol::{Binding, DefId, DocumentId, SymbolTable};
use miette::SourceSpan;
use nabla_syntax::ast::{Expr, List, Named, Primitive, Single, Struct, StructField, StructOrList};

/// Schemas every document can name without importing them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltIn {
    String,
    Number,
    Bool,
    Char,
}

impl BuiltIn {
    pub fn from_name(name: &str) -> Option<BuiltIn> {
        match name {
            "String" => Some(BuiltIn::String),
            "Number" => Some(BuiltIn::Number),
            "Bool" => Some(BuiltIn::Bool),
            "Char" => Some(BuiltIn::Char),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            BuiltIn::String => "String",
            BuiltIn::Number => "Number",
            BuiltIn::Bool => "Bool",
            BuiltIn::Char => "Char",
        }
    }

    pub fn accepts(self, primitive: &Primitive) -> bool {
        matches!(
            (self, primitive),
            (BuiltIn::String, Primitive::String { .. })
                | (BuiltIn::Number, Primitive::Number { .. })
                | (BuiltIn::Bool, Primitive::Bool { .. })
                | (BuiltIn::Char, Primitive::Char { .. })
        )
    }
}

/// What a schema name refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TypeRef {
    BuiltIn(BuiltIn),
    Def(DefId),
}

/// Look up the target of a name used as a schema.
///
/// Defs, including imported ones, shadow built-ins.
pub(crate) fn resolve_type_name(
    table: &SymbolTable<'_>,
    doc: DocumentId,
    named: &Named,
) -> Result<TypeRef, ResolutionError> {
    let path: Vec<&str> = named.path.iter().map(|ident| ident.name.as_str()).collect();
    let name = named.name();
    let span = named.path_span();
    match table.lookup(doc, &path) {
        Some(Binding::Def(id)) => Ok(TypeRef::Def(id)),
        Some(Binding::Module(_)) => Err(ResolutionError::UnresolvedName {
            help: Some(format!("`{name}` is a module; name an item inside it")),
            name,
            span,
        }),
        None => match path.as_slice() {
            [single] => match BuiltIn::from_name(single) {
                Some(builtin) => Ok(TypeRef::BuiltIn(builtin)),
                None => Err(ResolutionError::UnresolvedName {
                    help: table
                        .lookup_let(doc, single)
                        .map(|_| format!("`{name}` is a let binding and cannot describe a schema")),
                    name,
                    span,
                }),
            },
            _ => Err(ResolutionError::UnresolvedName {
                name,
                span,
                help: None,
            }),
        },
    }
}

#[derive(Debug, Clone)]
pub(crate) enum Ty<'a> {
    /// No constraint
    Any,
    /// A schema that failed to resolve. Matches nothing and reports nothing
    /// further, since the failure was already reported.
    Error,
    BuiltIn(BuiltIn),
    /// Exactly this literal
    Literal(&'a Primitive),
    Struct(StructTy<'a>),
    List {
        list: &'a List,
        doc: DocumentId,
    },
    /// Not yet expanded
    Def(DefId),
    Union(Vec<Ty<'a>>),
}

#[derive(Debug, Clone)]
pub(crate) struct StructTy<'a> {
    pub schema: &'a Struct,
    /// Document the schema is written in, where its defaults are evaluated
    pub doc: DocumentId,
    /// The def this schema was reached through, for naming
    pub def: Option<DefId>,
    /// Refinement bodies, outermost last
    pub overrides: Vec<(&'a Struct, DocumentId)>,
}

impl<'a> StructTy<'a> {
    /// Whether two schemas are the same declaration.
    pub fn same_schema(&self, other: &StructTy<'_>) -> bool {
        std::ptr::eq(self.schema, other.schema)
    }

    /// The field that sets a default: the outermost refinement that sets it,
    /// then the schema itself.
    pub fn default_field(&self, name: &str) -> Option<(&'a StructField, DocumentId)> {
        self.overrides
            .iter()
            .rev()
            .find_map(|(body, doc)| body.field(name).filter(|field| field.expr.is_some()).map(|field| (field, *doc)))
            .or_else(|| {
                self.schema
                    .field(name)
                    .filter(|field| field.expr.is_some())
                    .map(|field| (field, self.doc))
            })
    }

    pub fn default_for(&self, name: &str) -> Option<(&'a Expr, DocumentId)> {
        let (field, doc) = self.default_field(name)?;
        field.expr.as_ref().map(|expr| (expr, doc))
    }
}

impl<'a> Resolver<'a> {
    pub(crate) fn type_of(&mut self, expr: &'a Expr, doc: DocumentId) -> Ty<'a> {
        match expr {
            Expr::Error(_) => Ty::Error,
            Expr::Union(union) => Ty::Union(
                union
                    .alternatives
                    .iter()
                    .map(|single| self.single_type(single, doc))
                    .collect(),
            ),
            Expr::Single(single) => self.single_type(single, doc),
        }
    }

    fn single_type(&mut self, single: &'a Single, doc: DocumentId) -> Ty<'a> {
        let named = match single {
            Single::Primitive(primitive) => return Ty::Literal(primitive),
            Single::Struct(schema) => {
                return Ty::Struct(StructTy {
                    schema,
                    doc,
                    def: None,
                    overrides: Vec::new(),
                })
            }
            Single::List(list) => return Ty::List { list, doc },
            Single::Named(named) => named,
        };

        let target = match resolve_type_name(&self.table, doc, named) {
            Ok(target) => target,
            Err(error) => {
                self.report(doc, error);
                return Ty::Error;
            }
        };
        match (&named.body, target) {
            (None, TypeRef::BuiltIn(builtin)) => Ty::BuiltIn(builtin),
            (None, TypeRef::Def(id)) => Ty::Def(id),
            (Some(StructOrList::Struct(body)), TypeRef::Def(id)) => {
                match self.expand(id, named.path_span(), doc) {
                    Ty::Struct(mut refined) => {
                        refined.overrides.push((body, doc));
                        Ty::Struct(refined)
                    }
                    Ty::Error => Ty::Error,
                    other => self.not_refinable(doc, &other, named.path_span()),
                }
            }
            (Some(StructOrList::Struct(_)), TypeRef::BuiltIn(builtin)) => {
                self.not_refinable(doc, &Ty::BuiltIn(builtin), named.path_span())
            }
            (Some(StructOrList::List(list)), _) => {
                self.report(
                    doc,
                    ResolutionError::TypeMismatch {
                        expected: "a struct body refining the schema".to_string(),
                        found: "a list".to_string(),
                        span: list.span,
                    },
                );
                Ty::Error
            }
        }
    }

    fn not_refinable(&mut self, doc: DocumentId, base: &Ty<'a>, span: SourceSpan) -> Ty<'a> {
        let found = self.describe(base);
        self.report(
            doc,
            ResolutionError::TypeMismatch {
                expected: "a struct schema to refine".to_string(),
                found,
                span,
            },
        );
        Ty::Error
    }

    /// Follow a def to the schema it stands for.
    ///
    /// Chains like `def A = B` are followed until something other than a
    /// plain reference is found. A def on a reference cycle yields
    /// `CyclicType` at `span`.
    pub(crate) fn expand(&mut self, id: DefId, span: SourceSpan, doc: DocumentId) -> Ty<'a> {
        let mut current = id;
        // Cycles are marked before evaluation; the bound only guards against
        // a table that skipped detection.
        for _ in 0..=self.table.defs().len() {
            if let Some(cycle) = self.cycle_of(current) {
                let name = self.table.qualified_name(current);
                self.report(doc, ResolutionError::CyclicType { name, cycle, span });
                return Ty::Error;
            }
            let entry = self.table.def(current);
            let (schema, schema_doc) = match entry.schema() {
                Some(schema) => (schema, entry.document),
                None => return Ty::Error,
            };
            match self.type_of(schema, schema_doc) {
                Ty::Def(next) => current = next,
                Ty::Struct(mut schema) => {
                    schema.def = Some(id);
                    return Ty::Struct(schema);
                }
                other => return other,
            }
        }
        Ty::Error
    }

    /// How a schema is named in messages.
    pub(crate) fn describe(&self, ty: &Ty<'a>) -> String {
        match ty {
            Ty::Any => "any value".to_string(),
            Ty::Error => "an unresolved schema".to_string(),
            Ty::BuiltIn(builtin) => format!("`{}`", builtin.name()),
            Ty::Literal(primitive) => format!("`{primitive}`"),
            Ty::Struct(StructTy { def: Some(id), .. }) | Ty::Def(id) => {
                format!("`{}`", self.table.qualified_name(*id))
            }
            Ty::Struct(_) => "a struct".to_string(),
            Ty::List { list, .. } => format!("`{list}`"),
            Ty::Union(alternatives) => alternatives
                .iter()
                .map(|alternative| self.describe(alternative))
                .collect::<Vec<_>>()
                .join(" | "),
        }
    }
}
