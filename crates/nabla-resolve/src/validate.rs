//! Checks that need names but no evaluation.
//!
//! Runs once per document after imports are bound, so problems in schemas
//! that are never instantiated are still reported.

use crate::error::ResolutionError;
use crate::symbol::{DocumentId, SymbolTable};
use crate::types::resolve_type_name;
use fxhash::FxHashMap;
use miette::SourceSpan;
use nabla_syntax::ast::{AliasName, Expr, Global, Named, Single, Struct, StructField, StructOrList};

pub(crate) fn check_document(table: &SymbolTable<'_>, doc: DocumentId) -> Vec<ResolutionError> {
    let mut checker = Checker {
        table,
        doc,
        errors: Vec::new(),
    };
    for global in &table.document(doc).program.globals {
        match global {
            Global::Def(def) => match (&def.type_expr, &def.expr) {
                (Some(schema), default) => {
                    checker.schema(schema);
                    if let Some(default) = default {
                        checker.value(default);
                    }
                }
                (None, Some(schema)) => checker.schema(schema),
                (None, None) => {
                    if let Some(name) = &def.name {
                        checker.errors.push(ResolutionError::MissingValue {
                            name: name.name.clone(),
                            span: name.span,
                        });
                    }
                }
            },
            Global::Let(binding) => {
                if let Some(annotation) = &binding.type_expr {
                    checker.schema(annotation);
                }
                if let Some(expr) = &binding.expr {
                    checker.value(expr);
                }
            }
            Global::Init(expr) => checker.value(expr),
            Global::Use(_) | Global::Error(_) => {}
        }
    }
    checker.errors
}

struct Checker<'t, 'a> {
    table: &'t SymbolTable<'a>,
    doc: DocumentId,
    errors: Vec<ResolutionError>,
}

impl Checker<'_, '_> {
    fn schema(&mut self, expr: &Expr) {
        match expr {
            Expr::Union(union) => union.alternatives.iter().for_each(|single| self.schema_single(single)),
            Expr::Single(single) => self.schema_single(single),
            Expr::Error(_) => {}
        }
    }

    fn schema_single(&mut self, single: &Single) {
        match single {
            Single::Primitive(_) => {}
            Single::Struct(body) => self.fields(body),
            Single::List(list) => list.exprs.iter().for_each(|expr| self.schema(expr)),
            Single::Named(named) => {
                self.name(named, false);
                self.body(named);
            }
        }
    }

    fn value(&mut self, expr: &Expr) {
        match expr {
            Expr::Union(union) => self.errors.push(ResolutionError::UnionInValue { span: union.span }),
            Expr::Single(Single::Primitive(_)) | Expr::Error(_) => {}
            Expr::Single(Single::Struct(body)) => self.fields(body),
            Expr::Single(Single::List(list)) => list.exprs.iter().for_each(|expr| self.value(expr)),
            Expr::Single(Single::Named(named)) => {
                self.name(named, true);
                self.body(named);
            }
        }
    }

    fn body(&mut self, named: &Named) {
        match &named.body {
            Some(StructOrList::Struct(body)) => self.fields(body),
            Some(StructOrList::List(list)) => list.exprs.iter().for_each(|expr| self.value(expr)),
            None => {}
        }
    }

    fn fields(&mut self, body: &Struct) {
        let mut seen: FxHashMap<&str, SourceSpan> = FxHashMap::default();
        for field in body.fields() {
            if let Some(error) = duplicate_field(&mut seen, field) {
                self.errors.push(error);
            }
            if let Some(error) = field_alias_error(field) {
                self.errors.push(error);
            }
            if let Some(annotation) = &field.type_expr {
                self.schema(annotation);
            }
            if let Some(expr) = &field.expr {
                self.value(expr);
            }
        }
    }

    fn name(&mut self, named: &Named, value_position: bool) {
        if let [single] = named.path.as_slice() {
            if value_position && self.table.lookup_let(self.doc, &single.name).is_some() {
                return;
            }
        }
        if let Err(error) = resolve_type_name(self.table, self.doc, named) {
            self.errors.push(error);
        }
    }
}

/// Record a field name, reporting it if the body already set it.
pub(crate) fn duplicate_field<'f>(
    seen: &mut FxHashMap<&'f str, SourceSpan>,
    field: &'f StructField,
) -> Option<ResolutionError> {
    match seen.get(field.name.name.as_str()) {
        Some(previous) => Some(ResolutionError::DuplicateField {
            field: field.name.name.clone(),
            span: field.name.span,
            previous_span: *previous,
        }),
        None => {
            seen.insert(&field.name.name, field.name.span);
            None
        }
    }
}

pub(crate) fn field_alias_error(field: &StructField) -> Option<ResolutionError> {
    match field.alias.as_ref().and_then(|alias| alias.name.as_ref()) {
        Some(AliasName::Ident(ident)) => Some(ResolutionError::AliasMustBeString { span: ident.span }),
        _ => None,
    }
}
