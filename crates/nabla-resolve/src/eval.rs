//! Evaluation of value expressions against schemas.
//!
//! Every function here returns `None` when the value could not be built,
//! after reporting why. Errors from nested values propagate as `None`, so an
//! instantiation with any error anywhere below it produces no value.

use crate::core::Resolver;
use crate::error::ResolutionError;
use crate::symbol::{DefId, DocumentId, LetId};
use crate::types::{resolve_type_name, BuiltIn, StructTy, Ty, TypeRef};
use crate::validate::{duplicate_field, field_alias_error};
use crate::value::{Number, Object, Value};
use fxhash::{FxHashMap, FxHashSet};
use miette::SourceSpan;
use nabla_syntax::ast::{AliasName, Expr, List, Named, Primitive, Single, Struct, StructField, StructOrList};

/// Where the value of a def instantiation comes from.
#[derive(Clone, Copy)]
enum Source<'a> {
    Struct(&'a Struct),
    List(&'a List),
    Default(&'a Expr, DocumentId),
    /// A struct schema with no body: all defaults
    Schema,
}

/// A field value supplied to an instance.
#[derive(Clone, Copy)]
struct Given<'a> {
    field: &'a StructField,
    /// Document the field is written in
    doc: DocumentId,
    /// Written in the instance body rather than carried over as a default
    explicit: bool,
}

/// What a name in value position refers to.
enum ValueTarget {
    Let(LetId),
    Def(DefId),
    BuiltIn(BuiltIn),
}

impl<'a> Resolver<'a> {
    /// Evaluate `expr`, written in `doc`, as a value of type `ty`.
    pub(crate) fn eval(&mut self, expr: &'a Expr, doc: DocumentId, ty: &Ty<'a>) -> Option<Value> {
        if !self.enter(expr.span()) {
            return None;
        }
        let value = self.eval_expr(expr, doc, ty);
        self.leave();
        value
    }

    fn eval_expr(&mut self, expr: &'a Expr, doc: DocumentId, ty: &Ty<'a>) -> Option<Value> {
        let single = match expr {
            Expr::Error(_) => return None,
            Expr::Union(union) => {
                self.report(doc, ResolutionError::UnionInValue { span: union.span });
                return None;
            }
            Expr::Single(single) => single,
        };

        match ty {
            Ty::Def(id) => {
                let expanded = self.expand(*id, single.span(), doc);
                return self.eval(expr, doc, &expanded);
            }
            Ty::Union(alternatives) => return self.eval_union(expr, single, doc, ty, alternatives),
            _ => {}
        }

        match single {
            Single::Primitive(primitive) => self.eval_primitive(primitive, doc, ty),
            Single::Struct(body) => match ty {
                Ty::Any => self.eval_struct_literal(body, doc),
                Ty::Struct(schema) => self.instantiate(schema, Some(body), doc, body.span),
                Ty::Error => None,
                _ => self.mismatch(doc, ty, "a struct".to_string(), body.span),
            },
            Single::List(list) => self.eval_list(list, doc, ty),
            Single::Named(named) => self.eval_named(named, doc, ty),
        }
    }

    /// Try each alternative in order; the first that accepts the value
    /// without errors wins.
    fn eval_union(
        &mut self,
        expr: &'a Expr,
        single: &'a Single,
        doc: DocumentId,
        ty: &Ty<'a>,
        alternatives: &[Ty<'a>],
    ) -> Option<Value> {
        // An unknown name would fail every alternative; report it once.
        if let Single::Named(named) = single {
            self.value_target(named, doc)?;
        }
        for alternative in alternatives {
            let (value, clean) = self.trial(|r| r.eval(expr, doc, alternative));
            if self.fatal.is_some() {
                return None;
            }
            if let (Some(value), true) = (value, clean) {
                return Some(value);
            }
        }
        let found = self.describe_value_expr(single);
        self.mismatch(doc, ty, found, single.span())
    }

    fn eval_primitive(&mut self, primitive: &'a Primitive, doc: DocumentId, ty: &Ty<'a>) -> Option<Value> {
        let accepted = match ty {
            Ty::Any => true,
            Ty::Error => return None,
            Ty::BuiltIn(builtin) => builtin.accepts(primitive),
            Ty::Literal(literal) => same_literal(primitive, literal),
            _ => false,
        };
        if accepted {
            Some(primitive_value(primitive))
        } else {
            self.mismatch(doc, ty, format!("`{primitive}`"), primitive.span())
        }
    }

    /// A struct literal with no schema: every field is taken as written.
    fn eval_struct_literal(&mut self, body: &'a Struct, doc: DocumentId) -> Option<Value> {
        let mut object = Object::new();
        let mut ok = true;
        let mut seen = FxHashMap::default();
        for field in body.fields() {
            if let Some(error) = duplicate_field(&mut seen, field) {
                self.report(doc, error);
                ok = false;
                continue;
            }
            if let Some(error) = field_alias_error(field) {
                self.report(doc, error);
                ok = false;
            }
            let ty = match &field.type_expr {
                Some(annotation) => self.type_of(annotation, doc),
                None => Ty::Any,
            };
            match self.field_value(field, doc, &ty) {
                Some(value) => object.insert(field.emit_name(), value),
                None => ok = false,
            }
        }
        ok.then_some(Value::Object(object))
    }

    /// Build an instance of a struct schema from an optional body of
    /// overrides.
    ///
    /// Fields are emitted in schema order. A field takes the body's value,
    /// else the default, else is reported missing at `site`.
    pub(crate) fn instantiate(
        &mut self,
        schema: &StructTy<'a>,
        body: Option<&'a Struct>,
        doc: DocumentId,
        site: SourceSpan,
    ) -> Option<Value> {
        let (given, ok) = self.body_fields(body, doc);
        self.build_struct(schema, given, doc, site).filter(|_| ok)
    }

    /// Rebuild an instance of `source` as an instance of `expected`.
    ///
    /// The body's fields and the defaults of `source` it leaves unset are
    /// checked against `expected` field by field, so two schemas with the
    /// same shape accept each other's instances.
    fn conform(
        &mut self,
        source: &StructTy<'a>,
        body: Option<&'a Struct>,
        doc: DocumentId,
        expected: &StructTy<'a>,
        site: SourceSpan,
    ) -> Option<Value> {
        let (mut given, ok) = self.body_fields(body, doc);
        for field in source.schema.fields() {
            let name = field.name.name.as_str();
            if given.iter().any(|g| g.field.name.name == name) {
                continue;
            }
            if let Some((default, default_doc)) = source.default_field(name) {
                given.push(Given {
                    field: default,
                    doc: default_doc,
                    explicit: false,
                });
            }
        }
        self.build_struct(expected, given, doc, site).filter(|_| ok)
    }

    /// The fields of an instance body, reporting duplicates and bad aliases.
    fn body_fields(&mut self, body: Option<&'a Struct>, doc: DocumentId) -> (Vec<Given<'a>>, bool) {
        let mut ok = true;
        let mut given = Vec::new();
        let mut seen = FxHashMap::default();
        for field in body.into_iter().flat_map(|body| body.fields()) {
            if let Some(error) = duplicate_field(&mut seen, field) {
                self.report(doc, error);
                ok = false;
                continue;
            }
            if let Some(error) = field_alias_error(field) {
                self.report(doc, error);
                ok = false;
            }
            given.push(Given {
                field,
                doc,
                explicit: true,
            });
        }
        (given, ok)
    }

    fn build_struct(
        &mut self,
        schema: &StructTy<'a>,
        given: Vec<Given<'a>>,
        doc: DocumentId,
        site: SourceSpan,
    ) -> Option<Value> {
        let schema_name = self.describe(&Ty::Struct(schema.clone()));
        let mut ok = true;

        let mut by_name: FxHashMap<&'a str, Given<'a>> = FxHashMap::default();
        for g in given {
            if schema.schema.field(&g.field.name.name).is_none() {
                self.report(g.doc, unknown_field(g.field, &schema_name));
                ok = false;
            }
            by_name.insert(&g.field.name.name, g);
        }
        for (refinement, refinement_doc) in &schema.overrides {
            for field in refinement.fields() {
                if schema.schema.field(&field.name.name).is_none() {
                    self.report(*refinement_doc, unknown_field(field, &schema_name));
                    ok = false;
                }
            }
        }

        let mut object = Object::new();
        let mut emitted: FxHashSet<&'a str> = FxHashSet::default();
        for field in schema.schema.fields() {
            let name = field.name.name.as_str();
            // Duplicate schema fields were reported when the schema was checked.
            if !emitted.insert(name) {
                continue;
            }
            let ty = match &field.type_expr {
                Some(annotation) => self.type_of(annotation, schema.doc),
                None => Ty::Any,
            };
            let supplied = by_name.get(name).copied();
            let value = match supplied {
                Some(g) => self.instance_field_value(g.field, g.doc, &ty),
                None => match schema.default_for(name) {
                    Some((default, default_doc)) => self.eval(default, default_doc, &ty),
                    None => {
                        self.report(
                            doc,
                            ResolutionError::MissingField {
                                field: name.to_string(),
                                schema: schema_name.clone(),
                                span: site,
                            },
                        );
                        None
                    }
                },
            };
            let alias = supplied
                .filter(|g| g.explicit)
                .and_then(|g| g.field.alias.as_ref())
                .and_then(|alias| alias.name.as_ref());
            let key = match alias {
                Some(AliasName::String { value, .. }) => value.as_str(),
                _ => field.emit_name(),
            };
            match value {
                Some(value) => object.insert(key, value),
                None => ok = false,
            }
        }

        ok.then_some(Value::Object(object))
    }

    /// The value of a field set in an instance body. A local annotation
    /// `name: T = v` must accept the value as well as the schema's type.
    fn instance_field_value(&mut self, field: &'a StructField, doc: DocumentId, ty: &Ty<'a>) -> Option<Value> {
        if let (Some(annotation), Some(expr)) = (&field.type_expr, &field.expr) {
            let local = self.type_of(annotation, doc);
            if matches!(local, Ty::Error) {
                return None;
            }
            if !self.accepts(|r| r.eval(expr, doc, &local)) {
                let found = self.describe_value(expr);
                return self.mismatch(doc, &local, found, expr.span());
            }
        }
        self.field_value(field, doc, ty)
    }

    fn field_value(&mut self, field: &'a StructField, doc: DocumentId, ty: &Ty<'a>) -> Option<Value> {
        match &field.expr {
            Some(expr) => self.eval(expr, doc, ty),
            None => {
                self.report(
                    doc,
                    ResolutionError::MissingValue {
                        name: field.name.name.clone(),
                        span: field.span,
                    },
                );
                None
            }
        }
    }

    fn eval_list(&mut self, list: &'a List, doc: DocumentId, ty: &Ty<'a>) -> Option<Value> {
        let element = match ty {
            Ty::Any => Ty::Any,
            Ty::Error => return None,
            Ty::List { list: schema, doc: schema_doc } => {
                let schema: &'a List = *schema;
                match schema.exprs.as_slice() {
                    [] if list.exprs.is_empty() => Ty::Any,
                    [] => {
                        let found = format!("a list of {} elements", list.exprs.len());
                        return self.mismatch(doc, ty, found, list.span);
                    }
                    [element] => self.type_of(element, *schema_doc),
                    elements => Ty::Union(
                        elements
                            .iter()
                            .map(|element| self.type_of(element, *schema_doc))
                            .collect(),
                    ),
                }
            }
            _ => return self.mismatch(doc, ty, "a list".to_string(), list.span),
        };

        let mut items = Vec::with_capacity(list.exprs.len());
        let mut ok = true;
        for expr in &list.exprs {
            match self.eval(expr, doc, &element) {
                Some(value) => items.push(value),
                None => ok = false,
            }
        }
        ok.then_some(Value::Array(items))
    }

    fn value_target(&mut self, named: &'a Named, doc: DocumentId) -> Option<ValueTarget> {
        if let [single] = named.path.as_slice() {
            if let Some(id) = self.table.lookup_let(doc, &single.name) {
                return Some(ValueTarget::Let(id));
            }
        }
        match resolve_type_name(&self.table, doc, named) {
            Ok(TypeRef::Def(id)) => Some(ValueTarget::Def(id)),
            Ok(TypeRef::BuiltIn(builtin)) => Some(ValueTarget::BuiltIn(builtin)),
            Err(error) => {
                self.report(doc, error);
                None
            }
        }
    }

    fn eval_named(&mut self, named: &'a Named, doc: DocumentId, ty: &Ty<'a>) -> Option<Value> {
        match self.value_target(named, doc)? {
            ValueTarget::Let(id) if named.body.is_none() => self.let_reference(id, named, doc, ty),
            ValueTarget::Let(_) => {
                let found = format!("let `{}`", named.name());
                self.report(
                    doc,
                    ResolutionError::TypeMismatch {
                        expected: "a schema to instantiate".to_string(),
                        found,
                        span: named.path_span(),
                    },
                );
                None
            }
            ValueTarget::BuiltIn(builtin) => {
                self.report(
                    doc,
                    ResolutionError::TypeAsValue {
                        name: builtin.name().to_string(),
                        span: named.path_span(),
                    },
                );
                None
            }
            ValueTarget::Def(id) => self.instantiate_def(id, named, doc, ty),
        }
    }

    /// A let used as a value. Its own errors are replayed at every use; a
    /// value that does not fit the expected type is reported here.
    fn let_reference(&mut self, id: LetId, named: &'a Named, doc: DocumentId, ty: &Ty<'a>) -> Option<Value> {
        let value = self.let_value(id, named.span, doc)?;
        if matches!(ty, Ty::Any) {
            return Some(value);
        }
        let entry = self.table.let_entry(id);
        let (expr, let_doc) = (entry.node.expr.as_ref()?, entry.document);
        let (checked, clean) = self.trial(|r| r.eval(expr, let_doc, ty));
        match (checked, clean) {
            (Some(checked), true) => Some(checked),
            _ if self.fatal.is_some() => None,
            _ => {
                let found = format!("let `{}` = {value}", named.name());
                self.mismatch(doc, ty, found, named.span)
            }
        }
    }

    /// `Name`, `Name { .. }` or `Name [ .. ]` where `Name` is a def.
    fn instantiate_def(&mut self, id: DefId, named: &'a Named, doc: DocumentId, ty: &Ty<'a>) -> Option<Value> {
        let span = named.path_span();
        let schema = self.expand(id, span, doc);
        let source = match &named.body {
            Some(StructOrList::Struct(body)) => Source::Struct(body),
            Some(StructOrList::List(body)) => Source::List(body),
            None => {
                let entry = self.table.def(id);
                match entry.default_value() {
                    Some(default) => Source::Default(default, entry.document),
                    None => Source::Schema,
                }
            }
        };

        let value = match (source, &schema) {
            (_, Ty::Error) => return None,
            (Source::Struct(body), Ty::Struct(st)) => self.instantiate(st, Some(body), doc, named.span)?,
            (Source::Struct(body), _) => {
                return self.mismatch(doc, &schema, "a struct body".to_string(), body.span);
            }
            (Source::List(body), Ty::List { .. }) => self.eval_list(body, doc, &schema)?,
            (Source::List(body), _) => {
                return self.mismatch(doc, &schema, "a list body".to_string(), body.span);
            }
            (Source::Default(default, default_doc), _) => self.eval(default, default_doc, &schema)?,
            (Source::Schema, Ty::Struct(st)) => self.instantiate(st, None, doc, named.span)?,
            (Source::Schema, _) => {
                self.report(
                    doc,
                    ResolutionError::TypeAsValue {
                        name: named.name(),
                        span,
                    },
                );
                return None;
            }
        };

        // Unions and def references were unfolded before getting here.
        let fits = match (ty, source) {
            (Ty::Any, _) => true,
            (Ty::Error, _) => false,
            (_, Source::Default(default, default_doc)) => self.accepts(|r| r.eval(default, default_doc, ty)),
            (Ty::Struct(expected), _) => match &schema {
                Ty::Struct(st) if st.same_schema(expected) => true,
                Ty::Struct(st) => {
                    let body = match source {
                        Source::Struct(body) => Some(body),
                        _ => None,
                    };
                    let (conformed, clean) = self.trial(|r| r.conform(st, body, doc, expected, named.span));
                    match conformed {
                        Some(conformed) if clean => return Some(conformed),
                        _ => false,
                    }
                }
                _ => false,
            },
            (_, Source::List(body)) => self.accepts(|r| r.eval_list(body, doc, ty)),
            _ => false,
        };
        if fits {
            Some(value)
        } else {
            let found = format!("`{}` value", named.name());
            self.mismatch(doc, ty, found, named.span)
        }
    }

    /// Whether `check` builds a value without errors.
    fn accepts(&mut self, check: impl FnOnce(&mut Self) -> Option<Value>) -> bool {
        let (value, clean) = self.trial(check);
        value.is_some() && clean
    }

    fn mismatch(&mut self, doc: DocumentId, expected: &Ty<'a>, found: String, span: SourceSpan) -> Option<Value> {
        let expected = self.describe(expected);
        self.report(doc, ResolutionError::TypeMismatch { expected, found, span });
        None
    }

    fn describe_value(&self, expr: &Expr) -> String {
        match expr {
            Expr::Single(single) => self.describe_value_expr(single),
            Expr::Union(_) => "a union".to_string(),
            Expr::Error(_) => "an invalid expression".to_string(),
        }
    }

    fn describe_value_expr(&self, single: &Single) -> String {
        match single {
            Single::Primitive(primitive) => format!("`{primitive}`"),
            Single::Struct(_) => "a struct".to_string(),
            Single::List(_) => "a list".to_string(),
            Single::Named(named) if named.body.is_some() => format!("a `{}` instance", named.name()),
            Single::Named(named) => format!("`{}`", named.name()),
        }
    }
}

fn unknown_field(field: &StructField, schema: &str) -> ResolutionError {
    ResolutionError::UnknownField {
        field: field.name.name.clone(),
        schema: schema.to_string(),
        span: field.name.span,
    }
}

/// Literal types match by kind and exact source text, so `2` and `2.0` differ.
fn same_literal(value: &Primitive, literal: &Primitive) -> bool {
    match (value, literal) {
        (Primitive::String { value: a, .. }, Primitive::String { value: b, .. })
        | (Primitive::Char { value: a, .. }, Primitive::Char { value: b, .. })
        | (Primitive::Number { value: a, .. }, Primitive::Number { value: b, .. }) => a == b,
        (Primitive::Bool { value: a, .. }, Primitive::Bool { value: b, .. }) => a == b,
        (Primitive::Null { .. }, Primitive::Null { .. }) => true,
        _ => false,
    }
}

fn primitive_value(primitive: &Primitive) -> Value {
    match primitive {
        Primitive::String { value, .. } | Primitive::Char { value, .. } => Value::String(value.clone()),
        Primitive::Number { value, .. } => Value::Number(Number::from_literal(value)),
        Primitive::Bool { value, .. } => Value::Bool(*value),
        Primitive::Null { .. } => Value::Null,
    }
}
