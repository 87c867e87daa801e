//! Resolution of `use` declarations.
//!
//! Handles plain paths, wildcard imports, nested item groups and renaming.
//! A path names either a definition, which binds that definition, or a
//! module, which binds the module so that `alias::Item` resolves.

use crate::error::ResolutionError;
use crate::symbol::{join_path, Binding, DocumentId, SymbolTable};
use miette::SourceSpan;
use nabla_syntax::ast::{Alias, AliasName, Ident, Use, UseBody, UseEntry, UseItem};

/// Binds the imports of one document into a symbol table.
pub struct ImportResolver<'t, 'a> {
    table: &'t mut SymbolTable<'a>,
    doc: DocumentId,
    errors: Vec<ResolutionError>,
}

impl<'t, 'a> ImportResolver<'t, 'a> {
    pub fn new(table: &'t mut SymbolTable<'a>, doc: DocumentId) -> Self {
        Self {
            table,
            doc,
            errors: Vec::new(),
        }
    }

    /// Resolve every `use` of the document. Explicit imports are bound
    /// before wildcards so that they take precedence regardless of order.
    pub fn resolve_all(mut self) -> Vec<ResolutionError> {
        let program = self.table.document(self.doc).program;
        let uses: Vec<&Use> = program.uses().collect();
        for u in &uses {
            self.resolve_use(u, false);
        }
        for u in &uses {
            self.resolve_use(u, true);
        }
        self.errors
    }

    fn resolve_use(&mut self, u: &Use, wildcards: bool) {
        let Some(root) = &u.root else { return };
        match &u.body {
            None => {
                if !wildcards {
                    self.bind_path(root.name.clone(), root, u.alias.as_ref());
                }
            }
            Some(body) => {
                if let (Some(alias), false) = (&u.alias, wildcards) {
                    self.errors.push(ResolutionError::MisplacedAlias { span: alias.span });
                }
                self.resolve_body(root.name.clone(), root.span, body, wildcards);
            }
        }
    }

    fn resolve_body(&mut self, prefix: String, prefix_span: SourceSpan, body: &UseBody, wildcards: bool) {
        match body {
            UseBody::All(span) => {
                if wildcards {
                    self.bind_all(&prefix, join_spans(prefix_span, *span));
                }
            }
            UseBody::Single(item) => self.resolve_item(&prefix, item, wildcards),
            UseBody::Multiple(items) => {
                for entry in &items.items {
                    if let UseEntry::Item(item) = entry {
                        self.resolve_item(&prefix, item, wildcards);
                    }
                }
            }
            UseBody::Error(_) => {}
        }
    }

    fn resolve_item(&mut self, prefix: &str, item: &UseItem, wildcards: bool) {
        let path = join_path(prefix, &item.name.name);
        match &item.body {
            None => {
                if !wildcards {
                    self.bind_path(path, &item.name, item.alias.as_ref());
                }
            }
            Some(body) => {
                if let (Some(alias), false) = (&item.alias, wildcards) {
                    self.errors.push(ResolutionError::MisplacedAlias { span: alias.span });
                }
                self.resolve_body(path, item.span, body, wildcards);
            }
        }
    }

    /// Bind the last segment of `path`, or its alias.
    fn bind_path(&mut self, path: String, last: &Ident, alias: Option<&Alias>) {
        let (name, span) = match alias.and_then(|alias| alias.name.as_ref()) {
            Some(AliasName::Ident(ident)) => (ident.name.as_str(), ident.span),
            Some(AliasName::String { span, .. }) => {
                self.errors.push(ResolutionError::AliasMustBeIdent { span: *span });
                return;
            }
            // `as` without a name was already reported by the parser
            None if alias.is_some() => return,
            None => (last.name.as_str(), last.span),
        };

        let binding = match path.rsplit_once("::") {
            Some((module, item)) => self
                .table
                .module(module)
                .and_then(|module| self.table.module_def(module, item))
                .map(Binding::Def),
            None => self.table.module("").and_then(|root| self.table.module_def(root, &path)).map(Binding::Def),
        }
        .or_else(|| self.table.module(&path).map(Binding::Module));

        let Some(binding) = binding else {
            self.errors.push(ResolutionError::UnresolvedImport { path, span: last.span });
            return;
        };
        log::trace!("use `{path}` as `{name}`");
        if let Err(error) = self.table.bind_import(self.doc, name, binding, span, false) {
            self.errors.push(error);
        }
    }

    fn bind_all(&mut self, module_path: &str, span: SourceSpan) {
        let Some(module) = self.table.module(module_path) else {
            self.errors.push(ResolutionError::UnresolvedImport {
                path: format!("{module_path}::*"),
                span,
            });
            return;
        };
        let mut items: Vec<_> = self
            .table
            .module_scope(module)
            .defs
            .iter()
            .map(|(name, id)| (name.clone(), *id))
            .collect();
        items.sort_by_key(|(_, id)| *id);
        for (name, id) in items {
            // Wildcards never clash, so this cannot fail.
            let _ = self.table.bind_import(self.doc, &name, Binding::Def(id), span, true);
        }
    }
}

fn join_spans(start: SourceSpan, end: SourceSpan) -> SourceSpan {
    let offset = start.offset();
    SourceSpan::new(offset.into(), end.offset() + end.len() - offset)
}
