//! Symbol tables for name resolution.
//!
//! Each document is registered on its own with [`SymbolTable::register`],
//! which only looks at that document. Tables are then combined with
//! [`SymbolTable::merge`]; documents registered under the same module path
//! share one namespace there, and clashing names across files are reported.
//! After registration a table only changes by binding imports.

use crate::error::ResolutionError;
use fxhash::FxHashMap;
use miette::SourceSpan;
use nabla_syntax::ast::{Def, Expr, Global, Let, Program};

/// A unique identifier for a schema definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DefId(pub usize);

/// A unique identifier for a module path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModuleId(pub usize);

/// A unique identifier for a registered document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentId(pub usize);

/// A unique identifier for a `let` binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LetId(pub usize);

/// A parsed document and the module path it is registered under.
#[derive(Debug, Clone, Copy)]
pub struct Document<'a> {
    /// `::`-separated module path, empty for the root namespace
    pub module: &'a str,
    /// Where the document came from, used in diagnostics
    pub location: &'a str,
    pub program: &'a Program,
}

#[derive(Debug, Clone)]
pub struct DefEntry<'a> {
    pub name: String,
    pub module: ModuleId,
    pub document: DocumentId,
    pub node: &'a Def,
    /// Span of the name
    pub span: SourceSpan,
}

impl<'a> DefEntry<'a> {
    /// The type expression that describes values of this def.
    ///
    /// `def N: T` and `def N: T = E` are described by `T`, `def N = E` by `E`.
    pub fn schema(&self) -> Option<&'a Expr> {
        self.node.type_expr.as_ref().or(self.node.expr.as_ref())
    }

    /// The default value of a `def N: T = E`.
    pub fn default_value(&self) -> Option<&'a Expr> {
        self.node.type_expr.as_ref().and(self.node.expr.as_ref())
    }
}

#[derive(Debug, Clone)]
pub struct LetEntry<'a> {
    pub name: String,
    pub document: DocumentId,
    pub node: &'a Let,
    pub span: SourceSpan,
}

/// What a name bound by `use` refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    Def(DefId),
    Module(ModuleId),
}

#[derive(Debug, Clone)]
pub struct Import {
    pub binding: Binding,
    pub span: SourceSpan,
    /// Bound through `*`; explicit names take precedence
    pub wildcard: bool,
}

/// The public namespace of a module path.
#[derive(Debug, Clone, Default)]
pub struct ModuleScope {
    pub path: String,
    pub defs: FxHashMap<String, DefId>,
}

/// Names visible inside one document besides its module's defs.
#[derive(Debug, Clone)]
pub struct DocumentScope<'a> {
    pub location: String,
    pub module: ModuleId,
    pub program: &'a Program,
    pub imports: FxHashMap<String, Import>,
    /// Lets are private to the document that declares them
    pub lets: FxHashMap<String, LetId>,
}

#[derive(Debug, Clone, Default)]
pub struct SymbolTable<'a> {
    defs: Vec<DefEntry<'a>>,
    lets: Vec<LetEntry<'a>>,
    modules: Vec<ModuleScope>,
    module_ids: FxHashMap<String, ModuleId>,
    documents: Vec<DocumentScope<'a>>,
}

impl<'a> SymbolTable<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the table of a single document.
    ///
    /// Every def and let gets an entry, even a duplicate one, but only the
    /// first of a name is bound.
    pub fn register(document: &Document<'a>) -> (Self, Vec<ResolutionError>) {
        let mut table = SymbolTable::new();
        let mut errors = Vec::new();
        let module = table.ensure_module(document.module);
        let doc = DocumentId(table.documents.len());
        table.documents.push(DocumentScope {
            location: document.location.to_string(),
            module,
            program: document.program,
            imports: FxHashMap::default(),
            lets: FxHashMap::default(),
        });

        for global in &document.program.globals {
            match global {
                Global::Def(def) => {
                    let Some(name) = &def.name else { continue };
                    let id = DefId(table.defs.len());
                    table.defs.push(DefEntry {
                        name: name.name.clone(),
                        module,
                        document: doc,
                        node: def,
                        span: name.span,
                    });
                    match table.local_span(doc, &name.name) {
                        Some(previous) => errors.push(duplicate(&name.name, name.span, previous)),
                        None => {
                            table.modules[module.0].defs.insert(name.name.clone(), id);
                        }
                    }
                }
                Global::Let(binding) => {
                    let Some(name) = &binding.name else { continue };
                    let id = LetId(table.lets.len());
                    table.lets.push(LetEntry {
                        name: name.name.clone(),
                        document: doc,
                        node: binding,
                        span: name.span,
                    });
                    match table.local_span(doc, &name.name) {
                        Some(previous) => errors.push(duplicate(&name.name, name.span, previous)),
                        None => {
                            table.documents[doc.0].lets.insert(name.name.clone(), id);
                        }
                    }
                }
                Global::Use(_) | Global::Init(_) | Global::Error(_) => {}
            }
        }

        log::debug!(
            "registered `{}` as module `{}`: {} defs, {} lets",
            document.location,
            document.module,
            table.defs.len(),
            table.lets.len()
        );
        (table, errors)
    }

    /// Combine tables into one, merging documents that share a module path.
    ///
    /// Ids are renumbered; each input keeps its relative order. A def whose
    /// name is already bound in its module by an earlier table is reported
    /// against the later document and left unbound. Errors are keyed by the
    /// merged document id.
    pub fn merge(
        tables: impl IntoIterator<Item = SymbolTable<'a>>,
    ) -> (Self, Vec<(DocumentId, ResolutionError)>) {
        let mut merged = SymbolTable::new();
        let mut errors = Vec::new();

        for table in tables {
            let def_base = merged.defs.len();
            let let_base = merged.lets.len();
            let doc_base = merged.documents.len();
            let modules: Vec<ModuleId> = table
                .modules
                .iter()
                .map(|scope| merged.ensure_module(&scope.path))
                .collect();
            let remap = |binding: Binding| match binding {
                Binding::Def(id) => Binding::Def(DefId(id.0 + def_base)),
                Binding::Module(id) => Binding::Module(modules[id.0]),
            };

            for scope in table.documents {
                merged.documents.push(DocumentScope {
                    location: scope.location,
                    module: modules[scope.module.0],
                    program: scope.program,
                    imports: scope
                        .imports
                        .into_iter()
                        .map(|(name, import)| {
                            let binding = remap(import.binding);
                            (name, Import { binding, ..import })
                        })
                        .collect(),
                    lets: scope
                        .lets
                        .into_iter()
                        .map(|(name, id)| (name, LetId(id.0 + let_base)))
                        .collect(),
                });
            }
            merged.lets.extend(table.lets.into_iter().map(|entry| LetEntry {
                document: DocumentId(entry.document.0 + doc_base),
                ..entry
            }));

            // Only bound defs take part; unbound duplicates were already reported.
            let bound: Vec<(ModuleId, DefId)> = table
                .modules
                .iter()
                .zip(&modules)
                .flat_map(|(scope, module)| scope.defs.values().map(move |id| (*module, *id)))
                .collect();
            merged.defs.extend(table.defs.into_iter().map(|entry| DefEntry {
                module: modules[entry.module.0],
                document: DocumentId(entry.document.0 + doc_base),
                ..entry
            }));

            let mut bound = bound;
            bound.sort_by_key(|(_, id)| *id);
            for (module, local) in bound {
                let id = DefId(local.0 + def_base);
                let entry = &merged.defs[id.0];
                match merged.modules[module.0].defs.get(&entry.name) {
                    Some(previous) => {
                        let first = &merged.documents[merged.defs[previous.0].document.0];
                        errors.push((
                            entry.document,
                            ResolutionError::DuplicateDefinition {
                                name: entry.name.clone(),
                                span: entry.span,
                                previous_span: None,
                                note: Some(format!(
                                    "`{}` is already defined in `{}`",
                                    entry.name, first.location
                                )),
                            },
                        ));
                    }
                    None => {
                        let name = entry.name.clone();
                        merged.modules[module.0].defs.insert(name, id);
                    }
                }
            }
        }

        (merged, errors)
    }

    fn ensure_module(&mut self, path: &str) -> ModuleId {
        if let Some(id) = self.module_ids.get(path) {
            return *id;
        }
        let id = ModuleId(self.modules.len());
        self.modules.push(ModuleScope {
            path: path.to_string(),
            defs: FxHashMap::default(),
        });
        self.module_ids.insert(path.to_string(), id);
        id
    }

    /// Span of a def or let of this name declared in `doc` itself.
    fn local_span(&self, doc: DocumentId, name: &str) -> Option<SourceSpan> {
        let scope = &self.documents[doc.0];
        self.modules[scope.module.0]
            .defs
            .get(name)
            .map(|id| &self.defs[id.0])
            .filter(|entry| entry.document == doc)
            .map(|entry| entry.span)
            .or_else(|| scope.lets.get(name).map(|id| self.lets[id.0].span))
    }

    /// Bind a name brought in by `use`.
    ///
    /// Explicit imports clash with local defs, lets and other explicit
    /// imports. Wildcard imports only fill names that are still free.
    pub(crate) fn bind_import(
        &mut self,
        doc: DocumentId,
        name: &str,
        binding: Binding,
        span: SourceSpan,
        wildcard: bool,
    ) -> Result<(), ResolutionError> {
        let scope = &self.documents[doc.0];
        let module_def = self.modules[scope.module.0].defs.get(name).copied();
        let explicit = scope.imports.get(name).filter(|import| !import.wildcard);

        if wildcard {
            if module_def.is_none()
                && explicit.is_none()
                && !scope.lets.contains_key(name)
                && !scope.imports.contains_key(name)
            {
                self.insert_import(doc, name, binding, span, true);
            }
            return Ok(());
        }

        if let Some(id) = module_def {
            let entry = &self.defs[id.0];
            return Err(if entry.document == doc {
                duplicate(name, span, entry.span)
            } else {
                ResolutionError::DuplicateDefinition {
                    name: name.to_string(),
                    span,
                    previous_span: None,
                    note: Some(format!(
                        "`{name}` is already defined in `{}`",
                        self.documents[entry.document.0].location
                    )),
                }
            });
        }
        if let Some(previous) = scope
            .lets
            .get(name)
            .map(|id| self.lets[id.0].span)
            .or(explicit.map(|import| import.span))
        {
            return Err(duplicate(name, span, previous));
        }

        self.insert_import(doc, name, binding, span, false);
        Ok(())
    }

    fn insert_import(&mut self, doc: DocumentId, name: &str, binding: Binding, span: SourceSpan, wildcard: bool) {
        self.documents[doc.0].imports.insert(
            name.to_string(),
            Import {
                binding,
                span,
                wildcard,
            },
        );
    }

    /// Resolve a possibly qualified path as seen from `doc`.
    ///
    /// A single name is looked up among the module's defs, then the
    /// document's imports. In a qualified path the first segment may be an
    /// imported module alias; otherwise the path is taken from the root.
    pub fn lookup(&self, doc: DocumentId, path: &[&str]) -> Option<Binding> {
        let scope = &self.documents[doc.0];
        let (first, rest) = path.split_first()?;
        let Some((last, middle)) = rest.split_last() else {
            return self.modules[scope.module.0]
                .defs
                .get(*first)
                .map(|id| Binding::Def(*id))
                .or_else(|| scope.imports.get(*first).map(|import| import.binding));
        };

        let mut module = match scope.imports.get(*first) {
            Some(Import {
                binding: Binding::Module(id),
                ..
            }) => self.modules[id.0].path.clone(),
            _ => first.to_string(),
        };
        for segment in middle {
            module = join_path(&module, segment);
        }
        let module = self.module(&module)?;
        self.module_def(module, last).map(Binding::Def)
    }

    pub fn lookup_let(&self, doc: DocumentId, name: &str) -> Option<LetId> {
        self.documents[doc.0].lets.get(name).copied()
    }

    pub fn module(&self, path: &str) -> Option<ModuleId> {
        self.module_ids.get(path).copied()
    }

    pub fn module_def(&self, module: ModuleId, name: &str) -> Option<DefId> {
        self.modules[module.0].defs.get(name).copied()
    }

    pub fn module_scope(&self, module: ModuleId) -> &ModuleScope {
        &self.modules[module.0]
    }

    pub fn def(&self, id: DefId) -> &DefEntry<'a> {
        &self.defs[id.0]
    }

    pub fn defs(&self) -> &[DefEntry<'a>] {
        &self.defs
    }

    pub fn let_entry(&self, id: LetId) -> &LetEntry<'a> {
        &self.lets[id.0]
    }

    pub fn lets(&self) -> &[LetEntry<'a>] {
        &self.lets
    }

    pub fn document(&self, id: DocumentId) -> &DocumentScope<'a> {
        &self.documents[id.0]
    }

    pub fn documents(&self) -> impl Iterator<Item = (DocumentId, &DocumentScope<'a>)> {
        self.documents.iter().enumerate().map(|(i, scope)| (DocumentId(i), scope))
    }

    /// `module::Name`, or just `Name` in the root namespace.
    pub fn qualified_name(&self, id: DefId) -> String {
        let entry = &self.defs[id.0];
        join_path(&self.modules[entry.module.0].path, &entry.name)
    }
}

pub(crate) fn join_path(prefix: &str, segment: &str) -> String {
    if prefix.is_empty() {
        segment.to_string()
    } else {
        format!("{prefix}::{segment}")
    }
}

fn duplicate(name: &str, span: SourceSpan, previous: SourceSpan) -> ResolutionError {
    ResolutionError::DuplicateDefinition {
        name: name.to_string(),
        span,
        previous_span: Some(previous),
        note: None,
    }
}
