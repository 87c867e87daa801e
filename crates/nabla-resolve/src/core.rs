// Core resolver logic orchestrating the different passes.

use crate::cycles::{CycleDetector, ResolveState};
use crate::error::{LocatedError, ResolutionError, ResolveResult};
use crate::imports::ImportResolver;
use crate::symbol::{DefId, Document, DocumentId, LetId, SymbolTable};
use crate::types::Ty;
use crate::validate;
use crate::value::Value;
use fxhash::{FxHashMap, FxHashSet};
use miette::{Diagnostic, SourceSpan};
use nabla_source::Limits;
use nabla_syntax::ast::Program;

/// Location used for the document passed to [`resolve`].
pub const ROOT_LOCATION: &str = "<root>";

/// One bare expression of the root document and the value it produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Instantiation {
    pub span: SourceSpan,
    /// `None` when any error was found while evaluating it
    pub value: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub instantiations: Vec<Instantiation>,
    /// Errors in the root document, in source order
    pub diagnostics: Vec<ResolutionError>,
    /// Errors raised while evaluating code from other documents, such as a
    /// schema default that does not fit its field
    pub external_diagnostics: Vec<LocatedError>,
}

impl Resolution {
    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty() || !self.external_diagnostics.is_empty()
    }

    /// Values of the instantiations that succeeded.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.instantiations.iter().filter_map(|inst| inst.value.as_ref())
    }
}

/// Definitions provided by documents other than the one being resolved.
///
/// Built once from every imported module and shared by any number of
/// [`resolve`] calls.
#[derive(Debug, Clone, Default)]
pub struct ExternalSymbols<'a> {
    table: SymbolTable<'a>,
}

impl<'a> ExternalSymbols<'a> {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Register, merge and check the given documents.
    ///
    /// Their bare expressions are not evaluated; only their definitions are
    /// made available.
    pub fn build(documents: &[Document<'a>]) -> (Self, Vec<LocatedError>) {
        let mut tables = Vec::with_capacity(documents.len());
        let mut registration = Vec::new();
        for (i, document) in documents.iter().enumerate() {
            let (table, errors) = SymbolTable::register(document);
            registration.extend(errors.into_iter().map(|error| (DocumentId(i), error)));
            tables.push(table);
        }
        let (table, merge_errors) = SymbolTable::merge(tables);

        let mut resolver = Resolver::new(table, Limits::default());
        for (doc, error) in registration.into_iter().chain(merge_errors) {
            resolver.report(doc, error);
        }
        let docs: Vec<DocumentId> = resolver.table.documents().map(|(id, _)| id).collect();
        for doc in &docs {
            resolver.bind_imports(*doc);
        }
        for doc in &docs {
            resolver.validate(*doc);
        }
        for cycle in resolver.detect_cycles() {
            resolver.report_cycle(&cycle);
        }

        let errors = resolver.take_errors();
        let table = resolver.table;
        let errors = errors
            .into_iter()
            .map(|(doc, error)| LocatedError {
                location: table.document(doc).location.clone(),
                error,
            })
            .collect();
        (ExternalSymbols { table }, errors)
    }

    pub fn table(&self) -> &SymbolTable<'a> {
        &self.table
    }
}

/// Errors collected during resolution, each reported at most once.
#[derive(Debug, Default)]
pub(crate) struct Sink {
    errors: Vec<(DocumentId, ResolutionError)>,
    seen: FxHashSet<(DocumentId, ResolutionError)>,
}

impl Sink {
    fn push(&mut self, doc: DocumentId, error: ResolutionError) {
        if self.seen.insert((doc, error.clone())) {
            self.errors.push((doc, error));
        }
    }
}

/// The main resolver struct.
///
/// Owns the merged symbol table and the state of one resolution run:
/// cycle information, cached let values and the collected errors.
pub(crate) struct Resolver<'a> {
    pub(crate) table: SymbolTable<'a>,
    states: Vec<ResolveState>,
    /// Rendered cycle for every def on one
    cycles: FxHashMap<DefId, String>,
    pub(crate) limits: Limits,
    pub(crate) depth: usize,
    /// Set once the depth limit is hit; aborts the run
    pub(crate) fatal: Option<ResolutionError>,
    sink: Sink,
    let_values: Vec<Option<CachedLet>>,
    let_stack: Vec<LetId>,
}

/// A let's value and the errors found while computing it, replayed on
/// every use.
#[derive(Debug, Clone)]
struct CachedLet {
    value: Option<Value>,
    errors: Vec<(DocumentId, ResolutionError)>,
}

impl<'a> Resolver<'a> {
    pub(crate) fn new(table: SymbolTable<'a>, limits: Limits) -> Self {
        let defs = table.defs().len();
        let lets = table.lets().len();
        Self {
            table,
            states: vec![ResolveState::Unvisited; defs],
            cycles: FxHashMap::default(),
            limits,
            depth: 0,
            fatal: None,
            sink: Sink::default(),
            let_values: vec![None; lets],
            let_stack: Vec::new(),
        }
    }

    pub(crate) fn report(&mut self, doc: DocumentId, error: ResolutionError) {
        self.sink.push(doc, error);
    }

    fn take_errors(&mut self) -> Vec<(DocumentId, ResolutionError)> {
        std::mem::take(&mut self.sink).errors
    }

    /// Run `f` against a fresh error sink, returning its result and whether
    /// it finished without errors. The trial's errors are discarded.
    pub(crate) fn trial<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> (T, bool) {
        let saved = std::mem::take(&mut self.sink);
        let result = f(self);
        let trial = std::mem::replace(&mut self.sink, saved);
        (result, trial.errors.is_empty())
    }

    fn bind_imports(&mut self, doc: DocumentId) {
        let errors = ImportResolver::new(&mut self.table, doc).resolve_all();
        for error in errors {
            self.report(doc, error);
        }
    }

    fn validate(&mut self, doc: DocumentId) {
        for error in validate::check_document(&self.table, doc) {
            self.report(doc, error);
        }
    }

    fn detect_cycles(&mut self) -> Vec<Vec<DefId>> {
        let (states, cycles) = CycleDetector::new(&self.table).run();
        self.states = states;
        for cycle in &cycles {
            let rendered = self.render_cycle(cycle);
            for id in cycle {
                self.cycles.entry(*id).or_insert_with(|| rendered.clone());
            }
        }
        log::debug!("found {} reference cycles", cycles.len());
        cycles
    }

    fn render_cycle(&self, cycle: &[DefId]) -> String {
        cycle
            .iter()
            .chain(cycle.first())
            .map(|id| self.table.qualified_name(*id))
            .collect::<Vec<_>>()
            .join(" -> ")
    }

    /// Report a cycle once, at the def it was entered through.
    fn report_cycle(&mut self, cycle: &[DefId]) {
        let Some(first) = cycle.first() else { return };
        let entry = self.table.def(*first);
        let (doc, span) = (entry.document, entry.span);
        let error = ResolutionError::CyclicType {
            name: self.table.qualified_name(*first),
            cycle: self.render_cycle(cycle),
            span,
        };
        self.report(doc, error);
    }

    pub(crate) fn cycle_of(&self, id: DefId) -> Option<String> {
        match self.states.get(id.0) {
            Some(ResolveState::Cyclic) => self.cycles.get(&id).cloned(),
            _ => None,
        }
    }

    /// Guard one level of evaluation against the depth limit.
    pub(crate) fn enter(&mut self, span: SourceSpan) -> bool {
        if self.fatal.is_some() {
            return false;
        }
        if self.depth >= self.limits.max_depth {
            self.fatal = Some(ResolutionError::DepthLimitExceeded {
                limit: self.limits.max_depth,
                span,
            });
            return false;
        }
        self.depth += 1;
        true
    }

    pub(crate) fn leave(&mut self) {
        self.depth -= 1;
    }

    /// The value of a let, computed on first use.
    ///
    /// `site` and `doc` locate the reference, where a cycle between lets is
    /// reported.
    pub(crate) fn let_value(&mut self, id: LetId, site: SourceSpan, doc: DocumentId) -> Option<Value> {
        if let Some(cached) = self.let_values[id.0].clone() {
            for (doc, error) in cached.errors {
                self.report(doc, error);
            }
            return cached.value;
        }
        if let Some(start) = self.let_stack.iter().position(|entry| *entry == id) {
            let cycle = self.let_stack[start..]
                .iter()
                .chain(Some(&id))
                .map(|entry| self.table.let_entry(*entry).name.as_str())
                .collect::<Vec<_>>()
                .join(" -> ");
            let name = self.table.let_entry(id).name.clone();
            self.report(doc, ResolutionError::CyclicType { name, cycle, span: site });
            return None;
        }

        let entry = self.table.let_entry(id);
        let (node, let_doc, name, span) = (entry.node, entry.document, entry.name.clone(), entry.span);
        self.let_stack.push(id);
        let (value, errors) = {
            let saved = std::mem::take(&mut self.sink);
            let ty = match &node.type_expr {
                Some(annotation) => self.type_of(annotation, let_doc),
                None => Ty::Any,
            };
            let value = match &node.expr {
                Some(expr) => self.eval(expr, let_doc, &ty),
                None => {
                    self.report(let_doc, ResolutionError::MissingValue { name, span });
                    None
                }
            };
            (value, std::mem::replace(&mut self.sink, saved).errors)
        };
        self.let_stack.pop();

        for (doc, error) in errors.iter().cloned() {
            self.report(doc, error);
        }
        if self.fatal.is_none() {
            self.let_values[id.0] = Some(CachedLet {
                value: value.clone(),
                errors,
            });
        }
        value
    }
}

/// Resolve a document against previously built external symbols.
pub fn resolve<'a>(program: &'a Program, externals: &ExternalSymbols<'a>) -> ResolveResult<Resolution> {
    resolve_with_limits(program, externals, Limits::default())
}

/// Resolve with an explicit evaluation depth limit.
///
/// Reaching the limit aborts resolution with `DepthLimitExceeded`; every
/// other error is collected in the returned [`Resolution`].
pub fn resolve_with_limits<'a>(
    program: &'a Program,
    externals: &ExternalSymbols<'a>,
    limits: Limits,
) -> ResolveResult<Resolution> {
    let root = Document {
        module: "",
        location: ROOT_LOCATION,
        program,
    };
    let (local, registration) = SymbolTable::register(&root);
    let doc = DocumentId(externals.table.documents().count());
    let (table, merge_errors) = SymbolTable::merge([externals.table.clone(), local]);

    let mut resolver = Resolver::new(table, limits);
    for error in registration {
        resolver.report(doc, error);
    }
    for (error_doc, error) in merge_errors {
        resolver.report(error_doc, error);
    }
    resolver.bind_imports(doc);
    resolver.validate(doc);
    for cycle in resolver.detect_cycles() {
        // Cycles among external defs were reported when they were built.
        if let Some(start) = cycle
            .iter()
            .position(|id| resolver.table.def(*id).document == doc)
        {
            let mut rotated = cycle[start..].to_vec();
            rotated.extend_from_slice(&cycle[..start]);
            resolver.report_cycle(&rotated);
        }
    }

    let lets: Vec<(LetId, SourceSpan)> = resolver
        .table
        .lets()
        .iter()
        .enumerate()
        .filter(|(_, entry)| entry.document == doc)
        .map(|(i, entry)| (LetId(i), entry.span))
        .collect();
    for (id, span) in lets {
        resolver.let_value(id, span, doc);
    }
    if let Some(fatal) = resolver.fatal.take() {
        return Err(fatal);
    }

    let mut instantiations = Vec::new();
    for expr in program.inits() {
        let value = resolver.eval(expr, doc, &Ty::Any);
        if let Some(fatal) = resolver.fatal.take() {
            return Err(fatal);
        }
        instantiations.push(Instantiation {
            span: expr.span(),
            value,
        });
    }

    let mut diagnostics = Vec::new();
    let mut external_diagnostics = Vec::new();
    for (error_doc, error) in resolver.take_errors() {
        if error_doc == doc {
            diagnostics.push(error);
        } else {
            external_diagnostics.push(LocatedError {
                location: resolver.table.document(error_doc).location.clone(),
                error,
            });
        }
    }
    diagnostics.sort_by_key(primary_offset);

    log::debug!(
        "resolved {} instantiations with {} diagnostics",
        instantiations.len(),
        diagnostics.len() + external_diagnostics.len()
    );
    Ok(Resolution {
        instantiations,
        diagnostics,
        external_diagnostics,
    })
}

fn primary_offset(error: &ResolutionError) -> usize {
    error
        .labels()
        .and_then(|mut labels| labels.next())
        .map(|label| label.offset())
        .unwrap_or(0)
}
