use fxhash::FxHashMap;
use nabla_resolve::{resolve_with_limits, Document, ExternalSymbols, LocatedError, Resolution, Value};
use nabla_source::{NablaConfig, NablaError, Report, SourceFile};
use nabla_syntax::{parse_with_limits, Parse};

/// A document registered under a module path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleSource {
    /// `::`-separated module path, e.g. `net::http`
    pub module: String,
    pub file: SourceFile,
}

impl ModuleSource {
    pub fn new(module: impl Into<String>, file: SourceFile) -> Self {
        Self {
            module: module.into(),
            file,
        }
    }
}

/// Everything produced for one root document.
#[derive(Debug)]
pub struct Compilation {
    /// `None` when the root document hit a fatal parse limit
    pub parse: Option<Parse>,
    /// `None` when parsing or resolution of the root was aborted
    pub resolution: Option<Resolution>,
    /// Diagnostics of every document, modules first
    pub reports: Vec<Report>,
}

impl Compilation {
    pub fn has_errors(&self) -> bool {
        self.reports.iter().any(Report::is_error)
    }

    /// Values of the root's instantiations that resolved cleanly.
    pub fn values(&self) -> Vec<&Value> {
        self.resolution.iter().flat_map(Resolution::values).collect()
    }
}

/// Runs the frontend under one manifest.
#[derive(Debug, Clone, Default)]
pub struct Frontend {
    config: NablaConfig,
}

impl Frontend {
    pub fn new(config: NablaConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &NablaConfig {
        &self.config
    }

    /// Module path and file location of every document the manifest lists,
    /// sorted by module path. Reading them is left to the caller.
    pub fn module_files(&self) -> Vec<(&str, &str)> {
        let mut files: Vec<(&str, &str)> = self
            .config
            .modules
            .iter()
            .flat_map(|(module, config)| config.files().into_iter().map(move |file| (module.as_str(), file)))
            .collect();
        files.sort_by_key(|(module, _)| *module);
        files
    }

    /// Parse every document and resolve `root` against `modules`.
    ///
    /// A module whose parse is aborted contributes no definitions. Only a
    /// fatal error in the root itself leaves the compilation without a
    /// resolution.
    pub fn compile(&self, root: &SourceFile, modules: &[ModuleSource]) -> Compilation {
        let mut reports = Vec::new();

        let parsed: Vec<(&ModuleSource, Parse)> = modules
            .iter()
            .filter_map(|source| {
                self.parse_document(&source.file, &mut reports)
                    .map(|parse| (source, parse))
            })
            .collect();
        let documents: Vec<Document<'_>> = parsed
            .iter()
            .map(|(source, parse)| Document {
                module: &source.module,
                location: source.file.location(),
                program: &parse.program,
            })
            .collect();
        let files: FxHashMap<&str, &SourceFile> = modules
            .iter()
            .map(|source| (source.file.location(), &source.file))
            .collect();

        let (externals, errors) = ExternalSymbols::build(&documents);
        log::info!(
            "merged {} module document(s) with {} error(s)",
            documents.len(),
            errors.len()
        );
        reports.extend(errors.into_iter().map(|located| locate(located, &files, root)));

        let Some(parse) = self.parse_document(root, &mut reports) else {
            return Compilation {
                parse: None,
                resolution: None,
                reports,
            };
        };

        let resolution = match resolve_with_limits(&parse.program, &externals, self.config.limits) {
            Ok(resolution) => {
                log::info!(
                    "resolved `{}`: {} instantiation(s)",
                    root.location(),
                    resolution.instantiations.len()
                );
                reports.extend(resolution.diagnostics.iter().cloned().map(|error| error.report(root)));
                reports.extend(
                    resolution
                        .external_diagnostics
                        .iter()
                        .cloned()
                        .map(|located| locate(located, &files, root)),
                );
                Some(resolution)
            }
            Err(fatal) => {
                log::info!("resolution of `{}` aborted: {fatal}", root.location());
                reports.push(fatal.report(root));
                None
            }
        };

        Compilation {
            parse: Some(parse),
            resolution,
            reports,
        }
    }

    fn parse_document(&self, file: &SourceFile, reports: &mut Vec<Report>) -> Option<Parse> {
        match parse_with_limits(file.contents(), self.config.limits) {
            Ok(parse) => {
                log::info!(
                    "parsed `{}`: {} global(s), {} diagnostic(s)",
                    file.location(),
                    parse.program.globals.len(),
                    parse.diagnostics.len()
                );
                reports.extend(parse.diagnostics.iter().cloned().map(|diagnostic| diagnostic.report(file)));
                Some(parse)
            }
            Err(fatal) => {
                log::info!("parse of `{}` aborted: {fatal}", file.location());
                reports.push(fatal.report(file));
                None
            }
        }
    }
}

/// Attach an error from another document to that document's text.
fn locate(located: LocatedError, files: &FxHashMap<&str, &SourceFile>, root: &SourceFile) -> Report {
    match files.get(located.location.as_str()) {
        Some(file) => located.error.report(file),
        None => {
            log::warn!("no document named `{}`; reporting against the root", located.location);
            located.error.report(root)
        }
    }
}
