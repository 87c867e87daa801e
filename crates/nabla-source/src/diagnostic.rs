//! Diagnostic reports with source context.
//!
//! Every stage of the frontend produces its own miette diagnostic enum. A
//! [`Report`] pairs one of those diagnostics with the document it points
//! into, which is what miette needs to render labelled source snippets.

use crate::SourceFile;
use miette::{Diagnostic, GraphicalReportHandler, GraphicalTheme, NamedSource, Severity};
use std::{
    error::Error,
    fmt::{self, Display},
    sync::Arc,
};
use thiserror::Error;

/// A diagnostic together with the source text it refers to.
#[derive(Debug, Clone, Error)]
pub struct Report {
    /// Named source text for context in error displays
    pub source_code: Arc<NamedSource<String>>,

    /// The diagnostic itself
    pub report: Arc<dyn NablaError>,
}

impl Report {
    pub fn new(file: &SourceFile, diagnostic: impl NablaError) -> Self {
        Self {
            source_code: Arc::new(NamedSource::new(
                file.location(),
                file.contents().to_string(),
            )),
            report: Arc::new(diagnostic),
        }
    }

    pub fn is_error(&self) -> bool {
        !matches!(
            self.severity(),
            Some(Severity::Warning) | Some(Severity::Advice)
        )
    }

    /// Renders the report with source snippets and without colors.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let handler = GraphicalReportHandler::new_themed(GraphicalTheme::unicode_nocolor());
        match handler.render_report(&mut out, self) {
            Ok(()) => out,
            Err(_) => self.to_string(),
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.report.fmt(f)
    }
}

/// Delegates to the wrapped diagnostic, supplying the source text.
impl miette::Diagnostic for Report {
    fn code<'b>(&'b self) -> Option<Box<dyn fmt::Display + 'b>> {
        self.report.code()
    }

    fn diagnostic_source(&self) -> Option<&dyn Diagnostic> {
        self.report.diagnostic_source()
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.report.help()
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = miette::LabeledSpan> + '_>> {
        self.report.labels()
    }

    fn related<'a>(&'a self) -> Option<Box<dyn Iterator<Item = &'a dyn Diagnostic> + 'a>> {
        self.report.related()
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(self.source_code.as_ref())
    }

    fn url<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.report.url()
    }

    fn severity(&self) -> Option<Severity> {
        self.report.severity()
    }
}

/// A diagnostic that can be turned into a [`Report`].
///
/// Blanket-implemented for every miette diagnostic that is thread safe and
/// `'static`, so the lexer, parser and resolver error enums need nothing
/// extra.
pub trait NablaError: Diagnostic + Send + Sync + Display + Error + 'static {
    fn report(self, file: &SourceFile) -> Report
    where
        Self: Sized;
}

impl<T: Diagnostic + Send + Sync + Display + Error + 'static> NablaError for T {
    fn report(self, file: &SourceFile) -> Report {
        Report::new(file, self)
    }
}
