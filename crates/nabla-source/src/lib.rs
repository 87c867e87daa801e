//! Source documents, configuration and diagnostic reports for the Nabla frontend.
//!
//! This crate sits underneath the lexer, parser and resolver. It provides:
//! - [`SourceFile`], a named source text handed in by whoever reads files
//! - [`NablaConfig`] and [`Limits`], loaded from a `nabla.toml` manifest
//! - [`Report`], which attaches source text to any miette diagnostic so it
//!   can be rendered with labels and help

mod config;
mod diagnostic;
mod error;
mod file;

pub use config::{Limits, ModuleConfig, NablaConfig, PackageInfo, default_entry_point};
pub use diagnostic::{NablaError, Report};
pub use error::{SourceError, SourceResult};
pub use file::SourceFile;
