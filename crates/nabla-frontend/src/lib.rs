//! Driver for the Nabla frontend.
//!
//! Ties the pipeline stages together: every document is parsed, the module
//! documents are merged into one set of external symbols, and the root
//! document is resolved against them. Diagnostics from every stage come out
//! as [`Report`]s attached to the document they point into.
//!
//! ```
//! use nabla_frontend::{Frontend, ModuleSource};
//! use nabla_source::{NablaConfig, SourceFile};
//!
//! let net = ModuleSource::new("net", SourceFile::new("net.nabla", "def Port = 1 | 2"));
//! let root = SourceFile::new("main.nabla", "use net::Port\ndef S = { port: Port = 2 }\nS {}");
//!
//! let compilation = Frontend::new(NablaConfig::default()).compile(&root, &[net]);
//! assert!(!compilation.has_errors());
//! assert_eq!(compilation.values()[0].to_string(), "{port: 2}");
//! ```

mod driver;

pub use driver::{Compilation, Frontend, ModuleSource};
pub use nabla_source::Report;
