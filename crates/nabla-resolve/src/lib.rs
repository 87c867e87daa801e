//! Name resolution and schema checking for the Nabla configuration language.
//!
//! Resolution runs in passes over a parsed [`Program`](nabla_syntax::ast::Program):
//! definitions are registered per document, merged with the definitions of
//! imported modules, `use` declarations are bound, reference cycles are
//! detected, and finally every bare expression is evaluated against its
//! schema into a [`Value`].
//!
//! ```
//! use nabla_resolve::{resolve, ExternalSymbols};
//!
//! let source = r#"
//! def Config = {
//!     input_file: String
//!     output_folder: String = "build/"
//!     version: 1 | 2 = 2
//! }
//! Config { input_file = "input.txt" }
//! "#;
//! let parse = nabla_syntax::parse(source).unwrap();
//! let resolution = resolve(&parse.program, &ExternalSymbols::empty()).unwrap();
//! assert!(resolution.diagnostics.is_empty());
//! let value = resolution.instantiations[0].value.as_ref().unwrap();
//! assert_eq!(
//!     value.to_string(),
//!     r#"{input_file: "input.txt", output_folder: "build/", version: 2}"#
//! );
//! ```

mod core;
pub mod cycles;
pub mod error;
mod eval;
pub mod imports;
pub mod symbol;
mod types;
mod validate;
pub mod value;

pub use crate::core::{resolve, resolve_with_limits, ExternalSymbols, Instantiation, Resolution, ROOT_LOCATION};
pub use cycles::{CycleDetector, ResolveState};
pub use error::{LocatedError, ResolutionError, ResolveResult};
pub use symbol::{Binding, DefId, Document, DocumentId, LetId, ModuleId, SymbolTable};
pub use types::BuiltIn;
pub use value::{Number, Object, Value};
