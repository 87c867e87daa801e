//! Lexer, syntax tree and fault-tolerant parser for the Nabla configuration
//! language.
//!
//! ```
//! use nabla_syntax::{parse, ast::Global};
//!
//! let parse = parse("def Port = Number\nPort").unwrap();
//! assert!(parse.diagnostics.is_empty());
//! assert!(matches!(parse.program.globals[0], Global::Def(_)));
//! ```

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;

pub use error::{LexWarning, ParseDiagnostic, SyntaxError, SyntaxResult};
pub use lexer::{lex, lex_warnings, Token, TokenKind};
pub use parser::{parse, parse_with_limits, sync, Parse, SyncSet};
