use miette::Diagnostic;
use thiserror::Error;

/// Errors raised while loading a `nabla.toml` manifest.
#[derive(Debug, Error, Diagnostic, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("Invalid configuration: {0}")]
    #[diagnostic(
        code(nabla_source::config_parse),
        help("Check the manifest's TOML syntax")
    )]
    ConfigParseError(String),

    #[error("Limit `{name}` must be greater than zero")]
    #[diagnostic(code(nabla_source::invalid_limit))]
    InvalidLimit { name: &'static str },

    #[error("Invalid module path `{0}`")]
    #[diagnostic(
        code(nabla_source::invalid_module_path),
        help("Module paths are identifiers separated by `::`, e.g. `net::http`")
    )]
    InvalidModulePath(String),

    #[error("Module `{0}` lists no files")]
    #[diagnostic(code(nabla_source::empty_module))]
    EmptyModule(String),
}

impl From<toml::de::Error> for SourceError {
    fn from(err: toml::de::Error) -> Self {
        SourceError::ConfigParseError(err.to_string())
    }
}

pub type SourceResult<T> = std::result::Result<T, SourceError>;
