use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

/// Errors found while registering, importing and evaluating definitions.
///
/// All of them are collected and resolution continues, except
/// `DepthLimitExceeded`, which aborts the pass.
#[derive(Debug, Error, Diagnostic, Clone, Hash, PartialEq, Eq)]
pub enum ResolutionError {
    /// The same name is bound twice in one scope: two defs, two lets, a def
    /// and a let, or an explicit import clashing with either.
    #[error("Duplicate definition: `{name}` is defined multiple times")]
    #[diagnostic(code(nabla_resolve::duplicate_definition))]
    DuplicateDefinition {
        name: String,
        #[label("redefined here")]
        span: SourceSpan,
        /// Missing when the first definition lives in another document
        #[label("first defined here")]
        previous_span: Option<SourceSpan>,
        #[help]
        note: Option<String>,
    },

    #[error("Unresolved name: could not find `{name}` in this scope")]
    #[diagnostic(code(nabla_resolve::unresolved_name))]
    UnresolvedName {
        name: String,
        #[label("referenced here")]
        span: SourceSpan,
        #[help]
        help: Option<String>,
    },

    #[error("Unresolved import: `{path}` is neither a module nor a definition")]
    #[diagnostic(
        code(nabla_resolve::unresolved_import),
        help("check that the module is part of the build and the item is spelled correctly")
    )]
    UnresolvedImport {
        path: String,
        #[label("imported here")]
        span: SourceSpan,
    },

    #[error("An alias can only rename a single imported item")]
    #[diagnostic(
        code(nabla_resolve::misplaced_alias),
        help("move the alias next to the item, e.g. `use a::{{b as c}}`")
    )]
    MisplacedAlias {
        #[label("this alias has nothing to rename")]
        span: SourceSpan,
    },

    #[error("Cyclic type: `{name}` is defined in terms of itself ({cycle})")]
    #[diagnostic(
        code(nabla_resolve::cyclic_type),
        help("break the cycle with a struct field or list, e.g. `{{ next: Node | null = null }}`")
    )]
    CyclicType {
        name: String,
        cycle: String,
        #[label("part of a reference cycle")]
        span: SourceSpan,
    },

    #[error("Type mismatch: expected {expected}, found {found}")]
    #[diagnostic(code(nabla_resolve::type_mismatch))]
    TypeMismatch {
        expected: String,
        found: String,
        #[label("this value does not fit")]
        span: SourceSpan,
    },

    #[error("Missing field `{field}` of `{schema}`")]
    #[diagnostic(
        code(nabla_resolve::missing_field),
        help("set `{field}` here or give it a default in the schema")
    )]
    MissingField {
        field: String,
        schema: String,
        #[label("`{field}` is required")]
        span: SourceSpan,
    },

    #[error("Unknown field `{field}` for `{schema}`")]
    #[diagnostic(code(nabla_resolve::unknown_field))]
    UnknownField {
        field: String,
        schema: String,
        #[label("not declared in the schema")]
        span: SourceSpan,
    },

    #[error("Duplicate field `{field}`")]
    #[diagnostic(code(nabla_resolve::duplicate_field))]
    DuplicateField {
        field: String,
        #[label("repeated here")]
        span: SourceSpan,
        #[label("first set here")]
        previous_span: SourceSpan,
    },

    #[error("`{name}` has no value")]
    #[diagnostic(code(nabla_resolve::missing_value), help("write `{name} = <value>`"))]
    MissingValue {
        name: String,
        #[label("value expected")]
        span: SourceSpan,
    },

    #[error("Unions cannot be used as values")]
    #[diagnostic(
        code(nabla_resolve::union_in_value),
        help("unions describe types; pick one alternative")
    )]
    UnionInValue {
        #[label("union in value position")]
        span: SourceSpan,
    },

    #[error("`{name}` is a type, not a value")]
    #[diagnostic(code(nabla_resolve::type_as_value))]
    TypeAsValue {
        name: String,
        #[label("used as a value here")]
        span: SourceSpan,
    },

    #[error("Field aliases must be strings")]
    #[diagnostic(code(nabla_resolve::alias_must_be_string), help("write `as \"name\"`"))]
    AliasMustBeString {
        #[label("identifier alias on a field")]
        span: SourceSpan,
    },

    #[error("Import aliases must be identifiers")]
    #[diagnostic(code(nabla_resolve::alias_must_be_ident), help("write `as name` without quotes"))]
    AliasMustBeIdent {
        #[label("string alias on an import")]
        span: SourceSpan,
    },

    #[error("Schema nesting deeper than the configured limit of {limit}")]
    #[diagnostic(
        code(nabla_resolve::depth_limit),
        help("a default may instantiate its own schema; otherwise raise `limits.max_depth`")
    )]
    DepthLimitExceeded {
        limit: usize,
        #[label("limit exceeded while evaluating this")]
        span: SourceSpan,
    },
}

/// A resolution error raised in a document other than the one being resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedError {
    pub location: String,
    pub error: ResolutionError,
}

pub type ResolveResult<T> = std::result::Result<T, ResolutionError>;
