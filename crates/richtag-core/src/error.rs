//! Error types for richtag operations.

use miette::Diagnostic;
use smol_str::SmolStr;

/// Failure of a single toggle request. The caller must not mutate text or
/// selection when one of these is returned.
#[derive(thiserror::Error, Debug, Diagnostic)]
#[non_exhaustive]
pub enum MarkupError {
    /// Tag name not present in the registry
    #[error("unknown tag: {name}")]
    #[diagnostic(code(richtag::unknown_tag))]
    UnknownTag { name: SmolStr },

    /// Argument rejected by the tag's validator
    #[error("invalid {name}, value: {argument}")]
    #[diagnostic(
        code(richtag::invalid_argument),
        help("the value does not match the format this tag accepts")
    )]
    InvalidArgument { name: SmolStr, argument: String },

    /// Detection pattern failed to compile
    #[error(transparent)]
    #[diagnostic(code(richtag::pattern))]
    Pattern(#[from] regex::Error),
}

impl MarkupError {
    pub fn unknown_tag(name: impl Into<SmolStr>) -> Self {
        Self::UnknownTag { name: name.into() }
    }

    pub fn invalid_argument(name: impl Into<SmolStr>, argument: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name: name.into(),
            argument: argument.into(),
        }
    }
}

/// Errors raised while loading an [`EditorConfig`](crate::config::EditorConfig).
#[derive(thiserror::Error, Debug, Diagnostic)]
#[non_exhaustive]
pub enum ConfigError {
    /// Config file could not be read
    #[error(transparent)]
    #[diagnostic(code(richtag::config::io))]
    Io(#[from] std::io::Error),

    /// Config is not valid JSON for the expected shape
    #[error(transparent)]
    #[diagnostic(code(richtag::config::json))]
    Json(#[from] serde_json::Error),

    /// A tag's validator is not a valid regular expression
    #[error("invalid validator for tag `{tag}`")]
    #[diagnostic(code(richtag::config::validator))]
    InvalidValidator {
        tag: SmolStr,
        #[source]
        source: regex::Error,
    },
}
