//! Error types for the docsift-core library.

use thiserror::Error;

/// Main error type for the docsift library.
///
/// Every failure is returned as a value; the engine never panics on user
/// input. Out-of-range page selectors are not an error at all and are
/// silently dropped during resolution.
#[derive(Error, Debug)]
pub enum SiftError {
    /// The document path is missing or has the wrong extension.
    #[error("invalid path: {0}")]
    PathInvalid(String),

    /// A required external tool could not be found on the search path.
    #[error("{tool} is not available: {hint}")]
    CollaboratorUnavailable {
        tool: &'static str,
        hint: &'static str,
    },

    /// An external tool ran but exited with a failure.
    #[error("{tool} failed: {stderr}")]
    CollaboratorExecutionFailed {
        tool: &'static str,
        stderr: String,
    },

    /// The template store holds no definitions at all.
    #[error("no templates available")]
    NoTemplatesAvailable,

    /// Every template scored zero against the document.
    #[error("no template found")]
    NoTemplateFound,

    /// Two or more templates tied for the highest nonzero score.
    #[error("no clearly assignable template found")]
    AmbiguousTemplate,

    /// A store operation referenced an unknown template id.
    #[error("template {0} doesn't exist")]
    TemplateNotFound(String),

    /// A page-selector token was neither "a", "l" nor a positive integer.
    #[error("invalid page selector token: {0:?}")]
    SelectorInvalid(String),

    /// A template or field-pattern regex is unusable as configured.
    #[error("invalid pattern configuration: {0}")]
    PatternConfigInvalid(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A template definition or record could not be read or written as JSON.
    #[error("definition error: {0}")]
    Definition(#[from] serde_json::Error),
}

/// Result type for the docsift library.
pub type Result<T> = std::result::Result<T, SiftError>;
