//! Error types for essayguard-core.

use thiserror::Error;

/// Errors that can occur when working with configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to deserialize configuration.
    #[error("invalid configuration: {0}")]
    Deserialize(#[from] Box<figment::Error>),

    /// Configuration file not found after searching all locations.
    #[error("no configuration file found")]
    NotFound,

    /// A custom detection rule was rejected.
    #[error(transparent)]
    Rules(#[from] CatalogError),

    /// Scoring constants that cannot produce a score.
    #[error("invalid scoring settings: {0}")]
    Scoring(String),
}

/// Result type alias using [`ConfigError`].
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while building the pattern catalog.
///
/// These are startup failures: a catalog that cannot be built makes every
/// later analysis meaningless, so callers should treat them as fatal.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// The rule's pattern is not a valid regular expression.
    #[error("rule `{id}` has an invalid pattern: {source}")]
    InvalidPattern {
        /// Rule identifier.
        id: String,
        /// Underlying regex error.
        #[source]
        source: regex::Error,
    },

    /// The rule's pattern matches the empty string.
    #[error("rule `{id}` matches the empty string")]
    EmptyMatch {
        /// Rule identifier.
        id: String,
    },

    /// The rule's weight is zero.
    #[error("rule `{id}` must have a positive weight")]
    ZeroWeight {
        /// Rule identifier.
        id: String,
    },

    /// The rule has no default replacement.
    #[error("rule `{id}` has an empty default fix")]
    EmptyDefaultFix {
        /// Rule identifier.
        id: String,
    },

    /// Two rules share an identifier.
    #[error("duplicate rule id `{id}`")]
    DuplicateId {
        /// Rule identifier.
        id: String,
    },
}

/// Result type alias using [`CatalogError`].
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Input rejected before any pattern work is attempted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    /// The text is empty or whitespace only.
    #[error("no text to analyze")]
    Empty,

    /// The text is shorter than the configured minimum.
    #[error("text is too short: {chars} characters (minimum {min})")]
    TooShort {
        /// Character count of the trimmed input.
        chars: usize,
        /// Configured minimum.
        min: usize,
    },

    /// The text is longer than the configured maximum.
    #[error("text is too long: {chars} characters (maximum {max})")]
    TooLong {
        /// Character count of the trimmed input.
        chars: usize,
        /// Configured maximum.
        max: usize,
    },

    /// The usage gate refused this request.
    #[error("analysis not permitted for this request")]
    NotPermitted,
}

/// Errors that can occur during text analysis.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// The input failed validation.
    #[error(transparent)]
    Input(#[from] InputError),
}

impl AnalysisError {
    /// Returns the input error, if this is one.
    pub const fn as_input(&self) -> Option<&InputError> {
        match self {
            Self::Input(e) => Some(e),
        }
    }
}

/// Result type alias using [`AnalysisError`].
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Failures of the optional language-model collaborator.
///
/// Never surfaced from analysis; the engine logs them and falls back to
/// the pattern-based score.
#[derive(Error, Debug)]
pub enum ModelError {
    /// No API key was found in the configured environment variable.
    #[error("missing credentials: ${var} is not set")]
    MissingCredentials {
        /// Environment variable that was consulted.
        var: String,
    },

    /// The model did not answer within the deadline.
    #[error("model request timed out after {ms} ms")]
    Timeout {
        /// Deadline in milliseconds.
        ms: u64,
    },

    /// The request could not be sent or the body could not be read.
    #[error("model transport error: {0}")]
    Transport(String),

    /// The service answered with a non-success status.
    #[error("model service returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body (truncated).
        body: String,
    },

    /// The answer could not be interpreted.
    #[error("malformed model response: {0}")]
    Malformed(String),
}

/// Result type alias using [`ModelError`].
pub type ModelResult<T> = Result<T, ModelError>;
