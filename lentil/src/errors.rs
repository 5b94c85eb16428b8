use thiserror::Error;

/// Failures surfaced to the caller.
///
/// Bookkeeping defects inside the sampler (a count driven below zero, a
/// token without an assignment) are not represented here; they panic.
#[derive(Debug, Error)]
pub enum LdaError {
    /// Invalid hyperparameters or corpus dimensions, detected before sampling
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A numeric field of the corpus file is not a non-negative integer
    #[error("line {line}: cannot parse {field:?} as a non-negative integer")]
    Parse {
        /// 1-based line number
        line: usize,
        /// The offending text
        field: String,
        /// Underlying integer parse error
        #[source]
        source: std::num::ParseIntError,
    },

    /// Reading or writing a file failed
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result alias for this crate
pub type Result<T> = std::result::Result<T, LdaError>;

/// Shorthand for [`LdaError::Config`]
pub(crate) fn config_error(msg: impl Into<String>) -> LdaError {
    LdaError::Config(msg.into())
}
