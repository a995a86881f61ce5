use std::fmt::Display;
use thiserror::Error;

/// non-public (for now)
#[derive(Error, Debug)]
pub enum TidelineErrorVariants {
    /// Error reported by a history source
    #[error("error in tideline history: {0}")]
    HistoryError(String),

    /// History does not support a feature
    #[error("the history {history} does not support feature {feature}")]
    HistoryFeatureUnsupported {
        /// Custom display name for the history
        history: &'static str,

        /// Unsupported feature
        feature: &'static str,
    },

    /// Syntax error in an inputrc-style binding file
    #[error("binding parse error at line {line}: {message}")]
    BindingParseError {
        /// 1-based line in the configuration text
        line: usize,

        /// What went wrong
        message: String,
    },

    /// The search pattern could not be compiled
    #[error("invalid search pattern: {0}")]
    InvalidRegex(String),

    /// I/O error
    #[error("I/O error: {0}")]
    IOError(std::io::Error),
}

/// separate struct to not expose anything to the public (for now)
#[derive(Debug)]
pub struct TidelineError(pub TidelineErrorVariants);

impl From<std::io::Error> for TidelineError {
    fn from(err: std::io::Error) -> Self {
        Self(TidelineErrorVariants::IOError(err))
    }
}

impl Display for TidelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
impl std::error::Error for TidelineError {}

/// Standard [`std::result::Result`], with [`TidelineError`] as the error variant
pub type Result<T> = std::result::Result<T, TidelineError>;
