/// Error types for the fastmatcher library
use std::fmt;

/// Result type alias for matcher operations
pub type Result<T> = std::result::Result<T, MatcherError>;

/// Main error type for matcher operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatcherError {
    /// Operation not valid in the matcher's current mode
    /// (e.g. `feed` on a batch matcher)
    Mode(String),

    /// Operation requires built engines but none have been built yet
    NotBuilt(String),

    /// Pattern-related errors
    InvalidPattern(String),
}

impl fmt::Display for MatcherError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatcherError::Mode(msg) => write!(f, "Mode error: {}", msg),
            MatcherError::NotBuilt(msg) => write!(f, "Not built: {}", msg),
            MatcherError::InvalidPattern(msg) => write!(f, "Invalid pattern: {}", msg),
        }
    }
}

impl std::error::Error for MatcherError {}
