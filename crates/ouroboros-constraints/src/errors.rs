//! Configuration error types
//!
//! Everything in here is a programming or configuration mistake that aborts a
//! validation run. Data that fails a constraint is never an error; it is
//! recorded as a [`ValidationResult`](crate::result::ValidationResult) instead.

use thiserror::Error;

/// Errors raised while setting up or driving a validation run
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A constraint names a validator the registry does not know
    #[error("no validator registered as {0}")]
    UnregisteredValidator(String),

    /// The `groups` parameter is neither a string nor a list of strings
    #[error("invalid groups for constraint {key}: expected a string or a list of strings")]
    InvalidGroups {
        /// Key of the offending constraint
        key: String,
    },

    /// A constraint shorthand could not be recognized
    #[error("invalid constraint: {0}")]
    InvalidConstraint(String),

    /// A rule table entry could not be recognized
    #[error("invalid rule for {type_key}.{property}: {reason}")]
    InvalidRule {
        /// Type the rule belongs to
        type_key: String,
        /// Property the rule belongs to
        property: String,
        /// What was wrong with it
        reason: String,
    },

    /// Unsupported enumeration mode name
    #[error("unrecognized enumeration mode: {0}")]
    UnknownEnumerationMode(String),

    /// Model path lookup past the top of the tree
    #[error("index ({index}) should not exceed the depth of the model tree ({depth})")]
    PathIndexOutOfRange {
        /// Requested number of steps up
        index: usize,
        /// Number of entries in the model path
        depth: usize,
    },

    /// `pop_path` without a matching `push_path`
    #[error("cannot pop the validation path: nothing was pushed")]
    PathUnderflow,
}

/// Result type for operations that can fail with a [`ConfigError`]
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            ConfigError::UnregisteredValidator("futureDate".to_string()).to_string(),
            "no validator registered as futureDate"
        );
        assert_eq!(
            ConfigError::PathIndexOutOfRange { index: 4, depth: 2 }.to_string(),
            "index (4) should not exceed the depth of the model tree (2)"
        );
    }
}
