//! Error type shared by configuration validation and progress reporting.

use std::{fmt::Display, io};

use thiserror::Error;

/// Errors produced while building a bar or reporting progress to it.
#[derive(Debug, Error)]
pub enum Error {
    /// A configuration field or a reported count violates its constraint.
    #[error("argument `{name}` (is {value}) {expected}")]
    InvalidArgument {
        /// Name of the offending field or argument.
        name: &'static str,
        /// The rejected value, rendered for display.
        value: String,
        /// The constraint the value should have satisfied.
        expected: &'static str,
    },

    /// Writing to the output sink or spawning a timer thread failed.
    #[error("progress output failed: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    pub(crate) fn invalid(name: &'static str, value: impl Display, expected: &'static str) -> Self {
        Self::InvalidArgument {
            name,
            value: value.to_string(),
            expected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Error;

    /// Message Shape
    /// The message names the field, the rejected value and the constraint.
    #[test]
    fn test_invalid_argument_message() {
        let err = Error::invalid("width", 0, "should be integer > 0");

        assert_eq!(
            err.to_string(),
            "argument `width` (is 0) should be integer > 0"
        );
    }
}
