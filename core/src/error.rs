//! Parse errors.
//!
//! Every failure of [`CommandSpec::parse`](crate::CommandSpec::parse) is
//! terminal for that call; the caller reports it and prompts again.

use thiserror::Error;

/// Why a line could not be resolved to exactly one complete command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The line contained no tokens.
    #[error("empty command")]
    EmptyCommand,
    /// A word does not match any sub-command while descending the tree.
    #[error("unrecognised token '{token}' in command '{line}'")]
    UnrecognizedToken { token: String, line: String },
    /// A marker-prefixed token appeared where a required positional value
    /// was expected.
    #[error("unexpected named argument '{token}' while looking for positional argument '{expected}'")]
    UnexpectedNamedArg { token: String, expected: String },
    /// A bare word appeared after all positional arguments were consumed.
    #[error("expected '-' looking for named argument, not '{token}'")]
    ExpectedNamedArg { token: String },
    /// The named argument is not declared on the resolved command path.
    #[error("argument '{name}' not recognised")]
    UnknownArgument { name: String },
    /// A named argument is missing its value.
    #[error("incomplete argument '{name}'")]
    IncompleteArgument { name: String },
    /// The line ended before a complete command with all required positional
    /// arguments was reached.
    #[error("command incomplete, {missing}")]
    IncompleteCommand { missing: String },
}

/// Convenience alias for results with [`ParseError`].
pub type Result<T> = std::result::Result<T, ParseError>;
