//! Command grammar engine for the traffic-management shell.
//!
//! This crate turns a tree of command fragments into two operations that
//! share one state machine:
//!
//! - [`CommandSpec::parse`]: strict parsing of a full line into a
//!   [`ParsedCommand`], failing with a [`ParseError`].
//! - [`CommandSpec::suggest`]: best-effort completion of a partial line into
//!   a list of [`Suggestion`]s; never fails.
//!
//! Lines are split by [`tokenize`], which honors double-quote grouping.
//! Command words are matched case-insensitively; `-name` introduces a named
//! argument and flags take no value.
//!
//! # Example
//!
//! ```
//! use traffic_shell_core::*;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! enum Code {
//!     CreateCloudPlatform,
//! }
//!
//! let spec: CommandSpec<Code> = CommandSpec::new().with_command(
//!     "create",
//!     CommandFragment::new("Create resources")
//!         .with_named("shortName", NamedArg::value("Set the short name"))
//!         .with_sub(
//!             "platform",
//!             CommandFragment::new("Create a platform").with_sub(
//!                 "cloud",
//!                 CommandFragment::new("New public cloud platform")
//!                     .with_code(Code::CreateCloudPlatform)
//!                     .with_positional(PositionalArg::required("name", "Name of platform"))
//!                     .with_named("force", NamedArg::flag("Skip checks")),
//!             ),
//!         ),
//! );
//! assert!(validate_spec(&spec).is_empty());
//!
//! let cmd = spec.parse(r#"create platform cloud "west zone" -force"#).unwrap();
//! assert_eq!(cmd.code, Code::CreateCloudPlatform);
//! assert_eq!(cmd.arg("name"), Some("west zone"));
//!
//! let hints = spec.suggest("create platform cloud fred -sh");
//! assert_eq!(hints[0].text, "-shortName");
//! ```

mod engine;
mod error;
mod suggest;
mod tokenize;
mod types;
mod validate;

pub use error::{ParseError, Result};
pub use suggest::{filter_contains, filter_has_prefix, sort_suggestions};
pub use tokenize::{Tokens, tokenize};
pub use types::*;
pub use validate::{ValidationError, validate_spec};
