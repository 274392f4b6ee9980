//! Registration errors.
//!
//! These describe defects in a tool's own option declarations, never bad user
//! input. The panicking registration methods turn them into a fixed
//! diagnostic; the `try_*` variants hand them back.

use thiserror::Error;

/// Contract violations detected while registering options and subcommands.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// Two options share a name (or alias) in one subcommand table.
    #[error("option '{option}' registered more than once in {subcommand}")]
    DuplicateOption { option: String, subcommand: String },
    /// Two subcommands share a name.
    #[error("subcommand '{0}' registered more than once")]
    DuplicateSubCommand(String),
    /// Named subcommands need a non-empty name; the empty name is reserved.
    #[error("subcommand name cannot be empty")]
    EmptySubCommandName,
    /// A subcommand already has a consume-after option.
    #[error("cannot specify more than one ConsumeAfter option in {0}")]
    DuplicateConsumeAfter(String),
    /// Grouping options are combined character by character.
    #[error("grouping option '{0}' must have a single-character name")]
    GroupingNameLength(String),
    /// Only positional, sink and consume-after options may be anonymous.
    #[error("option must have a name unless it is positional, a sink, or ConsumeAfter")]
    MissingName,
    /// A multi-valued option cannot also forbid values.
    #[error("option '{0}' is multi-valued but does not allow a value")]
    MultiValueDisallowed(String),
    /// The option was scoped to a subcommand that is not registered.
    #[error("option '{0}' refers to an unregistered subcommand")]
    UnknownSubCommand(String),
}

/// Convenience alias for registration results.
pub type Result<T> = std::result::Result<T, RegistrationError>;
