//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Errors raised while parsing an argument vector or routing it to a command.
///
/// All of them are deterministic for a given input, so none is retryable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("unknown flag: {0}")]
    UnknownFlag(String),

    #[error("flag needs an argument: --{0}")]
    MissingFlagValue(String),

    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("invalid boolean value {value:?} for flag --{flag}")]
    MalformedBooleanValue { flag: String, value: String },

    #[error("missing command for {0}; run with --help for usage")]
    MissingCommand(String),
}

/// Errors raised while declaring a command tree.
///
/// These are programming mistakes in the tree definition, not user input errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DefinitionError {
    #[error("flag redefined: {0}")]
    DuplicateFlag(String),

    #[error("invalid flag name: {0:?}")]
    InvalidFlagName(String),

    #[error("command {parent} already has a subcommand named {name}")]
    DuplicateCommand { parent: String, name: String },

    #[error("flag --{flag} on {command} is shadowed by the root flag of the same name")]
    ShadowedFlag { command: String, flag: String },

    #[error("command node does not belong to this tree")]
    UnknownNode,
}

/// Result type for dispatch operations.
pub type DispatchResult<T> = Result<T, DispatchError>;
