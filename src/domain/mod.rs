//! Domain layer: the command dispatch engine
//!
//! This layer is independent of external concerns (no I/O, no process state).

pub mod command;
pub mod dispatch;
pub mod error;
pub mod flags;
pub mod help;
pub mod splitter;

pub use command::{Behavior, Command, CommandTree, Context, Handler};
pub use dispatch::{dispatch, Outcome};
pub use error::{DefinitionError, DispatchError, DispatchResult};
pub use flags::{Flag, FlagHandle, FlagKind, FlagRegistry, FlagType, FlagValue};
pub use help::Help;
pub use splitter::{split_root_flags, Split};
