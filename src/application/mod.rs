//! Application layer: the `valkey-demo` command set
//!
//! Builds the demo command tree on top of the domain engine and turns a
//! resolved invocation into an [`Action`].

pub mod error;
pub mod payload;
pub mod valkey;

pub use error::{ApplicationError, ApplicationResult};
pub use payload::{Action, GlobalOptions};
pub use valkey::{build_tree, execute, PROGRAM_NAME};
