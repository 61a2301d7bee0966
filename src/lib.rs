//! Command dispatch engine with global flags, subcommands and per-command
//! flags, plus the `valkey-demo` command set built on top of it.
//!
//! Layers:
//! - [`domain`]: flag registries, command tree, root splitter, dispatcher, help
//! - [`application`]: the demo command tree and its action payloads
//! - [`cli`]: process driver, output and exit codes

pub mod application;
pub mod cli;
pub mod domain;
pub mod exitcode;
pub mod util;
