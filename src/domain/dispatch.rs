//! Dispatcher: routes an argument vector through a command tree.
//!
//! Two states: `Root` (no subcommand resolved yet, root flags split out of
//! the whole vector) and `Dispatched` (a subcommand resolved, its own flags
//! parsed sequentially from its slice).

use generational_arena::Index;
use tracing::{debug, instrument};

use crate::domain::command::{Behavior, CommandTree, Context};
use crate::domain::error::{DispatchError, DispatchResult};
use crate::domain::flags::{FlagRegistry, FlagToken, TERMINATOR};
use crate::domain::help::{self, Help};
use crate::domain::splitter::split_root_flags;

/// Result of a successful dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    /// A handler ran and produced its payload.
    Completed(T),
    /// Help was requested; no handler ran.
    Help(Help),
}

enum State {
    Root {
        root_args: Vec<String>,
        remainder: Vec<String>,
    },
    Dispatched {
        node: Index,
        args: Vec<String>,
    },
}

enum Step {
    Next(State),
    Invoke { node: Index, positionals: Vec<String> },
}

/// Parse `args` against `tree` and run the resolved handler.
///
/// A help token anywhere in `args` short-circuits before any parsing.
#[instrument(level = "debug", skip(tree))]
pub fn dispatch<T>(tree: &mut CommandTree<T>, args: &[String]) -> DispatchResult<Outcome<T>> {
    if help::requested(args) {
        let target = help::locate(tree, args);
        debug!(command = %tree.path(target), "help requested");
        return Ok(Outcome::Help(help::render(tree, target)));
    }

    let root = tree.root();
    let split = {
        let empty = FlagRegistry::new();
        split_root_flags(args, tree.flags(root).unwrap_or(&empty))?
    };
    let mut state = State::Root {
        root_args: split.root_args,
        remainder: split.remainder,
    };

    let (node, positionals) = loop {
        let step = match state {
            State::Root {
                root_args,
                remainder,
            } => {
                tree.parse_flags(root, &root_args)?;
                let positionals = match remainder.split_first() {
                    Some((first, rest)) if first == TERMINATOR => rest.to_vec(),
                    Some((first, _)) => {
                        if let Some(flag) = FlagToken::parse(first) {
                            return Err(DispatchError::UnknownFlag(flag.raw.to_string()));
                        }
                        remainder
                    }
                    None => remainder,
                };
                route(tree, root, positionals)?
            }
            State::Dispatched { node, args } => {
                let positionals = tree.parse_flags(node, &args)?;
                route(tree, node, positionals)?
            }
        };
        match step {
            Step::Next(next) => state = next,
            Step::Invoke { node, positionals } => break (node, positionals),
        }
    };

    debug!(command = %tree.path(node), ?positionals, "invoking handler");
    let command = tree
        .command(node)
        .ok_or_else(|| DispatchError::MissingCommand(tree.path(root)))?;
    match command.behavior() {
        Behavior::Handler(handler) => {
            let ctx = Context::new(tree, node, &positionals);
            Ok(Outcome::Completed(handler(&ctx)))
        }
        Behavior::Group => Err(DispatchError::MissingCommand(tree.path(node))),
    }
}

/// Decide where `positionals` lead from `node`.
fn route<T>(tree: &CommandTree<T>, node: Index, positionals: Vec<String>) -> DispatchResult<Step> {
    let runnable = tree.command(node).is_some_and(|c| c.is_runnable());

    let Some(first) = positionals.first() else {
        return if runnable {
            Ok(Step::Invoke { node, positionals })
        } else {
            Err(DispatchError::MissingCommand(tree.path(node)))
        };
    };

    if let Some(child) = tree.child(node, first) {
        debug!(command = %tree.path(child), "dispatching");
        return Ok(Step::Next(State::Dispatched {
            node: child,
            args: positionals[1..].to_vec(),
        }));
    }
    if runnable {
        Ok(Step::Invoke { node, positionals })
    } else {
        Err(DispatchError::UnknownCommand(first.clone()))
    }
}
