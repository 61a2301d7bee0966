//! Pre-pass separating root flags from the rest of the argument vector.
//!
//! A single sequential scan cannot tell which flags belong to the root before
//! the subcommand is known, so root flags are lifted out of the whole vector
//! first. Root flags are therefore accepted before and after the subcommand
//! name; a bare `--` ends the scan.

use tracing::{debug, instrument};

use crate::domain::error::{DispatchError, DispatchResult};
use crate::domain::flags::{FlagRegistry, FlagToken, TERMINATOR};

/// Result of splitting an argument vector.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Split {
    /// Root flags with their values, in input order
    pub root_args: Vec<String>,
    /// Everything else, in input order
    pub remainder: Vec<String>,
}

#[instrument(level = "debug", skip(root))]
pub fn split_root_flags(args: &[String], root: &FlagRegistry) -> DispatchResult<Split> {
    let mut split = Split::default();
    let mut tokens = args.iter();

    while let Some(token) = tokens.next() {
        if token == TERMINATOR {
            split.remainder.push(token.clone());
            split.remainder.extend(tokens.by_ref().cloned());
            break;
        }
        let registered = FlagToken::parse(token)
            .and_then(|parsed| root.lookup(parsed.name).map(|flag| (parsed, flag)));
        match registered {
            Some((parsed, flag)) => {
                split.root_args.push(token.clone());
                if parsed.value.is_none() && flag.kind().takes_value() {
                    let value = tokens
                        .next()
                        .ok_or_else(|| DispatchError::MissingFlagValue(parsed.name.to_string()))?;
                    split.root_args.push(value.clone());
                }
            }
            None => split.remainder.push(token.clone()),
        }
    }

    debug!(root_args = ?split.root_args, remainder = ?split.remainder, "split");
    Ok(split)
}
