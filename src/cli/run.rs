//! Process-level driver: execute, print, pick the exit code.

use std::ffi::OsString;
use std::io::Write;

use tracing::{debug, instrument};

use crate::application::{execute, ApplicationError};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::domain::Outcome;
use crate::exitcode;

/// Convert raw process arguments, rejecting any that are not valid UTF-8.
pub fn collect_args(raw: impl IntoIterator<Item = OsString>) -> CliResult<Vec<String>> {
    raw.into_iter()
        .map(|arg| {
            arg.into_string().map_err(|bad| {
                CliError::InvalidArgs(format!("argument is not valid UTF-8: {:?}", bad))
            })
        })
        .collect()
}

/// Like [`run`], starting from raw process arguments (program name excluded).
pub fn run_os(
    raw: impl IntoIterator<Item = OsString>,
    out: &mut impl Write,
    err: &mut impl Write,
) -> i32 {
    match collect_args(raw) {
        Ok(args) => run(&args, out, err),
        Err(e) => {
            let _ = output::error(err, &e);
            e.exit_code()
        }
    }
}

/// Run one invocation, writing the payload or help to `out` and errors to `err`.
///
/// Returns the process exit code.
pub fn run(args: &[String], out: &mut impl Write, err: &mut impl Write) -> i32 {
    match execute_command(args, out) {
        Ok(()) => exitcode::OK,
        Err(e) => {
            debug!(error = ?e, "invocation failed");
            // Nothing left to report to if stderr itself is gone.
            let _ = output::error(err, &e);
            e.exit_code()
        }
    }
}

#[instrument(level = "debug", skip(out))]
fn execute_command(args: &[String], out: &mut impl Write) -> CliResult<()> {
    match execute(args)? {
        Outcome::Completed(action) => {
            let json = action.to_json().map_err(ApplicationError::from)?;
            output::info(out, &json).map_err(|e| CliError::io("payload", e))
        }
        Outcome::Help(help) => output::help(out, &help).map_err(|e| CliError::io("help", e)),
    }
}
