//! CLI layer: output formatting and the process driver

pub mod error;
pub mod output;
pub mod run;

pub use error::{CliError, CliResult};
pub use run::{collect_args, run, run_os};
