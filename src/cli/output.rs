//! Terminal output formatting with colors
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically.

use std::io::{self, Write};

use colored::Colorize;

use crate::domain::Help;

/// Write error (red bold "error:" prefix)
pub fn error(w: &mut impl Write, msg: &(impl std::fmt::Display + ?Sized)) -> io::Result<()> {
    writeln!(w, "{}: {}", "error".red().bold(), msg)
}

/// Write help text with cyan bold section headers
pub fn help(w: &mut impl Write, help: &Help) -> io::Result<()> {
    write!(w, "{}", help.render_with(|s| s.cyan().bold().to_string()))
}

/// Write plain output (no color, for JSON payloads)
pub fn info(w: &mut impl Write, msg: &(impl std::fmt::Display + ?Sized)) -> io::Result<()> {
    writeln!(w, "{}", msg)
}
