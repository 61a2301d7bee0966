//! Help requests and help text.
//!
//! A help token anywhere in the vector wins over every parse or dispatch
//! error. The target command is found by following subcommand names from the
//! root, skipping flags and the values of value-taking flags known on the way.

use std::fmt;

use generational_arena::Index;
use itertools::Itertools;

use crate::domain::command::CommandTree;
use crate::domain::flags::{is_help_token, FlagKind, FlagRegistry, FlagToken, TERMINATOR};

/// One row of a flag table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpFlag {
    pub name: String,
    pub kind: FlagKind,
    pub default: String,
    pub usage: String,
}

impl HelpFlag {
    fn label(&self) -> String {
        match self.kind {
            FlagKind::Bool => format!("--{}", self.name),
            FlagKind::String => format!("--{} {}", self.name, self.kind),
        }
    }

    fn description(&self) -> String {
        match (self.kind, self.default.as_str()) {
            (FlagKind::Bool, "false") | (FlagKind::String, "") => self.usage.clone(),
            (_, default) => format!("{} (default {:?})", self.usage, default),
        }
    }
}

/// One row of the subcommand table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpCommand {
    pub name: String,
    pub about: String,
}

/// Help for a single command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Help {
    pub path: String,
    pub about: String,
    pub runnable: bool,
    pub flags: Vec<HelpFlag>,
    pub global_flags: Vec<HelpFlag>,
    pub commands: Vec<HelpCommand>,
}

impl Help {
    pub fn usage(&self) -> String {
        let mut usage = self.path.clone();
        if !self.flags.is_empty() || !self.global_flags.is_empty() {
            usage.push_str(" [flags]");
        }
        if !self.commands.is_empty() {
            usage.push_str(if self.runnable { " [command]" } else { " <command>" });
        }
        usage
    }

    /// Render with `heading` applied to section titles.
    pub fn render_with(&self, heading: impl Fn(&str) -> String) -> String {
        let mut out = String::new();
        if self.about.is_empty() {
            out.push_str(&self.path);
        } else {
            out.push_str(&format!("{} - {}", self.path, self.about));
        }
        out.push_str(&format!("\n\n{}\n  {}\n", heading("Usage:"), self.usage()));

        if !self.commands.is_empty() {
            let width = self.commands.iter().map(|c| c.name.len()).max().unwrap_or(0);
            let rows = self
                .commands
                .iter()
                .map(|c| format!("  {:<width$}  {}", c.name, c.about, width = width))
                .join("\n");
            out.push_str(&format!("\n{}\n{}\n", heading("Commands:"), rows));
        }
        for (title, flags) in [("Flags:", &self.flags), ("Global Flags:", &self.global_flags)] {
            if flags.is_empty() {
                continue;
            }
            let labels = flags.iter().map(HelpFlag::label).collect_vec();
            let width = labels.iter().map(String::len).max().unwrap_or(0);
            let rows = labels
                .iter()
                .zip(flags.iter())
                .map(|(label, flag)| format!("  {:<width$}  {}", label, flag.description(), width = width))
                .join("\n");
            out.push_str(&format!("\n{}\n{}\n", heading(title), rows));
        }
        out
    }
}

impl fmt::Display for Help {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render_with(|s| s.to_string()))
    }
}

/// Whether any token asks for help.
pub fn requested(args: &[String]) -> bool {
    args.iter().any(|token| is_help_token(token))
}

/// The command whose help should be shown for `args`.
pub fn locate<T>(tree: &CommandTree<T>, args: &[String]) -> Index {
    let mut node = tree.root();
    let mut tokens = args.iter();

    while let Some(token) = tokens.next() {
        if token == TERMINATOR {
            break;
        }
        if let Some(flag) = FlagToken::parse(token) {
            let takes_value = tree
                .resolve_flag(node, flag.name)
                .is_some_and(|f| f.kind().takes_value());
            if flag.value.is_none() && takes_value {
                tokens.next();
            }
            continue;
        }
        match tree.child(node, token) {
            Some(child) => node = child,
            None => break,
        }
    }
    node
}

/// Help for `idx`; an unknown node yields the root's help.
pub fn render<T>(tree: &CommandTree<T>, idx: Index) -> Help {
    let idx = if tree.command(idx).is_some() { idx } else { tree.root() };
    let command = tree.command(idx);
    let root = tree.root();

    Help {
        path: tree.path(idx),
        about: command.map(|c| c.description().to_string()).unwrap_or_default(),
        runnable: command.is_some_and(|c| c.is_runnable()),
        flags: flag_rows(tree.flags(idx)),
        global_flags: if idx == root { Vec::new() } else { flag_rows(tree.flags(root)) },
        commands: tree
            .children(idx)
            .iter()
            .filter_map(|&child| tree.command(child))
            .map(|c| HelpCommand {
                name: c.name().to_string(),
                about: c.description().to_string(),
            })
            .collect(),
    }
}

fn flag_rows(registry: Option<&FlagRegistry>) -> Vec<HelpFlag> {
    registry
        .map(|r| {
            r.flags()
                .iter()
                .map(|flag| HelpFlag {
                    name: flag.name().to_string(),
                    kind: flag.kind(),
                    default: flag.default_value().to_string(),
                    usage: flag.usage().to_string(),
                })
                .collect()
        })
        .unwrap_or_default()
}
