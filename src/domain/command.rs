//! Command nodes and the arena-backed command tree.

use std::fmt;

use generational_arena::{Arena, Index};
use itertools::Itertools;
use tracing::instrument;

use crate::domain::error::{DefinitionError, DispatchResult};
use crate::domain::flags::{Flag, FlagHandle, FlagRegistry, FlagType};

/// Pure function turning resolved options into a payload.
pub type Handler<T> = Box<dyn Fn(&Context<'_, T>) -> T + Send + Sync>;

/// What a command does when it is the end of the resolved path.
pub enum Behavior<T> {
    /// Only routes to children; invoking it directly is a usage error.
    Group,
    /// Runs a handler with the leftover positionals.
    Handler(Handler<T>),
}

impl<T> fmt::Debug for Behavior<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Behavior::Group => write!(f, "Group"),
            Behavior::Handler(_) => write!(f, "Handler(..)"),
        }
    }
}

/// A named command with its own flags.
pub struct Command<T> {
    name: String,
    about: String,
    behavior: Behavior<T>,
    flags: Option<FlagRegistry>,
}

impl<T> Command<T> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            about: String::new(),
            behavior: Behavior::Group,
            flags: None,
        }
    }

    /// Set the short description shown in help output.
    pub fn about(mut self, about: impl Into<String>) -> Self {
        self.about = about.into();
        self
    }

    pub fn handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Context<'_, T>) -> T + Send + Sync + 'static,
    {
        self.behavior = Behavior::Handler(Box::new(handler));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.about
    }

    pub fn behavior(&self) -> &Behavior<T> {
        &self.behavior
    }

    pub fn is_runnable(&self) -> bool {
        matches!(self.behavior, Behavior::Handler(_))
    }

    /// The command's registry, if any flag was ever declared on it.
    pub fn flags(&self) -> Option<&FlagRegistry> {
        self.flags.as_ref()
    }

    /// The command's registry, created on first use.
    pub fn flags_mut(&mut self) -> &mut FlagRegistry {
        self.flags.get_or_insert_with(FlagRegistry::new)
    }

    fn flag_names(&self) -> impl Iterator<Item = &str> {
        self.flags
            .iter()
            .flat_map(|registry| registry.flags().iter().map(Flag::name))
    }
}

impl<T> fmt::Debug for Command<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("about", &self.about)
            .field("behavior", &self.behavior)
            .field("flags", &self.flags)
            .finish()
    }
}

/// Tree node in the arena.
#[derive(Debug)]
struct CommandNode<T> {
    command: Command<T>,
    parent: Option<Index>,
    children: Vec<Index>,
}

/// Static command hierarchy owned by a single invocation.
///
/// Nodes are only ever added under an existing parent, so the tree is acyclic.
#[derive(Debug)]
pub struct CommandTree<T> {
    arena: Arena<CommandNode<T>>,
    root: Index,
}

impl<T> CommandTree<T> {
    pub fn new(root: Command<T>) -> Self {
        let mut arena = Arena::new();
        let root = arena.insert(CommandNode {
            command: root,
            parent: None,
            children: Vec::new(),
        });
        Self { arena, root }
    }

    pub fn root(&self) -> Index {
        self.root
    }

    pub fn command(&self, idx: Index) -> Option<&Command<T>> {
        self.arena.get(idx).map(|node| &node.command)
    }

    pub fn parent(&self, idx: Index) -> Option<Index> {
        self.arena.get(idx).and_then(|node| node.parent)
    }

    /// Children in insertion order; empty for unknown nodes.
    pub fn children(&self, idx: Index) -> &[Index] {
        self.arena
            .get(idx)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    /// Child of `parent` named exactly `name`.
    pub fn child(&self, parent: Index, name: &str) -> Option<Index> {
        self.children(parent)
            .iter()
            .copied()
            .find(|&idx| self.command(idx).is_some_and(|c| c.name() == name))
    }

    pub fn flags(&self, idx: Index) -> Option<&FlagRegistry> {
        self.command(idx).and_then(Command::flags)
    }

    /// Space-separated names from the root down to `idx`.
    pub fn path(&self, idx: Index) -> String {
        let mut names = Vec::new();
        let mut current = Some(idx);
        while let Some(node) = current.and_then(|i| self.arena.get(i)) {
            names.push(node.command.name());
            current = node.parent;
        }
        names.iter().rev().join(" ")
    }

    #[instrument(level = "trace", skip(self, command), fields(child = command.name()))]
    pub fn add_child(&mut self, parent: Index, command: Command<T>) -> Result<Index, DefinitionError> {
        if !self.arena.contains(parent) {
            return Err(DefinitionError::UnknownNode);
        }
        if self.child(parent, command.name()).is_some() {
            return Err(DefinitionError::DuplicateCommand {
                parent: self.path(parent),
                name: command.name().to_string(),
            });
        }
        if let Some(flag) = command.flag_names().find(|name| self.is_root_flag(name)) {
            return Err(DefinitionError::ShadowedFlag {
                command: command.name().to_string(),
                flag: flag.to_string(),
            });
        }

        let idx = self.arena.insert(CommandNode {
            command,
            parent: Some(parent),
            children: Vec::new(),
        });
        if let Some(node) = self.arena.get_mut(parent) {
            node.children.push(idx);
        }
        Ok(idx)
    }

    pub fn add_children(
        &mut self,
        parent: Index,
        commands: impl IntoIterator<Item = Command<T>>,
    ) -> Result<Vec<Index>, DefinitionError> {
        commands
            .into_iter()
            .map(|command| self.add_child(parent, command))
            .collect()
    }

    /// Declare a flag on a node already in the tree.
    ///
    /// Root flags are recognised anywhere in the argument vector, so no other
    /// node may declare a flag with the same name.
    pub fn declare<V: FlagType>(
        &mut self,
        idx: Index,
        name: &str,
        default: V,
        usage: &str,
    ) -> Result<FlagHandle<V>, DefinitionError> {
        if !self.arena.contains(idx) {
            return Err(DefinitionError::UnknownNode);
        }
        let clash = if idx == self.root {
            self.arena
                .iter()
                .find(|(i, node)| *i != self.root && node.command.flag_names().any(|n| n == name))
                .map(|(_, node)| node.command.name().to_string())
        } else if self.is_root_flag(name) {
            self.command(idx).map(|c| c.name().to_string())
        } else {
            None
        };
        if let Some(command) = clash {
            return Err(DefinitionError::ShadowedFlag {
                command,
                flag: name.to_string(),
            });
        }

        self.arena
            .get_mut(idx)
            .ok_or(DefinitionError::UnknownNode)?
            .command
            .flags_mut()
            .declare(name, default, usage)
    }

    /// Nearest declaration of `name` on the path from `idx` up to the root.
    pub fn resolve_flag(&self, idx: Index, name: &str) -> Option<&Flag> {
        let mut current = Some(idx);
        while let Some(i) = current {
            if let Some(flag) = self.flags(i).and_then(|r| r.lookup(name)) {
                return Some(flag);
            }
            current = self.parent(i);
        }
        None
    }

    /// Parse `args` against the flags of `idx`, returning the positionals.
    pub(crate) fn parse_flags(&mut self, idx: Index, args: &[String]) -> DispatchResult<Vec<String>> {
        match self.arena.get_mut(idx) {
            Some(node) => node.command.flags_mut().parse(args),
            None => FlagRegistry::new().parse(args),
        }
    }

    fn is_root_flag(&self, name: &str) -> bool {
        self.flags(self.root).is_some_and(|r| r.contains(name))
    }
}

/// Read-only view handed to a handler.
pub struct Context<'a, T> {
    tree: &'a CommandTree<T>,
    invoked: Index,
    positionals: &'a [String],
}

impl<'a, T> Context<'a, T> {
    pub(crate) fn new(tree: &'a CommandTree<T>, invoked: Index, positionals: &'a [String]) -> Self {
        Self {
            tree,
            invoked,
            positionals,
        }
    }

    /// Value of a flag declared on the invoked command.
    pub fn local<V: FlagType>(&self, handle: FlagHandle<V>) -> V {
        self.get(self.invoked, handle)
    }

    /// Value of a flag declared on the root command.
    pub fn root<V: FlagType>(&self, handle: FlagHandle<V>) -> V {
        self.get(self.tree.root(), handle)
    }

    /// Value of a flag declared on any node of the tree.
    pub fn get<V: FlagType>(&self, idx: Index, handle: FlagHandle<V>) -> V {
        self.tree
            .flags(idx)
            .map(|registry| registry.get(handle))
            .unwrap_or_default()
    }

    /// Leftover positional arguments after flags and subcommand names.
    pub fn positionals(&self) -> &[String] {
        self.positionals
    }

    pub fn invoked(&self) -> Index {
        self.invoked
    }

    pub fn command_path(&self) -> String {
        self.tree.path(self.invoked)
    }

    pub fn tree(&self) -> &CommandTree<T> {
        self.tree
    }
}
