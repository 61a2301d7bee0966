//! Per-command flag registry: declaration, lookup and parsing of named options.

use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::trace;

use crate::domain::error::{DefinitionError, DispatchError, DispatchResult};

/// Token that ends flag collection; everything after it is positional.
pub const TERMINATOR: &str = "--";

/// Tokens that request help instead of dispatch.
pub const HELP_TOKENS: [&str; 2] = ["-h", "--help"];

const RESERVED_NAMES: [&str; 2] = ["h", "help"];

/// Source of registry identities; never reused within a process.
static NEXT_REGISTRY_ID: AtomicU64 = AtomicU64::new(0);

/// Value kind of a flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagKind {
    String,
    Bool,
}

impl FlagKind {
    /// Whether the flag consumes the following token when given without `=value`.
    pub fn takes_value(self) -> bool {
        matches!(self, FlagKind::String)
    }
}

impl fmt::Display for FlagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlagKind::String => write!(f, "string"),
            FlagKind::Bool => write!(f, "bool"),
        }
    }
}

/// Current or default value of a flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlagValue {
    String(String),
    Bool(bool),
}

impl FlagValue {
    pub fn kind(&self) -> FlagKind {
        match self {
            FlagValue::String(_) => FlagKind::String,
            FlagValue::Bool(_) => FlagKind::Bool,
        }
    }
}

impl fmt::Display for FlagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlagValue::String(s) => write!(f, "{}", s),
            FlagValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// Rust types that can back a flag.
pub trait FlagType: Sized + Default {
    const KIND: FlagKind;

    fn into_value(self) -> FlagValue;

    fn from_value(value: &FlagValue) -> Option<Self>;
}

impl FlagType for String {
    const KIND: FlagKind = FlagKind::String;

    fn into_value(self) -> FlagValue {
        FlagValue::String(self)
    }

    fn from_value(value: &FlagValue) -> Option<Self> {
        match value {
            FlagValue::String(s) => Some(s.clone()),
            FlagValue::Bool(_) => None,
        }
    }
}

impl FlagType for bool {
    const KIND: FlagKind = FlagKind::Bool;

    fn into_value(self) -> FlagValue {
        FlagValue::Bool(self)
    }

    fn from_value(value: &FlagValue) -> Option<Self> {
        match value {
            FlagValue::Bool(b) => Some(*b),
            FlagValue::String(_) => None,
        }
    }
}

/// Typed reference to a declared flag; the flag's bound destination.
///
/// Only valid for the registry that returned it.
pub struct FlagHandle<T> {
    registry: u64,
    slot: usize,
    _kind: PhantomData<fn() -> T>,
}

impl<T> Clone for FlagHandle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for FlagHandle<T> {}

impl<T> fmt::Debug for FlagHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlagHandle")
            .field("registry", &self.registry)
            .field("slot", &self.slot)
            .finish()
    }
}

/// A declared option.
#[derive(Debug, Clone)]
pub struct Flag {
    name: String,
    usage: String,
    default: FlagValue,
    value: FlagValue,
    set: bool,
}

impl Flag {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> FlagKind {
        self.default.kind()
    }

    pub fn usage(&self) -> &str {
        &self.usage
    }

    pub fn default_value(&self) -> &FlagValue {
        &self.default
    }

    pub fn value(&self) -> &FlagValue {
        &self.value
    }

    /// True once the flag appeared on the command line.
    pub fn is_set(&self) -> bool {
        self.set
    }
}

/// A flag-looking token split into its name and optional inline value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagToken<'a> {
    /// Token text before any `=`, dashes included (used in error messages)
    pub raw: &'a str,
    /// Name with one or two leading dashes stripped
    pub name: &'a str,
    /// Value from `--name=value` form
    pub value: Option<&'a str>,
}

impl<'a> FlagToken<'a> {
    /// Classify a token. Returns `None` for positionals, including a lone `-`.
    ///
    /// The terminator `--` is reported as a flag with an empty name; callers
    /// check for it first.
    pub fn parse(token: &'a str) -> Option<Self> {
        if !token.starts_with('-') || token == "-" {
            return None;
        }
        let stripped = token
            .strip_prefix("--")
            .or_else(|| token.strip_prefix('-'))
            .unwrap_or(token);
        let (name, value) = match stripped.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (stripped, None),
        };
        let raw_len = token.len() - stripped.len() + name.len();
        Some(Self {
            raw: &token[..raw_len],
            name,
            value,
        })
    }
}

/// Whether a token is a help request.
pub fn is_help_token(token: &str) -> bool {
    HELP_TOKENS.contains(&token)
}

/// Parse a boolean literal the way conventional CLI flag parsers accept them.
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

/// Table of named options owned by one command.
#[derive(Debug)]
pub struct FlagRegistry {
    id: u64,
    flags: Vec<Flag>,
    index: BTreeMap<String, usize>,
}

impl Default for FlagRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FlagRegistry {
    pub fn new() -> Self {
        Self {
            id: NEXT_REGISTRY_ID.fetch_add(1, Ordering::Relaxed),
            flags: Vec::new(),
            index: BTreeMap::new(),
        }
    }

    /// Whether `handle` was returned by this registry.
    pub fn owns<T>(&self, handle: FlagHandle<T>) -> bool {
        handle.registry == self.id
    }

    /// Declare a flag whose kind follows from `T`.
    pub fn declare<T: FlagType>(
        &mut self,
        name: &str,
        default: T,
        usage: &str,
    ) -> Result<FlagHandle<T>, DefinitionError> {
        if name.is_empty()
            || name.starts_with('-')
            || name.contains('=')
            || RESERVED_NAMES.contains(&name)
        {
            return Err(DefinitionError::InvalidFlagName(name.to_string()));
        }
        if self.index.contains_key(name) {
            return Err(DefinitionError::DuplicateFlag(name.to_string()));
        }
        let default = default.into_value();
        let slot = self.flags.len();
        self.flags.push(Flag {
            name: name.to_string(),
            usage: usage.to_string(),
            value: default.clone(),
            default,
            set: false,
        });
        self.index.insert(name.to_string(), slot);
        Ok(FlagHandle {
            registry: self.id,
            slot,
            _kind: PhantomData,
        })
    }

    pub fn lookup(&self, name: &str) -> Option<&Flag> {
        self.index.get(name).map(|&slot| &self.flags[slot])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Declared flags in declaration order.
    pub fn flags(&self) -> &[Flag] {
        &self.flags
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// Resolved value behind a handle.
    ///
    /// A handle from another registry resolves to `T::default()`.
    pub fn get<T: FlagType>(&self, handle: FlagHandle<T>) -> T {
        let value = self
            .owns(handle)
            .then(|| self.flags.get(handle.slot))
            .flatten()
            .and_then(|f| T::from_value(&f.value));
        match value {
            Some(value) => value,
            None => {
                tracing::warn!(
                    registry = self.id,
                    handle_registry = handle.registry,
                    slot = handle.slot,
                    "flag handle does not belong to this registry"
                );
                T::default()
            }
        }
    }

    /// Parse flags from `tokens`, returning the positionals.
    ///
    /// Flag collection stops at the first positional; it and all following
    /// tokens are returned as-is. A bare `--` stops collection and is dropped.
    pub fn parse(&mut self, tokens: &[String]) -> DispatchResult<Vec<String>> {
        let mut i = 0;
        while i < tokens.len() {
            let token = tokens[i].as_str();
            if token == TERMINATOR {
                return Ok(tokens[i + 1..].to_vec());
            }
            let Some(parsed) = FlagToken::parse(token) else {
                return Ok(tokens[i..].to_vec());
            };
            let slot = *self
                .index
                .get(parsed.name)
                .ok_or_else(|| DispatchError::UnknownFlag(parsed.raw.to_string()))?;

            let value = match (self.flags[slot].kind(), parsed.value) {
                (FlagKind::Bool, None) => FlagValue::Bool(true),
                (FlagKind::Bool, Some(raw)) => {
                    FlagValue::Bool(parse_bool(raw).ok_or_else(|| {
                        DispatchError::MalformedBooleanValue {
                            flag: parsed.name.to_string(),
                            value: raw.to_string(),
                        }
                    })?)
                }
                (FlagKind::String, Some(raw)) => FlagValue::String(raw.to_string()),
                (FlagKind::String, None) => {
                    i += 1;
                    let raw = tokens
                        .get(i)
                        .ok_or_else(|| DispatchError::MissingFlagValue(parsed.name.to_string()))?;
                    FlagValue::String(raw.clone())
                }
            };
            trace!(flag = parsed.name, value = %value, "flag set");
            let flag = &mut self.flags[slot];
            flag.value = value;
            flag.set = true;
            i += 1;
        }
        Ok(Vec::new())
    }
}
