//! # Schema Tables
//!
//! A schema table is an ordered allow-list of property paths, authored as
//! one string per entry in the mini-format
//!
//! ```text
//! path:type1,type2[v1,v2,v3]
//! ```
//!
//! where `path` is dot-separated, the comma list names
//! [`TypeTag`](formcheck_core::TypeTag)s and the optional bracket suffix
//! enumerates the allowed literal values (quotes around values are
//! optional). Every line is parsed exactly once, when the table is built.
//!
//! ## Path Resolution
//!
//! Paths are compared segment by segment, never as raw strings: the entry
//! `a` does not cover `ab.c`. [`SchemaTable::resolve`] prefers an exact
//! match; otherwise the longest entry that is a strict segment prefix of the
//! query and has no entries of its own beneath it (an opaque subtree)
//! covers the query.

use std::fmt;
use std::str::FromStr;

use formcheck_core::{LiteralValue, TypeSet, TypeTag};
use serde::{Serialize, Serializer};
use thiserror::Error;

/// A dot-separated property path, stored as segments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PropertyPath(Vec<String>);

impl PropertyPath {
    /// The empty path (the node itself).
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse `a.b.c`. Returns `None` for an empty string or an empty
    /// segment (`a..b`, `.a`).
    pub fn parse(path: &str) -> Option<Self> {
        let segments: Vec<String> = path.split('.').map(str::to_string).collect();
        if segments.iter().any(|s| s.is_empty()) {
            return None;
        }
        Some(Self(segments))
    }

    /// This path extended by one key.
    pub fn child(&self, key: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(key.to_string());
        Self(segments)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when every segment of `self` equals the corresponding leading
    /// segment of `other`, and `other` is longer.
    pub fn is_strict_prefix_of(&self, other: &PropertyPath) -> bool {
        self.0.len() < other.0.len() && other.0.starts_with(&self.0)
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

impl Serialize for PropertyPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Why a single schema line could not be parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EntryError {
    #[error("missing ':' between path and types")]
    MissingSeparator,

    #[error("path is empty or has an empty segment")]
    InvalidPath,

    #[error("unknown type name {0:?}")]
    UnknownType(String),

    #[error("value list is not closed with ']'")]
    UnterminatedValues,

    #[error("value list is empty")]
    EmptyValues,
}

/// Error building a schema table.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaDefinitionError {
    /// One line of the table is malformed.
    #[error("schema table '{table}': invalid entry {line:?}: {reason}")]
    InvalidEntry {
        /// Name of the table being built.
        table: String,
        /// The offending line, verbatim.
        line: String,
        /// What is wrong with it.
        reason: EntryError,
    },

    /// Two entries share a path.
    #[error("schema table '{table}': duplicate entry for path '{path}'")]
    DuplicatePath {
        /// Name of the table being built.
        table: String,
        /// The repeated path.
        path: String,
    },

    /// A required-property name is not a valid path.
    #[error("schema table '{table}': invalid required property {name:?}")]
    InvalidRequired {
        /// Name of the table being configured.
        table: String,
        /// The offending name.
        name: String,
    },
}

/// One parsed schema line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaEntry {
    /// Property path this entry allows.
    pub path: PropertyPath,
    /// Types the property's value may have.
    pub types: TypeSet,
    /// Allowed literal values; empty means unrestricted.
    pub values: Vec<String>,
}

impl SchemaEntry {
    /// True if the object type is among the allowed types.
    pub fn is_object(&self) -> bool {
        self.types.contains(TypeTag::Object)
    }

    /// Whether a literal passes the value enumeration.
    pub fn allows_value(&self, value: &LiteralValue) -> bool {
        self.values.is_empty() || self.values.contains(&value.to_enum_text())
    }
}

impl FromStr for SchemaEntry {
    type Err = EntryError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let (path, spec) = line.trim().split_once(':').ok_or(EntryError::MissingSeparator)?;
        let path = PropertyPath::parse(path.trim()).ok_or(EntryError::InvalidPath)?;
        let spec = spec.trim();

        let (types, values) = match spec.find('[') {
            Some(open) => {
                let inner = spec[open + 1..]
                    .strip_suffix(']')
                    .ok_or(EntryError::UnterminatedValues)?;
                (&spec[..open], parse_values(inner)?)
            }
            None => (spec, Vec::new()),
        };

        let types = TypeSet::parse(types).map_err(|_| {
            let unknown = types
                .split(',')
                .map(str::trim)
                .find(|name| name.parse::<TypeTag>().is_err())
                .unwrap_or_default();
            EntryError::UnknownType(unknown.to_string())
        })?;

        Ok(Self {
            path,
            types,
            values,
        })
    }
}

fn parse_values(inner: &str) -> Result<Vec<String>, EntryError> {
    let values: Vec<String> = inner
        .split(',')
        .map(|v| unquote(v.trim()).to_string())
        .filter(|v| !v.is_empty())
        .collect();
    if values.is_empty() {
        return Err(EntryError::EmptyValues);
    }
    Ok(values)
}

fn unquote(value: &str) -> &str {
    ['"', '\'']
        .iter()
        .find_map(|q| value.strip_prefix(*q)?.strip_suffix(*q))
        .unwrap_or(value)
}

impl fmt::Display for SchemaEntry {
    /// Renders the entry back in the mini-format.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.path, self.types)?;
        if !self.values.is_empty() {
            write!(f, "[{}]", self.values.join(","))?;
        }
        Ok(())
    }
}

/// An ordered table of schema entries for one structural level.
///
/// Tables are immutable once built and `Send + Sync`; one table can serve
/// any number of concurrent validation runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaTable {
    name: String,
    entries: Vec<SchemaEntry>,
}

impl SchemaTable {
    /// Parse a table from mini-format lines.
    ///
    /// # Errors
    ///
    /// Returns `SchemaDefinitionError::InvalidEntry` for the first malformed
    /// line and `SchemaDefinitionError::DuplicatePath` if two lines name the
    /// same path.
    pub fn parse<I, S>(name: &str, lines: I) -> Result<Self, SchemaDefinitionError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entries = lines
            .into_iter()
            .map(|line| {
                let line = line.as_ref();
                line.parse::<SchemaEntry>()
                    .map_err(|reason| SchemaDefinitionError::InvalidEntry {
                        table: name.to_string(),
                        line: line.to_string(),
                        reason,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_entries(name, entries)
    }

    /// Build a table from already-parsed entries.
    ///
    /// # Errors
    ///
    /// Returns `SchemaDefinitionError::DuplicatePath` if two entries share a path.
    pub fn from_entries(name: &str, entries: Vec<SchemaEntry>) -> Result<Self, SchemaDefinitionError> {
        for (i, entry) in entries.iter().enumerate() {
            if entries[..i].iter().any(|e| e.path == entry.path) {
                return Err(SchemaDefinitionError::DuplicatePath {
                    table: name.to_string(),
                    path: entry.path.to_string(),
                });
            }
        }
        Ok(Self {
            name: name.to_string(),
            entries,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entries(&self) -> &[SchemaEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find the entry governing `path`.
    pub fn resolve(&self, path: &PropertyPath) -> Option<&SchemaEntry> {
        if let Some(exact) = self.entries.iter().find(|e| e.path == *path) {
            return Some(exact);
        }
        self.entries
            .iter()
            .filter(|e| e.path.is_strict_prefix_of(path) && !self.drills_into(&e.path))
            .max_by_key(|e| e.path.len())
    }

    /// True if some entry lies strictly beneath `path`, i.e. an object at
    /// `path` has its own properties checked.
    pub fn drills_into(&self, path: &PropertyPath) -> bool {
        self.entries.iter().any(|e| path.is_strict_prefix_of(&e.path))
    }

    /// The table rendered back into mini-format lines.
    pub fn to_lines(&self) -> Vec<String> {
        self.entries.iter().map(ToString::to_string).collect()
    }
}
