//! # Type Tags — Semantic Type Classification
//!
//! Defines the [`TypeTag`] enum naming every semantic type a schema entry
//! may require, and the fixed classification table mapping syntactic node
//! shapes onto those tags.
//!
//! | Tag | Admits |
//! |-----|--------|
//! | `string` | string literal |
//! | `boolean` | boolean literal |
//! | `number` | numeric literal |
//! | `array` | array node |
//! | `object` | object node |
//! | `function` | function-like node (alias: `arrowFunction`) |
//! | `any` | every node |
//!
//! Scalar tags look at the literal's flavour, not only at the node kind:
//! `123` is a literal but it is not a `string`. A `null` literal, a call and
//! an "other" node are admitted by `any` alone.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FormcheckError;
use crate::node::{LiteralValue, NodeKind, SyntaxNode};

/// Semantic type a schema entry can require.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeTag {
    String,
    Boolean,
    Number,
    Array,
    Object,
    Function,
    Any,
}

/// Total number of type tags.
pub const TYPE_TAG_COUNT: usize = 7;

impl TypeTag {
    /// Returns all type tags in canonical order.
    pub fn all_tags() -> &'static [TypeTag] {
        &[
            Self::String,
            Self::Boolean,
            Self::Number,
            Self::Array,
            Self::Object,
            Self::Function,
            Self::Any,
        ]
    }

    /// Returns the schema spelling of this tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Number => "number",
            Self::Array => "array",
            Self::Object => "object",
            Self::Function => "function",
            Self::Any => "any",
        }
    }

    /// Node kinds this tag can ever admit.
    pub fn node_kinds(&self) -> &'static [NodeKind] {
        match self {
            Self::String | Self::Boolean | Self::Number => &[NodeKind::Literal],
            Self::Array => &[NodeKind::Array],
            Self::Object => &[NodeKind::Object],
            Self::Function => &[NodeKind::FunctionLike],
            Self::Any => NodeKind::all_kinds(),
        }
    }

    /// Whether `node` is of this semantic type.
    pub fn admits(&self, node: &SyntaxNode) -> bool {
        match self {
            Self::String => matches!(node.literal(), Some(LiteralValue::String(_))),
            Self::Boolean => matches!(node.literal(), Some(LiteralValue::Boolean(_))),
            Self::Number => matches!(node.literal(), Some(LiteralValue::Number(_))),
            Self::Array => node.kind() == NodeKind::Array,
            Self::Object => node.kind() == NodeKind::Object,
            Self::Function => node.kind() == NodeKind::FunctionLike,
            Self::Any => true,
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TypeTag {
    type Err = FormcheckError;

    /// Parse a tag from its schema spelling. `arrowFunction` is accepted as
    /// an alias of `function`; schemas written for the form library use it.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" => Ok(Self::String),
            "boolean" => Ok(Self::Boolean),
            "number" => Ok(Self::Number),
            "array" => Ok(Self::Array),
            "object" => Ok(Self::Object),
            "function" | "arrowFunction" => Ok(Self::Function),
            "any" => Ok(Self::Any),
            other => Err(FormcheckError::UnknownTypeName(other.to_string())),
        }
    }
}

/// An ordered set of type tags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeSet(BTreeSet<TypeTag>);

impl TypeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a comma-joined list of type names, e.g. `"string,arrowFunction"`.
    ///
    /// # Errors
    ///
    /// Returns `FormcheckError::UnknownTypeName` for an empty item or a name
    /// that is not a known tag.
    pub fn parse(list: &str) -> Result<Self, FormcheckError> {
        list.split(',')
            .map(|name| name.trim().parse::<TypeTag>())
            .collect()
    }

    pub fn insert(&mut self, tag: TypeTag) -> bool {
        self.0.insert(tag)
    }

    pub fn contains(&self, tag: TypeTag) -> bool {
        self.0.contains(&tag)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = TypeTag> + '_ {
        self.0.iter().copied()
    }

    /// True when any tag in the set admits `node`.
    pub fn admits(&self, node: &SyntaxNode) -> bool {
        self.0.iter().any(|tag| tag.admits(node))
    }

    /// Union of the node kinds every tag maps to, in [`NodeKind::all_kinds`] order.
    pub fn node_kinds(&self) -> Vec<NodeKind> {
        NodeKind::all_kinds()
            .iter()
            .copied()
            .filter(|kind| self.0.iter().any(|tag| tag.node_kinds().contains(kind)))
            .collect()
    }
}

impl FromIterator<TypeTag> for TypeSet {
    fn from_iter<I: IntoIterator<Item = TypeTag>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for TypeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, tag) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            f.write_str(tag.as_str())?;
        }
        Ok(())
    }
}

/// Every tag that admits `node`. Always contains [`TypeTag::Any`].
pub fn classify(node: &SyntaxNode) -> TypeSet {
    TypeTag::all_tags()
        .iter()
        .copied()
        .filter(|tag| tag.admits(node))
        .collect()
}

/// Whether `node` matches at least one of the comma-joined type names.
///
/// # Errors
///
/// Returns `FormcheckError::UnknownTypeName` if `expected` names an
/// unknown type.
pub fn matches(node: &SyntaxNode, expected: &str) -> Result<bool, FormcheckError> {
    Ok(TypeSet::parse(expected)?.admits(node))
}
