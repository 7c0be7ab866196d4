//! # Syntax Node Model
//!
//! The read-only tree the validation engine walks. A [`SyntaxNode`] is the
//! syntactic shape of a configuration expression as supplied by the host
//! parser: literals, arrays, objects with ordered keys, and opaque markers
//! for anything whose value only exists at runtime.
//!
//! ## Invariants
//!
//! - Object properties keep declaration order, duplicates included. The
//!   engine reports in traversal order, so order is part of the contract.
//! - `Call` and `FunctionLike` nodes carry no children. Their shape is
//!   unknowable without evaluation.
//! - [`SourceLocation`] is an opaque handle. Nothing in the engine branches
//!   on it.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Syntactic kind of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// String, number, boolean or null literal.
    Literal,
    /// Array expression.
    Array,
    /// Object expression with statically known keys.
    Object,
    /// Arrow function, function expression or method.
    FunctionLike,
    /// Call, construction, spread or any other deferred computation.
    Call,
    /// Anything else (identifiers, conditionals, member access, ...).
    Other,
}

impl NodeKind {
    /// Returns all node kinds in declaration order.
    pub fn all_kinds() -> &'static [NodeKind] {
        &[
            Self::Literal,
            Self::Array,
            Self::Object,
            Self::FunctionLike,
            Self::Call,
            Self::Other,
        ]
    }

    /// Returns the snake_case identifier for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Literal => "literal",
            Self::Array => "array",
            Self::Object => "object",
            Self::FunctionLike => "function_like",
            Self::Call => "call",
            Self::Other => "other",
        }
    }

    /// True for kinds whose value is produced at runtime and therefore
    /// cannot be shape-checked statically.
    pub fn is_dynamic(&self) -> bool {
        matches!(self, Self::Call | Self::FunctionLike)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value of a literal node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum LiteralValue {
    /// String literal (including template literals without interpolation).
    String(String),
    /// Numeric literal.
    Number(f64),
    /// `true` or `false`.
    Boolean(bool),
    /// `null`.
    Null,
}

impl LiteralValue {
    /// Name of the literal flavour, as used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Number(_) => "number",
            Self::Boolean(_) => "boolean",
            Self::Null => "null",
        }
    }

    /// Textual form used to compare against enumerated schema values.
    ///
    /// Integral numbers render without a fractional part, so `3` and `3.0`
    /// both compare equal to the enum entry `3`.
    pub fn to_enum_text(&self) -> String {
        match self {
            Self::String(s) => s.clone(),
            Self::Number(n) => format_number(*n),
            Self::Boolean(b) => b.to_string(),
            Self::Null => "null".to_string(),
        }
    }
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "{s:?}"),
            other => f.write_str(&other.to_enum_text()),
        }
    }
}

fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

/// Position of a node in the host's source text.
///
/// `line` is 1-based; a zero line means the host supplied no line
/// information and only the byte range (possibly empty) is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SourceLocation {
    /// Byte offset of the first character.
    pub start: usize,
    /// Byte offset one past the last character.
    pub end: usize,
    /// 1-based line, or 0 when unknown.
    pub line: u32,
    /// 0-based column on `line`.
    pub column: u32,
}

impl SourceLocation {
    /// A location covering `start..end` with no line information.
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            line: 0,
            column: 0,
        }
    }

    /// Attach a line/column position.
    pub fn with_position(mut self, line: u32, column: u32) -> Self {
        self.line = line;
        self.column = column;
        self
    }

    /// True when the host supplied any position information.
    pub fn is_known(&self) -> bool {
        self.line > 0 || self.end > self.start
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line > 0 {
            write!(f, "{}:{}", self.line, self.column + 1)
        } else {
            write!(f, "@{}..{}", self.start, self.end)
        }
    }
}

/// Payload of a syntax node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum NodeData {
    /// Literal value.
    Literal(LiteralValue),
    /// Array elements in order.
    Array(Vec<SyntaxNode>),
    /// Object properties in declaration order.
    Object(Vec<Property>),
    /// Function-like value.
    FunctionLike,
    /// Deferred computation.
    Call,
    /// Anything else, with a short description of what it was.
    Other(String),
}

/// One `key: value` pair of an object node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    /// Static key name.
    pub key: String,
    /// Value expression.
    pub value: SyntaxNode,
    /// Location of the whole property (key and value).
    pub location: SourceLocation,
}

/// A node of the configuration syntax tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntaxNode {
    /// Kind-specific payload.
    pub data: NodeData,
    /// Where the node came from.
    pub location: SourceLocation,
}

impl SyntaxNode {
    /// Create a node with an unknown location.
    pub fn new(data: NodeData) -> Self {
        Self {
            data,
            location: SourceLocation::default(),
        }
    }

    /// Attach a source location.
    pub fn at(mut self, location: SourceLocation) -> Self {
        self.location = location;
        self
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::new(NodeData::Literal(LiteralValue::String(value.into())))
    }

    pub fn number(value: f64) -> Self {
        Self::new(NodeData::Literal(LiteralValue::Number(value)))
    }

    pub fn boolean(value: bool) -> Self {
        Self::new(NodeData::Literal(LiteralValue::Boolean(value)))
    }

    pub fn null() -> Self {
        Self::new(NodeData::Literal(LiteralValue::Null))
    }

    pub fn array(elements: Vec<SyntaxNode>) -> Self {
        Self::new(NodeData::Array(elements))
    }

    /// Build an object node. Each property takes its value's location.
    pub fn object<I, K>(properties: I) -> Self
    where
        I: IntoIterator<Item = (K, SyntaxNode)>,
        K: Into<String>,
    {
        let properties = properties
            .into_iter()
            .map(|(key, value)| Property {
                key: key.into(),
                location: value.location,
                value,
            })
            .collect();
        Self::new(NodeData::Object(properties))
    }

    pub fn function_like() -> Self {
        Self::new(NodeData::FunctionLike)
    }

    pub fn call() -> Self {
        Self::new(NodeData::Call)
    }

    pub fn other(description: impl Into<String>) -> Self {
        Self::new(NodeData::Other(description.into()))
    }

    /// Syntactic kind of this node.
    pub fn kind(&self) -> NodeKind {
        match &self.data {
            NodeData::Literal(_) => NodeKind::Literal,
            NodeData::Array(_) => NodeKind::Array,
            NodeData::Object(_) => NodeKind::Object,
            NodeData::FunctionLike => NodeKind::FunctionLike,
            NodeData::Call => NodeKind::Call,
            NodeData::Other(_) => NodeKind::Other,
        }
    }

    /// See [`NodeKind::is_dynamic`].
    pub fn is_dynamic(&self) -> bool {
        self.kind().is_dynamic()
    }

    /// Literal payload, if this is a literal.
    pub fn literal(&self) -> Option<&LiteralValue> {
        match &self.data {
            NodeData::Literal(value) => Some(value),
            _ => None,
        }
    }

    /// Array elements; empty for every other kind.
    pub fn elements(&self) -> &[SyntaxNode] {
        match &self.data {
            NodeData::Array(elements) => elements,
            _ => &[],
        }
    }

    /// Object properties; empty for every other kind.
    pub fn properties(&self) -> &[Property] {
        match &self.data {
            NodeData::Object(properties) => properties,
            _ => &[],
        }
    }

    /// Value of the property named `key`. When the key repeats, the last
    /// occurrence wins.
    pub fn property(&self, key: &str) -> Option<&SyntaxNode> {
        self.properties()
            .iter()
            .rfind(|p| p.key == key)
            .map(|p| &p.value)
    }

    /// Follow a chain of keys through nested objects.
    ///
    /// Returns `None` as soon as a segment is missing or an intermediate
    /// value is not an object.
    pub fn lookup<S: AsRef<str>>(&self, segments: &[S]) -> Option<&SyntaxNode> {
        segments
            .iter()
            .try_fold(self, |node, segment| node.property(segment.as_ref()))
    }

    /// Human-readable description of the node's type for diagnostics.
    pub fn describe(&self) -> &str {
        match &self.data {
            NodeData::Literal(value) => value.type_name(),
            NodeData::Array(_) => "array",
            NodeData::Object(_) => "object",
            NodeData::FunctionLike => "function",
            NodeData::Call => "call",
            NodeData::Other(description) if !description.is_empty() => description,
            NodeData::Other(_) => "other",
        }
    }
}

impl From<&serde_json::Value> for SyntaxNode {
    /// Lower a plain data document. The result contains only literals,
    /// arrays and objects, all without location information.
    fn from(value: &serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => Self::null(),
            Value::Bool(b) => Self::boolean(*b),
            Value::Number(n) => match n.as_f64() {
                Some(f) => Self::number(f),
                None => Self::other("number"),
            },
            Value::String(s) => Self::string(s.as_str()),
            Value::Array(items) => Self::array(items.iter().map(Self::from).collect()),
            Value::Object(map) => {
                Self::object(map.iter().map(|(k, v)| (k.as_str(), Self::from(v))))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_of_each_constructor() {
        assert_eq!(SyntaxNode::string("a").kind(), NodeKind::Literal);
        assert_eq!(SyntaxNode::number(1.0).kind(), NodeKind::Literal);
        assert_eq!(SyntaxNode::null().kind(), NodeKind::Literal);
        assert_eq!(SyntaxNode::array(vec![]).kind(), NodeKind::Array);
        assert_eq!(
            SyntaxNode::object(Vec::<(&str, SyntaxNode)>::new()).kind(),
            NodeKind::Object
        );
        assert_eq!(SyntaxNode::function_like().kind(), NodeKind::FunctionLike);
        assert_eq!(SyntaxNode::call().kind(), NodeKind::Call);
        assert_eq!(SyntaxNode::other("identifier").kind(), NodeKind::Other);
    }

    #[test]
    fn test_only_call_and_function_are_dynamic() {
        let dynamic: Vec<_> = NodeKind::all_kinds()
            .iter()
            .filter(|k| k.is_dynamic())
            .collect();
        assert_eq!(dynamic, vec![&NodeKind::FunctionLike, &NodeKind::Call]);
    }

    #[test]
    fn test_lookup_nested_path() {
        let node = SyntaxNode::object([(
            "serverAPI",
            SyntaxNode::object([(
                "additionalParams",
                SyntaxNode::object([("routeExtraParams", SyntaxNode::array(vec![]))]),
            )]),
        )]);
        let found = node.lookup(&["serverAPI", "additionalParams", "routeExtraParams"]);
        assert_eq!(found.map(|n| n.kind()), Some(NodeKind::Array));
        assert!(node.lookup(&["serverAPI", "missing"]).is_none());
        assert!(node
            .lookup(&["serverAPI", "additionalParams", "routeExtraParams", "x"])
            .is_none());
    }

    #[test]
    fn test_lookup_empty_path_is_self() {
        let node = SyntaxNode::string("x");
        let empty: [&str; 0] = [];
        assert_eq!(node.lookup(&empty), Some(&node));
    }

    #[test]
    fn test_property_last_duplicate_wins() {
        let node = SyntaxNode::object([
            ("a", SyntaxNode::number(1.0)),
            ("a", SyntaxNode::number(2.0)),
        ]);
        assert_eq!(node.properties().len(), 2);
        assert_eq!(
            node.property("a").and_then(|n| n.literal()),
            Some(&LiteralValue::Number(2.0))
        );
    }

    #[test]
    fn test_enum_text_of_numbers() {
        assert_eq!(LiteralValue::Number(3.0).to_enum_text(), "3");
        assert_eq!(LiteralValue::Number(-2.0).to_enum_text(), "-2");
        assert_eq!(LiteralValue::Number(0.5).to_enum_text(), "0.5");
        assert_eq!(LiteralValue::Boolean(true).to_enum_text(), "true");
        assert_eq!(LiteralValue::Null.to_enum_text(), "null");
    }

    #[test]
    fn test_literal_display_quotes_strings() {
        assert_eq!(LiteralValue::String("void".into()).to_string(), "\"void\"");
        assert_eq!(LiteralValue::Number(12.0).to_string(), "12");
    }

    #[test]
    fn test_describe() {
        assert_eq!(SyntaxNode::number(1.0).describe(), "number");
        assert_eq!(SyntaxNode::function_like().describe(), "function");
        assert_eq!(SyntaxNode::other("identifier").describe(), "identifier");
        assert_eq!(SyntaxNode::other("").describe(), "other");
    }

    #[test]
    fn test_location_display() {
        assert_eq!(SourceLocation::new(4, 9).to_string(), "@4..9");
        assert_eq!(SourceLocation::new(4, 9).with_position(2, 0).to_string(), "2:1");
        assert!(!SourceLocation::default().is_known());
    }

    #[test]
    fn test_from_json_value() {
        let value = json!({"title": "t", "steps": [{"name": "s1"}], "debug": true});
        let node = SyntaxNode::from(&value);
        let keys: Vec<&str> = node.properties().iter().map(|p| p.key.as_str()).collect();
        // serde_json without preserve_order sorts keys.
        assert_eq!(keys.len(), 3);
        assert!(keys.contains(&"steps"));
        assert_eq!(
            node.lookup(&["steps"]).map(|n| n.elements().len()),
            Some(1)
        );
        assert_eq!(
            node.property("debug").and_then(|n| n.literal()),
            Some(&LiteralValue::Boolean(true))
        );
    }
}
