//! # ESTree Host Adapter
//!
//! Turns the JSON output of a JavaScript parser (acorn, espree, or
//! `@babel/parser` with or without the `estree` plugin) into [`SyntaxNode`]
//! trees, and finds the expressions that hold form declarations.
//!
//! The engine never parses source text. This module is the boundary where
//! the host's tree is translated, and the only place that knows ESTree
//! node names.
//!
//! ## Lowering Rules
//!
//! | ESTree | SyntaxNode |
//! |--------|------------|
//! | `Literal` (string/number/boolean/null) | literal |
//! | `TemplateLiteral` without interpolation | string literal |
//! | unary `-`/`+` on a numeric literal | number literal |
//! | `ArrayExpression` | array (holes become `other`, spreads become `call`) |
//! | `ObjectExpression` | object (computed keys and spreads are dropped) |
//! | arrow / function expressions, object methods | function-like |
//! | calls, `new`, tagged templates, `await`, dynamic `import` | call |
//! | parentheses, optional chains, TS casts | unwrapped |
//! | anything else | other, described by its ESTree type |

use std::fmt;

use serde_json::Value;

use crate::error::EstreeError;
use crate::node::{NodeData, Property, SourceLocation, SyntaxNode};

/// Which declarations hold a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormLocator {
    /// Variable name bound to the form (`const form = {...}`).
    pub binding: String,
    /// Also treat `export default ...` as a form.
    pub default_export: bool,
}

impl Default for FormLocator {
    fn default() -> Self {
        Self {
            binding: "form".to_string(),
            default_export: false,
        }
    }
}

/// How a located form was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormOrigin {
    /// `const <name> = ...`
    Binding(String),
    /// `export default ...`
    DefaultExport,
}

impl fmt::Display for FormOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Binding(name) => write!(f, "binding `{name}`"),
            Self::DefaultExport => f.write_str("default export"),
        }
    }
}

/// A candidate form expression inside an ESTree document.
#[derive(Debug, Clone)]
pub struct LocatedForm<'a> {
    pub origin: FormOrigin,
    /// The ESTree expression to lower. When the declaration is a function,
    /// this is the object it returns.
    pub expression: &'a Value,
    /// Location of the declaration itself.
    pub location: SourceLocation,
}

impl LocatedForm<'_> {
    /// Lower the located expression.
    ///
    /// # Errors
    ///
    /// See [`lower_expression`].
    pub fn lower(&self) -> Result<SyntaxNode, EstreeError> {
        lower_expression(self.expression)
    }
}

/// Find every form declaration in an ESTree document, in source order.
pub fn locate_forms<'a>(program: &'a Value, locator: &FormLocator) -> Vec<LocatedForm<'a>> {
    let mut found = Vec::new();
    collect_forms(program, locator, &mut found);
    found.sort_by_key(|form| form.location.start);
    found
}

fn collect_forms<'a>(value: &'a Value, locator: &FormLocator, out: &mut Vec<LocatedForm<'a>>) {
    match value {
        Value::Object(map) => {
            match node_type(value) {
                Some("VariableDeclarator") => {
                    let id_matches = map
                        .get("id")
                        .filter(|id| node_type(id) == Some("Identifier"))
                        .and_then(|id| id.get("name"))
                        .and_then(Value::as_str)
                        == Some(locator.binding.as_str());
                    if let Some(init) = map.get("init").filter(|init| id_matches && !init.is_null()) {
                        out.push(LocatedForm {
                            origin: FormOrigin::Binding(locator.binding.clone()),
                            expression: returned_expression(init),
                            location: location_of(value),
                        });
                    }
                }
                Some("ExportDefaultDeclaration") if locator.default_export => {
                    if let Some(declaration) = map.get("declaration").filter(|d| !d.is_null()) {
                        out.push(LocatedForm {
                            origin: FormOrigin::DefaultExport,
                            expression: returned_expression(declaration),
                            location: location_of(value),
                        });
                    }
                }
                _ => {}
            }
            for (key, child) in map {
                if key != "loc" && key != "range" {
                    collect_forms(child, locator, out);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_forms(item, locator, out);
            }
        }
        _ => {}
    }
}

/// For function declarations, the object expression they return; otherwise
/// the expression itself.
fn returned_expression(expression: &Value) -> &Value {
    match node_type(expression) {
        Some("ArrowFunctionExpression" | "FunctionExpression" | "FunctionDeclaration") => {
            let Some(body) = expression.get("body") else {
                return expression;
            };
            if node_type(body) != Some("BlockStatement") {
                return body;
            }
            body.get("body")
                .and_then(Value::as_array)
                .and_then(|statements| {
                    statements
                        .iter()
                        .find(|s| node_type(s) == Some("ReturnStatement"))
                })
                .and_then(|ret| ret.get("argument"))
                .filter(|argument| !argument.is_null())
                .unwrap_or(expression)
        }
        _ => expression,
    }
}

/// Lower an ESTree expression into a syntax node.
///
/// # Errors
///
/// Returns `EstreeError::NotANode` when a value in expression position is
/// not an ESTree node, and `EstreeError::MissingField` when a node lacks a
/// field its type requires.
pub fn lower_expression(value: &Value) -> Result<SyntaxNode, EstreeError> {
    lower(value, "root")
}

fn lower(value: &Value, context: &str) -> Result<SyntaxNode, EstreeError> {
    let ty = node_type_of(value, context)?;
    let location = location_of(value);

    let node = match ty {
        "Literal" => lower_literal(value),
        "StringLiteral" | "NumericLiteral" | "BooleanLiteral" => {
            let inner = field(value, "value", ty)?;
            SyntaxNode::from(inner)
        }
        "NullLiteral" => SyntaxNode::null(),
        "TemplateLiteral" => lower_template(value),
        "UnaryExpression" => lower_unary(value, ty)?,
        "ArrayExpression" => {
            let elements = field(value, "elements", ty)?
                .as_array()
                .map(Vec::as_slice)
                .unwrap_or_default();
            let elements = elements
                .iter()
                .map(|element| {
                    if element.is_null() {
                        Ok(SyntaxNode::other("array hole"))
                    } else {
                        lower(element, "array element")
                    }
                })
                .collect::<Result<Vec<_>, _>>()?;
            SyntaxNode::array(elements)
        }
        "ObjectExpression" => lower_object(value, ty)?,
        "ArrowFunctionExpression" | "FunctionExpression" => SyntaxNode::function_like(),
        "CallExpression" | "NewExpression" | "TaggedTemplateExpression" | "AwaitExpression"
        | "ImportExpression" | "SpreadElement" => SyntaxNode::call(),
        "ParenthesizedExpression" | "ChainExpression" | "TSAsExpression"
        | "TSSatisfiesExpression" | "TSNonNullExpression" | "TSTypeAssertion" => {
            return lower(field(value, "expression", ty)?, context);
        }
        "Identifier" => SyntaxNode::other("identifier"),
        other => SyntaxNode::other(other),
    };
    Ok(node.at(location))
}

fn lower_literal(value: &Value) -> SyntaxNode {
    if value.get("regex").is_some() {
        return SyntaxNode::other("regex");
    }
    if value.get("bigint").is_some() {
        return SyntaxNode::other("bigint");
    }
    match value.get("value") {
        Some(inner @ (Value::String(_) | Value::Number(_) | Value::Bool(_))) => SyntaxNode::from(inner),
        _ => SyntaxNode::null(),
    }
}

fn lower_template(value: &Value) -> SyntaxNode {
    let has_expressions = value
        .get("expressions")
        .and_then(Value::as_array)
        .is_some_and(|e| !e.is_empty());
    if has_expressions {
        return SyntaxNode::other("template literal");
    }
    let text = value
        .get("quasis")
        .and_then(Value::as_array)
        .and_then(|quasis| quasis.first())
        .and_then(|quasi| quasi.get("value"))
        .and_then(|v| v.get("cooked").or_else(|| v.get("raw")))
        .and_then(Value::as_str)
        .unwrap_or_default();
    SyntaxNode::string(text)
}

fn lower_unary(value: &Value, ty: &str) -> Result<SyntaxNode, EstreeError> {
    let operator = field(value, "operator", ty)?.as_str().unwrap_or_default();
    let argument = field(value, "argument", ty)?;
    let number = argument
        .get("value")
        .filter(|_| matches!(node_type(argument), Some("Literal" | "NumericLiteral")))
        .and_then(Value::as_f64);
    Ok(match (operator, number) {
        ("-", Some(n)) => SyntaxNode::number(-n),
        ("+", Some(n)) => SyntaxNode::number(n),
        _ => SyntaxNode::other("unary expression"),
    })
}

fn lower_object(value: &Value, ty: &str) -> Result<SyntaxNode, EstreeError> {
    let items = field(value, "properties", ty)?
        .as_array()
        .map(Vec::as_slice)
        .unwrap_or_default();

    let mut properties = Vec::with_capacity(items.len());
    for item in items {
        let item_type = node_type_of(item, "object property")?;
        let is_method = match item_type {
            "Property" | "ObjectProperty" => false,
            "ObjectMethod" => true,
            other => {
                tracing::debug!(node_type = other, "skipping non-static object member");
                continue;
            }
        };
        if item.get("computed").and_then(Value::as_bool) == Some(true) {
            tracing::debug!("skipping computed object key");
            continue;
        }
        let Some(key) = static_key(field(item, "key", item_type)?) else {
            tracing::debug!("skipping object key without a static name");
            continue;
        };
        let location = location_of(item);
        let value = if is_method {
            SyntaxNode::function_like().at(location)
        } else {
            lower(field(item, "value", item_type)?, &format!("property {key:?}"))?
        };
        properties.push(Property {
            key,
            value,
            location,
        });
    }
    Ok(SyntaxNode::new(NodeData::Object(properties)))
}

/// Name of a non-computed key: identifiers by name, literals by value.
fn static_key(key: &Value) -> Option<String> {
    match node_type(key)? {
        "Identifier" => key.get("name")?.as_str().map(str::to_string),
        "Literal" | "StringLiteral" | "NumericLiteral" => match key.get("value")? {
            Value::String(s) => Some(s.clone()),
            number @ Value::Number(_) => Some(number.to_string()),
            _ => None,
        },
        _ => None,
    }
}

fn node_type(value: &Value) -> Option<&str> {
    value.get("type")?.as_str()
}

fn node_type_of<'a>(value: &'a Value, context: &str) -> Result<&'a str, EstreeError> {
    node_type(value).ok_or_else(|| EstreeError::NotANode {
        context: context.to_string(),
        found: describe_json(value).to_string(),
    })
}

fn field<'a>(value: &'a Value, name: &'static str, ty: &str) -> Result<&'a Value, EstreeError> {
    value.get(name).ok_or_else(|| EstreeError::MissingField {
        node_type: ty.to_string(),
        field: name,
    })
}

/// Location from `start`/`end` (acorn, babel) or `range` (espree), plus
/// `loc.start` when present.
fn location_of(value: &Value) -> SourceLocation {
    let offset = |name: &str, index: usize| {
        value
            .get(name)
            .and_then(Value::as_u64)
            .or_else(|| value.get("range")?.get(index)?.as_u64())
            .unwrap_or_default() as usize
    };
    let location = SourceLocation::new(offset("start", 0), offset("end", 1));
    let start = value.get("loc").and_then(|loc| loc.get("start"));
    let position = |name: &str| {
        start
            .and_then(|s| s.get(name))
            .and_then(Value::as_u64)
            .and_then(|n| u32::try_from(n).ok())
    };
    match (position("line"), position("column")) {
        (Some(line), Some(column)) => location.with_position(line, column),
        _ => location,
    }
}

fn describe_json(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object without a type",
    }
}
