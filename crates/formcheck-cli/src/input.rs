//! # Input Loading
//!
//! Two kinds of input files are understood:
//!
//! - **ESTree documents**: the JSON AST of a JavaScript/TypeScript module,
//!   as produced by acorn, espree or `@babel/parser`. Every declaration
//!   matched by the [`FormLocator`] yields one form.
//! - **Data documents**: a JSON or YAML file whose root value is the form
//!   itself. These are lowered from YAML so key order is preserved.

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use clap::ValueEnum;

use formcheck_core::{locate_forms, FormLocator, SyntaxNode};

/// How to interpret an input file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum InputFormat {
    /// ESTree when a `.json` file holds a `Program` or `File` node, data otherwise.
    #[default]
    Auto,
    /// ESTree JSON.
    Estree,
    /// Plain JSON or YAML data.
    Data,
}

/// One form found in an input file.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedForm {
    /// Where in the file the form came from, e.g. "binding `form`".
    pub origin: String,
    pub tree: SyntaxNode,
}

/// Read `path` and extract every form it contains.
pub fn load_forms(path: &Path, format: InputFormat, locator: &FormLocator) -> Result<Vec<LoadedForm>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_forms(&content, detect_format(path, &content, format), locator)
}

/// Extract forms from already-read content.
pub fn parse_forms(content: &str, format: InputFormat, locator: &FormLocator) -> Result<Vec<LoadedForm>> {
    match format {
        InputFormat::Estree => {
            let program: serde_json::Value =
                serde_json::from_str(content).context("invalid ESTree JSON")?;
            let located = locate_forms(&program, locator);
            tracing::debug!(forms = located.len(), binding = %locator.binding, "located forms");
            located
                .iter()
                .map(|form| {
                    let tree = form
                        .lower()
                        .with_context(|| format!("cannot read {} at {}", form.origin, form.location))?;
                    Ok(LoadedForm {
                        origin: form.origin.to_string(),
                        tree,
                    })
                })
                .collect()
        }
        InputFormat::Data | InputFormat::Auto => {
            let document: serde_yaml::Value =
                serde_yaml::from_str(content).context("invalid JSON/YAML document")?;
            let tree = yaml_to_syntax_node(&document).map_err(|e| anyhow!(e))?;
            Ok(vec![LoadedForm {
                origin: "document".to_string(),
                tree,
            }])
        }
    }
}

fn detect_format(path: &Path, content: &str, requested: InputFormat) -> InputFormat {
    if requested != InputFormat::Auto {
        return requested;
    }
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    if !is_json {
        return InputFormat::Data;
    }
    let root_type = serde_json::from_str::<serde_json::Value>(content)
        .ok()
        .and_then(|v| v.get("type").and_then(|t| t.as_str()).map(str::to_string));
    match root_type.as_deref() {
        Some("Program" | "File") => InputFormat::Estree,
        _ => InputFormat::Data,
    }
}

/// Lower a YAML (or JSON) value into a syntax node, keeping mapping order.
fn yaml_to_syntax_node(yaml: &serde_yaml::Value) -> Result<SyntaxNode, String> {
    match yaml {
        serde_yaml::Value::Null => Ok(SyntaxNode::null()),
        serde_yaml::Value::Bool(b) => Ok(SyntaxNode::boolean(*b)),
        serde_yaml::Value::Number(n) => n
            .as_f64()
            .map(SyntaxNode::number)
            .ok_or_else(|| format!("unsupported YAML number: {n:?}")),
        serde_yaml::Value::String(s) => Ok(SyntaxNode::string(s.as_str())),
        serde_yaml::Value::Sequence(seq) => {
            let items: Result<Vec<SyntaxNode>, String> = seq.iter().map(yaml_to_syntax_node).collect();
            Ok(SyntaxNode::array(items?))
        }
        serde_yaml::Value::Mapping(map) => {
            let mut properties = Vec::with_capacity(map.len());
            for (k, v) in map {
                let key = match k {
                    serde_yaml::Value::String(s) => s.clone(),
                    serde_yaml::Value::Number(n) => n.to_string(),
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    other => return Err(format!("unsupported YAML map key type: {other:?}")),
                };
                properties.push((key, yaml_to_syntax_node(v)?));
            }
            Ok(SyntaxNode::object(properties))
        }
        // Tags carry no shape information.
        serde_yaml::Value::Tagged(tagged) => yaml_to_syntax_node(&tagged.value),
    }
}
