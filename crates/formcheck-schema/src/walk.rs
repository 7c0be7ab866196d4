//! Depth-first traversal shared by the form, step and field validators.
//!
//! One [`Walk`] lives for exactly one validation run and owns that run's
//! sink. Each element is checked in a fixed order: required properties,
//! then every present property in declaration order (drilling into nested
//! objects as it goes), then the level's containers. A container key the
//! level's table does not list is reported as unknown and not descended
//! into. Repeated keys resolve to the last occurrence, as in JavaScript.

use formcheck_core::{NodeKind, SyntaxNode};

use crate::catalog::{ElementPolicy, FormSchema, Level, LevelSchema};
use crate::diagnostic::{Diagnostic, DiagnosticKind, DiagnosticSink};
use crate::table::{PropertyPath, SchemaEntry};
use crate::validate::ValidatorConfig;

pub(crate) struct Walk<'s> {
    schema: &'s FormSchema,
    config: &'s ValidatorConfig,
    sink: DiagnosticSink,
}

impl<'s> Walk<'s> {
    pub(crate) fn new(schema: &'s FormSchema, config: &'s ValidatorConfig) -> Self {
        Self {
            schema,
            config,
            sink: DiagnosticSink::new(),
        }
    }

    pub(crate) fn finish(self) -> DiagnosticSink {
        self.sink
    }

    /// Validate `node` as an element of `level` sitting at `pointer`.
    ///
    /// Dynamic nodes are skipped. Anything else that is not an object is
    /// reported once, as is an element nested deeper than the ceiling.
    pub(crate) fn element(&mut self, level: Level, node: &SyntaxNode, pointer: &str, depth: usize) {
        if node.is_dynamic() {
            return;
        }
        if self.config.trace {
            tracing::debug!(level = %level, pointer, depth, kind = %node.kind(), "validating element");
        }
        if depth > self.config.max_depth {
            self.report(Diagnostic {
                kind: DiagnosticKind::DepthLimitExceeded,
                level,
                path: PropertyPath::root(),
                pointer: pointer.to_string(),
                message: format!(
                    "{level} nested deeper than the limit of {}; not validated",
                    self.config.max_depth
                ),
                location: node.location,
            });
            return;
        }
        if node.kind() != NodeKind::Object {
            self.report(Diagnostic {
                kind: DiagnosticKind::MalformedElement,
                level,
                path: PropertyPath::root(),
                pointer: pointer.to_string(),
                message: format!("{level} is not a valid object, found {}", node.describe()),
                location: node.location,
            });
            return;
        }

        let schema: &'s FormSchema = self.schema;
        let schema = schema.level(level);
        self.required(schema, node, pointer);
        self.properties(schema, node, &PropertyPath::root(), pointer);
        self.containers(schema, node, pointer, depth);
    }

    fn required(&mut self, schema: &LevelSchema, node: &SyntaxNode, pointer: &str) {
        for path in &schema.required {
            if node.lookup(path.segments()).is_none() {
                self.report(Diagnostic {
                    kind: DiagnosticKind::MissingRequiredProperty,
                    level: schema.level,
                    path: path.clone(),
                    pointer: pointer.to_string(),
                    message: format!("missing required property \"{path}\" in {}", schema.level),
                    location: node.location,
                });
            }
        }
    }

    fn properties(&mut self, schema: &LevelSchema, node: &SyntaxNode, prefix: &PropertyPath, pointer: &str) {
        for property in node.properties() {
            let path = prefix.child(&property.key);
            let property_pointer = join(pointer, &property.key);
            let Some(entry) = schema.table.resolve(&path) else {
                self.report(Diagnostic {
                    kind: DiagnosticKind::UnknownProperty,
                    level: schema.level,
                    message: format!("invalid property \"{path}\" in {}", schema.level),
                    path,
                    pointer: property_pointer,
                    location: property.location,
                });
                continue;
            };

            // Containers are shape-checked by the container gate.
            if schema.container(&path).is_some() {
                continue;
            }
            let value = &property.value;
            if value.kind() == NodeKind::Call {
                continue;
            }
            if !self.check_value(schema.level, entry, &path, value, &property_pointer) {
                continue;
            }
            if value.kind() == NodeKind::Object && entry.path == path && schema.table.drills_into(&path) {
                self.properties(schema, value, &path, &property_pointer);
            }
        }
    }

    /// Type and enumeration check for one property value. Returns false
    /// when a diagnostic was emitted.
    fn check_value(
        &mut self,
        level: Level,
        entry: &SchemaEntry,
        path: &PropertyPath,
        value: &SyntaxNode,
        pointer: &str,
    ) -> bool {
        if !entry.types.admits(value) {
            self.report(Diagnostic {
                kind: DiagnosticKind::InvalidType,
                level,
                path: path.clone(),
                pointer: pointer.to_string(),
                message: format!(
                    "property \"{path}\" has invalid type {}; expected {}",
                    value.describe(),
                    entry.types
                ),
                location: value.location,
            });
            return false;
        }
        if let Some(literal) = value.literal() {
            if !entry.allows_value(literal) {
                self.report(Diagnostic {
                    kind: DiagnosticKind::InvalidValue,
                    level,
                    path: path.clone(),
                    pointer: pointer.to_string(),
                    message: format!(
                        "property \"{path}\" has invalid value {literal}; allowed values: {}",
                        entry.values.join(", ")
                    ),
                    location: value.location,
                });
                return false;
            }
        }
        true
    }

    fn containers(&mut self, schema: &LevelSchema, node: &SyntaxNode, pointer: &str, depth: usize) {
        for container in &schema.containers {
            if schema.table.resolve(&container.path).is_none() {
                continue;
            }
            let Some(value) = node.lookup(container.path.segments()) else {
                continue;
            };
            if value.is_dynamic() {
                continue;
            }
            let path = &container.path;
            let container_pointer = join(pointer, &path.to_string());
            if value.kind() != NodeKind::Array {
                self.report(Diagnostic {
                    kind: DiagnosticKind::MalformedContainer,
                    level: schema.level,
                    path: path.clone(),
                    pointer: container_pointer,
                    message: format!("\"{path}\" should be an array, found {}", value.describe()),
                    location: value.location,
                });
                continue;
            }
            if self.config.trace {
                tracing::debug!(
                    level = %schema.level,
                    container = %path,
                    elements = value.elements().len(),
                    "descending into container"
                );
            }

            for (index, element) in value.elements().iter().enumerate() {
                let element_pointer = format!("{container_pointer}[{index}]");
                match container.elements {
                    ElementPolicy::Steps => self.element(Level::Step, element, &element_pointer, depth + 1),
                    ElementPolicy::Fields => self.element(Level::Field, element, &element_pointer, depth + 1),
                    ElementPolicy::Objects => {
                        if !element.is_dynamic() && element.kind() != NodeKind::Object {
                            self.report(Diagnostic {
                                kind: DiagnosticKind::MalformedElement,
                                level: schema.level,
                                path: path.clone(),
                                pointer: element_pointer,
                                message: format!(
                                    "element {index} of \"{path}\" is not a valid object, found {}",
                                    element.describe()
                                ),
                                location: element.location,
                            });
                        }
                    }
                }
            }
        }
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        self.sink.push(diagnostic);
    }
}

fn join(pointer: &str, key: &str) -> String {
    if pointer.is_empty() {
        key.to_string()
    } else {
        format!("{pointer}.{key}")
    }
}
