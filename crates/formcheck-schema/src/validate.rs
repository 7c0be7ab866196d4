//! # Form Validation
//!
//! [`SchemaValidator`] checks a form's syntax tree against a [`FormSchema`]
//! and returns every violation it finds. The per-level entry points
//! ([`FormValidator`], [`StepValidator`], [`FieldValidator`]) validate a
//! subtree in isolation; they share one traversal, so a step checked on its
//! own yields the same diagnostics it would inside a form (pointers aside).
//!
//! ## Dynamic Values
//!
//! A value built by a call (or a spread, `new`, `await`...) has no static
//! shape. Such nodes are skipped wherever an element is expected: the
//! root, a container, and each container element. As a property value a
//! call passes the type check unexamined. Function values are skipped as
//! elements but are type-checked as properties, where `function` is a
//! declared type.
//!
//! ## Thread Safety
//!
//! `SchemaValidator` is `Send + Sync` and holds no per-run state; each call
//! to `validate` gets its own sink.

use formcheck_core::SyntaxNode;
use serde::{Deserialize, Serialize};

use crate::catalog::{FormSchema, Level, RequiredPolicy};
use crate::diagnostic::DiagnosticSink;
use crate::table::SchemaDefinitionError;
use crate::walk::Walk;

/// Default nesting ceiling. The form is depth 0, its steps depth 1 and
/// their fields depth 2 and below.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Runtime knobs for a validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorConfig {
    /// Elements nested deeper than this are reported and not descended into.
    pub max_depth: usize,
    /// Emit one `debug` event per validated element and container.
    pub trace: bool,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            trace: false,
        }
    }
}

/// Validates form syntax trees against a schema.
#[derive(Debug, Clone)]
pub struct SchemaValidator {
    schema: FormSchema,
    config: ValidatorConfig,
}

impl SchemaValidator {
    pub fn new(schema: FormSchema, config: ValidatorConfig) -> Self {
        Self { schema, config }
    }

    /// Built-in tables, [`RequiredPolicy::Canonical`], default config.
    ///
    /// # Errors
    ///
    /// Returns `SchemaDefinitionError` if a built-in table fails to parse.
    pub fn canonical() -> Result<Self, SchemaDefinitionError> {
        Ok(Self::new(FormSchema::new(RequiredPolicy::Canonical)?, ValidatorConfig::default()))
    }

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Validate a whole form. Diagnostics come back in traversal order.
    pub fn validate(&self, root: &SyntaxNode) -> DiagnosticSink {
        FormValidator::new(self).validate(root)
    }

    fn run(&self, level: Level, node: &SyntaxNode, depth: usize) -> DiagnosticSink {
        let mut walk = Walk::new(&self.schema, &self.config);
        walk.element(level, node, "", depth);
        let sink = walk.finish();
        tracing::debug!(
            level = %level,
            diagnostics = sink.len(),
            "validation finished"
        );
        sink
    }
}

/// Validates the root level and everything beneath it.
#[derive(Debug, Clone, Copy)]
pub struct FormValidator<'a> {
    validator: &'a SchemaValidator,
}

impl<'a> FormValidator<'a> {
    pub fn new(validator: &'a SchemaValidator) -> Self {
        Self { validator }
    }

    pub fn validate(&self, form: &SyntaxNode) -> DiagnosticSink {
        self.validator.run(Level::Form, form, 0)
    }
}

/// Validates one step and its fields.
#[derive(Debug, Clone, Copy)]
pub struct StepValidator<'a> {
    validator: &'a SchemaValidator,
}

impl<'a> StepValidator<'a> {
    pub fn new(validator: &'a SchemaValidator) -> Self {
        Self { validator }
    }

    pub fn validate(&self, step: &SyntaxNode) -> DiagnosticSink {
        self.validator.run(Level::Step, step, 1)
    }
}

/// Validates one field and, recursively, its nested fields.
#[derive(Debug, Clone, Copy)]
pub struct FieldValidator<'a> {
    validator: &'a SchemaValidator,
}

impl<'a> FieldValidator<'a> {
    pub fn new(validator: &'a SchemaValidator) -> Self {
        Self { validator }
    }

    pub fn validate(&self, field: &SyntaxNode) -> DiagnosticSink {
        self.validator.run(Level::Field, field, 2)
    }
}
