//! # formcheck-schema — Schema Tables & Form Validators
//!
//! Checks a form configuration's syntax tree against a declarative schema
//! of allowed property names, types and enumerated values, reporting every
//! violation rather than stopping at the first.
//!
//! ## Schema Tables (`table`)
//!
//! Tables are authored in the `path:type1,type2[v1,v2]` mini-format and
//! parsed once into [`SchemaEntry`] values. Path resolution is
//! segment-aware.
//!
//! ## Catalog (`catalog`)
//!
//! The built-in form, step and field tables, the containers each level
//! descends into, and the named [`RequiredPolicy`] presets.
//!
//! ## Validation (`validate`)
//!
//! - [`SchemaValidator::validate`] — validates a whole form and returns a
//!   [`DiagnosticSink`] in traversal order.
//! - [`FormValidator`], [`StepValidator`], [`FieldValidator`] — the same
//!   traversal entered at one level.
//!
//! ## Crate Policy
//!
//! - Depends only on `formcheck-core` internally.
//! - Validation never fails: malformed input becomes diagnostics. Only
//!   building a schema returns an error.
//! - Nothing is evaluated. Calls and functions are opaque.

pub mod catalog;
pub mod diagnostic;
pub mod table;
pub mod validate;
mod walk;

pub use catalog::{
    Container, ElementPolicy, FormSchema, Level, LevelSchema, RequiredPolicy, FIELD_SCHEMA,
    FORM_SCHEMA, STEP_SCHEMA,
};
pub use diagnostic::{Diagnostic, DiagnosticKind, DiagnosticSink};
pub use table::{EntryError, PropertyPath, SchemaDefinitionError, SchemaEntry, SchemaTable};
pub use validate::{
    FieldValidator, FormValidator, SchemaValidator, StepValidator, ValidatorConfig,
    DEFAULT_MAX_DEPTH,
};
