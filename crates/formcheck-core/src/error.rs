//! # Error Types — Structured Error Hierarchy
//!
//! Defines the error types used throughout formcheck. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Validation findings are never errors. They are returned as diagnostics.
//! - Errors here cover inputs the engine cannot interpret at all: malformed
//!   host trees and schema type names that do not exist.

use thiserror::Error;

/// Top-level error type for formcheck.
#[derive(Error, Debug)]
pub enum FormcheckError {
    /// A schema named a type that is not a known [`TypeTag`](crate::TypeTag).
    #[error("unknown type name: {0:?}")]
    UnknownTypeName(String),
}

/// Error while lowering an ESTree document into syntax nodes.
#[derive(Error, Debug)]
pub enum EstreeError {
    /// A value in node position is not an object with a string `type` field.
    #[error("expected an ESTree node at {context}, found {found}")]
    NotANode {
        /// Where in the parent the node was expected.
        context: String,
        /// Short description of what was found instead.
        found: String,
    },

    /// A node is missing a field its ESTree type requires.
    #[error("{node_type} node is missing required field {field:?}")]
    MissingField {
        /// ESTree `type` of the incomplete node.
        node_type: String,
        /// Name of the missing field.
        field: &'static str,
    },
}
