//! # formcheck-core — Foundational Types for formcheck
//!
//! This crate is the leaf of the formcheck workspace. It defines the
//! read-only tree model that the validation engine walks, and the adapter
//! that builds that tree from the host parser's output. Every other crate in
//! the workspace depends on `formcheck-core`; it depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Syntax, not values.** A [`SyntaxNode`] describes the *shape* of a
//!    configuration expression. Calls and functions are kept as opaque
//!    [`NodeKind::Call`] / [`NodeKind::FunctionLike`] markers; nothing is
//!    ever evaluated.
//!
//! 2. **One classification table.** [`TypeTag`] is the single definition of
//!    the semantic types a schema may name. Adding a tag forces every
//!    `match` over it to be updated.
//!
//! 3. **Opaque locations.** [`SourceLocation`] is carried through to
//!    diagnostics and never interpreted by the engine.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `formcheck-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod estree;
pub mod node;
pub mod types;

// Re-export primary types for ergonomic imports.
pub use error::{EstreeError, FormcheckError};
pub use estree::{locate_forms, lower_expression, FormLocator, FormOrigin, LocatedForm};
pub use node::{LiteralValue, NodeData, NodeKind, Property, SourceLocation, SyntaxNode};
pub use types::{classify, matches, TypeSet, TypeTag, TYPE_TAG_COUNT};
