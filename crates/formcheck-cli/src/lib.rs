//! # formcheck-cli — Form Configuration Checker
//!
//! The `formcheck` binary. Loads form declarations from ESTree documents or
//! plain JSON/YAML data, validates them with `formcheck-schema`, and prints
//! the diagnostics.
//!
//! ## Subcommands
//!
//! - `check` — validate files and report diagnostics
//! - `schema` — print the effective schema tables
//!
//! ## Crate Policy
//!
//! - Argument parsing lives in `main.rs`; handlers take parsed arguments.
//! - Validation rules live in the library crates, never here.

pub mod check;
pub mod config;
pub mod input;
pub mod report;
pub mod schema;
