//! # Diagnostics
//!
//! A [`Diagnostic`] is one reported violation. Diagnostics are data, not
//! errors: a validation run always completes and hands back a
//! [`DiagnosticSink`] holding every violation in traversal order.

use std::fmt;

use formcheck_core::SourceLocation;
use serde::{Deserialize, Serialize};

use crate::catalog::Level;
use crate::table::PropertyPath;

/// Category of a violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A required key is absent.
    MissingRequiredProperty,
    /// A key has no schema entry.
    UnknownProperty,
    /// A value's type is not among the entry's allowed types.
    InvalidType,
    /// A literal is not in the entry's enumeration.
    InvalidValue,
    /// A container property is not an array.
    MalformedContainer,
    /// A container element (or the root) is not an object.
    MalformedElement,
    /// Nesting exceeded the configured ceiling.
    DepthLimitExceeded,
}

impl DiagnosticKind {
    pub fn all_kinds() -> &'static [DiagnosticKind] {
        &[
            Self::MissingRequiredProperty,
            Self::UnknownProperty,
            Self::InvalidType,
            Self::InvalidValue,
            Self::MalformedContainer,
            Self::MalformedElement,
            Self::DepthLimitExceeded,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingRequiredProperty => "missing_required_property",
            Self::UnknownProperty => "unknown_property",
            Self::InvalidType => "invalid_type",
            Self::InvalidValue => "invalid_value",
            Self::MalformedContainer => "malformed_container",
            Self::MalformedElement => "malformed_element",
            Self::DepthLimitExceeded => "depth_limit_exceeded",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single violation with structured context.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// Structural level whose table was applied.
    pub level: Level,
    /// Property path relative to that level; empty for element-level checks.
    pub path: PropertyPath,
    /// Position in the whole tree, e.g. `steps[0].fields[1].type`.
    pub pointer: String,
    /// Human-readable description.
    pub message: String,
    /// Location of the offending node.
    pub location: SourceLocation,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.pointer.is_empty() {
            write!(f, "({}): {}", self.level, self.message)
        } else {
            write!(f, "{}: {}", self.pointer, self.message)
        }
    }
}

/// Append-only, ordered collection of diagnostics for one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DiagnosticSink {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Returns the number of diagnostics.
    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    /// Returns true if nothing was reported.
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Returns a slice of all diagnostics in traversal order.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Consumes self and returns the inner Vec.
    pub fn into_inner(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.diagnostics.iter()
    }

    /// Number of diagnostics of one kind.
    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.diagnostics.iter().filter(|d| d.kind == kind).count()
    }
}

impl<'a> IntoIterator for &'a DiagnosticSink {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.iter()
    }
}

impl fmt::Display for DiagnosticSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, d) in self.diagnostics.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{d}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diagnostic(kind: DiagnosticKind, pointer: &str) -> Diagnostic {
        Diagnostic {
            kind,
            level: Level::Form,
            path: PropertyPath::root(),
            pointer: pointer.to_string(),
            message: "message".to_string(),
            location: SourceLocation::default(),
        }
    }

    #[test]
    fn test_display_root_pointer() {
        let d = diagnostic(DiagnosticKind::MissingRequiredProperty, "");
        assert_eq!(d.to_string(), "(form): message");
        let d = Diagnostic {
            level: Level::Step,
            ..diagnostic(DiagnosticKind::MalformedElement, "")
        };
        assert_eq!(d.to_string(), "(step): message");
        let d = diagnostic(DiagnosticKind::InvalidType, "steps[0].name");
        assert_eq!(d.to_string(), "steps[0].name: message");
    }

    #[test]
    fn test_sink_keeps_order_and_duplicates() {
        let mut sink = DiagnosticSink::new();
        sink.push(diagnostic(DiagnosticKind::UnknownProperty, "a"));
        sink.push(diagnostic(DiagnosticKind::UnknownProperty, "a"));
        sink.push(diagnostic(DiagnosticKind::InvalidType, "b"));
        assert_eq!(sink.len(), 3);
        assert_eq!(sink.count(DiagnosticKind::UnknownProperty), 2);
        let pointers: Vec<&str> = sink.iter().map(|d| d.pointer.as_str()).collect();
        assert_eq!(pointers, vec!["a", "a", "b"]);
        assert_eq!(sink.to_string(), "a: message\na: message\nb: message");
    }

    #[test]
    fn test_kind_names_are_unique() {
        let mut names: Vec<&str> = DiagnosticKind::all_kinds().iter().map(|k| k.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), DiagnosticKind::all_kinds().len());
    }
}
