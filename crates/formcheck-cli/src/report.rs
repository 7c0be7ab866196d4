//! # Diagnostic Rendering
//!
//! Text output is one line per diagnostic:
//!
//! ```text
//! forms/signup.ast.json:12:5: steps[0].fields[1].type: property "type" has invalid type number; expected string,function [invalid_type]
//! ```
//!
//! The line/column prefix is omitted when the input carried no positions.
//! JSON output is an array of diagnostic objects, each tagged with its file
//! and form origin.

use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::Serialize;

use formcheck_schema::{Diagnostic, DiagnosticSink};

/// Output format for `formcheck check`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Diagnostics for one form of one file.
#[derive(Debug, Clone)]
pub struct FormReport {
    pub file: PathBuf,
    pub origin: String,
    pub diagnostics: DiagnosticSink,
}

#[derive(Serialize)]
struct JsonDiagnostic<'a> {
    file: &'a Path,
    form: &'a str,
    #[serde(flatten)]
    diagnostic: &'a Diagnostic,
}

/// Render a single diagnostic as a text line.
pub fn text_line(file: &Path, diagnostic: &Diagnostic) -> String {
    let location = &diagnostic.location;
    let prefix = if location.line > 0 {
        format!("{}:{}:{}", file.display(), location.line, location.column + 1)
    } else {
        file.display().to_string()
    };
    format!("{prefix}: {diagnostic} [{}]", diagnostic.kind)
}

/// Render every report as text, one diagnostic per line.
pub fn render_text(reports: &[FormReport]) -> String {
    reports
        .iter()
        .flat_map(|report| report.diagnostics.iter().map(move |d| text_line(&report.file, d)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render every report as a pretty-printed JSON array.
pub fn render_json(reports: &[FormReport]) -> serde_json::Result<String> {
    let entries: Vec<JsonDiagnostic<'_>> = reports
        .iter()
        .flat_map(|report| {
            report.diagnostics.iter().map(move |diagnostic| JsonDiagnostic {
                file: &report.file,
                form: &report.origin,
                diagnostic,
            })
        })
        .collect();
    serde_json::to_string_pretty(&entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use formcheck_core::SourceLocation;
    use formcheck_schema::{DiagnosticKind, Level, PropertyPath};

    fn report(location: SourceLocation) -> FormReport {
        let mut diagnostics = DiagnosticSink::new();
        diagnostics.push(Diagnostic {
            kind: DiagnosticKind::InvalidType,
            level: Level::Field,
            path: PropertyPath::parse("type").unwrap(),
            pointer: "steps[0].fields[0].type".into(),
            message: "property \"type\" has invalid type number; expected string,function".into(),
            location,
        });
        FormReport {
            file: PathBuf::from("signup.json"),
            origin: "binding `form`".into(),
            diagnostics,
        }
    }

    #[test]
    fn test_text_with_position() {
        let text = render_text(&[report(SourceLocation::new(100, 103).with_position(12, 4))]);
        assert_eq!(
            text,
            "signup.json:12:5: steps[0].fields[0].type: property \"type\" has invalid type number; \
             expected string,function [invalid_type]"
        );
    }

    #[test]
    fn test_text_without_position() {
        let text = render_text(&[report(SourceLocation::default())]);
        assert!(text.starts_with("signup.json: steps[0].fields[0].type: "));
    }

    #[test]
    fn test_json_is_flat() {
        let json = render_json(&[report(SourceLocation::new(1, 2))]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let first = &value[0];
        assert_eq!(first["file"], "signup.json");
        assert_eq!(first["form"], "binding `form`");
        assert_eq!(first["kind"], "invalid_type");
        assert_eq!(first["level"], "field");
        assert_eq!(first["path"], "type");
        assert_eq!(first["location"]["start"], 1);
    }

    #[test]
    fn test_empty_reports_render_empty() {
        assert_eq!(render_text(&[]), "");
        assert_eq!(render_json(&[]).unwrap(), "[]");
    }
}
