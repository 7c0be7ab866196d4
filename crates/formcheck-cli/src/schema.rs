//! # Schema Subcommand
//!
//! Prints the effective schema tables, after configuration, in the
//! mini-format they are authored in.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;

use formcheck_schema::{FormSchema, Level, RequiredPolicy};

use crate::config::{FormcheckConfig, Overrides};

/// Arguments for the schema subcommand.
#[derive(Args, Debug)]
pub struct SchemaArgs {
    /// Print only this level (form, step, field).
    #[arg(long)]
    pub level: Option<Level>,

    /// Required-property policy (canonical, strict, none).
    #[arg(long)]
    pub policy: Option<RequiredPolicy>,
}

/// Execute the schema subcommand.
pub fn run_schema(args: &SchemaArgs, config_path: Option<&Path>) -> Result<u8> {
    let overrides = Overrides {
        policy: args.policy,
        ..Overrides::default()
    };
    let config = FormcheckConfig::load_optional(config_path)?.with_overrides(&overrides);
    let schema = config.form_schema().context("invalid schema configuration")?;
    let levels: Vec<Level> = match args.level {
        Some(level) => vec![level],
        None => Level::all_levels().to_vec(),
    };
    print!("{}", render_schema(&schema, &levels));
    Ok(0)
}

fn render_schema(schema: &FormSchema, levels: &[Level]) -> String {
    let mut out = String::new();
    for (i, level) in levels.iter().enumerate() {
        let level_schema = schema.level(*level);
        if i > 0 {
            out.push('\n');
        }
        let required: Vec<String> = level_schema.required.iter().map(ToString::to_string).collect();
        let required = if required.is_empty() {
            "none".to_string()
        } else {
            required.join(", ")
        };
        let _ = writeln!(out, "# {level} (required: {required})");
        for line in level_schema.table.to_lines() {
            let _ = writeln!(out, "{line}");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_single_level() {
        let schema = FormSchema::new(RequiredPolicy::Strict).unwrap();
        let text = render_schema(&schema, &[Level::Step]);
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("# step (required: stepperCallout, name, fields)"));
        assert_eq!(lines.next(), Some("id:string"));
        assert!(text.contains("stepperCallout:string,boolean\n"));
        assert!(text.contains("layout:string[single,double,grid]\n"));
    }

    #[test]
    fn test_render_all_levels() {
        let schema = FormSchema::canonical().unwrap();
        let text = render_schema(&schema, Level::all_levels());
        assert!(text.contains("# form (required: steps)"));
        assert!(text.contains("# step (required: none)"));
        assert!(text.contains("# field (required: none)"));
        assert!(text.contains("persistence:string[void,localStorage,sessionStorage]"));
    }

    #[test]
    fn test_run_schema_with_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("formcheck.yaml");
        std::fs::write(&config, "schema:\n  field: [\"id:string\"]\n").unwrap();
        let args = SchemaArgs {
            level: Some(Level::Field),
            policy: None,
        };
        assert_eq!(run_schema(&args, Some(&config)).unwrap(), 0);
    }
}
