//! # Check Subcommand
//!
//! Validates the forms in one or more files and reports every diagnostic.
//!
//! Exit codes: `0` when every form is clean, `1` when diagnostics were
//! reported (`0` with `--warn-only`), `2` when a file could not be read or
//! parsed. Unreadable files are reported and the remaining files are still
//! checked.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use formcheck_schema::RequiredPolicy;

use crate::config::{FormcheckConfig, Overrides};
use crate::input::{load_forms, InputFormat};
use crate::report::{render_json, render_text, FormReport, OutputFormat};

/// Arguments for the check subcommand.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Files to check (ESTree JSON, or JSON/YAML data).
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// How to interpret the input files.
    #[arg(long, value_enum, default_value_t = InputFormat::Auto)]
    pub input: InputFormat,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Required-property policy (canonical, strict, none).
    #[arg(long)]
    pub policy: Option<RequiredPolicy>,

    /// Variable name that holds the form.
    #[arg(long)]
    pub binding: Option<String>,

    /// Also validate `export default` expressions.
    #[arg(long)]
    pub default_export: bool,

    /// Maximum nesting depth before descent stops.
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Log every validated element at debug level.
    #[arg(long)]
    pub trace: bool,

    /// Report diagnostics but exit 0.
    #[arg(long)]
    pub warn_only: bool,
}

impl CheckArgs {
    fn overrides(&self) -> Overrides {
        Overrides {
            policy: self.policy,
            max_depth: self.max_depth,
            trace: self.trace,
            binding: self.binding.clone(),
            default_export: self.default_export,
        }
    }
}

/// Execute the check subcommand.
pub fn run_check(args: &CheckArgs, config_path: Option<&Path>) -> Result<u8> {
    let config = FormcheckConfig::load_optional(config_path)?.with_overrides(&args.overrides());
    let validator = config.validator().context("invalid schema configuration")?;
    let locator = config.locator();
    tracing::debug!(
        policy = %config.policy.unwrap_or_default(),
        binding = %locator.binding,
        default_export = locator.default_export,
        "resolved configuration"
    );

    let mut reports = Vec::new();
    let mut unreadable = 0usize;
    for path in &args.paths {
        let forms = match load_forms(path, args.input, &locator) {
            Ok(forms) => forms,
            Err(e) => {
                eprintln!("{}: parsing error: {e:#}", path.display());
                unreadable += 1;
                continue;
            }
        };
        if forms.is_empty() {
            tracing::info!(file = %path.display(), "no form declaration found");
        }
        for form in forms {
            let diagnostics = validator.validate(&form.tree);
            tracing::info!(
                file = %path.display(),
                form = %form.origin,
                diagnostics = diagnostics.len(),
                "checked form"
            );
            reports.push(FormReport {
                file: path.clone(),
                origin: form.origin,
                diagnostics,
            });
        }
    }

    let total: usize = reports.iter().map(|r| r.diagnostics.len()).sum();
    match args.format {
        OutputFormat::Text => {
            if total > 0 {
                println!("{}", render_text(&reports));
            }
        }
        OutputFormat::Json => println!("{}", render_json(&reports)?),
    }
    tracing::info!(
        files = args.paths.len(),
        forms = reports.len(),
        diagnostics = total,
        unreadable,
        "check finished"
    );

    Ok(exit_code(total, unreadable, args.warn_only))
}

fn exit_code(diagnostics: usize, unreadable: usize, warn_only: bool) -> u8 {
    if unreadable > 0 {
        2
    } else if diagnostics > 0 && !warn_only {
        1
    } else {
        0
    }
}
