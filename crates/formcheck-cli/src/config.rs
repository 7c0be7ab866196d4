//! # Configuration File
//!
//! Optional YAML file selected with `--config`. Every key is optional;
//! unknown keys are rejected so typos do not silently fall back to
//! defaults. Command-line flags override values read from the file.
//!
//! ```yaml
//! policy: strict
//! required:
//!   field: [id, type]
//! schema:
//!   form: ["title:string", "steps:array"]
//! max_depth: 128
//! trace: true
//! binding: form
//! default_export: true
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use formcheck_core::FormLocator;
use formcheck_schema::{
    FormSchema, Level, RequiredPolicy, SchemaDefinitionError, SchemaValidator, ValidatorConfig,
    DEFAULT_MAX_DEPTH,
};

/// One optional value per structural level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PerLevel<T> {
    #[serde(default)]
    pub form: Option<T>,
    #[serde(default)]
    pub step: Option<T>,
    #[serde(default)]
    pub field: Option<T>,
}

impl<T> Default for PerLevel<T> {
    fn default() -> Self {
        Self {
            form: None,
            step: None,
            field: None,
        }
    }
}

impl<T> PerLevel<T> {
    pub fn get(&self, level: Level) -> Option<&T> {
        match level {
            Level::Form => self.form.as_ref(),
            Level::Step => self.step.as_ref(),
            Level::Field => self.field.as_ref(),
        }
    }
}

/// Contents of a formcheck configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FormcheckConfig {
    /// Required-property preset.
    #[serde(default)]
    pub policy: Option<RequiredPolicy>,
    /// Per-level replacement of the preset's required names.
    #[serde(default)]
    pub required: PerLevel<Vec<String>>,
    /// Per-level replacement of the built-in tables, in mini-format lines.
    #[serde(default)]
    pub schema: PerLevel<Vec<String>>,
    #[serde(default)]
    pub max_depth: Option<usize>,
    #[serde(default)]
    pub trace: Option<bool>,
    /// Variable name that holds the form.
    #[serde(default)]
    pub binding: Option<String>,
    /// Also validate `export default` expressions.
    #[serde(default)]
    pub default_export: Option<bool>,
}

/// Values given on the command line; `None` leaves the file's value alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub policy: Option<RequiredPolicy>,
    pub max_depth: Option<usize>,
    pub trace: bool,
    pub binding: Option<String>,
    pub default_export: bool,
}

impl FormcheckConfig {
    /// Read and parse a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;
        tracing::debug!(path = %path.display(), ?config, "loaded configuration");
        Ok(config)
    }

    /// Load `path` if given, otherwise start from defaults.
    pub fn load_optional(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Apply command-line overrides on top of the file's values.
    pub fn with_overrides(mut self, overrides: &Overrides) -> Self {
        if let Some(policy) = overrides.policy {
            self.policy = Some(policy);
        }
        if let Some(max_depth) = overrides.max_depth {
            self.max_depth = Some(max_depth);
        }
        if overrides.trace {
            self.trace = Some(true);
        }
        if let Some(binding) = &overrides.binding {
            self.binding = Some(binding.clone());
        }
        if overrides.default_export {
            self.default_export = Some(true);
        }
        self
    }

    /// The effective schema: the policy's preset with per-level tables and
    /// required sets replaced where configured.
    pub fn form_schema(&self) -> Result<FormSchema, SchemaDefinitionError> {
        let mut schema = FormSchema::new(self.policy.unwrap_or_default())?;
        for level in Level::all_levels() {
            if let Some(lines) = self.schema.get(*level) {
                schema.replace_table(*level, lines)?;
            }
            if let Some(names) = self.required.get(*level) {
                schema.set_required(*level, names)?;
            }
        }
        Ok(schema)
    }

    pub fn validator_config(&self) -> ValidatorConfig {
        ValidatorConfig {
            max_depth: self.max_depth.unwrap_or(DEFAULT_MAX_DEPTH),
            trace: self.trace.unwrap_or(false),
        }
    }

    pub fn validator(&self) -> Result<SchemaValidator, SchemaDefinitionError> {
        Ok(SchemaValidator::new(self.form_schema()?, self.validator_config()))
    }

    pub fn locator(&self) -> FormLocator {
        let defaults = FormLocator::default();
        FormLocator {
            binding: self.binding.clone().unwrap_or(defaults.binding),
            default_export: self.default_export.unwrap_or(defaults.default_export),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults_without_file() {
        let config = FormcheckConfig::load_optional(None).unwrap();
        assert_eq!(config, FormcheckConfig::default());
        assert_eq!(config.validator_config(), ValidatorConfig::default());
        assert_eq!(config.locator(), FormLocator::default());
        let schema = config.form_schema().unwrap();
        assert_eq!(schema, FormSchema::canonical().unwrap());
    }

    #[test]
    fn test_load_full_file() {
        let file = write_config(
            r#"
policy: strict
required:
  field: [id, type]
schema:
  form: ["title:string", "steps:array"]
max_depth: 128
trace: true
binding: wizard
default_export: true
"#,
        );
        let config = FormcheckConfig::load(file.path()).unwrap();
        assert_eq!(config.policy, Some(RequiredPolicy::Strict));
        assert_eq!(config.locator().binding, "wizard");
        assert!(config.locator().default_export);
        assert_eq!(config.validator_config().max_depth, 128);

        let schema = config.form_schema().unwrap();
        assert_eq!(schema.form.table.len(), 2);
        assert_eq!(schema.field.required.len(), 2);
        assert_eq!(schema.step.required.len(), 3);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let file = write_config("polcy: strict\n");
        let err = FormcheckConfig::load(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("polcy"));
    }

    #[test]
    fn test_unknown_policy_rejected() {
        let file = write_config("policy: lenient\n");
        assert!(FormcheckConfig::load(file.path()).is_err());
    }

    #[test]
    fn test_bad_schema_line_is_definition_error() {
        let file = write_config("schema:\n  step: [\"name\"]\n");
        let config = FormcheckConfig::load(file.path()).unwrap();
        let err = config.validator().unwrap_err();
        assert!(matches!(err, SchemaDefinitionError::InvalidEntry { .. }));
    }

    #[test]
    fn test_overrides_win() {
        let file = write_config("policy: none\nmax_depth: 10\nbinding: wizard\n");
        let config = FormcheckConfig::load(file.path())
            .unwrap()
            .with_overrides(&Overrides {
                policy: Some(RequiredPolicy::Strict),
                max_depth: None,
                trace: true,
                binding: Some("form".into()),
                default_export: false,
            });
        assert_eq!(config.policy, Some(RequiredPolicy::Strict));
        assert_eq!(config.max_depth, Some(10));
        assert_eq!(config.trace, Some(true));
        assert_eq!(config.binding.as_deref(), Some("form"));
        assert_eq!(config.default_export, None);
    }

    #[test]
    fn test_missing_file_has_context() {
        let err = FormcheckConfig::load(Path::new("/nonexistent/formcheck.yaml")).unwrap_err();
        assert!(err.to_string().contains("failed to read config file"));
    }
}
