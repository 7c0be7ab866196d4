//! # Schema Catalog — Canonical Tables and Required-Property Policies
//!
//! The built-in schema for form configurations, one table per structural
//! level, plus the named required-property policies.
//!
//! ## Required-Property Policies
//!
//! Form configurations have been checked under several incompatible
//! required-property rules. They are kept apart as named presets instead
//! of being merged:
//!
//! | Policy | form | step | field |
//! |--------|------|------|-------|
//! | `canonical` | `steps` | — | — |
//! | `strict` | `steps` | `stepperCallout`, `name`, `fields` | — |
//! | `none` | — | — | — |
//!
//! Any level's required set can also be replaced explicitly.
//!
//! ## Containers
//!
//! Each level owns the array-valued properties it descends into. Container
//! properties are checked by the container gate (array shape, then element
//! shape) rather than by the property type check.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::table::{PropertyPath, SchemaDefinitionError, SchemaTable};

/// Allowed properties at the form (root) level.
pub const FORM_SCHEMA: &[&str] = &[
    "id:string",
    "title:string",
    "subtitle:string",
    "description:string",
    "steps:array",
    r#"persistence:string["void","localStorage","sessionStorage"]"#,
    "persistenceKey:string",
    "initialValues:object,function",
    "showStepper:boolean",
    r#"stepperPosition:string["top","left","right","bottom"]"#,
    "submitLabel:string",
    "onSubmit:function",
    "onComplete:function",
    "onError:function",
    "serverAPI:object",
    "serverAPI.url:string",
    r#"serverAPI.method:string["GET","POST","PUT","PATCH"]"#,
    "serverAPI.headers:object,function",
    "serverAPI.additionalParams:object",
    "serverAPI.additionalParams.routeExtraParams:object,array",
    "serverAPI.additionalParams.queryParams:object",
    "serverAPI.additionalParams.body:object",
    "debug:boolean",
];

/// Allowed properties on each step.
pub const STEP_SCHEMA: &[&str] = &[
    "id:string",
    "name:string",
    "title:string",
    "subtitle:string",
    "description:string",
    "icon:string",
    "stepperCallout:boolean,string",
    "fields:array",
    "preflights:array,function",
    "visibleIf:function",
    "hidden:boolean,function",
    "disabled:boolean,function",
    "skippable:boolean",
    "nextLabel:string",
    "backLabel:string",
    "onEnter:function",
    "onLeave:function",
    r#"layout:string["single","double","grid"]"#,
];

/// Allowed properties on each field, at any nesting depth.
pub const FIELD_SCHEMA: &[&str] = &[
    "id:string",
    "name:string",
    "type:string,arrowFunction",
    "label:string",
    "placeholder:string",
    "helperText:string",
    "tooltip:string",
    "defaultValue:any",
    "required:boolean,function",
    "hidden:boolean,function",
    "disabled:boolean,function",
    "readOnly:boolean",
    "visibleIf:function",
    "min:number",
    "max:number",
    "minLength:number",
    "maxLength:number",
    "pattern:string",
    r#"typeValidation:string["email","phone","url","number","date","fiscalCode","iban"]"#,
    "errorMessage:string",
    "onChange:function",
    "onBlur:function",
    r#"width:string["full","half","third"]"#,
    "fields:array",
    "options:array,object,function",
    "options.data:array",
    "options.url:string",
    "options.labelKey:string",
    "options.valueKey:string",
    "options.multiple:boolean",
];

/// Structural level of the configuration tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Form,
    Step,
    Field,
}

impl Level {
    /// All levels, outermost first.
    pub fn all_levels() -> &'static [Level] {
        &[Self::Form, Self::Step, Self::Field]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Form => "form",
            Self::Step => "step",
            Self::Field => "field",
        }
    }

    /// The built-in table for this level.
    pub fn default_table(&self) -> &'static [&'static str] {
        match self {
            Self::Form => FORM_SCHEMA,
            Self::Step => STEP_SCHEMA,
            Self::Field => FIELD_SCHEMA,
        }
    }

    /// The containers this level descends into.
    fn containers(&self) -> Vec<Container> {
        let container = |segments: &[&str], elements| Container {
            path: segments
                .iter()
                .fold(PropertyPath::root(), |path, segment| path.child(segment)),
            elements,
        };
        match self {
            Self::Form => vec![container(&["steps"], ElementPolicy::Steps)],
            Self::Step => vec![container(&["fields"], ElementPolicy::Fields)],
            Self::Field => vec![
                container(&["fields"], ElementPolicy::Fields),
                container(&["options", "data"], ElementPolicy::Objects),
            ],
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "form" => Ok(Self::Form),
            "step" => Ok(Self::Step),
            "field" => Ok(Self::Field),
            other => Err(format!("unknown level: {other:?}")),
        }
    }
}

/// Named required-property preset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequiredPolicy {
    /// The form must declare `steps`; nothing else is required.
    #[default]
    Canonical,
    /// Additionally, every step must declare `stepperCallout`, `name` and `fields`.
    Strict,
    /// Nothing is required anywhere.
    None,
}

impl RequiredPolicy {
    pub fn all_policies() -> &'static [RequiredPolicy] {
        &[Self::Canonical, Self::Strict, Self::None]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Canonical => "canonical",
            Self::Strict => "strict",
            Self::None => "none",
        }
    }

    /// Required property names at `level` under this policy.
    pub fn required(&self, level: Level) -> &'static [&'static str] {
        match (self, level) {
            (Self::Canonical | Self::Strict, Level::Form) => &["steps"],
            (Self::Strict, Level::Step) => &["stepperCallout", "name", "fields"],
            _ => &[],
        }
    }
}

impl fmt::Display for RequiredPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequiredPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "canonical" => Ok(Self::Canonical),
            "strict" => Ok(Self::Strict),
            "none" => Ok(Self::None),
            other => Err(format!("unknown required-property policy: {other:?}")),
        }
    }
}

/// How the elements of a container are validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementPolicy {
    /// Each element is a step.
    Steps,
    /// Each element is a field.
    Fields,
    /// Each element must be an object; its keys are not checked.
    Objects,
}

/// An array-valued property a level descends into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    pub path: PropertyPath,
    pub elements: ElementPolicy,
}

/// Everything needed to validate one structural level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelSchema {
    pub level: Level,
    pub table: SchemaTable,
    pub required: Vec<PropertyPath>,
    pub containers: Vec<Container>,
}

impl LevelSchema {
    /// Build a level from mini-format lines and required names.
    ///
    /// # Errors
    ///
    /// Returns `SchemaDefinitionError` if a line is malformed or a required
    /// name is not a valid path.
    pub fn new<I, S, R, T>(level: Level, lines: I, required: R) -> Result<Self, SchemaDefinitionError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        R: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let table = SchemaTable::parse(level.as_str(), lines)?;
        let required = parse_required(level, required)?;
        Ok(Self {
            level,
            table,
            required,
            containers: level.containers(),
        })
    }

    /// The container declared at exactly `path`, if any.
    pub fn container(&self, path: &PropertyPath) -> Option<&Container> {
        self.containers.iter().find(|c| c.path == *path)
    }
}

fn parse_required<R, T>(level: Level, names: R) -> Result<Vec<PropertyPath>, SchemaDefinitionError>
where
    R: IntoIterator<Item = T>,
    T: AsRef<str>,
{
    names
        .into_iter()
        .map(|name| {
            let name = name.as_ref();
            PropertyPath::parse(name).ok_or_else(|| SchemaDefinitionError::InvalidRequired {
                table: level.as_str().to_string(),
                name: name.to_string(),
            })
        })
        .collect()
}

/// The complete schema: one [`LevelSchema`] per level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSchema {
    pub form: LevelSchema,
    pub step: LevelSchema,
    pub field: LevelSchema,
}

impl FormSchema {
    /// Built-in tables with the given required-property policy.
    ///
    /// # Errors
    ///
    /// Returns `SchemaDefinitionError` if a built-in table fails to parse.
    pub fn new(policy: RequiredPolicy) -> Result<Self, SchemaDefinitionError> {
        let level = |level: Level| LevelSchema::new(level, level.default_table(), policy.required(level));
        Ok(Self {
            form: level(Level::Form)?,
            step: level(Level::Step)?,
            field: level(Level::Field)?,
        })
    }

    /// Built-in tables with [`RequiredPolicy::Canonical`].
    ///
    /// # Errors
    ///
    /// See [`FormSchema::new`].
    pub fn canonical() -> Result<Self, SchemaDefinitionError> {
        Self::new(RequiredPolicy::Canonical)
    }

    pub fn level(&self, level: Level) -> &LevelSchema {
        match level {
            Level::Form => &self.form,
            Level::Step => &self.step,
            Level::Field => &self.field,
        }
    }

    fn level_mut(&mut self, level: Level) -> &mut LevelSchema {
        match level {
            Level::Form => &mut self.form,
            Level::Step => &mut self.step,
            Level::Field => &mut self.field,
        }
    }

    /// Replace one level's table.
    ///
    /// # Errors
    ///
    /// Returns `SchemaDefinitionError` if a line is malformed.
    pub fn replace_table<I, S>(&mut self, level: Level, lines: I) -> Result<(), SchemaDefinitionError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.level_mut(level).table = SchemaTable::parse(level.as_str(), lines)?;
        Ok(())
    }

    /// Replace one level's required set.
    ///
    /// # Errors
    ///
    /// Returns `SchemaDefinitionError::InvalidRequired` for a malformed name.
    pub fn set_required<R, T>(&mut self, level: Level, names: R) -> Result<(), SchemaDefinitionError>
    where
        R: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        self.level_mut(level).required = parse_required(level, names)?;
        Ok(())
    }
}
