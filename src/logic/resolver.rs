//! Parameter Resolver
//!
//! Merges caller overrides over family and global defaults into a record that
//! holds exactly one value slot per known parameter.
//!
//! # Resolution Rules
//!
//! | Source             | Used when |
//! |--------------------|-----------|
//! | Override           | The caller supplied the key (or an alias) |
//! | Family default     | The field's default differs per OS family |
//! | Global default     | The field has a single default |
//! | Unset              | Optional field with no default and no override |
//!
//! Each override is type-checked against the field's declared kind. Strings
//! that spell a boolean or an integer are accepted for those kinds, because
//! manifests routinely pass `'true'` or `'1234'`.

use std::collections::{BTreeMap, HashMap};

use crate::defaults::{self, FieldSpec, FIELDS};
use crate::error::{AgentConfError, Result};
use crate::os::OsFamily;
use crate::types::{FieldKind, Origin, ParamValue, ServiceEnsure};

/// Caller-supplied overrides, keyed by parameter name or alias
pub type Overrides = BTreeMap<String, ParamValue>;

/// One parameter after resolution
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedField {
    pub spec: &'static FieldSpec,
    /// Effective value; `None` only for unset optional fields
    pub value: Option<ParamValue>,
    pub origin: Origin,
}

impl ResolvedField {
    pub fn key(&self) -> &'static str {
        self.spec.key
    }
}

/// Every known parameter with its effective value, in table order
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    family: OsFamily,
    fields: Vec<ResolvedField>,
}

impl ResolvedConfig {
    /// Family the defaults were resolved for
    pub fn family(&self) -> OsFamily {
        self.family
    }

    pub fn fields(&self) -> &[ResolvedField] {
        &self.fields
    }

    /// Look up a field by key or alias
    pub fn get(&self, name: &str) -> Option<&ResolvedField> {
        self.fields.iter().find(|f| f.spec.answers_to(name))
    }

    pub fn value(&self, name: &str) -> Option<&ParamValue> {
        self.get(name).and_then(|f| f.value.as_ref())
    }

    /// True when the caller explicitly set the field
    pub fn is_set(&self, name: &str) -> bool {
        self.get(name).is_some_and(|f| f.origin.is_set())
    }

    pub fn bool_value(&self, name: &str) -> Option<bool> {
        self.value(name).and_then(ParamValue::as_bool)
    }

    pub fn str_value(&self, name: &str) -> Option<&str> {
        self.value(name).and_then(ParamValue::as_str)
    }

    /// Desired agent service state
    pub fn service_ensure(&self) -> ServiceEnsure {
        self.str_value("service_ensure")
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }
}

/// Resolve overrides against the defaults for `family`.
///
/// # Errors
///
/// - `UnknownParameter` for a key that is neither a field key nor an alias
/// - `InvalidParameterType` for a value that does not fit the field's kind
pub fn resolve(family: OsFamily, overrides: &Overrides) -> Result<ResolvedConfig> {
    let mut supplied: HashMap<&'static str, ParamValue> = HashMap::new();

    for (name, value) in overrides {
        let spec = defaults::lookup(name)
            .ok_or_else(|| AgentConfError::unknown_parameter(name.as_str()))?;
        let value = coerce(spec, name, value)?;

        if name != spec.key && overrides.contains_key(spec.key) {
            tracing::warn!(
                alias = %name,
                key = spec.key,
                "both alias and key supplied, ignoring the alias"
            );
            continue;
        }
        supplied.insert(spec.key, value);
    }

    let fields = FIELDS
        .iter()
        .map(|spec| match supplied.remove(spec.key) {
            Some(value) => ResolvedField {
                spec,
                value: Some(value),
                origin: Origin::Override,
            },
            None => {
                let value = spec.default.value_for(family);
                let origin = match (&value, spec.default.is_family_specific()) {
                    (None, _) => Origin::Unset,
                    (Some(_), true) => Origin::FamilyDefault,
                    (Some(_), false) => Origin::Default,
                };
                ResolvedField { spec, value, origin }
            }
        })
        .collect::<Vec<_>>();

    tracing::debug!(
        %family,
        fields = fields.len(),
        overridden = overrides.len(),
        "resolved parameters"
    );

    Ok(ResolvedConfig { family, fields })
}

/// Check `value` against the field's kind, converting accepted spellings.
///
/// Strings are trimmed. Every value lands on a single `key: value` line, so
/// control characters (line breaks included) are rejected outright.
fn coerce(spec: &FieldSpec, name: &str, value: &ParamValue) -> Result<ParamValue> {
    let mismatch = || AgentConfError::invalid_type(name, spec.kind.to_string(), value.describe());
    let single_line = |s: &str| -> Result<String> {
        let s = s.trim();
        if s.chars().any(char::is_control) {
            return Err(AgentConfError::invalid_type(
                name,
                format!("{} without line breaks or control characters", spec.kind),
                value.describe(),
            ));
        }
        Ok(s.to_string())
    };

    match (spec.kind, value) {
        (FieldKind::Boolean, ParamValue::Bool(b)) => Ok(ParamValue::Bool(*b)),
        (FieldKind::Boolean, ParamValue::Str(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Ok(ParamValue::Bool(true)),
            "false" => Ok(ParamValue::Bool(false)),
            _ => Err(mismatch()),
        },
        (FieldKind::Integer, ParamValue::Int(i)) => Ok(ParamValue::Int(*i)),
        (FieldKind::Integer, ParamValue::Str(s)) => s
            .trim()
            .parse::<i64>()
            .map(ParamValue::Int)
            .map_err(|_| mismatch()),
        (FieldKind::Port, ParamValue::Int(i)) => port(*i).ok_or_else(mismatch),
        (FieldKind::Port, ParamValue::Str(s)) => s
            .trim()
            .parse::<i64>()
            .ok()
            .and_then(port)
            .ok_or_else(mismatch),
        (FieldKind::Text, ParamValue::Str(s)) => single_line(s).map(ParamValue::Str),
        // Numeric passwords and keys arrive as integers from JSON
        (FieldKind::Text, ParamValue::Int(i)) => Ok(ParamValue::Str(i.to_string())),
        (FieldKind::Url, ParamValue::Str(s)) => {
            let url = single_line(s)?;
            if url.starts_with("http://") || url.starts_with("https://") {
                Ok(ParamValue::Str(url))
            } else {
                Err(mismatch())
            }
        }
        (FieldKind::Choice(choices), ParamValue::Str(s)) => {
            let choice = s.trim().to_ascii_lowercase();
            if choices.iter().any(|c| *c == choice) {
                Ok(ParamValue::Str(choice))
            } else {
                Err(mismatch())
            }
        }
        (FieldKind::List, ParamValue::List(items)) => items
            .iter()
            .map(|item| single_line(item))
            .filter(|item| !matches!(item, Ok(item) if item.is_empty()))
            .collect::<Result<Vec<_>>>()
            .map(ParamValue::List),
        (FieldKind::List, ParamValue::Str(s)) => s
            .split(',')
            .map(single_line)
            .filter(|item| !matches!(item, Ok(item) if item.is_empty()))
            .collect::<Result<Vec<_>>>()
            .map(ParamValue::List),
        _ => Err(mismatch()),
    }
}

fn port(value: i64) -> Option<ParamValue> {
    (1..=65535).contains(&value).then_some(ParamValue::Int(value))
}
