//! Field Normalizer
//!
//! Turns each resolved value into the exact string datadog.conf expects and
//! decides whether its line is commented out. The renderer does no decisions
//! of its own; everything format-related happens here.

use crate::logic::resolver::{ResolvedConfig, ResolvedField};
use crate::os::OsFamily;
use crate::types::{OutputFormat, ParamValue, Presence, Section};

/// One parameter ready for rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedField {
    pub key: &'static str,
    pub section: Option<Section>,
    /// Value as written after `key: `; empty for unset fields
    pub value: String,
    pub commented: bool,
}

/// Every parameter ready for rendering, in table order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedConfig {
    family: OsFamily,
    fields: Vec<NormalizedField>,
}

impl NormalizedConfig {
    pub fn family(&self) -> OsFamily {
        self.family
    }

    pub fn fields(&self) -> &[NormalizedField] {
        &self.fields
    }

    pub fn get(&self, key: &str) -> Option<&NormalizedField> {
        self.fields.iter().find(|f| f.key == key)
    }

    /// Fields with a line in `section`, in render order
    pub fn section(&self, section: Section) -> impl Iterator<Item = &NormalizedField> {
        self.fields
            .iter()
            .filter(move |f| f.section == Some(section))
    }
}

/// Normalize every resolved field. Never drops or reorders fields.
pub fn normalize(resolved: &ResolvedConfig) -> NormalizedConfig {
    let fields: Vec<NormalizedField> = resolved.fields().iter().map(normalize_field).collect();

    tracing::debug!(
        commented = fields.iter().filter(|f| f.commented).count(),
        total = fields.len(),
        "normalized parameters"
    );

    NormalizedConfig {
        family: resolved.family(),
        fields,
    }
}

fn normalize_field(field: &ResolvedField) -> NormalizedField {
    let spec = field.spec;
    let value = field
        .value
        .as_ref()
        .map(|v| format_value(v, spec.format, field.origin.is_set()))
        .unwrap_or_default();

    let commented = match spec.presence {
        Presence::Live => false,
        Presence::CommentedDefault => !field.origin.is_set(),
        Presence::Optional => field.value.as_ref().is_none_or(ParamValue::is_empty),
    };

    NormalizedField {
        key: spec.key,
        section: spec.section,
        value,
        commented,
    }
}

/// Spell a value the way datadog.conf expects it.
fn format_value(value: &ParamValue, format: OutputFormat, explicit: bool) -> String {
    match (value, format) {
        (ParamValue::Bool(b), OutputFormat::YesNo) => (if *b { "yes" } else { "no" }).to_string(),
        (ParamValue::Bool(b), _) => b.to_string(),
        (ParamValue::Int(i), _) => i.to_string(),
        (ParamValue::Str(s), OutputFormat::Upper) => s.to_uppercase(),
        // Only the shipped placeholder is quoted, real keys go in bare
        (ParamValue::Str(s), OutputFormat::QuotedDefault) if !explicit => format!("'{}'", s),
        (ParamValue::Str(s), _) => s.clone(),
        (ParamValue::List(items), _) => items.join(", "),
    }
}
