//! Type-safe parameter types for dd-agent-conf
//!
//! Override values, field metadata and section names are proper Rust enums
//! so the resolver and renderer can match on them exhaustively.

use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{Display, EnumIter, EnumString};

/// A caller-supplied override value.
///
/// Deserializes from plain JSON scalars and arrays, so an overrides file reads
/// `{"use_mount": true, "proxy_port": 3128, "tags": ["env:prod"]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Str(String),
    List(Vec<String>),
}

impl ParamValue {
    /// Short description used in type mismatch errors, e.g. `string "maybe"`
    pub fn describe(&self) -> String {
        match self {
            Self::Bool(b) => format!("boolean {}", b),
            Self::Int(i) => format!("integer {}", i),
            Self::Str(s) => format!("string {:?}", s),
            Self::List(items) => format!("list {:?}", items),
        }
    }

    /// Returns true for empty strings and empty lists
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Str(s) => s.is_empty(),
            Self::List(items) => items.is_empty(),
            Self::Bool(_) | Self::Int(_) => false,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

/// Semantic type declared for a parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Boolean,
    Integer,
    /// Integer in 1..=65535
    Port,
    /// Single-line string, surrounding whitespace trimmed
    Text,
    /// String that must start with `http://` or `https://`
    Url,
    /// Lower-case string restricted to the listed choices
    Choice(&'static [&'static str]),
    /// List of strings, also accepted as one comma-separated string
    List,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean => write!(f, "boolean"),
            Self::Integer => write!(f, "integer"),
            Self::Port => write!(f, "port (1-65535)"),
            Self::Text => write!(f, "string"),
            Self::Url => write!(f, "URL (http:// or https://)"),
            Self::Choice(choices) => write!(f, "one of {}", choices.join(", ")),
            Self::List => write!(f, "list of strings"),
        }
    }
}

/// How a value is spelled in datadog.conf
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Value as-is
    Plain,
    /// Booleans as `yes` / `no`
    YesNo,
    /// Booleans as lower-case `true` / `false`
    TrueFalse,
    /// Strings upper-cased (log levels)
    Upper,
    /// Single-quoted while the value is still the default
    QuotedDefault,
    /// Lists joined with `, `
    CommaList,
}

/// When a field's line is commented out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// Always rendered as a live line
    Live,
    /// Commented while at its default, live once explicitly set
    CommentedDefault,
    /// No default; commented with a blank value until set to something non-empty
    Optional,
}

/// Named section of datadog.conf, in render order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Section {
    General,
    Proxy,
    Pup,
    Dogstatsd,
    Ganglia,
    Logging,
}

impl Section {
    /// Heading used in the section banner
    pub fn title(&self) -> &'static str {
        match self {
            Self::General => "General",
            Self::Proxy => "Proxy",
            Self::Pup => "Pup",
            Self::Dogstatsd => "DogStatsD",
            Self::Ganglia => "Ganglia",
            Self::Logging => "Logging",
        }
    }
}

/// Where a resolved value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[derive(Display)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    #[strum(serialize = "override")]
    Override,
    #[strum(serialize = "family default")]
    FamilyDefault,
    #[strum(serialize = "default")]
    Default,
    #[strum(serialize = "unset")]
    Unset,
}

impl Origin {
    /// True only when the caller supplied the value explicitly
    pub fn is_set(&self) -> bool {
        matches!(self, Self::Override)
    }
}

/// Desired state of the agent service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum ServiceEnsure {
    #[default]
    Running,
    Stopped,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_param_value_from_json() {
        let value: ParamValue = serde_json::from_str("true").unwrap();
        assert_eq!(value, ParamValue::Bool(true));

        let value: ParamValue = serde_json::from_str("3128").unwrap();
        assert_eq!(value, ParamValue::Int(3128));

        let value: ParamValue = serde_json::from_str("\"localhost\"").unwrap();
        assert_eq!(value, ParamValue::Str("localhost".to_string()));

        let value: ParamValue = serde_json::from_str(r#"["env:prod", "role:db"]"#).unwrap();
        assert_eq!(
            value,
            ParamValue::List(vec!["env:prod".to_string(), "role:db".to_string()])
        );
    }

    #[test]
    fn test_param_value_rejects_floats() {
        let result: Result<ParamValue, _> = serde_json::from_str("1.5");
        assert!(result.is_err());
    }

    #[test]
    fn test_param_value_describe() {
        assert_eq!(ParamValue::Bool(false).describe(), "boolean false");
        assert_eq!(ParamValue::from("x").describe(), "string \"x\"");
        assert_eq!(ParamValue::Int(7).describe(), "integer 7");
    }

    #[test]
    fn test_param_value_is_empty() {
        assert!(ParamValue::from("").is_empty());
        assert!(ParamValue::List(vec![]).is_empty());
        assert!(!ParamValue::Bool(false).is_empty());
        assert!(!ParamValue::Int(0).is_empty());
    }

    #[test]
    fn test_field_kind_display() {
        assert_eq!(FieldKind::Boolean.to_string(), "boolean");
        assert_eq!(FieldKind::Port.to_string(), "port (1-65535)");
        assert_eq!(
            FieldKind::Choice(&["running", "stopped"]).to_string(),
            "one of running, stopped"
        );
    }

    #[test]
    fn test_section_order() {
        let order: Vec<String> = Section::iter().map(|s| s.to_string()).collect();
        assert_eq!(
            order,
            vec!["general", "proxy", "pup", "dogstatsd", "ganglia", "logging"]
        );
    }

    #[test]
    fn test_service_ensure_parsing() {
        assert_eq!(ServiceEnsure::from_str("running").unwrap(), ServiceEnsure::Running);
        assert_eq!(ServiceEnsure::from_str("Stopped").unwrap(), ServiceEnsure::Stopped);
        assert!(ServiceEnsure::from_str("paused").is_err());
        assert_eq!(ServiceEnsure::default(), ServiceEnsure::Running);
    }

    #[test]
    fn test_origin_is_set() {
        assert!(Origin::Override.is_set());
        assert!(!Origin::Default.is_set());
        assert!(!Origin::FamilyDefault.is_set());
        assert!(!Origin::Unset.is_set());
    }
}
