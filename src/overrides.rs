//! Loading parameter overrides from files and the command line.
//!
//! Overrides files are flat JSON objects mapping parameter names to values:
//!
//! ```json
//! { "api_key": "0123abcd", "use_dogstatsd": true, "tags": ["env:prod"] }
//! ```
//!
//! Names and types are not checked here; the resolver does that against the
//! parameter table so file and command-line input fail the same way.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::logic::resolver::Overrides;
use crate::types::ParamValue;

/// Load overrides from a JSON object file
pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Overrides> {
    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read overrides from {:?}", path.as_ref()))?;

    let overrides: Overrides = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse overrides JSON in {:?}", path.as_ref()))?;

    tracing::debug!(path = ?path.as_ref(), count = overrides.len(), "loaded overrides file");
    Ok(overrides)
}

/// Parse one `key=value` assignment.
///
/// The value is always kept as a string. The resolver turns it into a
/// boolean or integer when the field asks for one, so `proxy_password=123456`
/// or a key with leading zeros survives untouched.
pub fn parse_assignment(assignment: &str) -> Result<(String, ParamValue)> {
    let (key, raw) = assignment
        .split_once('=')
        .with_context(|| format!("Expected key=value, got {:?}", assignment))?;

    let key = key.trim();
    if key.is_empty() {
        anyhow::bail!("Missing parameter name in {:?}", assignment);
    }

    Ok((key.to_string(), ParamValue::Str(raw.to_string())))
}

/// Build overrides from an optional file plus `key=value` assignments.
///
/// Assignments are applied after the file, so they win on conflicts.
pub fn collect(file: Option<&Path>, assignments: &[String]) -> Result<Overrides> {
    let mut overrides = match file {
        Some(path) => load_from_file(path)?,
        None => Overrides::new(),
    };

    for assignment in assignments {
        let (key, value) = parse_assignment(assignment)?;
        if let Some(previous) = overrides.insert(key.clone(), value) {
            tracing::debug!(%key, previous = %previous.describe(), "command line overrides file value");
        }
    }

    Ok(overrides)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(contents: &str) -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(contents.as_bytes()).unwrap();
        temp_file.flush().unwrap();
        temp_file
    }

    #[test]
    fn test_load_overrides_file() {
        let temp_file = write_temp(
            r#"{"api_key": "notakey", "proxy_port": 3128, "use_mount": true, "tags": ["a", "b"]}"#,
        );
        let overrides = load_from_file(temp_file.path()).unwrap();

        assert_eq!(overrides.get("api_key"), Some(&ParamValue::from("notakey")));
        assert_eq!(overrides.get("proxy_port"), Some(&ParamValue::Int(3128)));
        assert_eq!(overrides.get("use_mount"), Some(&ParamValue::Bool(true)));
        assert_eq!(
            overrides.get("tags"),
            Some(&ParamValue::List(vec!["a".into(), "b".into()]))
        );
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = load_from_file(Path::new("/nonexistent/overrides.json"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_invalid_json() {
        let temp_file = write_temp("{ invalid json }");
        assert!(load_from_file(temp_file.path()).is_err());
    }

    #[test]
    fn test_load_rejects_non_object() {
        let temp_file = write_temp("[1, 2, 3]");
        assert!(load_from_file(temp_file.path()).is_err());
    }

    #[test]
    fn test_load_rejects_nested_objects() {
        let temp_file = write_temp(r#"{"proxy": {"host": "localhost"}}"#);
        assert!(load_from_file(temp_file.path()).is_err());
    }

    #[test]
    fn test_parse_assignment_keeps_strings() {
        assert_eq!(
            parse_assignment("use_mount=true").unwrap(),
            ("use_mount".to_string(), ParamValue::from("true"))
        );
        assert_eq!(
            parse_assignment("proxy_password=123456").unwrap(),
            ("proxy_password".to_string(), ParamValue::from("123456"))
        );
        assert_eq!(
            parse_assignment("api_key=000123").unwrap(),
            ("api_key".to_string(), ParamValue::from("000123"))
        );
        assert_eq!(
            parse_assignment("dd_url=https://notaurl.datadoghq.com").unwrap(),
            (
                "dd_url".to_string(),
                ParamValue::from("https://notaurl.datadoghq.com")
            )
        );
    }

    #[test]
    fn test_parse_assignment_keeps_equals_in_value() {
        let (key, value) = parse_assignment("device_blacklist_re=a=b").unwrap();
        assert_eq!(key, "device_blacklist_re");
        assert_eq!(value, ParamValue::from("a=b"));
    }

    #[test]
    fn test_parse_assignment_empty_value() {
        let (_, value) = parse_assignment("proxy_host=").unwrap();
        assert_eq!(value, ParamValue::from(""));
    }

    #[test]
    fn test_parse_assignment_errors() {
        assert!(parse_assignment("no_equals_sign").is_err());
        assert!(parse_assignment("=value").is_err());
    }

    #[test]
    fn test_collect_assignments_win() {
        let temp_file = write_temp(r#"{"log_level": "info", "api_key": "fromfile"}"#);
        let overrides = collect(
            Some(temp_file.path()),
            &["log_level=critical".to_string()],
        )
        .unwrap();

        assert_eq!(overrides.get("log_level"), Some(&ParamValue::from("critical")));
        assert_eq!(overrides.get("api_key"), Some(&ParamValue::from("fromfile")));
    }

    #[test]
    fn test_collect_without_file() {
        let overrides = collect(None, &[]).unwrap();
        assert!(overrides.is_empty());
    }
}
