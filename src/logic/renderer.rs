//! Config Renderer
//!
//! Serializes a normalized configuration into datadog.conf text. The layout
//! is a contract: consumers match whole lines anchored at line start, so
//! section order, banners and `key: value` spacing must stay stable.
//!
//! ```text
//! [Main]
//!
//! # ========================================================================== #
//! # General
//! # ========================================================================== #
//!
//! dd_url: https://app.datadoghq.com
//! api_key: 'your_API_key'
//! # hostname:
//! ...
//! ```

use serde::Serialize;
use std::fmt;
use strum::IntoEnumIterator;

use crate::logic::normalizer::{NormalizedConfig, NormalizedField};
use crate::types::Section;

/// Ini section header the agent expects
const MAIN_HEADER: &str = "[Main]";

const BANNER_RULE: &str =
    "# ========================================================================== #";

/// A single `key: value` line, possibly commented out
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedLine {
    pub key: &'static str,
    pub value: String,
    pub commented: bool,
}

impl From<&NormalizedField> for RenderedLine {
    fn from(field: &NormalizedField) -> Self {
        Self {
            key: field.key,
            value: field.value.clone(),
            commented: field.commented,
        }
    }
}

impl fmt::Display for RenderedLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.commented {
            write!(f, "# ")?;
        }
        write!(f, "{}:", self.key)?;
        if !self.value.is_empty() {
            write!(f, " {}", self.value)?;
        }
        Ok(())
    }
}

/// Lines of one named section
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedSection {
    pub section: Section,
    pub lines: Vec<RenderedLine>,
}

/// Complete datadog.conf document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedDocument {
    sections: Vec<RenderedSection>,
}

impl RenderedDocument {
    pub fn sections(&self) -> &[RenderedSection] {
        &self.sections
    }

    /// All field lines in document order
    pub fn lines(&self) -> impl Iterator<Item = &RenderedLine> {
        self.sections.iter().flat_map(|s| s.lines.iter())
    }

    /// The line rendered for `key`, if the field belongs to a section
    pub fn line(&self, key: &str) -> Option<&RenderedLine> {
        self.lines().find(|l| l.key == key)
    }

    /// Number of field lines, banners excluded
    pub fn field_count(&self) -> usize {
        self.sections.iter().map(|s| s.lines.len()).sum()
    }

    /// Full file contents
    pub fn to_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for RenderedDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", MAIN_HEADER)?;
        for section in &self.sections {
            writeln!(f)?;
            writeln!(f, "{}", BANNER_RULE)?;
            writeln!(f, "# {}", section.section.title())?;
            writeln!(f, "{}", BANNER_RULE)?;
            writeln!(f)?;
            for line in &section.lines {
                writeln!(f, "{}", line)?;
            }
        }
        Ok(())
    }
}

/// Render a normalized configuration.
///
/// Sections come out in `Section` declaration order and fields in table
/// order; module-level fields have no section and are skipped.
pub fn render(config: &NormalizedConfig) -> RenderedDocument {
    let sections: Vec<RenderedSection> = Section::iter()
        .map(|section| RenderedSection {
            section,
            lines: config.section(section).map(RenderedLine::from).collect(),
        })
        .collect();

    let document = RenderedDocument { sections };
    tracing::debug!(
        family = %config.family(),
        lines = document.field_count(),
        "rendered datadog.conf"
    );
    document
}
