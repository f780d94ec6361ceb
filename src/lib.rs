//! dd-agent-conf Library
//!
//! Renders the Datadog agent's `datadog.conf` from typed, defaultable
//! parameters, gated on host operating system support. Every pipeline stage
//! is public so callers can stop after any of them; `render_config` runs the
//! whole thing.

pub mod cli;
pub mod defaults;
pub mod error;
pub mod facts;
pub mod logic;
pub mod os;
pub mod overrides;
pub mod types;

// Re-export main types for convenience
pub use error::{AgentConfError, Result};
pub use facts::OsFacts;
pub use os::{classify, OsFamily};
pub use types::{FieldKind, OutputFormat, ParamValue, Presence, Section, ServiceEnsure};

// Pipeline stages
pub use logic::normalizer::{normalize, NormalizedConfig};
pub use logic::plan::{resolve_plan, InstallPlan, Step};
pub use logic::renderer::{render, RenderedDocument};
pub use logic::resolver::{resolve, Overrides, ResolvedConfig};
pub use logic::render_config;
