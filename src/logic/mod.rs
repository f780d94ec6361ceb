//! Logic modules: the classify → resolve → normalize → render pipeline.
//!
//! # Modules
//!
//! - `resolver`: merges overrides over family and global defaults
//! - `normalizer`: per-field spelling and comment-out decisions
//! - `renderer`: datadog.conf serialization
//! - `plan`: declarative provisioning steps around the rendered file

pub mod normalizer;
pub mod plan;
pub mod renderer;
pub mod resolver;

use crate::error::Result;
use crate::facts::OsFacts;
use normalizer::normalize;
use renderer::{render, RenderedDocument};
use resolver::{resolve, Overrides};

/// Run the whole pipeline for one host.
///
/// Classification happens once, before anything else; an unsupported host
/// fails here without resolving a single parameter.
pub fn render_config(facts: &OsFacts, overrides: &Overrides) -> Result<RenderedDocument> {
    let family = facts.classify()?;
    let resolved = resolve(family, overrides)?;
    Ok(render(&normalize(&resolved)))
}
