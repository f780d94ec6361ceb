//! dd-agent-conf - Main entry point
//!
//! Gathers host facts and parameter overrides, runs the rendering pipeline and
//! writes or prints the result. All decisions live in the library; this file
//! only does I/O.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use strum::IntoEnumIterator;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use dd_agent_conf::cli::{Cli, Commands, OverrideArgs};
use dd_agent_conf::defaults::{self, FieldSpec, FIELDS};
use dd_agent_conf::logic::normalizer::normalize;
use dd_agent_conf::logic::plan::resolve_plan;
use dd_agent_conf::logic::renderer::render;
use dd_agent_conf::logic::resolver::{resolve, Overrides};
use dd_agent_conf::{overrides, render_config, OsFacts, Section};

/// Initialize tracing on stderr so stdout stays clean for rendered output
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse_args();
    init_tracing(cli.verbose);
    debug!("CLI arguments parsed");

    if let Err(e) = run(cli) {
        eprintln!("✗ {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let facts = || gather_facts(cli.os_family.as_deref(), cli.os_name.as_deref());

    match cli.command {
        Commands::Render { overrides, output } => {
            let facts = facts()?;
            let overrides = load_overrides(&overrides)?;
            let text = render_config(&facts, &overrides)?.to_text();
            match output {
                Some(path) => write_config(&path, &text)?,
                None => print!("{}", text),
            }
        }
        Commands::Check { overrides } => {
            let facts = facts()?;
            let overrides = load_overrides(&overrides)?;
            let family = facts.classify()?;
            let config = resolve(family, &overrides)?;
            let set = config.fields().iter().filter(|f| f.origin.is_set()).count();
            println!(
                "✓ {} classified as {}; {} parameters resolved, {} set",
                facts,
                family,
                config.fields().len(),
                set
            );
        }
        Commands::Plan { overrides } => {
            let facts = facts()?;
            let overrides = load_overrides(&overrides)?;
            let config = resolve(facts.classify()?, &overrides)?;
            let document = render(&normalize(&config));
            let plan = resolve_plan(&config, &document);
            println!(
                "{}",
                serde_json::to_string_pretty(&plan).context("Failed to serialize install plan")?
            );
        }
        Commands::Params => print_params(),
        Commands::Facts => {
            let facts = facts()?;
            println!("os_family: {}", facts.os_family);
            println!("os_name: {}", facts.os_name);
            let family = facts.classify()?;
            println!("family: {}", family);
        }
    }

    Ok(())
}

/// Explicit facts win; a single missing flag counts as an empty fact
fn gather_facts(os_family: Option<&str>, os_name: Option<&str>) -> Result<OsFacts> {
    match (os_family, os_name) {
        (None, None) => OsFacts::detect(),
        (family, name) => Ok(OsFacts::new(
            family.unwrap_or_default(),
            name.unwrap_or_default(),
        )),
    }
}

fn load_overrides(args: &OverrideArgs) -> Result<Overrides> {
    overrides::collect(args.params.as_deref(), &args.set)
}

/// Write the rendered file, creating its directory. A file that already has
/// the same content is left untouched.
fn write_config(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    if fs::read_to_string(path).is_ok_and(|existing| existing == text) {
        info!(path = %path.display(), "configuration unchanged");
        return Ok(());
    }

    fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), "configuration written");
    Ok(())
}

fn print_params() {
    for section in Section::iter() {
        println!("[{}]", section.title());
        for spec in defaults::section_fields(section) {
            print_param(spec);
        }
        println!();
    }

    println!("[Module]");
    for spec in FIELDS.iter().filter(|s| !s.is_rendered()) {
        print_param(spec);
    }
}

fn print_param(spec: &FieldSpec) {
    let mut line = format!("  {:<26} {:<28} {}", spec.key, spec.kind.to_string(), spec.default);
    if !spec.aliases.is_empty() {
        line.push_str(&format!(" (alias: {})", spec.aliases.join(", ")));
    }
    println!("{}", line);
    println!("      {}", spec.description);
}
