use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// dd-agent-conf - Render the Datadog agent configuration for this host
#[derive(Parser)]
#[command(name = "dd-agent-conf")]
#[command(about = "Renders /etc/dd-agent/datadog.conf from typed parameters")]
#[command(version)]
pub struct Cli {
    /// Operating system family fact (e.g. debian, redhat).
    ///
    /// When neither --os-family nor --os-name is given, facts are read from
    /// /etc/os-release.
    #[arg(long, global = true)]
    pub os_family: Option<String>,

    /// Operating system name fact (e.g. Ubuntu, CentOS)
    #[arg(long, global = true)]
    pub os_name: Option<String>,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where parameter overrides come from
#[derive(Args, Debug, Default)]
pub struct OverrideArgs {
    /// JSON object file of parameter overrides
    #[arg(short, long, value_name = "FILE")]
    pub params: Option<PathBuf>,

    /// Override a single parameter; wins over --params
    #[arg(short, long = "set", value_name = "KEY=VALUE")]
    pub set: Vec<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render datadog.conf
    Render {
        #[command(flatten)]
        overrides: OverrideArgs,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Classify the host and validate parameters without rendering
    Check {
        #[command(flatten)]
        overrides: OverrideArgs,
    },
    /// Print the install plan as JSON
    Plan {
        #[command(flatten)]
        overrides: OverrideArgs,
    },
    /// List every known parameter with its type and default
    Params,
    /// Print the operating system facts and the classified family
    Facts,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
