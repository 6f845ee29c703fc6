//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// hepstack - recursive installer for High-Energy-Physics tool stacks
#[derive(Parser)]
#[command(name = "hepstack")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Install a tool and whatever it depends on
    Install(InstallArgs),

    /// List the tool catalog
    List(ListArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct InstallArgs {
    /// Tool to install
    pub tool: String,

    /// Install root for the tool and its dependencies
    #[arg(long)]
    pub prefix: Option<PathBuf>,

    /// Overwrite an existing installation
    #[arg(long)]
    pub force: bool,

    /// C++ compiler (name or path)
    #[arg(long)]
    pub cpp_compiler: Option<String>,

    /// Fortran compiler (name or path)
    #[arg(long)]
    pub fortran_compiler: Option<String>,

    /// C++ standard library the compiler links to (-lc++ or -lstdc++)
    #[arg(long, allow_hyphen_values = true)]
    pub cpp_standard_lib: Option<String>,

    /// MG5 distribution invoking this installer
    #[arg(long)]
    pub mg5_path: Option<PathBuf>,

    /// Directory holding the per-tool install scripts
    #[arg(long)]
    pub scripts_dir: Option<PathBuf>,

    /// Per-tool install location, as TOOL=<path|default|off>
    #[arg(long = "with", value_name = "TOOL=MODE")]
    pub with_overrides: Vec<String>,

    /// Per-tool tarball source, as TOOL=<path-or-url>
    #[arg(long = "tarball", value_name = "TOOL=SOURCE")]
    pub tarball_overrides: Vec<String>,

    /// Configuration file (lower precedence than flags)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Args)]
pub struct ListArgs {}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
