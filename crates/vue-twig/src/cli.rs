//! Command-line argument parsing.

use clap::Parser;
use std::path::PathBuf;
use twig_compiler::StyleOutput;

/// Compile Vue single-file components into Twig templates
#[derive(Parser, Debug, Clone)]
#[command(name = "vue-twig")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Files or directories to compile (defaults to the workspace)
    pub paths: Vec<PathBuf>,

    /// Workspace directory
    #[arg(short, long)]
    pub workspace: Option<PathBuf>,

    /// Path to vue-twig.json
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory the templates are written to
    #[arg(short, long)]
    pub out_dir: Option<PathBuf>,

    /// Recompile on change
    #[arg(long)]
    pub watch: bool,

    /// Output format
    #[arg(long, default_value = "human")]
    pub output: OutputFormat,

    /// Banner line written on top of every template (repeatable)
    #[arg(long)]
    pub banner: Vec<String>,

    /// Keep the whitespace of the markup
    #[arg(long)]
    pub no_strip_whitespace: bool,

    /// Which style blocks are copied into the templates
    #[arg(long)]
    pub style_output: Option<StyleOutputArg>,

    /// Emit `{% set %}` blocks for component data
    #[arg(long)]
    pub data: bool,

    /// Register a component as `Tag=path/to/partial.twig` (repeatable)
    #[arg(long = "component", value_parser = parse_component)]
    pub components: Vec<(String, String)>,

    /// Ignore patterns (glob)
    #[arg(long)]
    pub ignore: Vec<String>,

    /// Print templates instead of writing them
    #[arg(long)]
    pub stdout: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Output format for results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    #[default]
    Human,
    /// JSON lines
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum StyleOutputArg {
    None,
    Scoped,
    Unscoped,
    All,
}

impl From<StyleOutputArg> for StyleOutput {
    fn from(arg: StyleOutputArg) -> Self {
        match arg {
            StyleOutputArg::None => StyleOutput::NONE,
            StyleOutputArg::Scoped => StyleOutput::SCOPED,
            StyleOutputArg::Unscoped => StyleOutput::UNSCOPED,
            StyleOutputArg::All => StyleOutput::ALL,
        }
    }
}

impl Args {
    /// Default `tracing` filter when `RUST_LOG` is not set.
    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            "info"
        } else {
            "warn"
        }
    }
}

fn parse_component(value: &str) -> Result<(String, String), String> {
    match value.split_once('=') {
        Some((tag, path)) if !tag.trim().is_empty() && !path.trim().is_empty() => {
            Ok((tag.trim().to_string(), path.trim().to_string()))
        }
        _ => Err(format!("expected `Tag=path`, got `{}`", value)),
    }
}
