//! Configuration loading and management.

use crate::cli::Args;
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use indexmap::IndexMap;
use miette::{IntoDiagnostic, Result, WrapErr};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;
use twig_compiler::CompilerOptions;

/// File name searched for upward from the workspace.
pub const CONFIG_FILE_NAME: &str = "vue-twig.json";

const DEFAULT_EXCLUDES: [&str; 3] = ["**/node_modules/**", "**/dist/**", "**/.*/**"];

/// Contents of `vue-twig.json`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigFile {
    pub compiler_options: CompilerOptions,
    /// Tag name to include path.
    pub components: IndexMap<String, String>,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub out_dir: Option<PathBuf>,
}

impl ConfigFile {
    pub fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&content)
            .into_diagnostic()
            .wrap_err_with(|| format!("Invalid configuration in {}", path.display()))
    }

    /// Look for [`CONFIG_FILE_NAME`] in `start` and its ancestors.
    pub fn find(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(CONFIG_FILE_NAME))
            .find(|candidate| candidate.is_file())
    }
}

/// Configuration for vue-twig: the config file with CLI flags applied.
#[derive(Debug, Clone)]
pub struct Config {
    /// Workspace root directory.
    pub workspace: PathBuf,
    pub config_path: Option<PathBuf>,
    pub options: CompilerOptions,
    /// Explicitly registered components, tag to include path.
    pub components: IndexMap<String, String>,
    /// Output root. `None` writes each template next to its source.
    pub out_dir: Option<PathBuf>,
    include: Option<GlobSet>,
    exclude: GlobSet,
}

impl Config {
    /// Load configuration from CLI arguments and workspace.
    pub fn load(workspace: &Path, args: &Args) -> Result<Self> {
        let config_path = args
            .config
            .clone()
            .or_else(|| ConfigFile::find(workspace));
        let file = match &config_path {
            Some(path) => {
                debug!(path = %path.display(), "loading configuration");
                ConfigFile::read(path)?
            }
            None => ConfigFile::default(),
        };

        let mut options = file.compiler_options;
        if !args.banner.is_empty() {
            options = options.with_banner(args.banner.iter().cloned());
        }
        if args.no_strip_whitespace {
            options = options.with_strip_whitespace(false);
        }
        if let Some(style_output) = args.style_output {
            options = options.with_style_output(style_output.into());
        }
        if args.data {
            options = options.with_data_support(true);
        }
        if let Some(base) = options.base_path.take() {
            options = options.with_base_path(if base.is_absolute() {
                base
            } else {
                workspace.join(base)
            });
        }

        let mut components = file.components;
        components.extend(args.components.iter().cloned());

        let include = if file.include.is_empty() {
            None
        } else {
            Some(build_glob_set(file.include.iter().map(String::as_str))?)
        };
        let exclude = build_glob_set(
            DEFAULT_EXCLUDES
                .into_iter()
                .chain(file.exclude.iter().map(String::as_str))
                .chain(args.ignore.iter().map(String::as_str)),
        )?;

        let out_dir = args
            .out_dir
            .clone()
            .or(file.out_dir)
            .map(|dir| if dir.is_absolute() { dir } else { workspace.join(dir) });

        Ok(Self {
            workspace: workspace.to_path_buf(),
            config_path,
            options,
            components,
            out_dir,
            include,
            exclude,
        })
    }

    /// Whether a file is a component selected by the include and exclude
    /// patterns. Patterns match the path relative to the workspace.
    pub fn should_process(&self, path: &Path) -> bool {
        if path.extension().map_or(true, |ext| ext != "vue") {
            return false;
        }
        let relative = path.strip_prefix(&self.workspace).unwrap_or(path);
        if self.exclude.is_match(relative) {
            return false;
        }
        self.include
            .as_ref()
            .map_or(true, |include| include.is_match(relative))
    }
}

fn build_glob_set<'p>(patterns: impl IntoIterator<Item = &'p str>) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()
            .into_diagnostic()
            .wrap_err_with(|| format!("Invalid glob pattern `{}`", pattern))?;
        builder.add(glob);
    }
    builder.build().into_diagnostic()
}
