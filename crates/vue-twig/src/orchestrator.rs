//! Orchestrator for compiling a workspace.

use crate::cli::Args;
use crate::config::{Config, CONFIG_FILE_NAME};
use crate::output::OutputFormatter;
use camino::Utf8PathBuf;
use miette::{IntoDiagnostic, Result};
use rayon::prelude::*;
use source_map::{LineCol, LineIndex};
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info};
use twig_compiler::helpers::{camel_to_kebab, to_pascal_case};
use twig_compiler::{Compiler, ConvertError};

/// Why a single component produced no template.
#[derive(Debug, Error)]
pub enum CompileFailure {
    #[error("Failed to read the component: {0}")]
    Read(#[source] std::io::Error),

    #[error("Failed to write the template: {0}")]
    Write(#[source] std::io::Error),

    #[error("{error}")]
    Convert {
        #[source]
        error: ConvertError,
        location: Option<LineCol>,
    },
}

impl CompileFailure {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Read(_) => "read",
            Self::Write(_) => "write",
            Self::Convert { error, .. } => error.kind().as_str(),
        }
    }

    /// Line and column of a parse error in the component source.
    pub fn location(&self) -> Option<LineCol> {
        match self {
            Self::Convert { location, .. } => *location,
            _ => None,
        }
    }
}

/// Result of a compile run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CompileSummary {
    /// Number of components found.
    pub file_count: usize,
    pub compiled_count: usize,
    pub error_count: usize,
    pub duration_ms: u64,
}

/// Orchestrator for running vue-twig.
pub struct Orchestrator {
    workspace: PathBuf,
    config: Config,
    args: Args,
    formatter: OutputFormatter,
}

impl Orchestrator {
    pub fn new(workspace: PathBuf, args: Args) -> Result<Self> {
        let config = Config::load(&workspace, &args)?;
        if let Some(path) = &config.config_path {
            info!(path = %path.display(), "using configuration file");
        }
        let formatter = OutputFormatter::new(args.output);

        Ok(Self {
            workspace,
            config,
            args,
            formatter,
        })
    }

    /// Compile every selected component once.
    pub async fn run_single(&mut self) -> Result<CompileSummary> {
        let start = Instant::now();

        let files = self.find_vue_files();
        info!(count = files.len(), "found components");

        let compiler = self.build_compiler(&files);
        let results: Vec<(PathBuf, Result<String, CompileFailure>)> = files
            .par_iter()
            .map(|file| (file.clone(), self.compile_file(&compiler, file)))
            .collect();

        let mut summary = CompileSummary {
            file_count: files.len(),
            ..Default::default()
        };
        for (source, result) in results {
            let outcome = match result {
                Ok(template) => self.emit(&source, &template).await,
                Err(failure) => Err(failure),
            };
            match outcome {
                Ok(()) => summary.compiled_count += 1,
                Err(failure) => {
                    summary.error_count += 1;
                    self.formatter.print_failure(&source, &failure);
                }
            }
        }

        summary.duration_ms = start.elapsed().as_millis() as u64;
        self.formatter.print_summary(&summary);

        Ok(summary)
    }

    /// Run in watch mode.
    pub async fn run_watch_mode(&mut self) -> Result<()> {
        use notify::{Config as NotifyConfig, RecommendedWatcher, RecursiveMode, Watcher};
        use std::sync::mpsc::channel;
        use std::time::Duration;

        eprintln!("Starting watch mode...\n");

        if let Err(e) = self.run_single().await {
            eprintln!("{:?}", e);
        }

        let (tx, rx) = channel();

        let mut watcher = RecommendedWatcher::new(
            move |res| {
                if let Ok(event) = res {
                    let _ = tx.send(event);
                }
            },
            NotifyConfig::default().with_poll_interval(Duration::from_millis(500)),
        )
        .into_diagnostic()?;

        watcher
            .watch(&self.workspace, RecursiveMode::Recursive)
            .into_diagnostic()?;

        loop {
            match rx.recv_timeout(Duration::from_millis(100)) {
                Ok(event) => {
                    let config_changed = event
                        .paths
                        .iter()
                        .any(|p| p.file_name().is_some_and(|n| n == CONFIG_FILE_NAME));
                    let component_changed = event
                        .paths
                        .iter()
                        .any(|p| p.extension().is_some_and(|e| e == "vue"));

                    if !config_changed && !component_changed {
                        continue;
                    }
                    if config_changed {
                        match Config::load(&self.workspace, &self.args) {
                            Ok(config) => self.config = config,
                            Err(e) => {
                                eprintln!("{:?}", e);
                                continue;
                            }
                        }
                    }

                    print!("\x1B[2J\x1B[1;1H");
                    eprintln!("File change detected. Recompiling...\n");
                    if let Err(e) = self.run_single().await {
                        eprintln!("{:?}", e);
                    }
                }
                Err(std::sync::mpsc::RecvTimeoutError::Timeout) => {}
                Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,
            }
        }

        Ok(())
    }

    /// Components named on the command line, or every component of the
    /// workspace. Relative paths are resolved against the workspace.
    fn find_vue_files(&self) -> Vec<PathBuf> {
        let roots: Vec<PathBuf> = if self.args.paths.is_empty() {
            vec![self.workspace.clone()]
        } else {
            self.args
                .paths
                .iter()
                .map(|p| if p.is_absolute() { p.clone() } else { self.workspace.join(p) })
                .collect()
        };

        let mut files = Vec::new();
        for root in roots {
            if root.is_file() {
                if root.extension().is_some_and(|e| e == "vue") {
                    files.push(root);
                }
                continue;
            }
            for entry in walkdir::WalkDir::new(&root)
                .follow_links(true)
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let path = entry.path();
                if path.is_dir() || !self.config.should_process(path) {
                    continue;
                }
                files.push(path.to_path_buf());
            }
        }

        files.sort();
        files.dedup();
        files
    }

    /// A compiler knowing every discovered component by its PascalCase and
    /// kebab-case name. Configured components win over discovered ones.
    fn build_compiler(&self, files: &[PathBuf]) -> Compiler {
        let mut compiler = Compiler::new(self.config.options.clone());
        for file in files {
            let path = include_path(&self.workspace, file);
            for name in component_names(file) {
                debug!(%name, %path, "registered component");
                compiler.register_component(&name, path.clone());
            }
        }
        for (name, path) in &self.config.components {
            compiler.register_component(name, path.clone());
        }
        debug!(count = compiler.components().len(), "component registry ready");
        compiler
    }

    fn compile_file(&self, compiler: &Compiler, path: &Path) -> Result<String, CompileFailure> {
        let source = std::fs::read_to_string(path).map_err(CompileFailure::Read)?;

        // Style imports resolve next to the component unless configured.
        let compiler = match (&self.config.options.base_path, path.parent()) {
            (None, Some(parent)) => {
                let mut local = compiler.clone();
                local.options_mut().base_path = Some(parent.to_path_buf());
                Cow::Owned(local)
            }
            _ => Cow::Borrowed(compiler),
        };

        compiler.convert(&source).map_err(|error| {
            let location = error.span().map(|span| LineIndex::new(&source).locate(span));
            CompileFailure::Convert { error, location }
        })
    }

    async fn emit(&self, source: &Path, template: &str) -> Result<(), CompileFailure> {
        if self.args.stdout {
            self.formatter.print_template(source, template);
            return Ok(());
        }

        let target = template_path(&self.workspace, self.config.out_dir.as_deref(), source);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(CompileFailure::Write)?;
        }
        tokio::fs::write(&target, template)
            .await
            .map_err(CompileFailure::Write)?;
        self.formatter.print_compiled(source, &target);
        Ok(())
    }
}

/// `src/ui/MyCard.vue` → `["MyCard", "my-card"]`.
fn component_names(file: &Path) -> Vec<String> {
    let Some(stem) = file.file_stem().map(|s| s.to_string_lossy()) else {
        return Vec::new();
    };
    let pascal = to_pascal_case(&stem);
    let kebab = camel_to_kebab(&pascal).trim_start_matches('-').to_string();
    if kebab.eq_ignore_ascii_case(&pascal) {
        vec![pascal]
    } else {
        vec![pascal, kebab]
    }
}

fn relative<'p>(workspace: &Path, file: &'p Path) -> &'p Path {
    file.strip_prefix(workspace)
        .ok()
        .or_else(|| file.file_name().map(Path::new))
        .unwrap_or(file)
}

/// Include path of a component, relative to the output root and written
/// with `/` separators.
fn include_path(workspace: &Path, file: &Path) -> String {
    let twig = relative(workspace, file).with_extension("twig");
    match Utf8PathBuf::from_path_buf(twig) {
        Ok(path) => path
            .components()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join("/"),
        Err(path) => path.to_string_lossy().replace('\\', "/"),
    }
}

/// Where the template of `file` is written: mirrored under `out_dir`, or
/// next to the component.
fn template_path(workspace: &Path, out_dir: Option<&Path>, file: &Path) -> PathBuf {
    match out_dir {
        Some(out) => out.join(relative(workspace, file)).with_extension("twig"),
        None => file.with_extension("twig"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use pretty_assertions::assert_eq;

    fn orchestrator(dir: &Path, extra: &[&str]) -> Orchestrator {
        let mut argv = vec!["vue-twig", "--output", "json"];
        argv.extend_from_slice(extra);
        let args = Args::try_parse_from(argv).unwrap();
        Orchestrator::new(dir.to_path_buf(), args).unwrap()
    }

    fn write(dir: &Path, relative: &str, content: &str) {
        let path = dir.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn test_component_names() {
        assert_eq!(
            component_names(Path::new("src/my-card.vue")),
            vec!["MyCard", "my-card"]
        );
        assert_eq!(component_names(Path::new("Card.vue")), vec!["Card"]);
    }

    #[test]
    fn test_paths() {
        let workspace = Path::new("/project");
        let file = Path::new("/project/src/ui/Card.vue");
        assert_eq!(include_path(workspace, file), "src/ui/Card.twig");
        assert_eq!(
            template_path(workspace, Some(Path::new("/out")), file),
            PathBuf::from("/out/src/ui/Card.twig")
        );
        assert_eq!(
            template_path(workspace, None, file),
            PathBuf::from("/project/src/ui/Card.twig")
        );
        assert_eq!(include_path(workspace, Path::new("/elsewhere/Icon.vue")), "Icon.twig");
    }

    #[tokio::test]
    async fn test_compiles_workspace() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "components/Card.vue",
            "<template><div class=\"card\"><slot></slot></div></template>",
        );
        write(
            dir.path(),
            "Page.vue",
            "<template><main><card :title=\"t\">x</card></main></template>",
        );
        write(dir.path(), "node_modules/lib/Skip.vue", "<template><p></p></template>");

        let mut orchestrator = orchestrator(dir.path(), &["-o", "out"]);
        let summary = orchestrator.run_single().await.unwrap();

        assert_eq!(summary.file_count, 2);
        assert_eq!(summary.compiled_count, 2);
        assert_eq!(summary.error_count, 0);

        let page = std::fs::read_to_string(dir.path().join("out/Page.twig")).unwrap();
        assert!(page.contains("{% include \"components/Card.twig\" with {"), "{}", page);
        assert!(page.contains("'title': t"), "{}", page);
        assert!(dir.path().join("out/components/Card.twig").is_file());
        assert!(!dir.path().join("out/node_modules").exists());
    }

    #[tokio::test]
    async fn test_failures_are_counted() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "Good.vue", "<template><p>ok</p></template>");
        write(dir.path(), "Broken.vue", "<script>export default {}</script>");

        let mut orchestrator = orchestrator(dir.path(), &[]);
        let summary = orchestrator.run_single().await.unwrap();

        assert_eq!(summary.compiled_count, 1);
        assert_eq!(summary.error_count, 1);
        assert!(dir.path().join("Good.twig").is_file());
        assert!(!dir.path().join("Broken.twig").exists());
    }

    #[test]
    fn test_markup_failure_is_located() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "Bad.vue", "<template>\n  <div class=\"x\"\n</template>");

        let orchestrator = orchestrator(dir.path(), &[]);
        let failure = orchestrator
            .compile_file(&Compiler::default(), &dir.path().join("Bad.vue"))
            .unwrap_err();
        assert_eq!(failure.kind(), "markup");
        assert_eq!(failure.location().map(|loc| loc.to_string()), Some("2:3".to_string()));
    }

    #[tokio::test]
    async fn test_explicit_paths_and_stdout() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a/One.vue", "<template><p>1</p></template>");
        write(dir.path(), "b/Two.vue", "<template><p>2</p></template>");

        let mut orchestrator = orchestrator(dir.path(), &["--stdout", "a"]);
        let summary = orchestrator.run_single().await.unwrap();

        assert_eq!(summary.file_count, 1);
        assert_eq!(summary.compiled_count, 1);
        assert!(!dir.path().join("a/One.twig").exists());
    }
}
