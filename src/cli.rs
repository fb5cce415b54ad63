//! Minimal CLI: analyze → (text | json), plus a node tree dump.
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use indexmap::IndexMap;
use rayon::prelude::*;
use tracing::{debug, error, info};

use ast_metrics::render::{node_tree, report_text};
use ast_metrics::{AnalysisReport, Analyzer, AnalyzerConfig, Value};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// function inventory and conditional counts over JSON-encoded C syntax trees
#[derive(Parser, Debug)]
#[command(name = "ast-metrics", version)]
pub struct CommandLineInterface {
    /// debug logging on stderr (RUST_LOG overrides)
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// analyze each input and print its report
    Report(ReportOut),
    /// print the syntax node tree of each input
    Tree(TreeOut),
    /// print the effective analyzer configuration as JSON
    Config(ConfigOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// JSON Pointer to the AST root inside each document (e.g. /ast)
    #[arg(long)]
    json_pointer: Option<String>,

    /// One or more inputs. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(Args, Debug, Clone)]
struct AnalyzerSettings {
    /// analyzer config file (JSON); flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// key holding each node's kind
    #[arg(long)]
    discriminator: Option<String>,

    /// placeholder for missing names and types
    #[arg(long)]
    sentinel: Option<String>,

    /// node kind counted as a conditional (repeatable; replaces the configured list)
    #[arg(long = "conditional-kind")]
    conditional_kinds: Vec<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(clap::Parser, Debug)]
struct ReportOut {
    #[command(flatten)]
    input_settings: InputSettings,

    #[command(flatten)]
    analyzer_settings: AnalyzerSettings,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// output file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// never emit ANSI colors
    #[arg(long)]
    no_color: bool,
}

#[derive(clap::Parser, Debug)]
struct TreeOut {
    #[command(flatten)]
    input_settings: InputSettings,

    #[command(flatten)]
    analyzer_settings: AnalyzerSettings,

    /// output file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct ConfigOut {
    #[command(flatten)]
    analyzer_settings: AnalyzerSettings,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn source_paths(&self) -> anyhow::Result<Vec<PathBuf>> {
        let source_paths = resolve_file_path_patterns(&self.input)?;
        info!(count = source_paths.len(), "resolved inputs");
        Ok(source_paths)
    }

    /// Parse one input and hand the selected AST root to `apply`.
    fn with_document<T>(
        &self,
        source_path: &Path,
        apply: impl FnOnce(&Value) -> anyhow::Result<T>,
    ) -> anyhow::Result<T> {
        let source = std::fs::read_to_string(source_path)
            .with_context(|| format!("failed to read {}", source_path.display()))?;
        let document = ast_metrics::parse::parse(&source)
            .with_context(|| format!("failed to parse {}", source_path.display()))?;
        match self.json_pointer.as_deref() {
            None => apply(&document),
            Some(pointer) => match document.pointer(pointer) {
                Some(root) => apply(root),
                None => bail!("JSON pointer {pointer:?} selects nothing in {}", source_path.display()),
            },
        }
    }
}

impl AnalyzerSettings {
    fn resolve(&self) -> anyhow::Result<AnalyzerConfig> {
        let mut config = match self.config.as_ref() {
            Some(path) => AnalyzerConfig::load(path)?,
            None => AnalyzerConfig::default(),
        };
        if let Some(discriminator) = self.discriminator.as_ref() {
            config.discriminator = discriminator.clone();
        }
        if let Some(sentinel) = self.sentinel.as_ref() {
            config.sentinel = sentinel.clone();
        }
        if !self.conditional_kinds.is_empty() {
            config.conditional_kinds = self.conditional_kinds.clone();
        }
        config.validate()?;
        debug!(?config, "effective analyzer config");
        Ok(config)
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }
    pub fn run(&self) -> anyhow::Result<()> {
        match &self.cmd {
            Command::Report(target) => {
                let config = target.analyzer_settings.resolve()?;
                let source_paths = target.input_settings.source_paths()?;

                // 1) analyze every input; collect keeps input order
                let results = source_paths
                    .par_iter()
                    .map(|source_path| {
                        let started = Instant::now();
                        let result = target.input_settings.with_document(source_path, |root| {
                            Ok(Analyzer::new(&config).analyze(root).with_context(|| {
                                format!("{} is not a syntax tree", source_path.display())
                            })?)
                        });
                        debug!(path = %source_path.display(), elapsed = ?started.elapsed(), "analyzed");
                        (source_path, result)
                    })
                    .collect::<Vec<_>>();

                // 2) keep what succeeded, log what did not
                let mut reports = IndexMap::<String, AnalysisReport>::new();
                let mut failures = 0usize;
                for (source_path, result) in results {
                    match result {
                        Ok(report) => {
                            reports.insert(source_path.to_string_lossy().to_string(), report);
                        }
                        Err(err) => {
                            failures += 1;
                            error!("{err:#}");
                        }
                    }
                }

                // 3) render
                let color = target.out.is_none() && !target.no_color && std::io::stdout().is_terminal();
                let rendered = match target.format {
                    OutputFormat::Json if source_paths.len() == 1 => match reports.values().next() {
                        Some(report) => serde_json::to_string_pretty(report)?,
                        None => String::new(),
                    },
                    OutputFormat::Json => serde_json::to_string_pretty(&reports)?,
                    OutputFormat::Text if source_paths.len() == 1 => reports
                        .values()
                        .map(|report| report_text(report, color))
                        .collect(),
                    OutputFormat::Text => reports
                        .iter()
                        .map(|(path, report)| format!("==> {path} <==\n{}\n", report_text(report, color)))
                        .collect(),
                };
                if !rendered.is_empty() {
                    write_output(target.out.as_deref(), &rendered)?;
                }

                if failures > 0 {
                    bail!("{failures} of {} inputs failed", source_paths.len());
                }
                Ok(())
            }
            Command::Tree(target) => {
                let config = target.analyzer_settings.resolve()?;
                let source_paths = target.input_settings.source_paths()?;
                let mut rendered = String::new();
                let mut failures = 0usize;
                for source_path in &source_paths {
                    let tree = target
                        .input_settings
                        .with_document(source_path, |root| Ok(node_tree(root, &config.discriminator)));
                    match tree {
                        Ok(tree) => rendered.push_str(&tree),
                        Err(err) => {
                            failures += 1;
                            error!("{err:#}");
                        }
                    }
                }
                if !rendered.is_empty() {
                    write_output(target.out.as_deref(), &rendered)?;
                }

                if failures > 0 {
                    bail!("{failures} of {} inputs failed", source_paths.len());
                }
                Ok(())
            }
            Command::Config(target) => {
                let config = target.analyzer_settings.resolve()?;
                println!("{}", serde_json::to_string_pretty(&config)?);
                Ok(())
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn write_output(out: Option<&Path>, rendered: &str) -> anyhow::Result<()> {
    match out {
        Some(out) => {
            if let Some(parent) = out.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            std::fs::write(out, rendered).with_context(|| format!("failed to write {}", out.display()))
        }
        None => {
            print!("{rendered}");
            if !rendered.ends_with('\n') {
                println!();
            }
            Ok(())
        }
    }
}

fn resolve_file_path_patterns<I>(patterns: I) -> anyhow::Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'['))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern).with_context(|| format!("invalid glob pattern: {pattern}"))? {
                out.push(entry?);
                matched_any = true;
            }
            if !matched_any {
                // an explicit glob that matched nothing is almost always a typo
                bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}
