//! Runs every fixture case under a directory and reports pass/fail per case.
//!
//! A fixture file is a JSON array of cases:
//! `{ "name", "config"?, "document" | "source", "expected" | "error" }`
//! where `error` is `"parse"` or `"projection"`.
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use ast_metrics::{AnalysisReport, AnalyzerConfig, Error, analyze_str};
use clap::Parser;
use colored::Colorize;
use regex::Regex;
use serde::Deserialize;

#[derive(Parser, Debug)]
struct Args {
    /// directory holding fixture `.json` files
    #[arg(default_value = "fixtures")]
    dir: PathBuf,

    /// only run cases whose `file::name` matches this regex
    #[arg(long, value_parser = Regex::new)]
    filter: Option<Regex>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Case {
    name: String,
    #[serde(default)]
    config: Option<AnalyzerConfig>,
    #[serde(default)]
    document: Option<serde_json::Value>,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    expected: Option<AnalysisReport>,
    #[serde(default)]
    error: Option<ExpectedError>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ExpectedError {
    Parse,
    Projection,
}

fn main() -> ExitCode {
    let args = Args::parse();
    let files = match fixture_files(&args.dir) {
        Ok(files) => files,
        Err(error) => {
            eprintln!("❌ cannot list {}: {error}", args.dir.display());
            return ExitCode::FAILURE;
        }
    };

    let mut passed = 0usize;
    let mut failed = 0usize;
    for file in files {
        let file_name = file.file_stem().map(|s| s.to_string_lossy().to_string()).unwrap_or_default();
        let cases = match load_cases(&file) {
            Ok(cases) => cases,
            Err(error) => {
                eprintln!("❌ {}: {error}", file.display());
                failed += 1;
                continue;
            }
        };
        for case in cases {
            let label = format!("{file_name}::{}", case.name);
            if args.filter.as_ref().is_some_and(|filter| !filter.is_match(&label)) {
                continue;
            }
            match run_case(&case) {
                Ok(()) => {
                    passed += 1;
                    eprintln!("✅ {label}");
                }
                Err(reason) => {
                    failed += 1;
                    eprintln!("❌ {label}: {reason}");
                }
            }
        }
    }

    let summary = format!("{passed} passed, {failed} failed");
    if failed == 0 {
        eprintln!("{}", summary.as_str().green().bold());
        ExitCode::SUCCESS
    } else {
        eprintln!("{}", summary.as_str().red().bold());
        ExitCode::FAILURE
    }
}

fn fixture_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn load_cases(file: &Path) -> Result<Vec<Case>, String> {
    let src = std::fs::read_to_string(file).map_err(|error| error.to_string())?;
    let de = &mut serde_json::Deserializer::from_str(&src);
    serde_path_to_error::deserialize(de).map_err(|err| {
        let path = err.path().to_string();
        format!("at JSON path {path} → {}", err.into_inner())
    })
}

fn run_case(case: &Case) -> Result<(), String> {
    let config = case.config.clone().unwrap_or_default();
    config.validate().map_err(|error| error.to_string())?;
    let source = match (&case.document, &case.source) {
        (Some(document), None) => serde_json::to_string_pretty(document).map_err(|error| error.to_string())?,
        (None, Some(source)) => source.clone(),
        _ => return Err("a case needs exactly one of `document` or `source`".to_string()),
    };

    let result = analyze_str(&source, &config);
    match (&case.expected, case.error, result) {
        (Some(expected), None, Ok(report)) if &report == expected => Ok(()),
        (Some(expected), None, Ok(report)) => Err(format!(
            "report mismatch\n  expected: {}\n  actual:   {}",
            serde_json::to_string(expected).unwrap_or_default(),
            serde_json::to_string(&report).unwrap_or_default(),
        )),
        (Some(_), None, Err(error)) => Err(format!("unexpected error: {error}")),
        (None, Some(ExpectedError::Parse), Err(Error::Parse(_))) => Ok(()),
        (None, Some(ExpectedError::Projection), Err(Error::Projection(_))) => Ok(()),
        (None, Some(kind), Err(error)) => Err(format!("expected a {kind:?} error, got: {error}")),
        (None, Some(kind), Ok(_)) => Err(format!("expected a {kind:?} error, got a report")),
        _ => Err("a case needs exactly one of `expected` or `error`".to_string()),
    }
}
