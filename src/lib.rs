//! Structural metrics over JSON-encoded C syntax trees.
//!
//! The pipeline is `parse` → `syntax::project` → `analyze`, each stage
//! borrowing the output of the previous one:
//!
//! ```
//! let text = r#"{"_nodetype": "FileAST", "ext": []}"#;
//! let report = ast_metrics::analyze_str(text, &ast_metrics::AnalyzerConfig::default()).unwrap();
//! assert_eq!(report.total_conditionals, 0);
//! ```
pub mod analyze;
pub mod config;
pub mod error;
pub mod parse;
pub mod render;
pub mod report;
pub mod syntax;
pub mod value;

use std::io::Read;

pub use analyze::Analyzer;
pub use config::{AnalyzerConfig, ConfigError};
pub use error::{Error, ParseError, ParseErrorKind, Position};
pub use report::{AnalysisReport, FunctionRecord, Parameter};
pub use syntax::{ProjectionError, SyntaxNode};
pub use value::{Number, Value};

/// Parse `text` and analyze the whole document.
pub fn analyze_str(text: &str, config: &AnalyzerConfig) -> Result<AnalysisReport, Error> {
    let document = parse::parse(text)?;
    Ok(analyze::analyze(&document, config)?)
}

/// Read a document from `reader` and analyze it.
pub fn analyze_reader<R: Read>(reader: R, config: &AnalyzerConfig) -> Result<AnalysisReport, Error> {
    let document = parse::parse_reader(reader)?;
    Ok(analyze::analyze(&document, config)?)
}
