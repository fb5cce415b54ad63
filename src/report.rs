//! Analysis output.
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// function definitions in discovery order
    pub functions: Vec<FunctionRecord>,
    /// every conditional in the document, inside a function or not
    pub total_conditionals: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionRecord {
    pub name: String,
    pub return_type: String,
    pub parameters: Vec<Parameter>,
    /// the parameter list ended in `...`
    #[serde(default)]
    pub variadic: bool,
    /// conditionals in this function's own body, not counting nested definitions
    pub conditional_count: usize,
    /// front-end source coordinate, e.g. `"add.c:1:5"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    #[serde(rename = "type")]
    pub type_name: String,
    pub name: String,
}

impl Parameter {
    pub fn new(type_name: impl Into<String>, name: impl Into<String>) -> Self {
        Parameter { type_name: type_name.into(), name: name.into() }
    }
}

impl AnalysisReport {
    /// Conditionals that sit outside every function body.
    pub fn outside_conditionals(&self) -> usize {
        let inside: usize = self.functions.iter().map(|f| f.conditional_count).sum();
        self.total_conditionals.saturating_sub(inside)
    }
}
