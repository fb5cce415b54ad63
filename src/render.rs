//! Human-readable renderings of reports and node trees.
//! - report: function inventory and conditional totals
//! - tree: one line per syntax node, indented by depth
use std::fmt::Write;

use colored::*;

use crate::report::{AnalysisReport, FunctionRecord};
use crate::syntax::kind_of;
use crate::value::Value;

const INDENT: &str = "  ";

/// Render a report as text. `color` enables ANSI styling of headers.
pub fn report_text(report: &AnalysisReport, color: bool) -> String {
    let mut out = String::new();
    let title = "=== AST analysis ===";
    let _ = writeln!(out, "{}", if color { title.cyan().bold() } else { title.normal() });
    let _ = writeln!(out, "functions: {}", report.functions.len());
    for (index, function) in report.functions.iter().enumerate() {
        out.push('\n');
        let heading = format!("[function {}] {}", index + 1, function.name);
        let _ = write!(out, "{}", if color { heading.as_str().bold() } else { heading.as_str().normal() });
        if let Some(location) = function.location.as_deref() {
            let _ = write!(out, " ({location})");
        }
        out.push('\n');
        let _ = writeln!(out, "{INDENT}return type: {}", function.return_type);
        let _ = writeln!(out, "{INDENT}parameters: {}", parameter_list(function));
        let _ = writeln!(out, "{INDENT}conditionals: {}", function.conditional_count);
    }
    out.push('\n');
    let total = format!("total conditionals: {}", report.total_conditionals);
    let _ = writeln!(out, "{}", if color { total.as_str().bold() } else { total.as_str().normal() });
    out
}

fn parameter_list(function: &FunctionRecord) -> String {
    let mut parts: Vec<String> = function
        .parameters
        .iter()
        .map(|p| format!("{} {}", p.type_name, p.name))
        .collect();
    if function.variadic {
        parts.push("...".to_string());
    }
    if parts.is_empty() {
        "(none)".to_string()
    } else {
        parts.join(", ")
    }
}

/// Dump every syntax node under `root`, one per line:
/// `Type: <kind>[, Name: <name>][, Value: <value>]`.
///
/// Arrays and objects without a discriminator do not get a line of their
/// own; the nodes inside them are listed as children of the enclosing node.
pub fn node_tree(root: &Value, discriminator: &str) -> String {
    let mut out = String::new();
    let mut stack = vec![(root, 0usize)];
    while let Some((value, depth)) = stack.pop() {
        let start = stack.len();
        match value {
            Value::Object(object) => {
                let child_depth = match kind_of(object, discriminator) {
                    Some(kind) => {
                        for _ in 0..depth {
                            out.push_str(INDENT);
                        }
                        let _ = write!(out, "Type: {kind}");
                        if let Some(name) = object.get("name").and_then(Value::as_str) {
                            let _ = write!(out, ", Name: {name}");
                        }
                        match object.get("value") {
                            Some(Value::String(text)) => {
                                let _ = write!(out, ", Value: {text}");
                            }
                            Some(Value::Number(number)) => {
                                let _ = write!(out, ", Value: {number}");
                            }
                            _ => {}
                        }
                        out.push('\n');
                        depth + 1
                    }
                    None => depth,
                };
                stack.extend(
                    object
                        .iter()
                        .filter(|(key, _)| key.as_str() != discriminator)
                        .map(|(_, child)| (child, child_depth)),
                );
            }
            Value::Array(items) => stack.extend(items.iter().map(|item| (item, depth))),
            _ => continue,
        }
        stack[start..].reverse();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::Parameter;
    use serde_json::json;

    #[test]
    fn report_lists_functions_in_order() {
        let report = AnalysisReport {
            functions: vec![
                FunctionRecord {
                    name: "add".into(),
                    return_type: "int".into(),
                    parameters: vec![Parameter::new("int", "a"), Parameter::new("int", "b")],
                    conditional_count: 1,
                    location: Some("add.c:1:5".into()),
                    ..FunctionRecord::default()
                },
                FunctionRecord {
                    name: "log".into(),
                    return_type: "void".into(),
                    parameters: vec![Parameter::new("char", "fmt")],
                    variadic: true,
                    ..FunctionRecord::default()
                },
                FunctionRecord { name: "main".into(), return_type: "int".into(), ..FunctionRecord::default() },
            ],
            total_conditionals: 2,
        };
        let expected = "\
=== AST analysis ===
functions: 3

[function 1] add (add.c:1:5)
  return type: int
  parameters: int a, int b
  conditionals: 1

[function 2] log
  return type: void
  parameters: char fmt, ...
  conditionals: 0

[function 3] main
  return type: int
  parameters: (none)
  conditionals: 0

total conditionals: 2
";
        assert_eq!(report_text(&report, false), expected);
    }

    #[test]
    fn empty_report() {
        let text = report_text(&AnalysisReport::default(), false);
        assert_eq!(text, "=== AST analysis ===\nfunctions: 0\n\ntotal conditionals: 0\n");
    }

    #[test]
    fn tree_indents_nodes_and_skips_plumbing() {
        let value = Value::from(json!({
            "_nodetype": "FileAST",
            "ext": [{
                "_nodetype": "Decl",
                "name": "x",
                "coord": {"file": "a.c", "line": 1},
                "init": {"_nodetype": "Constant", "type": "int", "value": "42"}
            }, {
                "_nodetype": "If",
                "cond": {"_nodetype": "ID", "name": "x"},
                "iftrue": null
            }]
        }));
        let expected = "\
Type: FileAST
  Type: Decl, Name: x
    Type: Constant, Value: 42
  Type: If
    Type: ID, Name: x
";
        assert_eq!(node_tree(&value, "_nodetype"), expected);
    }

    #[test]
    fn tree_shows_numeric_values() {
        let value = Value::from(json!({
            "kind": "Enumerator",
            "name": "RED",
            "value": 3,
            "extra": [{"kind": "Weight", "value": 0.5}]
        }));
        assert_eq!(node_tree(&value, "kind"), "Type: Enumerator, Name: RED, Value: 3\n  Type: Weight, Value: 0.5\n");
    }

    #[test]
    fn tree_of_a_scalar_is_empty() {
        assert_eq!(node_tree(&Value::from(json!(3)), "_nodetype"), "");
    }
}
