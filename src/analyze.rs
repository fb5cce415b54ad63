//! Structural analysis.
//!
//! One depth-first, left-to-right walk over the projected tree. Pending work
//! lives on a heap stack together with the index of the function record whose
//! body it belongs to, so nesting depth is bounded by memory rather than by the
//! call stack.

use crate::config::AnalyzerConfig;
use crate::report::{AnalysisReport, FunctionRecord, Parameter};
use crate::syntax::{NodePath, ProjectionError, SyntaxNode, kind_of, project};
use crate::value::{Map, Value};

const DECL: &str = "decl";
const BODY: &str = "body";
const TYPE: &str = "type";
const NAMES: &str = "names";
const NAME: &str = "name";
const ARGS: &str = "args";
const PARAMS: &str = "params";
const PARAM_DECLS: &str = "param_decls";
const COORD: &str = "coord";

const ELLIPSIS_PARAM: &str = "EllipsisParam";
const IDENTIFIER: &str = "ID";
const VOID: &str = "void";

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

pub struct Analyzer<'c> {
    config: &'c AnalyzerConfig,
}

enum NodeClass {
    Function,
    Conditional,
    Other,
}

/// A unit of traversal work plus the function body it sits in, if any.
enum Pending<'a> {
    Node {
        node: SyntaxNode<'a>,
        function: Option<usize>,
    },
    Value {
        value: &'a Value,
        path: NodePath<'a>,
        function: Option<usize>,
    },
}

#[derive(Default)]
struct Signature {
    parameters: Vec<Parameter>,
    variadic: bool,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

/// Analyze a whole document with `config`.
pub fn analyze(document: &Value, config: &AnalyzerConfig) -> Result<AnalysisReport, ProjectionError> {
    Analyzer::new(config).analyze(document)
}

impl<'c> Analyzer<'c> {
    pub fn new(config: &'c AnalyzerConfig) -> Self {
        Analyzer { config }
    }

    pub fn analyze(&self, document: &Value) -> Result<AnalysisReport, ProjectionError> {
        let root = project(document, &self.config.discriminator)?;
        self.analyze_node(root)
    }

    /// Analyze the subtree rooted at an already projected node.
    ///
    /// Objects without a string discriminator are walked through during the
    /// generic traversal, while the structural fields of a function
    /// definition (`decl`, `args`, `params`, `param_decls`) reject them with
    /// `MissingDiscriminator`.
    pub fn analyze_node(&self, root: SyntaxNode<'_>) -> Result<AnalysisReport, ProjectionError> {
        let discriminator = root.discriminator();
        let mut report = AnalysisReport::default();
        let mut stack = vec![Pending::Node { node: root, function: None }];
        while let Some(item) = stack.pop() {
            match item {
                Pending::Node { node, function } => {
                    self.visit(node, function, &mut report, &mut stack)?;
                }
                Pending::Value { value: Value::Object(object), path, function } => {
                    if kind_of(object, discriminator).is_some() {
                        let node = SyntaxNode::from_object(object, discriminator, path)?;
                        self.visit(node, function, &mut report, &mut stack)?;
                    } else {
                        // plain objects (coordinates, front-end metadata) are walked through
                        let start = stack.len();
                        stack.extend(
                            object
                                .iter()
                                .filter(|(_, value)| is_container(value))
                                .map(|(key, value)| Pending::Value { value, path: path.child(key), function }),
                        );
                        stack[start..].reverse();
                    }
                }
                Pending::Value { value: Value::Array(items), path, function } => {
                    let start = stack.len();
                    stack.extend(
                        items
                            .iter()
                            .enumerate()
                            .filter(|(_, value)| is_container(value))
                            .map(|(index, value)| Pending::Value { value, path: path.index(index), function }),
                    );
                    stack[start..].reverse();
                }
                Pending::Value { .. } => {}
            }
        }
        Ok(report)
    }

    fn classify(&self, kind: &str) -> NodeClass {
        if self.config.is_function(kind) {
            NodeClass::Function
        } else if self.config.is_conditional(kind) {
            NodeClass::Conditional
        } else {
            NodeClass::Other
        }
    }

    fn visit<'a>(
        &self,
        node: SyntaxNode<'a>,
        function: Option<usize>,
        report: &mut AnalysisReport,
        stack: &mut Vec<Pending<'a>>,
    ) -> Result<(), ProjectionError> {
        let body_context = match self.classify(node.kind()) {
            NodeClass::Function => {
                // reserve the slot now so nested definitions land after this one
                report.functions.push(self.function_record(&node)?);
                Some(report.functions.len() - 1)
            }
            NodeClass::Conditional => {
                report.total_conditionals += 1;
                if let Some(record) = function.and_then(|index| report.functions.get_mut(index)) {
                    record.conditional_count += 1;
                }
                None
            }
            NodeClass::Other => None,
        };

        let start = stack.len();
        stack.extend(node.fields().filter(|(_, value)| is_container(value)).map(|(key, value)| {
            let function = match body_context {
                Some(index) if key == BODY => Some(index),
                _ => function,
            };
            Pending::Value { value, path: node.path().child(key), function }
        }));
        stack[start..].reverse();
        Ok(())
    }

    fn function_record(&self, definition: &SyntaxNode<'_>) -> Result<FunctionRecord, ProjectionError> {
        let sentinel = &self.config.sentinel;
        let mut record = FunctionRecord {
            name: sentinel.clone(),
            return_type: sentinel.clone(),
            location: definition.field_str(COORD).map(str::to_string),
            ..FunctionRecord::default()
        };

        let Some(decl) = definition.field_as_node(DECL)? else {
            return Ok(record);
        };
        if let Some(name) = decl.field_str(NAME) {
            record.name = name.to_string();
        }
        if record.location.is_none() {
            record.location = decl.field_str(COORD).map(str::to_string);
        }

        let Some(declarator) = self.function_declarator(&decl)? else {
            return Ok(record);
        };
        if let Some((return_type, _)) = self.resolve_type(&declarator) {
            record.return_type = return_type.to_string();
        }
        let signature = self.signature(&declarator, definition)?;
        record.parameters = signature.parameters;
        record.variadic = signature.variadic;
        Ok(record)
    }

    /// The first node of the declaration's `type` chain that carries an
    /// `args` key. `int f()` has `"args": null`, which still counts.
    fn function_declarator<'a>(&self, decl: &SyntaxNode<'a>) -> Result<Option<SyntaxNode<'a>>, ProjectionError> {
        let mut current = decl.field_as_node(TYPE)?;
        for _ in 0..=self.config.max_type_depth {
            match current {
                Some(node) if node.field(ARGS).is_some() => return Ok(Some(node)),
                Some(node) => current = node.field_as_node(TYPE)?,
                None => return Ok(None),
            }
        }
        Ok(None)
    }

    fn signature<'a>(
        &self,
        declarator: &SyntaxNode<'a>,
        definition: &SyntaxNode<'a>,
    ) -> Result<Signature, ProjectionError> {
        let mut signature = Signature::default();
        let Some(args) = declarator.field_as_node(ARGS)? else {
            return Ok(signature);
        };
        let params = args.field_as_node_array(PARAMS)?;
        if let [only] = params.as_slice() {
            if self.is_void_marker(only) {
                return Ok(signature);
            }
        }

        let knr_decls = definition.field_as_node_array(PARAM_DECLS)?;
        for param in &params {
            let name = param.field_str(NAME);
            let type_name = match param.kind() {
                ELLIPSIS_PARAM => {
                    signature.variadic = true;
                    continue;
                }
                IDENTIFIER => knr_decls
                    .iter()
                    .find(|decl| name.is_some() && decl.field_str(NAME) == name)
                    .and_then(|decl| self.resolve_type(decl)),
                _ => self.resolve_type(param),
            };
            let sentinel = self.config.sentinel.as_str();
            signature.parameters.push(Parameter::new(
                type_name.map_or(sentinel, |(type_name, _)| type_name),
                name.unwrap_or(sentinel),
            ));
        }
        Ok(signature)
    }

    /// `f(void)`: an unnamed parameter whose type is plain `void`, not `void *`.
    fn is_void_marker(&self, param: &SyntaxNode<'_>) -> bool {
        if param.field_str(NAME).is_some() || matches!(param.kind(), ELLIPSIS_PARAM | IDENTIFIER) {
            return false;
        }
        matches!(self.resolve_type(param), Some((VOID, links)) if links <= 1)
    }

    /// Terminal type name of a node's `type` field, with the number of links
    /// followed below that field to reach it.
    fn resolve_type<'a>(&self, node: &SyntaxNode<'a>) -> Option<(&'a str, usize)> {
        let start = node.field(TYPE)?.as_object()?;
        self.terminal_type(start)
    }

    fn terminal_type<'a>(&self, start: &'a Map) -> Option<(&'a str, usize)> {
        let mut current = start;
        for links in 0..=self.config.max_type_depth {
            if let Some(names) = current.get(NAMES).and_then(Value::as_array) {
                return names.first().and_then(Value::as_str).map(|name| (name, links));
            }
            current = current.get(TYPE)?.as_object()?;
        }
        None
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn is_container(value: &Value) -> bool {
    matches!(value, Value::Object(_) | Value::Array(_))
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————
