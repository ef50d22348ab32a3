//! AST evaluator
//!
//! Error prevention: every failure is a typed [`CalcError`]; the evaluator
//! never panics on user input.

use std::collections::HashMap;
use std::f64::consts;

use crate::core::parser::AstNode;
use crate::core::{CalcError, CalcResult, Value};

/// Looks up a built-in constant by name
#[must_use]
pub fn constant(name: &str) -> Option<f64> {
    match name {
        "pi" => Some(consts::PI),
        "e" => Some(consts::E),
        "tau" => Some(consts::TAU),
        "phi" => Some(1.618_033_988_749_895),
        _ => None,
    }
}

/// Evaluator for AST expressions
///
/// Holds a scope of named variables (`ans` lives here). Constants are
/// resolved after variables, so a variable may shadow a constant.
#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    variables: HashMap<String, f64>,
}

impl Evaluator {
    /// Creates a new evaluator with an empty scope
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a variable in the scope
    pub fn set_variable(&mut self, name: impl Into<String>, value: f64) {
        self.variables.insert(name.into(), value);
    }

    /// Returns a variable's value, if bound
    #[must_use]
    pub fn variable(&self, name: &str) -> Option<f64> {
        self.variables.get(name).copied()
    }

    /// Number of bound variables
    #[must_use]
    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    /// Evaluates an AST node and returns the result
    pub fn evaluate(&self, node: &AstNode) -> CalcResult<Value> {
        self.eval(node, None)
    }

    /// Evaluates with one extra variable bound for this call only
    pub fn evaluate_with(&self, node: &AstNode, name: &str, value: f64) -> CalcResult<Value> {
        self.eval(node, Some((name, value)))
    }

    fn lookup(&self, name: &str, binding: Option<(&str, f64)>) -> CalcResult<f64> {
        if let Some((bound, value)) = binding {
            if bound == name {
                return Ok(value);
            }
        }
        self.variable(name)
            .or_else(|| constant(name))
            .ok_or_else(|| CalcError::UndefinedSymbol(name.to_string()))
    }

    fn eval_number(
        &self,
        node: &AstNode,
        binding: Option<(&str, f64)>,
        context: &'static str,
    ) -> CalcResult<f64> {
        self.eval(node, binding)?
            .as_number()
            .ok_or(CalcError::TypeMismatch(context))
    }

    fn eval(&self, node: &AstNode, binding: Option<(&str, f64)>) -> CalcResult<Value> {
        match node {
            AstNode::Number(n) => Ok(Value::Number(*n)),
            AstNode::Variable(name) => self.lookup(name, binding).map(Value::Number),
            AstNode::Unary { op, operand } => {
                let value = self.eval_number(operand, binding, "unary operator")?;
                op.apply(value).map(Value::Number)
            }
            AstNode::BinaryOp { left, op, right } => {
                let a = self.eval_number(left, binding, op.symbol())?;
                let b = self.eval_number(right, binding, op.symbol())?;
                op.apply(a, b).map(Value::Number)
            }
            AstNode::Call { function, args } => {
                let values = args
                    .iter()
                    .map(|arg| self.eval(arg, binding))
                    .collect::<CalcResult<Vec<_>>>()?;
                function.apply(&values)
            }
        }
    }
}
