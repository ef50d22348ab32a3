//! Math backend interface
//!
//! The calculator state only talks to a [`MathBackend`]; [`NativeBackend`]
//! is the built-in implementation on top of the parser, evaluator and
//! differentiator in this crate.

use crate::core::derivative::differentiate;
use crate::core::evaluator::Evaluator;
use crate::core::parser::{AstNode, Parser};
use crate::core::{CalcError, CalcResult, Value};

/// Name of the variable holding the last successful numeric result
pub const ANS: &str = "ans";

/// An expression parsed once and evaluated many times
pub trait CompiledExpression {
    /// Evaluates with the compiled variable bound to `value`
    fn evaluate_at(&self, value: f64) -> CalcResult<Value>;
}

/// Expression evaluation, differentiation and compilation
pub trait MathBackend {
    /// Compiled form returned by [`MathBackend::compile`]
    type Compiled: CompiledExpression;

    /// Evaluates an expression to a finite number or a text value
    fn evaluate(&mut self, expression: &str) -> CalcResult<Value>;

    /// Returns the simplified derivative of `expression` as text
    fn differentiate(&self, expression: &str, variable: &str) -> CalcResult<String>;

    /// Parses `expression` once for repeated evaluation over `variable`
    fn compile(&self, expression: &str, variable: &str) -> CalcResult<Self::Compiled>;

    /// Number of variables the backend currently holds
    fn variable_count(&self) -> usize {
        0
    }
}

/// Built-in backend
#[derive(Debug, Clone, Default)]
pub struct NativeBackend {
    evaluator: Evaluator,
}

impl NativeBackend {
    /// Creates a backend with an empty scope
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the last successful numeric result, if any
    #[must_use]
    pub fn ans(&self) -> Option<f64> {
        self.evaluator.variable(ANS)
    }
}

impl MathBackend for NativeBackend {
    type Compiled = NativeCompiled;

    fn evaluate(&mut self, expression: &str) -> CalcResult<Value> {
        let ast = Parser::parse_str(expression)?;
        let value = self.evaluator.evaluate(&ast)?;
        match value {
            Value::Number(n) if !n.is_finite() => Err(CalcError::NonFinite),
            Value::Number(n) => {
                self.evaluator.set_variable(ANS, n);
                Ok(value)
            }
            Value::Text(_) => Ok(value),
        }
    }

    fn differentiate(&self, expression: &str, variable: &str) -> CalcResult<String> {
        let ast = Parser::parse_str(expression)?;
        differentiate(&ast, variable).map(|d| d.to_string())
    }

    fn compile(&self, expression: &str, variable: &str) -> CalcResult<NativeCompiled> {
        Ok(NativeCompiled {
            ast: Parser::parse_str(expression)?,
            variable: variable.to_string(),
            scope: self.evaluator.clone(),
        })
    }

    fn variable_count(&self) -> usize {
        self.evaluator.variable_count()
    }
}

/// Compiled expression from [`NativeBackend`]
///
/// Captures the backend's scope at compile time, so `ans` inside a graphed
/// function keeps the value it had when the graph was requested.
#[derive(Debug, Clone)]
pub struct NativeCompiled {
    ast: AstNode,
    variable: String,
    scope: Evaluator,
}

impl NativeCompiled {
    /// Returns the parsed expression
    #[must_use]
    pub fn ast(&self) -> &AstNode {
        &self.ast
    }
}

impl CompiledExpression for NativeCompiled {
    fn evaluate_at(&self, value: f64) -> CalcResult<Value> {
        self.scope.evaluate_with(&self.ast, &self.variable, value)
    }
}
