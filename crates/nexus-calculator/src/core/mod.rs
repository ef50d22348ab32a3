//! Calculator core: expression engine, display buffer, history and modes
//!
//! Everything in here is free of terminal or browser concerns so the whole
//! calculator can be driven from tests through [`state::CalculatorState`].

pub mod backend;
pub mod buffer;
pub mod derivative;
pub mod evaluator;
pub mod finance;
pub mod graph;
pub mod history;
pub mod memory;
pub mod mode;
mod operations;
pub mod parser;
pub mod radix;
pub mod state;
pub mod units;
mod value;

pub use operations::{Function, Operation, UnaryOp};
pub use value::{format_number, parse_float_prefix, Value};

use thiserror::Error;

/// Result type for calculator operations
pub type CalcResult<T> = Result<T, CalcError>;

/// Calculator error types - exhaustive enum ensures all cases handled
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalcError {
    /// Empty expression provided
    #[error("Empty expression")]
    EmptyExpression,
    /// Invalid expression syntax
    #[error("Invalid expression: {0}")]
    ParseError(String),
    /// Identifier with no value in scope
    #[error("Undefined symbol {0}")]
    UndefinedSymbol(String),
    /// Call to a function the engine does not know
    #[error("Unknown function {0}")]
    UnknownFunction(String),
    /// Function called with the wrong number of arguments
    #[error("Function {function} expects {expected} argument(s), got {found}")]
    WrongArity {
        /// Function name
        function: &'static str,
        /// Accepted argument count, e.g. "1" or "1 or 2"
        expected: &'static str,
        /// Number of arguments supplied
        found: usize,
    },
    /// Argument outside the function's real domain
    #[error("Domain error: {0}")]
    DomainError(String),
    /// Operation needs integer operands
    #[error("{0} requires integer operands")]
    NonInteger(&'static str),
    /// Text value used where a number is required
    #[error("Cannot use text value in {0}")]
    TypeMismatch(&'static str),
    /// Result is NaN or infinite
    #[error("Result is not a finite number")]
    NonFinite,
    /// No differentiation rule for this construct
    #[error("Cannot differentiate {0}")]
    UnsupportedDerivative(String),
}
