//! Operators and built-in functions
//!
//! Error prevention: type-safe operator and function enums mean the
//! evaluator can only ever dispatch to something that exists.

use crate::core::{CalcError, CalcResult, Value};

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Addition (+)
    Add,
    /// Subtraction (-)
    Subtract,
    /// Multiplication (*)
    Multiply,
    /// Division (/)
    Divide,
    /// Modulo (%)
    Modulo,
    /// Power (^)
    Power,
    /// Bitwise AND (&)
    BitAnd,
    /// Bitwise OR (|)
    BitOr,
    /// Bitwise XOR (^|)
    BitXor,
    /// Left shift (<<)
    ShiftLeft,
    /// Arithmetic right shift (>>)
    ShiftRight,
}

impl Operation {
    /// Returns the operator symbol for display
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Modulo => "%",
            Self::Power => "^",
            Self::BitAnd => "&",
            Self::BitOr => "|",
            Self::BitXor => "^|",
            Self::ShiftLeft => "<<",
            Self::ShiftRight => ">>",
        }
    }

    /// Returns the precedence level for operator ordering (higher = evaluated first)
    #[must_use]
    pub const fn precedence(&self) -> u8 {
        match self {
            Self::BitOr => 1,
            Self::BitXor => 2,
            Self::BitAnd => 3,
            Self::ShiftLeft | Self::ShiftRight => 4,
            Self::Add | Self::Subtract => 5,
            Self::Multiply | Self::Divide | Self::Modulo => 6,
            Self::Power => 8,
        }
    }

    /// Returns true if this operation is left-associative
    #[must_use]
    pub const fn is_left_associative(&self) -> bool {
        !matches!(self, Self::Power)
    }

    /// Applies the operator to two operands
    ///
    /// Division by zero follows IEEE rules; callers decide whether a
    /// non-finite result is acceptable.
    pub fn apply(&self, a: f64, b: f64) -> CalcResult<f64> {
        let result = match self {
            Self::Add => a + b,
            Self::Subtract => a - b,
            Self::Multiply => a * b,
            Self::Divide => a / b,
            Self::Modulo => modulo(a, b),
            Self::Power => a.powf(b),
            Self::BitAnd => (to_integer(a, "bitAnd")? & to_integer(b, "bitAnd")?) as f64,
            Self::BitOr => (to_integer(a, "bitOr")? | to_integer(b, "bitOr")?) as f64,
            Self::BitXor => (to_integer(a, "bitXor")? ^ to_integer(b, "bitXor")?) as f64,
            Self::ShiftLeft => {
                let shift = shift_amount(b, "leftShift")?;
                to_integer(a, "leftShift")?.wrapping_shl(shift) as f64
            }
            Self::ShiftRight => {
                let shift = shift_amount(b, "rightArithShift")?;
                (to_integer(a, "rightArithShift")? >> shift) as f64
            }
        };
        Ok(result)
    }
}

/// Modulo with the sign of the divisor; `x % 0` is `x`
fn modulo(a: f64, b: f64) -> f64 {
    if b == 0.0 {
        a
    } else {
        a - b * (a / b).floor()
    }
}

fn to_integer(value: f64, op: &'static str) -> CalcResult<i64> {
    if value.is_finite() && value.fract() == 0.0 && value.abs() <= i64::MAX as f64 {
        Ok(value as i64)
    } else {
        Err(CalcError::NonInteger(op))
    }
}

fn shift_amount(value: f64, op: &'static str) -> CalcResult<u32> {
    let shift = to_integer(value, op)?;
    if (0..64).contains(&shift) {
        Ok(shift as u32)
    } else {
        Err(CalcError::DomainError(format!(
            "shift amount {shift} out of range"
        )))
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// Negation (-x)
    Negate,
    /// Bitwise NOT (~x)
    BitNot,
    /// Factorial (x!)
    Factorial,
}

impl UnaryOp {
    /// Applies the operator to its operand
    pub fn apply(&self, value: f64) -> CalcResult<f64> {
        match self {
            Self::Negate => Ok(-value),
            Self::BitNot => Ok((!to_integer(value, "bitNot")?) as f64),
            Self::Factorial => factorial(value),
        }
    }
}

fn factorial(value: f64) -> CalcResult<f64> {
    if value < 0.0 || value.fract() != 0.0 || !value.is_finite() {
        return Err(CalcError::DomainError(format!(
            "factorial of {value} is undefined"
        )));
    }
    // 171! overflows f64 anyway
    let n = value.min(171.0) as u32;
    Ok((2..=n).fold(1.0, |acc, k| acc * f64::from(k)))
}

/// Built-in functions callable as `name(args)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    /// Sine (radians)
    Sin,
    /// Cosine (radians)
    Cos,
    /// Tangent (radians)
    Tan,
    /// Inverse sine
    Asin,
    /// Inverse cosine
    Acos,
    /// Inverse tangent
    Atan,
    /// Hyperbolic sine
    Sinh,
    /// Hyperbolic cosine
    Cosh,
    /// Hyperbolic tangent
    Tanh,
    /// Square root
    Sqrt,
    /// Cube root
    Cbrt,
    /// Absolute value
    Abs,
    /// Natural exponential
    Exp,
    /// Natural logarithm, or logarithm to a base with two arguments
    Log,
    /// Base-10 logarithm
    Log10,
    /// Base-2 logarithm
    Log2,
    /// Round down
    Floor,
    /// Round up
    Ceil,
    /// Round to nearest
    Round,
    /// Sign (-1, 0, 1)
    Sign,
    /// Hexadecimal text form of an integer
    Hex,
    /// Binary text form of an integer
    Bin,
    /// Octal text form of an integer
    Oct,
}

impl Function {
    /// Every built-in function
    pub const ALL: [Self; 23] = [
        Self::Sin,
        Self::Cos,
        Self::Tan,
        Self::Asin,
        Self::Acos,
        Self::Atan,
        Self::Sinh,
        Self::Cosh,
        Self::Tanh,
        Self::Sqrt,
        Self::Cbrt,
        Self::Abs,
        Self::Exp,
        Self::Log,
        Self::Log10,
        Self::Log2,
        Self::Floor,
        Self::Ceil,
        Self::Round,
        Self::Sign,
        Self::Hex,
        Self::Bin,
        Self::Oct,
    ];

    /// Looks a function up by the name used in expressions
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }

    /// Returns the name used in expressions
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Sin => "sin",
            Self::Cos => "cos",
            Self::Tan => "tan",
            Self::Asin => "asin",
            Self::Acos => "acos",
            Self::Atan => "atan",
            Self::Sinh => "sinh",
            Self::Cosh => "cosh",
            Self::Tanh => "tanh",
            Self::Sqrt => "sqrt",
            Self::Cbrt => "cbrt",
            Self::Abs => "abs",
            Self::Exp => "exp",
            Self::Log => "log",
            Self::Log10 => "log10",
            Self::Log2 => "log2",
            Self::Floor => "floor",
            Self::Ceil => "ceil",
            Self::Round => "round",
            Self::Sign => "sign",
            Self::Hex => "hex",
            Self::Bin => "bin",
            Self::Oct => "oct",
        }
    }

    /// Checks the argument count
    pub fn check_arity(&self, found: usize) -> CalcResult<()> {
        let ok = match self {
            Self::Log => found == 1 || found == 2,
            _ => found == 1,
        };
        if ok {
            Ok(())
        } else {
            Err(CalcError::WrongArity {
                function: self.name(),
                expected: if matches!(self, Self::Log) { "1 or 2" } else { "1" },
                found,
            })
        }
    }

    /// Applies the function to already-evaluated arguments
    pub fn apply(&self, args: &[Value]) -> CalcResult<Value> {
        self.check_arity(args.len())?;
        let mut numbers = Vec::with_capacity(args.len());
        for arg in args {
            numbers.push(arg.as_number().ok_or(CalcError::TypeMismatch(self.name()))?);
        }
        let x = numbers[0];

        let result = match self {
            Self::Sin => x.sin(),
            Self::Cos => x.cos(),
            Self::Tan => x.tan(),
            Self::Asin => real_domain(x, (-1.0..=1.0).contains(&x), "asin")?.asin(),
            Self::Acos => real_domain(x, (-1.0..=1.0).contains(&x), "acos")?.acos(),
            Self::Atan => x.atan(),
            Self::Sinh => x.sinh(),
            Self::Cosh => x.cosh(),
            Self::Tanh => x.tanh(),
            Self::Sqrt => real_domain(x, x >= 0.0, "sqrt")?.sqrt(),
            Self::Cbrt => x.cbrt(),
            Self::Abs => x.abs(),
            Self::Exp => x.exp(),
            Self::Log => {
                let ln = real_domain(x, x >= 0.0, "log")?.ln();
                match numbers.get(1) {
                    Some(&base) => ln / real_domain(base, base > 0.0, "log")?.ln(),
                    None => ln,
                }
            }
            Self::Log10 => real_domain(x, x >= 0.0, "log10")?.log10(),
            Self::Log2 => real_domain(x, x >= 0.0, "log2")?.log2(),
            Self::Floor => x.floor(),
            Self::Ceil => x.ceil(),
            Self::Round => x.round(),
            Self::Sign => {
                if x == 0.0 {
                    0.0
                } else {
                    x.signum()
                }
            }
            Self::Hex => return radix_text(x, "0x", 16, "hex"),
            Self::Bin => return radix_text(x, "0b", 2, "bin"),
            Self::Oct => return radix_text(x, "0o", 8, "oct"),
        };
        Ok(Value::Number(result))
    }
}

fn real_domain(x: f64, in_domain: bool, name: &str) -> CalcResult<f64> {
    if in_domain {
        Ok(x)
    } else {
        Err(CalcError::DomainError(format!(
            "{name}({x}) has no real value"
        )))
    }
}

fn radix_text(x: f64, prefix: &str, radix: u32, name: &'static str) -> CalcResult<Value> {
    let n = to_integer(x, name)?;
    let digits = match radix {
        16 => format!("{:x}", n.unsigned_abs()),
        8 => format!("{:o}", n.unsigned_abs()),
        _ => format!("{:b}", n.unsigned_abs()),
    };
    let sign = if n < 0 { "-" } else { "" };
    Ok(Value::Text(format!("{sign}{prefix}{digits}")))
}
