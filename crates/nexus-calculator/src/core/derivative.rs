//! Symbolic differentiation and algebraic simplification

use crate::core::parser::AstNode;
use crate::core::parser::AstNode::Number as N;
use crate::core::{CalcError, CalcResult, Function, Operation, UnaryOp};

/// Differentiates `expr` with respect to `var` and simplifies the result
///
/// Identifiers other than `var` are treated as constants.
pub fn differentiate(expr: &AstNode, var: &str) -> CalcResult<AstNode> {
    derive(expr, var).map(simplify)
}

fn derive(node: &AstNode, var: &str) -> CalcResult<AstNode> {
    if !node.contains_variable(var) {
        return Ok(N(0.0));
    }

    match node {
        AstNode::Number(_) => Ok(N(0.0)),
        AstNode::Variable(_) => Ok(N(1.0)),
        AstNode::Unary {
            op: UnaryOp::Negate,
            operand,
        } => Ok(AstNode::negate(derive(operand, var)?)),
        AstNode::Unary { .. } => Err(CalcError::UnsupportedDerivative(node.to_string())),
        AstNode::BinaryOp { left, op, right } => derive_binary(left, *op, right, var, node),
        AstNode::Call { function, args } => derive_call(*function, args, var, node),
    }
}

fn mul(a: AstNode, b: AstNode) -> AstNode {
    AstNode::binary(a, Operation::Multiply, b)
}

fn div(a: AstNode, b: AstNode) -> AstNode {
    AstNode::binary(a, Operation::Divide, b)
}

fn pow(a: AstNode, b: AstNode) -> AstNode {
    AstNode::binary(a, Operation::Power, b)
}

fn call(function: Function, arg: AstNode) -> AstNode {
    AstNode::call(function, vec![arg])
}

fn derive_binary(
    u: &AstNode,
    op: Operation,
    v: &AstNode,
    var: &str,
    whole: &AstNode,
) -> CalcResult<AstNode> {
    let derived = match op {
        Operation::Add | Operation::Subtract => {
            AstNode::binary(derive(u, var)?, op, derive(v, var)?)
        }
        Operation::Multiply => AstNode::binary(
            mul(derive(u, var)?, v.clone()),
            Operation::Add,
            mul(u.clone(), derive(v, var)?),
        ),
        Operation::Divide if !v.contains_variable(var) => div(derive(u, var)?, v.clone()),
        Operation::Divide => div(
            AstNode::binary(
                mul(derive(u, var)?, v.clone()),
                Operation::Subtract,
                mul(u.clone(), derive(v, var)?),
            ),
            pow(v.clone(), N(2.0)),
        ),
        // d(u^n) = n * u^(n - 1) * du
        Operation::Power if !v.contains_variable(var) => mul(
            mul(
                v.clone(),
                pow(
                    u.clone(),
                    AstNode::binary(v.clone(), Operation::Subtract, N(1.0)),
                ),
            ),
            derive(u, var)?,
        ),
        // d(a^v) = a^v * log(a) * dv
        Operation::Power if !u.contains_variable(var) => mul(
            mul(whole.clone(), call(Function::Log, u.clone())),
            derive(v, var)?,
        ),
        // d(u^v) = u^v * (dv * log(u) + v * du / u)
        Operation::Power => mul(
            whole.clone(),
            AstNode::binary(
                mul(derive(v, var)?, call(Function::Log, u.clone())),
                Operation::Add,
                div(mul(v.clone(), derive(u, var)?), u.clone()),
            ),
        ),
        _ => return Err(CalcError::UnsupportedDerivative(whole.to_string())),
    };
    Ok(derived)
}

fn one_minus_square(u: &AstNode) -> AstNode {
    AstNode::binary(N(1.0), Operation::Subtract, pow(u.clone(), N(2.0)))
}

fn derive_call(
    function: Function,
    args: &[AstNode],
    var: &str,
    whole: &AstNode,
) -> CalcResult<AstNode> {
    let unsupported = || CalcError::UnsupportedDerivative(whole.to_string());
    let u = args.first().ok_or_else(unsupported)?;
    let du = derive(u, var)?;
    let u = u.clone();

    let outer = match function {
        Function::Sin => call(Function::Cos, u),
        Function::Cos => AstNode::negate(call(Function::Sin, u)),
        Function::Tan => div(N(1.0), pow(call(Function::Cos, u), N(2.0))),
        Function::Asin => div(N(1.0), call(Function::Sqrt, one_minus_square(&u))),
        Function::Acos => AstNode::negate(div(
            N(1.0),
            call(Function::Sqrt, one_minus_square(&u)),
        )),
        Function::Atan => div(
            N(1.0),
            AstNode::binary(N(1.0), Operation::Add, pow(u, N(2.0))),
        ),
        Function::Sinh => call(Function::Cosh, u),
        Function::Cosh => call(Function::Sinh, u),
        Function::Tanh => div(N(1.0), pow(call(Function::Cosh, u), N(2.0))),
        Function::Sqrt => div(N(1.0), mul(N(2.0), call(Function::Sqrt, u))),
        Function::Cbrt => div(N(1.0), mul(N(3.0), pow(call(Function::Cbrt, u), N(2.0)))),
        Function::Abs => call(Function::Sign, u),
        Function::Exp => call(Function::Exp, u),
        Function::Log => match args.get(1) {
            None => div(N(1.0), u),
            Some(base) if !base.contains_variable(var) => {
                div(N(1.0), mul(u, call(Function::Log, base.clone())))
            }
            Some(_) => return Err(unsupported()),
        },
        Function::Log10 => div(N(1.0), mul(u, call(Function::Log, N(10.0)))),
        Function::Log2 => div(N(1.0), mul(u, call(Function::Log, N(2.0)))),
        Function::Floor
        | Function::Ceil
        | Function::Round
        | Function::Sign
        | Function::Hex
        | Function::Bin
        | Function::Oct => return Err(unsupported()),
    };

    Ok(mul(outer, du))
}

/// Simplifies an expression tree
///
/// Folds constant arithmetic, removes `0` and `1` identities, and moves
/// numeric coefficients to the front of products (`x * 2` becomes `2 * x`).
#[must_use]
pub fn simplify(node: AstNode) -> AstNode {
    match node {
        AstNode::Unary { op, operand } => simplify_unary(op, simplify(*operand)),
        AstNode::BinaryOp { left, op, right } => {
            simplify_binary(simplify(*left), op, simplify(*right))
        }
        AstNode::Call { function, args } => {
            AstNode::call(function, args.into_iter().map(simplify).collect())
        }
        leaf => leaf,
    }
}

fn is_zero(node: &AstNode) -> bool {
    matches!(node, N(n) if *n == 0.0)
}

fn is_one(node: &AstNode) -> bool {
    matches!(node, N(n) if *n == 1.0)
}

fn simplify_unary(op: UnaryOp, operand: AstNode) -> AstNode {
    match (op, operand) {
        (UnaryOp::Negate, N(n)) => N(-n),
        (
            UnaryOp::Negate,
            AstNode::Unary {
                op: UnaryOp::Negate,
                operand,
            },
        ) => *operand,
        (
            UnaryOp::Negate,
            AstNode::BinaryOp {
                left,
                op: Operation::Multiply,
                right,
            },
        ) => match *left {
            N(a) => simplify_binary(N(-a), Operation::Multiply, *right),
            other => AstNode::negate(mul(other, *right)),
        },
        (op, N(n)) => match op.apply(n) {
            Ok(v) if v.is_finite() => N(v),
            _ => AstNode::unary(op, N(n)),
        },
        (op, operand) => AstNode::unary(op, operand),
    }
}

fn simplify_binary(l: AstNode, op: Operation, r: AstNode) -> AstNode {
    if let (N(a), N(b)) = (&l, &r) {
        let foldable = matches!(
            op,
            Operation::Add
                | Operation::Subtract
                | Operation::Multiply
                | Operation::Divide
                | Operation::Power
        );
        if foldable {
            if let Ok(v) = op.apply(*a, *b) {
                if v.is_finite() {
                    return N(v);
                }
            }
        }
    }

    match (op, l, r) {
        (Operation::Add, l, r) if is_zero(&l) => r,
        (Operation::Add | Operation::Subtract, l, r) if is_zero(&r) => l,
        (Operation::Add, l, r) if l == r => simplify_binary(N(2.0), Operation::Multiply, l),
        (
            Operation::Add,
            l,
            AstNode::Unary {
                op: UnaryOp::Negate,
                operand,
            },
        ) => simplify_binary(l, Operation::Subtract, *operand),
        (Operation::Add, l, N(n)) if n < 0.0 => {
            AstNode::binary(l, Operation::Subtract, N(-n))
        }
        (Operation::Subtract, l, r) if is_zero(&l) => simplify_unary(UnaryOp::Negate, r),
        (Operation::Subtract, l, r) if l == r => N(0.0),
        (
            Operation::Subtract,
            l,
            AstNode::Unary {
                op: UnaryOp::Negate,
                operand,
            },
        ) => simplify_binary(l, Operation::Add, *operand),
        (Operation::Multiply, l, r) if is_zero(&l) || is_zero(&r) => N(0.0),
        (Operation::Multiply, l, r) if is_one(&l) => r,
        (Operation::Multiply, l, r) if is_one(&r) => l,
        (Operation::Multiply, N(a), r) if a == -1.0 => simplify_unary(UnaryOp::Negate, r),
        (Operation::Multiply, l, N(b)) if !matches!(l, N(_)) => {
            simplify_binary(N(b), Operation::Multiply, l)
        }
        (
            Operation::Multiply,
            N(a),
            AstNode::BinaryOp {
                left,
                op: Operation::Multiply,
                right,
            },
        ) => match *left {
            N(b) => simplify_binary(N(a * b), Operation::Multiply, *right),
            other => mul(N(a), mul(other, *right)),
        },
        (
            Operation::Multiply,
            N(a),
            AstNode::Unary {
                op: UnaryOp::Negate,
                operand,
            },
        ) => simplify_binary(N(-a), Operation::Multiply, *operand),
        (
            Operation::Multiply,
            AstNode::Unary {
                op: UnaryOp::Negate,
                operand,
            },
            r,
        ) => simplify_unary(
            UnaryOp::Negate,
            simplify_binary(*operand, Operation::Multiply, r),
        ),
        (Operation::Divide, l, _) if is_zero(&l) => N(0.0),
        (Operation::Divide | Operation::Power, l, r) if is_one(&r) => l,
        (Operation::Power, _, r) if is_zero(&r) => N(1.0),
        (op, l, r) => AstNode::binary(l, op, r),
    }
}
