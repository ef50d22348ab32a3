//! Expression tokenizer, parser and printer
//!
//! Error prevention: type-safe tokens prevent invalid syntax from ever
//! reaching the evaluator.

use std::fmt;

use crate::core::{format_number, CalcError, CalcResult, Function, Operation, UnaryOp};

/// Token types from lexical analysis
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Numeric literal
    Number(f64),
    /// Constant, variable or function name
    Identifier(String),
    /// Binary operator (also unary `-` and `+`)
    Operator(Operation),
    /// Bitwise NOT (~)
    Tilde,
    /// Factorial (!)
    Bang,
    /// Argument separator
    Comma,
    /// Left parenthesis
    LeftParen,
    /// Right parenthesis
    RightParen,
}

impl Token {
    /// Returns true if this token is an operator
    #[must_use]
    pub const fn is_operator(&self) -> bool {
        matches!(self, Self::Operator(_))
    }

    /// Returns true if this token can start an operand
    ///
    /// Used for implicit multiplication such as `2x` or `3(1 + 2)`.
    #[must_use]
    pub const fn starts_operand(&self) -> bool {
        matches!(
            self,
            Self::Number(_) | Self::Identifier(_) | Self::LeftParen
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => f.write_str(&format_number(*n)),
            Self::Identifier(name) => f.write_str(name),
            Self::Operator(op) => f.write_str(op.symbol()),
            Self::Tilde => f.write_str("~"),
            Self::Bang => f.write_str("!"),
            Self::Comma => f.write_str(","),
            Self::LeftParen => f.write_str("("),
            Self::RightParen => f.write_str(")"),
        }
    }
}

/// Abstract Syntax Tree node
#[derive(Debug, Clone, PartialEq)]
pub enum AstNode {
    /// Numeric literal
    Number(f64),
    /// Named constant or variable
    Variable(String),
    /// Unary operation
    Unary {
        /// Operator
        op: UnaryOp,
        /// Operand
        operand: Box<AstNode>,
    },
    /// Binary operation
    BinaryOp {
        /// Left operand
        left: Box<AstNode>,
        /// Operator
        op: Operation,
        /// Right operand
        right: Box<AstNode>,
    },
    /// Function call
    Call {
        /// Function being called
        function: Function,
        /// Arguments in order
        args: Vec<AstNode>,
    },
}

const UNARY_PRECEDENCE: u8 = 7;
const POSTFIX_PRECEDENCE: u8 = 9;
const ATOM_PRECEDENCE: u8 = 10;

impl AstNode {
    /// Creates a new number node
    #[must_use]
    pub fn number(value: f64) -> Self {
        Self::Number(value)
    }

    /// Creates a new variable node
    #[must_use]
    pub fn variable(name: impl Into<String>) -> Self {
        Self::Variable(name.into())
    }

    /// Creates a new binary operation node
    #[must_use]
    pub fn binary(left: AstNode, op: Operation, right: AstNode) -> Self {
        Self::BinaryOp {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    /// Creates a new unary operation node
    #[must_use]
    pub fn unary(op: UnaryOp, operand: AstNode) -> Self {
        Self::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    /// Creates a new negation node
    #[must_use]
    pub fn negate(inner: AstNode) -> Self {
        Self::unary(UnaryOp::Negate, inner)
    }

    /// Creates a new function call node
    #[must_use]
    pub fn call(function: Function, args: Vec<AstNode>) -> Self {
        Self::Call { function, args }
    }

    /// Returns true if `name` appears anywhere in the tree
    #[must_use]
    pub fn contains_variable(&self, name: &str) -> bool {
        match self {
            Self::Number(_) => false,
            Self::Variable(v) => v == name,
            Self::Unary { operand, .. } => operand.contains_variable(name),
            Self::BinaryOp { left, right, .. } => {
                left.contains_variable(name) || right.contains_variable(name)
            }
            Self::Call { args, .. } => args.iter().any(|a| a.contains_variable(name)),
        }
    }

    /// Binding strength when printed
    fn precedence(&self) -> u8 {
        match self {
            Self::Number(n) if *n < 0.0 => UNARY_PRECEDENCE,
            Self::Number(_) | Self::Variable(_) | Self::Call { .. } => ATOM_PRECEDENCE,
            Self::Unary {
                op: UnaryOp::Factorial,
                ..
            } => POSTFIX_PRECEDENCE,
            Self::Unary { .. } => UNARY_PRECEDENCE,
            Self::BinaryOp { op, .. } => op.precedence(),
        }
    }
}

fn write_operand(f: &mut fmt::Formatter<'_>, node: &AstNode, parens: bool) -> fmt::Result {
    if parens {
        write!(f, "({node})")
    } else {
        write!(f, "{node}")
    }
}

/// Prints the expression with spaces around binary operators and only the
/// parentheses needed to parse back to the same tree.
impl fmt::Display for AstNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => f.write_str(&format_number(*n)),
            Self::Variable(name) => f.write_str(name),
            Self::Unary {
                op: UnaryOp::Factorial,
                operand,
            } => {
                write_operand(f, operand, operand.precedence() < POSTFIX_PRECEDENCE)?;
                f.write_str("!")
            }
            Self::Unary { op, operand } => {
                f.write_str(if *op == UnaryOp::Negate { "-" } else { "~" })?;
                write_operand(f, operand, operand.precedence() < UNARY_PRECEDENCE)
            }
            Self::BinaryOp { left, op, right } => {
                let p = op.precedence();
                let left_parens = left.precedence() < p
                    || (left.precedence() == p && !op.is_left_associative());
                let right_parens = if *op == Operation::Power {
                    right.precedence() < UNARY_PRECEDENCE
                } else {
                    right.precedence() < p
                        || (right.precedence() == p && op.is_left_associative())
                };
                write_operand(f, left, left_parens)?;
                write!(f, " {} ", op.symbol())?;
                write_operand(f, right, right_parens)
            }
            Self::Call { function, args } => {
                write!(f, "{}(", function.name())?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(")")
            }
        }
    }
}

/// Tokenizer for converting expression strings to tokens
#[derive(Debug)]
pub struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Tokenizer<'a> {
    /// Creates a new tokenizer for the given input
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    /// Returns the remaining input
    #[must_use]
    pub fn remaining(&self) -> &str {
        &self.input[self.pos..]
    }

    /// Tokenizes the entire input
    pub fn tokenize(&mut self) -> CalcResult<Vec<Token>> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    /// Returns the next token, or None if at end of input
    pub fn next_token(&mut self) -> CalcResult<Option<Token>> {
        self.skip_whitespace();

        let Some(ch) = self.current_char() else {
            return Ok(None);
        };

        if ch.is_ascii_digit() || ch == '.' {
            return self.read_number().map(Some);
        }
        if ch.is_alphabetic() || ch == '_' {
            return Ok(Some(self.read_identifier()));
        }

        self.advance();
        let token = match ch {
            '+' => Token::Operator(Operation::Add),
            '-' => Token::Operator(Operation::Subtract),
            '*' => Token::Operator(Operation::Multiply),
            '/' => Token::Operator(Operation::Divide),
            '%' => Token::Operator(Operation::Modulo),
            '^' if self.current_char() == Some('|') => {
                self.advance();
                Token::Operator(Operation::BitXor)
            }
            '^' => Token::Operator(Operation::Power),
            '&' => Token::Operator(Operation::BitAnd),
            '|' => Token::Operator(Operation::BitOr),
            '<' | '>' if self.current_char() == Some(ch) => {
                self.advance();
                if ch == '<' {
                    Token::Operator(Operation::ShiftLeft)
                } else {
                    Token::Operator(Operation::ShiftRight)
                }
            }
            '~' => Token::Tilde,
            '!' => Token::Bang,
            ',' => Token::Comma,
            '(' => Token::LeftParen,
            ')' => Token::RightParen,
            _ => {
                return Err(CalcError::ParseError(format!(
                    "Unexpected character: '{ch}'"
                )));
            }
        };

        Ok(Some(token))
    }

    fn current_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input[self.pos..].chars().nth(offset)
    }

    fn advance(&mut self) {
        if let Some(ch) = self.current_char() {
            self.pos += ch.len_utf8();
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn consume_digits(&mut self) {
        while self.current_char().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }
    }

    fn read_number(&mut self) -> CalcResult<Token> {
        let start = self.pos;

        self.consume_digits();
        if self.current_char() == Some('.') {
            self.advance();
            self.consume_digits();
        }

        // Exponent only when digits follow, so `2e` stays `2 * e`
        if matches!(self.current_char(), Some('e' | 'E')) {
            let digit_at = match self.peek_char(1) {
                Some('+' | '-') => 2,
                _ => 1,
            };
            if self.peek_char(digit_at).is_some_and(|c| c.is_ascii_digit()) {
                for _ in 0..digit_at {
                    self.advance();
                }
                self.consume_digits();
            }
        }

        let num_str = &self.input[start..self.pos];
        let value: f64 = num_str
            .parse()
            .map_err(|_| CalcError::ParseError(format!("Invalid number: '{num_str}'")))?;

        Ok(Token::Number(value))
    }

    fn read_identifier(&mut self) -> Token {
        let start = self.pos;
        while self
            .current_char()
            .is_some_and(|c| c.is_alphanumeric() || c == '_')
        {
            self.advance();
        }
        Token::Identifier(self.input[start..self.pos].to_string())
    }
}

/// Recursive descent parser for expressions
///
/// Grammar:
/// ```text
/// expression ::= bitor
/// bitor      ::= bitxor ('|' bitxor)*
/// bitxor     ::= bitand ('^|' bitand)*
/// bitand     ::= shift ('&' shift)*
/// shift      ::= additive (('<<' | '>>') additive)*
/// additive   ::= term (('+' | '-') term)*
/// term       ::= unary (('*' | '/' | '%') unary | power)*   // bare power = implicit '*'
/// unary      ::= ('-' | '+' | '~') unary | power
/// power      ::= postfix ('^' unary)?                      // Right associative
/// postfix    ::= primary '!'*
/// primary    ::= NUMBER | IDENT | IDENT '(' args ')' | '(' expression ')'
/// ```
#[derive(Debug)]
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    /// Creates a new parser from tokens
    #[must_use]
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    /// Parses a string expression into an AST
    pub fn parse_str(input: &str) -> CalcResult<AstNode> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(CalcError::EmptyExpression);
        }

        let mut tokenizer = Tokenizer::new(trimmed);
        let tokens = tokenizer.tokenize()?;

        let mut parser = Self::new(tokens);
        parser.parse()
    }

    /// Parses tokens into an AST, requiring every token to be consumed
    pub fn parse(&mut self) -> CalcResult<AstNode> {
        if self.tokens.is_empty() {
            return Err(CalcError::EmptyExpression);
        }
        let ast = self.parse_expression()?;

        if let Some(token) = self.current() {
            return Err(CalcError::ParseError(format!(
                "Unexpected token '{token}' at position {}",
                self.pos
            )));
        }

        Ok(ast)
    }

    fn current(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<&Token> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    /// A number only multiplies implicitly after `!` (`3!2`); `2 3` and
    /// `1.2.3` are malformed
    fn implicit_operand_follows(&self) -> bool {
        match self.current() {
            Some(Token::Number(_)) => {
                self.pos > 0 && matches!(self.tokens.get(self.pos - 1), Some(Token::Bang))
            }
            Some(token) => token.starts_operand(),
            None => false,
        }
    }

    fn current_operator(&self) -> Option<Operation> {
        match self.current() {
            Some(Token::Operator(op)) => Some(*op),
            _ => None,
        }
    }

    fn parse_expression(&mut self) -> CalcResult<AstNode> {
        self.parse_bit_or()
    }

    /// Parses one left-associative precedence level
    fn parse_left_assoc(
        &mut self,
        ops: &[Operation],
        next: fn(&mut Self) -> CalcResult<AstNode>,
    ) -> CalcResult<AstNode> {
        let mut left = next(self)?;

        while let Some(op) = self.current_operator().filter(|op| ops.contains(op)) {
            self.advance();
            let right = next(self)?;
            left = AstNode::binary(left, op, right);
        }

        Ok(left)
    }

    fn parse_bit_or(&mut self) -> CalcResult<AstNode> {
        self.parse_left_assoc(&[Operation::BitOr], Self::parse_bit_xor)
    }

    fn parse_bit_xor(&mut self) -> CalcResult<AstNode> {
        self.parse_left_assoc(&[Operation::BitXor], Self::parse_bit_and)
    }

    fn parse_bit_and(&mut self) -> CalcResult<AstNode> {
        self.parse_left_assoc(&[Operation::BitAnd], Self::parse_shift)
    }

    fn parse_shift(&mut self) -> CalcResult<AstNode> {
        self.parse_left_assoc(
            &[Operation::ShiftLeft, Operation::ShiftRight],
            Self::parse_additive,
        )
    }

    fn parse_additive(&mut self) -> CalcResult<AstNode> {
        self.parse_left_assoc(&[Operation::Add, Operation::Subtract], Self::parse_term)
    }

    fn parse_term(&mut self) -> CalcResult<AstNode> {
        let mut left = self.parse_unary()?;

        loop {
            match self.current_operator() {
                Some(op @ (Operation::Multiply | Operation::Divide | Operation::Modulo)) => {
                    self.advance();
                    let right = self.parse_unary()?;
                    left = AstNode::binary(left, op, right);
                }
                Some(_) => break,
                None if self.implicit_operand_follows() => {
                    let right = self.parse_power()?;
                    left = AstNode::binary(left, Operation::Multiply, right);
                }
                None => break,
            }
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> CalcResult<AstNode> {
        match self.current() {
            Some(Token::Operator(Operation::Subtract)) => {
                self.advance();
                Ok(AstNode::negate(self.parse_unary()?))
            }
            Some(Token::Operator(Operation::Add)) => {
                self.advance();
                self.parse_unary()
            }
            Some(Token::Tilde) => {
                self.advance();
                Ok(AstNode::unary(UnaryOp::BitNot, self.parse_unary()?))
            }
            _ => self.parse_power(),
        }
    }

    fn parse_power(&mut self) -> CalcResult<AstNode> {
        let base = self.parse_postfix()?;

        // Power is right-associative and its exponent may carry a sign
        if self.current_operator() == Some(Operation::Power) {
            self.advance();
            let exponent = self.parse_unary()?;
            return Ok(AstNode::binary(base, Operation::Power, exponent));
        }

        Ok(base)
    }

    fn parse_postfix(&mut self) -> CalcResult<AstNode> {
        let mut node = self.parse_primary()?;
        while matches!(self.current(), Some(Token::Bang)) {
            self.advance();
            node = AstNode::unary(UnaryOp::Factorial, node);
        }
        Ok(node)
    }

    fn parse_primary(&mut self) -> CalcResult<AstNode> {
        let token = self
            .advance()
            .cloned()
            .ok_or_else(|| CalcError::ParseError("Unexpected end of expression".into()))?;

        match token {
            Token::Number(n) => Ok(AstNode::number(n)),
            Token::Identifier(name) => {
                if !matches!(self.current(), Some(Token::LeftParen)) {
                    return Ok(AstNode::variable(name));
                }
                let function =
                    Function::from_name(&name).ok_or(CalcError::UnknownFunction(name))?;
                self.advance();
                let args = self.parse_arguments()?;
                function.check_arity(args.len())?;
                Ok(AstNode::call(function, args))
            }
            Token::LeftParen => {
                let expr = self.parse_expression()?;
                match self.advance() {
                    Some(Token::RightParen) => Ok(expr),
                    Some(t) => Err(CalcError::ParseError(format!(
                        "Expected ')' but found '{t}'"
                    ))),
                    None => Err(CalcError::ParseError("Unclosed parenthesis".into())),
                }
            }
            other => Err(CalcError::ParseError(format!(
                "Unexpected token: '{other}'"
            ))),
        }
    }

    /// Parses a call's argument list after the opening parenthesis
    fn parse_arguments(&mut self) -> CalcResult<Vec<AstNode>> {
        let mut args = Vec::new();
        if matches!(self.current(), Some(Token::RightParen)) {
            self.advance();
            return Ok(args);
        }

        loop {
            args.push(self.parse_expression()?);
            match self.advance() {
                Some(Token::Comma) => {}
                Some(Token::RightParen) => return Ok(args),
                Some(t) => {
                    return Err(CalcError::ParseError(format!(
                        "Expected ',' or ')' but found '{t}'"
                    )))
                }
                None => return Err(CalcError::ParseError("Unclosed function call".into())),
            }
        }
    }
}
