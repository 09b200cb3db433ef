//! Type definitions shared by the lexer, compiler and evaluator.
//!
//! This module holds the token type produced by the lexer, the constant operator
//! table used by the shunting-yard compiler, and the RPN instruction set executed
//! by the evaluator.

use crate::functions::Function;
use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum length in bytes of an identifier (variable or function name).
pub const MAX_IDENT_LEN: usize = 64;

/// Maximum number of bindings an [`EvalContext`](crate::context::EvalContext) holds.
///
/// Must be a power of two (heapless index map requirement).
pub const MAX_BINDINGS: usize = 32;

/// Fixed-capacity string used for identifiers.
pub type HString = heapless::String<MAX_IDENT_LEN>;

/// Helper trait to convert string slices into [`HString`].
pub trait TryIntoHeaplessString {
    fn try_into_heapless(self) -> Option<HString>;
}

impl TryIntoHeaplessString for &str {
    fn try_into_heapless(self) -> Option<HString> {
        let mut s = HString::new();
        s.push_str(self).ok()?;
        Some(s)
    }
}

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// A non-negative numeric literal such as `3` or `2.75`.
    Number(f64),
    /// A variable or function name.
    Identifier(HString),
    /// One of `+ - * / ^`.
    Operator(char),
    LeftParen,
    RightParen,
    Comma,
}

/// Operator associativity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Associativity {
    Left,
    Right,
}

/// Static properties of an operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatorInfo {
    pub precedence: u8,
    pub associativity: Associativity,
    pub arity: u8,
}

impl OperatorInfo {
    const fn new(precedence: u8, associativity: Associativity, arity: u8) -> Self {
        Self {
            precedence,
            associativity,
            arity,
        }
    }
}

/// Operators known to the compiler.
///
/// Unary minus is a separate operator from binary minus; the compiler decides which
/// one a `-` token denotes from the token before it.
///
/// Variants are declared in [`OPERATOR_TABLE`] order; the discriminant is the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Negate,
    Power,
    Multiply,
    Divide,
    Add,
    Subtract,
}

/// Operator table, highest precedence first. The compiler reads precedence and
/// associativity from here.
///
/// Unary minus sits above `^`, so `-2^2` is `(-2)^2`.
pub static OPERATOR_TABLE: [(Operator, OperatorInfo); 6] = [
    (Operator::Negate, OperatorInfo::new(5, Associativity::Right, 1)),
    (Operator::Power, OperatorInfo::new(4, Associativity::Right, 2)),
    (Operator::Multiply, OperatorInfo::new(3, Associativity::Left, 2)),
    (Operator::Divide, OperatorInfo::new(3, Associativity::Left, 2)),
    (Operator::Add, OperatorInfo::new(2, Associativity::Left, 2)),
    (Operator::Subtract, OperatorInfo::new(2, Associativity::Left, 2)),
];

impl Operator {
    /// Map an operator character to an operator. `unary` selects unary minus for `-`.
    ///
    /// Returns `None` for characters without a table entry.
    pub fn from_symbol(symbol: char, unary: bool) -> Option<Operator> {
        match (symbol, unary) {
            ('-', true) => Some(Operator::Negate),
            ('+', false) => Some(Operator::Add),
            ('-', false) => Some(Operator::Subtract),
            ('*', false) => Some(Operator::Multiply),
            ('/', false) => Some(Operator::Divide),
            ('^', false) => Some(Operator::Power),
            _ => None,
        }
    }

    /// This operator's row of [`OPERATOR_TABLE`].
    #[inline]
    pub fn info(self) -> OperatorInfo {
        OPERATOR_TABLE[self as usize].1
    }

    /// Whether this operator, sitting on the stack, must be popped before pushing
    /// `incoming`.
    pub fn yields_to(self, incoming: Operator) -> bool {
        let top = self.info();
        let next = incoming.info();
        top.precedence > next.precedence
            || (top.precedence == next.precedence
                && next.associativity == Associativity::Left)
    }

    /// The RPN instruction this operator compiles to.
    pub fn to_item(self) -> RpnItem {
        match self {
            Operator::Add => RpnItem::BinaryOp(BinaryOp::Add),
            Operator::Subtract => RpnItem::BinaryOp(BinaryOp::Subtract),
            Operator::Multiply => RpnItem::BinaryOp(BinaryOp::Multiply),
            Operator::Divide => RpnItem::BinaryOp(BinaryOp::Divide),
            Operator::Power => RpnItem::BinaryOp(BinaryOp::Power),
            Operator::Negate => RpnItem::UnaryOp(UnaryOp::Negate),
        }
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum UnaryOp {
    Negate,
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
}

impl UnaryOp {
    /// Apply a unary operation to a value
    pub fn apply(self, operand: f64) -> f64 {
        match self {
            UnaryOp::Negate => -operand,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Negate => "u-",
        }
    }
}

impl BinaryOp {
    /// Apply a binary operation to two values. Division by zero follows IEEE-754.
    pub fn apply(self, left: f64, right: f64) -> f64 {
        match self {
            BinaryOp::Add => left + right,
            BinaryOp::Subtract => left - right,
            BinaryOp::Multiply => left * right,
            BinaryOp::Divide => left / right,
            BinaryOp::Power => libm::pow(left, right),
        }
    }

    pub fn symbol(self) -> char {
        match self {
            BinaryOp::Add => '+',
            BinaryOp::Subtract => '-',
            BinaryOp::Multiply => '*',
            BinaryOp::Divide => '/',
            BinaryOp::Power => '^',
        }
    }
}

/// A single instruction of a compiled RPN program.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RpnItem {
    /// Push a constant.
    Literal(f64),
    /// Push the value bound to a name (`pi` and `e` are reserved).
    Variable(HString),
    /// Pop two operands, push the result.
    BinaryOp(BinaryOp),
    /// Pop one operand, push the result.
    UnaryOp(UnaryOp),
    /// Pop `argc` operands in argument order and call a builtin by name.
    ///
    /// The name is resolved when the item runs. `compile` never emits this; it is
    /// for hand-built programs.
    Call { name: HString, argc: usize },
    /// Pop the builtin's arity in operands and call it. Emitted by `compile`.
    Apply(Function),
}

impl RpnItem {
    /// Operands consumed and values produced by this item.
    pub(crate) fn stack_effect(&self) -> (usize, usize) {
        match self {
            RpnItem::Literal(_) | RpnItem::Variable(_) => (0, 1),
            RpnItem::BinaryOp(_) => (2, 1),
            RpnItem::UnaryOp(_) => (1, 1),
            RpnItem::Call { argc, .. } => (*argc, 1),
            RpnItem::Apply(function) => (function.arity(), 1),
        }
    }
}

impl fmt::Display for RpnItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RpnItem::Literal(value) => write!(f, "{}", value),
            RpnItem::Variable(name) => write!(f, "{}", name),
            RpnItem::BinaryOp(op) => write!(f, "{}", op.symbol()),
            RpnItem::UnaryOp(op) => write!(f, "{}", op.symbol()),
            RpnItem::Call { name, argc } => write!(f, "{}/{}", name, argc),
            RpnItem::Apply(function) => write!(f, "{}/{}", function.name(), function.arity()),
        }
    }
}
