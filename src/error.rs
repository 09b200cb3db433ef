//! Error types for the shader-expr crate.
//!
//! Errors are split by phase. [`LexError`] covers the character stream, [`ParseError`]
//! covers the token sequence and the static checks run over the compiled program, and
//! [`EvalError`] covers a single evaluation call. [`CompileError`] wraps the first two
//! so that `compile` has a single error type.

use crate::types::HString;
use core::fmt;

/// Result type used by the compiler.
///
/// The error parameter defaults to [`CompileError`]; the evaluator uses
/// `Result<f64, EvalError>`.
pub type Result<T, E = CompileError> = core::result::Result<T, E>;

/// Error raised while scanning raw expression text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    /// A character that cannot start any token.
    ///
    /// `position` is the character index (not the byte offset) of the offending
    /// character in the input, so `"1 $ 2"` reports position 2.
    UnexpectedCharacter { found: char, position: usize },

    /// An identifier longer than [`crate::types::MAX_IDENT_LEN`] bytes.
    IdentifierTooLong { position: usize },
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexError::UnexpectedCharacter { found, position } => {
                write!(f, "Unexpected character '{}' at position {}", found, position)
            }
            LexError::IdentifierTooLong { position } => {
                write!(
                    f,
                    "Identifier at position {} exceeds {} characters",
                    position,
                    crate::types::MAX_IDENT_LEN
                )
            }
        }
    }
}

/// Error raised while turning tokens into an RPN program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// An opening parenthesis was never closed, or a closing parenthesis or comma
    /// appeared without a matching opening parenthesis.
    MismatchedParens,

    /// An operator symbol that has no entry in the operator table.
    UnsupportedOperator { symbol: char },

    /// A call to a name that is not in the builtin registry.
    UnknownFunction { name: HString },

    /// An operator or call that would consume more operands than are available,
    /// e.g. `2 *` or `max(,1)`.
    StackUnderflow,

    /// A builtin called with the wrong number of arguments.
    ArityMismatch {
        name: HString,
        expected: usize,
        found: usize,
    },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::MismatchedParens => write!(f, "Mismatched parentheses"),
            ParseError::UnsupportedOperator { symbol } => {
                write!(f, "Unsupported operator: '{}'", symbol)
            }
            ParseError::UnknownFunction { name } => write!(f, "Unknown function: '{}'", name),
            ParseError::StackUnderflow => write!(f, "Missing operand"),
            ParseError::ArityMismatch {
                name,
                expected,
                found,
            } => write!(
                f,
                "Invalid function call to '{}': expected {} arguments, found {}",
                name, expected, found
            ),
        }
    }
}

/// Error returned by `compile`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    Lex(LexError),
    Parse(ParseError),
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::Lex(err) => write!(f, "Tokenizer error: {}", err),
            CompileError::Parse(err) => write!(f, "Syntax error: {}", err),
        }
    }
}

impl From<LexError> for CompileError {
    fn from(err: LexError) -> CompileError {
        CompileError::Lex(err)
    }
}

impl From<ParseError> for CompileError {
    fn from(err: ParseError) -> CompileError {
        CompileError::Parse(err)
    }
}

/// Error raised by a single evaluation call.
///
/// The compiled expression stays valid after any of these; the next call with other
/// bindings may succeed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    /// A `Call` item names a function that is not in the builtin registry.
    ///
    /// Only reachable for programs built with
    /// [`CompiledExpression::from_items`](crate::CompiledExpression::from_items),
    /// since `compile` resolves names up front.
    UnknownFunction { name: HString },

    /// An item needed more operands than the stack held.
    StackUnderflow,

    /// The program did not reduce to exactly one value.
    InvalidExpression { remaining: usize },

    /// A variable had no binding and the evaluator runs with
    /// [`UnboundPolicy::Error`](crate::eval::UnboundPolicy::Error).
    UnboundVariable { name: HString },

    /// A `Call` item declares an argument count the builtin does not accept.
    ArityMismatch {
        name: HString,
        expected: usize,
        found: usize,
    },

    /// A fixed-capacity container is full.
    CapacityExceeded(&'static str),
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalError::UnknownFunction { name } => write!(f, "Unknown function: '{}'", name),
            EvalError::StackUnderflow => write!(f, "Operand stack underflow"),
            EvalError::InvalidExpression { remaining } => write!(
                f,
                "Expression left {} values on the stack, expected exactly 1",
                remaining
            ),
            EvalError::UnboundVariable { name } => write!(f, "Unknown variable: '{}'", name),
            EvalError::ArityMismatch {
                name,
                expected,
                found,
            } => write!(
                f,
                "Invalid function call to '{}': expected {} arguments, found {}",
                name, expected, found
            ),
            EvalError::CapacityExceeded(container) => {
                write!(f, "Capacity exceeded for {}", container)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for LexError {}

#[cfg(feature = "std")]
impl std::error::Error for ParseError {}

#[cfg(feature = "std")]
impl std::error::Error for EvalError {}

#[cfg(feature = "std")]
impl std::error::Error for CompileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CompileError::Lex(err) => Some(err),
            CompileError::Parse(err) => Some(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn test_error_display_messages() {
        let err = CompileError::from(LexError::UnexpectedCharacter {
            found: '$',
            position: 2,
        });
        assert_eq!(
            err.to_string(),
            "Tokenizer error: Unexpected character '$' at position 2"
        );

        let err = CompileError::from(ParseError::MismatchedParens);
        assert_eq!(err.to_string(), "Syntax error: Mismatched parentheses");

        let err = EvalError::InvalidExpression { remaining: 0 };
        assert_eq!(
            err.to_string(),
            "Expression left 0 values on the stack, expected exactly 1"
        );
    }
}
