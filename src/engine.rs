//! Shunting-yard compiler.
//!
//! Turns a token list into a postfix (RPN) program in one left-to-right pass, then
//! runs a stack-depth check over the program so that the evaluator only ever sees
//! programs whose calls resolve and whose operators have their operands.

use crate::error::{ParseError, Result};
use crate::expression::CompiledExpression;
use crate::functions::Function;
use crate::lexer::tokenize;
use crate::types::{HString, Operator, RpnItem, Token};
use alloc::vec::Vec;

/// Entries of the compiler's operator stack.
#[derive(Debug, Clone, PartialEq)]
enum StackEntry {
    Operator(Operator),
    OpenParen,
    /// A function name seen just before a `(`; `argc` counts arguments from commas.
    PendingCall { name: HString, argc: usize },
}

struct ShuntingYard<'a> {
    tokens: &'a [Token],
    output: Vec<RpnItem>,
    stack: Vec<StackEntry>,
}

impl<'a> ShuntingYard<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        Self {
            tokens,
            output: Vec::with_capacity(tokens.len()),
            stack: Vec::new(),
        }
    }

    fn run(mut self) -> core::result::Result<Vec<RpnItem>, ParseError> {
        let tokens = self.tokens;
        for (i, token) in tokens.iter().enumerate() {
            let prev = i.checked_sub(1).map(|p| &tokens[p]);
            let next = tokens.get(i + 1);

            match token {
                Token::Number(value) => self.output.push(RpnItem::Literal(*value)),
                Token::Identifier(name) => {
                    if next == Some(&Token::LeftParen) {
                        self.stack.push(StackEntry::PendingCall {
                            name: name.clone(),
                            argc: 0,
                        });
                    } else {
                        self.output.push(RpnItem::Variable(name.clone()));
                    }
                }
                Token::Operator(symbol) => self.push_operator(*symbol, prev)?,
                Token::LeftParen => self.stack.push(StackEntry::OpenParen),
                Token::Comma => self.separate_argument()?,
                Token::RightParen => self.close_paren(prev)?,
            }
        }

        while let Some(entry) = self.stack.pop() {
            match entry {
                StackEntry::Operator(op) => self.output.push(op.to_item()),
                StackEntry::OpenParen | StackEntry::PendingCall { .. } => {
                    return Err(ParseError::MismatchedParens);
                }
            }
        }

        Ok(self.output)
    }

    /// A `-` is unary at the start of input or after an operator, `(` or `,`.
    fn push_operator(
        &mut self,
        symbol: char,
        prev: Option<&Token>,
    ) -> core::result::Result<(), ParseError> {
        let unary = symbol == '-'
            && matches!(
                prev,
                None | Some(Token::Operator(_)) | Some(Token::LeftParen) | Some(Token::Comma)
            );
        let incoming = Operator::from_symbol(symbol, unary)
            .ok_or(ParseError::UnsupportedOperator { symbol })?;

        while let Some(StackEntry::Operator(top)) = self.stack.last() {
            if !top.yields_to(incoming) {
                break;
            }
            self.output.push(top.to_item());
            self.stack.pop();
        }
        self.stack.push(StackEntry::Operator(incoming));
        Ok(())
    }

    /// Move operators to the output until an open paren is on top of the stack.
    fn pop_until_paren(&mut self) -> core::result::Result<(), ParseError> {
        loop {
            match self.stack.last() {
                Some(StackEntry::Operator(op)) => {
                    self.output.push(op.to_item());
                    self.stack.pop();
                }
                Some(StackEntry::OpenParen) => return Ok(()),
                Some(StackEntry::PendingCall { .. }) | None => {
                    return Err(ParseError::MismatchedParens);
                }
            }
        }
    }

    fn separate_argument(&mut self) -> core::result::Result<(), ParseError> {
        self.pop_until_paren()?;
        let below_paren = self.stack.len().checked_sub(2);
        if let Some(StackEntry::PendingCall { argc, .. }) =
            below_paren.and_then(|i| self.stack.get_mut(i))
        {
            *argc = (*argc).max(1) + 1;
        }
        Ok(())
    }

    fn close_paren(&mut self, prev: Option<&Token>) -> core::result::Result<(), ParseError> {
        self.pop_until_paren()?;
        self.stack.pop();

        match self.stack.pop() {
            Some(StackEntry::PendingCall { name, argc }) => {
                let argc = if prev == Some(&Token::LeftParen) {
                    0
                } else {
                    argc.max(1)
                };
                self.output.push(resolve_call(name, argc)?);
            }
            Some(entry) => self.stack.push(entry),
            None => {}
        }
        Ok(())
    }
}

/// Resolve a call against the builtin registry.
fn resolve_call(name: HString, argc: usize) -> core::result::Result<RpnItem, ParseError> {
    let function = Function::from_name(&name).ok_or_else(|| ParseError::UnknownFunction {
        name: name.clone(),
    })?;
    if function.arity() != argc {
        return Err(ParseError::ArityMismatch {
            name,
            expected: function.arity(),
            found: argc,
        });
    }
    Ok(RpnItem::Apply(function))
}

/// Simulate the operand stack depth over a program.
///
/// Fails with `StackUnderflow` if any item consumes more operands than have been
/// produced. Returns the final depth; a well-formed expression ends at 1.
pub(crate) fn stack_depth(items: &[RpnItem]) -> core::result::Result<usize, ParseError> {
    items.iter().try_fold(0usize, |depth, item| {
        let (consumed, produced) = item.stack_effect();
        depth
            .checked_sub(consumed)
            .map(|d| d + produced)
            .ok_or(ParseError::StackUnderflow)
    })
}

/// Convert a token list into an RPN program.
///
/// Function names and arities are resolved here, and operand underflow is rejected.
/// A program whose final depth is not 1 (such as the empty program) is accepted and
/// reported by the evaluator instead.
pub fn parse(tokens: &[Token]) -> core::result::Result<Vec<RpnItem>, ParseError> {
    let items = ShuntingYard::new(tokens).run()?;
    stack_depth(&items)?;
    Ok(items)
}

/// Compile expression text into a reusable [`CompiledExpression`].
///
/// # Examples
///
/// ```
/// use shader_expr::{compile, evaluate};
///
/// let expr = compile("2 + 3 * 4").unwrap();
/// assert_eq!(expr.to_string(), "2 3 4 * +");
/// assert_eq!(evaluate(&expr, &()).unwrap(), 14.0);
/// ```
pub fn compile(text: &str) -> Result<CompiledExpression> {
    let compiled: Result<Vec<RpnItem>> = tokenize(text)
        .map_err(Into::into)
        .and_then(|tokens| parse(&tokens).map_err(Into::into));

    match compiled {
        Ok(items) => {
            let expr = CompiledExpression::from_parsed(items);
            log::debug!("compiled {:?} into {} items", text, expr.len());
            log::trace!("program: {}", expr);
            Ok(expr)
        }
        Err(err) => {
            log::debug!("failed to compile {:?}: {}", text, err);
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CompileError, LexError};
    use crate::types::{BinaryOp, TryIntoHeaplessString, UnaryOp};
    use alloc::string::{String, ToString};

    fn rpn(text: &str) -> String {
        compile(text)
            .unwrap_or_else(|e| panic!("compile error for {:?}: {}", text, e))
            .to_string()
    }

    fn parse_err(text: &str) -> ParseError {
        match compile(text) {
            Err(CompileError::Parse(err)) => err,
            other => panic!("expected parse error for {:?}, got {:?}", text, other),
        }
    }

    #[test]
    fn test_precedence_and_associativity() {
        assert_eq!(rpn("2+3*4"), "2 3 4 * +");
        assert_eq!(rpn("(2+3)*4"), "2 3 + 4 *");
        assert_eq!(rpn("1-2-3"), "1 2 - 3 -");
        assert_eq!(rpn("8/4/2"), "8 4 / 2 /");
        assert_eq!(rpn("2^3^2"), "2 3 2 ^ ^");
        assert_eq!(rpn("1+2*3^4"), "1 2 3 4 ^ * +");
    }

    #[test]
    fn test_unary_minus_disambiguation() {
        assert_eq!(rpn("-x"), "x u-");
        assert_eq!(rpn("2--3"), "2 3 u- -");
        assert_eq!(rpn("2*-3"), "2 3 u- *");
        assert_eq!(rpn("(-1)"), "1 u-");
        assert_eq!(rpn("max(-1,-2)"), "1 u- 2 u- max/2");
        assert_eq!(rpn("--1"), "1 u- u-");
        // Binary after a closing paren or identifier
        assert_eq!(rpn("(1)-2"), "1 2 -");
        assert_eq!(rpn("x-1"), "x 1 -");
    }

    #[test]
    fn test_unary_minus_binds_tighter_than_power() {
        assert_eq!(rpn("-2^2"), "2 u- 2 ^");
        assert_eq!(rpn("2^-2"), "2 2 u- ^");
    }

    #[test]
    fn test_function_calls_and_arity_tracking() {
        assert_eq!(rpn("sin(x)"), "x sin/1");
        assert_eq!(rpn("max(1, 2)"), "1 2 max/2");
        assert_eq!(rpn("clamp(x, 0, 1)"), "x 0 1 clamp/3");
        assert_eq!(rpn("mix(a, b, sin(t * 2))"), "a b t 2 * sin/1 mix/3");
        assert_eq!(rpn("max(min(1,2),(3))"), "1 2 min/2 3 max/2");
        assert_eq!(rpn("sin(cos(x)) + 1"), "x cos/1 sin/1 1 +");
    }

    #[test]
    fn test_calls_resolved_to_builtin_slots() {
        let expr = compile("clamp(x, 0, 1)").unwrap();
        assert_eq!(
            expr.items().last(),
            Some(&RpnItem::Apply(crate::functions::Function::Clamp))
        );
        assert!(
            expr.items()
                .iter()
                .all(|item| !matches!(item, RpnItem::Call { .. }))
        );
    }

    #[test]
    fn test_emitted_items_are_typed() {
        let expr = compile("-a / 2").unwrap();
        assert_eq!(
            expr.items(),
            &[
                RpnItem::Variable("a".try_into_heapless().unwrap()),
                RpnItem::UnaryOp(UnaryOp::Negate),
                RpnItem::Literal(2.0),
                RpnItem::BinaryOp(BinaryOp::Divide),
            ]
        );
    }

    #[test]
    fn test_mismatched_parens() {
        assert_eq!(parse_err("(1+2"), ParseError::MismatchedParens);
        assert_eq!(parse_err("1+2)"), ParseError::MismatchedParens);
        assert_eq!(parse_err("1,2"), ParseError::MismatchedParens);
        assert_eq!(parse_err("sin("), ParseError::MismatchedParens);
        assert_eq!(parse_err(")("), ParseError::MismatchedParens);
    }

    #[test]
    fn test_unknown_function_and_arity_resolved_at_compile_time() {
        assert_eq!(
            parse_err("foo(1,2)"),
            ParseError::UnknownFunction {
                name: "foo".try_into_heapless().unwrap()
            }
        );
        assert_eq!(
            parse_err("sin(1, 2)"),
            ParseError::ArityMismatch {
                name: "sin".try_into_heapless().unwrap(),
                expected: 1,
                found: 2
            }
        );
        assert_eq!(
            parse_err("sin()"),
            ParseError::ArityMismatch {
                name: "sin".try_into_heapless().unwrap(),
                expected: 1,
                found: 0
            }
        );
    }

    #[test]
    fn test_missing_operands_underflow() {
        assert_eq!(parse_err("2*"), ParseError::StackUnderflow);
        assert_eq!(parse_err("*2"), ParseError::StackUnderflow);
        assert_eq!(parse_err("+1"), ParseError::StackUnderflow);
        assert_eq!(parse_err("-"), ParseError::StackUnderflow);
        assert_eq!(parse_err("max(,1)"), ParseError::StackUnderflow);
        assert_eq!(parse_err("max(1,)"), ParseError::StackUnderflow);
    }

    #[test]
    fn test_unsupported_operator_from_raw_tokens() {
        let tokens = [Token::Number(1.0), Token::Operator('%'), Token::Number(2.0)];
        assert_eq!(
            parse(&tokens),
            Err(ParseError::UnsupportedOperator { symbol: '%' })
        );
    }

    #[test]
    fn test_depth_mismatch_left_to_evaluator() {
        assert!(compile("").unwrap().is_empty());
        assert_eq!(rpn("1 2"), "1 2");
        assert_eq!(rpn("(1, 2)"), "1 2");
    }

    #[test]
    fn test_lex_errors_propagate() {
        assert_eq!(
            compile("1 $ 2"),
            Err(CompileError::Lex(LexError::UnexpectedCharacter {
                found: '$',
                position: 2
            }))
        );
    }
}
