//! Lexer for expression text.
//!
//! Produces numbers (`digits` or `digits.digits`), identifiers, the operator
//! characters `+ - * / ^`, parentheses and commas. Error positions are character
//! indices into the input.
//!
//! ```
//! use shader_expr::lexer::Lexer;
//! use shader_expr::types::Token;
//!
//! let tokens: Result<Vec<Token>, _> = Lexer::new("2 * x").collect();
//! assert_eq!(tokens.unwrap().len(), 3);
//! ```

use crate::error::LexError;
use crate::types::{HString, MAX_IDENT_LEN, Token};
use alloc::vec::Vec;

/// The lexer struct, which produces tokens from an input string.
#[derive(Clone)]
pub struct Lexer<'a> {
    input: &'a str,
    /// Byte offset into `input`.
    pos: usize,
    /// Character index of `pos`, used for error positions.
    char_pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            char_pos: 0,
        }
    }

    /// Peek at the current character.
    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    /// Advance the position by one character.
    fn advance(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
            self.char_pos += 1;
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_ascii_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn advance_while(&mut self, pred: impl Fn(char) -> bool) {
        while let Some(c) = self.peek() {
            if pred(c) {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Scan `digits ('.' digits)?`. A trailing dot is left for the next token.
    fn scan_number(&mut self, start: usize, start_char: usize) -> Result<Token, LexError> {
        self.advance_while(|c| c.is_ascii_digit());

        let mut rest = self.input[self.pos..].chars();
        if rest.next() == Some('.') && rest.next().is_some_and(|d| d.is_ascii_digit()) {
            self.advance();
            self.advance_while(|c| c.is_ascii_digit());
        }

        let text = &self.input[start..self.pos];
        text.parse::<f64>()
            .map(Token::Number)
            .map_err(|_| LexError::UnexpectedCharacter {
                found: text.chars().next().unwrap_or('0'),
                position: start_char,
            })
    }

    fn scan_identifier(&mut self, start: usize, start_char: usize) -> Result<Token, LexError> {
        self.advance_while(|c| c.is_ascii_alphanumeric() || c == '_');

        let text = &self.input[start..self.pos];
        if text.len() > MAX_IDENT_LEN {
            return Err(LexError::IdentifierTooLong {
                position: start_char,
            });
        }
        let mut ident = HString::new();
        ident
            .push_str(text)
            .map_err(|_| LexError::IdentifierTooLong {
                position: start_char,
            })?;
        Ok(Token::Identifier(ident))
    }

    /// Get the next token from the input, or `None` at end of input.
    pub fn next_token(&mut self) -> Result<Option<Token>, LexError> {
        self.skip_whitespace();
        let start = self.pos;
        let start_char = self.char_pos;
        let Some(c) = self.peek() else {
            return Ok(None);
        };

        if c.is_ascii_digit() {
            return self.scan_number(start, start_char).map(Some);
        }
        if c.is_ascii_alphabetic() || c == '_' {
            return self.scan_identifier(start, start_char).map(Some);
        }

        let token = match c {
            '(' => Token::LeftParen,
            ')' => Token::RightParen,
            ',' => Token::Comma,
            '+' | '-' | '*' | '/' | '^' => Token::Operator(c),
            _ => {
                return Err(LexError::UnexpectedCharacter {
                    found: c,
                    position: start_char,
                });
            }
        };
        self.advance();
        Ok(Some(token))
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token().transpose()
    }
}

/// Convert raw text into a flat token list.
///
/// # Examples
///
/// ```
/// use shader_expr::lexer::tokenize;
/// use shader_expr::types::Token;
///
/// let tokens = tokenize("2 * x").unwrap();
/// assert_eq!(tokens[0], Token::Number(2.0));
/// assert_eq!(tokens[1], Token::Operator('*'));
/// ```
pub fn tokenize(text: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(text).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TryIntoHeaplessString;

    fn ident(s: &str) -> Token {
        Token::Identifier(s.try_into_heapless().unwrap())
    }

    #[test]
    fn test_lexer_tokenization_all_types() {
        let tokens = tokenize("1 + foo_bar * (2.5) , -baz_123 / 4.2 ^ _x").unwrap();
        assert_eq!(
            tokens,
            alloc::vec![
                Token::Number(1.0),
                Token::Operator('+'),
                ident("foo_bar"),
                Token::Operator('*'),
                Token::LeftParen,
                Token::Number(2.5),
                Token::RightParen,
                Token::Comma,
                Token::Operator('-'),
                ident("baz_123"),
                Token::Operator('/'),
                Token::Number(4.2),
                Token::Operator('^'),
                ident("_x"),
            ]
        );
    }

    #[test]
    fn test_lexer_unexpected_character_position() {
        assert_eq!(
            tokenize("1 $ 2"),
            Err(LexError::UnexpectedCharacter {
                found: '$',
                position: 2
            })
        );
        // Positions count characters, not bytes.
        assert_eq!(
            tokenize("π + é"),
            Err(LexError::UnexpectedCharacter {
                found: 'π',
                position: 0
            })
        );
        assert_eq!(
            tokenize("x+é"),
            Err(LexError::UnexpectedCharacter {
                found: 'é',
                position: 2
            })
        );
    }

    #[test]
    fn test_lexer_no_exponent_or_leading_dot() {
        // `1e3` is the number 1 followed by the identifier `e3`.
        assert_eq!(
            tokenize("1e3").unwrap(),
            alloc::vec![Token::Number(1.0), ident("e3")]
        );
        assert_eq!(
            tokenize(".5"),
            Err(LexError::UnexpectedCharacter {
                found: '.',
                position: 0
            })
        );
        // A dot not followed by a digit is not part of the number.
        assert_eq!(
            tokenize("3."),
            Err(LexError::UnexpectedCharacter {
                found: '.',
                position: 1
            })
        );
        assert_eq!(
            tokenize("1.2.3"),
            Err(LexError::UnexpectedCharacter {
                found: '.',
                position: 3
            })
        );
    }

    #[test]
    fn test_lexer_whitespace_and_empty() {
        assert!(tokenize("").unwrap().is_empty());
        assert!(tokenize(" \t\r\n ").unwrap().is_empty());
        assert_eq!(
            tokenize("\tsin( x )\n").unwrap(),
            alloc::vec![
                ident("sin"),
                Token::LeftParen,
                ident("x"),
                Token::RightParen
            ]
        );
    }

    #[test]
    fn test_lexer_identifier_too_long() {
        let long = "a".repeat(MAX_IDENT_LEN + 1);
        let text = alloc::format!("1 + {}", long);
        assert_eq!(
            tokenize(&text),
            Err(LexError::IdentifierTooLong { position: 4 })
        );
        let ok = "b".repeat(MAX_IDENT_LEN);
        assert_eq!(tokenize(&ok).unwrap().len(), 1);
    }
}
