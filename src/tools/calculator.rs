//! Sandboxed arithmetic for the `calculate` tool.
//!
//! Input is first checked against the allowed alphabet `[0-9+\-*/().\s]`.
//! An expression that contains anything else is refused outright, never
//! truncated and evaluated. Accepted input is evaluated by a small
//! recursive-descent parser; no general-purpose evaluator is involved.

use thiserror::Error;

const MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalcError {
    #[error("Expression contains invalid characters")]
    InvalidCharacters,
    #[error("Expression is empty")]
    Empty,
    #[error("Unexpected character '{ch}' at position {pos}")]
    UnexpectedChar { ch: char, pos: usize },
    #[error("Unexpected end of expression")]
    UnexpectedEnd,
    #[error("Invalid number '{0}'")]
    InvalidNumber(String),
    #[error("Division by zero")]
    DivisionByZero,
    #[error("Expression nested too deeply")]
    TooDeep,
    #[error("Result is not a finite number")]
    NonFinite,
}

fn is_allowed(c: char) -> bool {
    c.is_ascii_digit() || matches!(c, '+' | '-' | '*' | '/' | '(' | ')' | '.') || c.is_whitespace()
}

/// Drop every character outside the allowed alphabet.
pub fn sanitize(expression: &str) -> String {
    expression.chars().filter(|&c| is_allowed(c)).collect()
}

/// True when sanitizing would not change the expression.
pub fn is_safe_expression(expression: &str) -> bool {
    expression.chars().all(is_allowed)
}

/// Evaluate an arithmetic expression over `+ - * / ( )` and decimal literals.
pub fn evaluate(expression: &str) -> Result<f64, CalcError> {
    if sanitize(expression) != expression {
        return Err(CalcError::InvalidCharacters);
    }
    if expression.trim().is_empty() {
        return Err(CalcError::Empty);
    }

    let mut parser = Parser {
        chars: expression.chars().collect(),
        pos: 0,
        depth: 0,
    };
    let value = parser.expr()?;
    parser.skip_ws();
    if let Some(ch) = parser.peek() {
        return Err(CalcError::UnexpectedChar {
            ch,
            pos: parser.pos,
        });
    }
    if value.is_finite() {
        Ok(value)
    } else {
        Err(CalcError::NonFinite)
    }
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    // expr := term (('+' | '-') term)*
    fn expr(&mut self) -> Result<f64, CalcError> {
        let mut acc = self.term()?;
        loop {
            self.skip_ws();
            match self.peek() {
                Some('+') => {
                    self.pos += 1;
                    acc += self.term()?;
                }
                Some('-') => {
                    self.pos += 1;
                    acc -= self.term()?;
                }
                _ => return Ok(acc),
            }
        }
    }

    // term := factor (('*' | '/') factor)*
    fn term(&mut self) -> Result<f64, CalcError> {
        let mut acc = self.factor()?;
        loop {
            self.skip_ws();
            match self.peek() {
                Some('*') => {
                    self.pos += 1;
                    acc *= self.factor()?;
                }
                Some('/') => {
                    self.pos += 1;
                    let rhs = self.factor()?;
                    if rhs == 0.0 {
                        return Err(CalcError::DivisionByZero);
                    }
                    acc /= rhs;
                }
                _ => return Ok(acc),
            }
        }
    }

    // factor := ('+' | '-') factor | primary
    fn factor(&mut self) -> Result<f64, CalcError> {
        self.skip_ws();
        match self.peek() {
            Some('+') => {
                self.pos += 1;
                self.nested(Self::factor)
            }
            Some('-') => {
                self.pos += 1;
                self.nested(Self::factor).map(|v| -v)
            }
            _ => self.primary(),
        }
    }

    // primary := number | '(' expr ')'
    fn primary(&mut self) -> Result<f64, CalcError> {
        self.skip_ws();
        match self.peek() {
            None => Err(CalcError::UnexpectedEnd),
            Some('(') => {
                self.pos += 1;
                let value = self.nested(Self::expr)?;
                self.skip_ws();
                match self.peek() {
                    Some(')') => {
                        self.pos += 1;
                        Ok(value)
                    }
                    Some(ch) => Err(CalcError::UnexpectedChar { ch, pos: self.pos }),
                    None => Err(CalcError::UnexpectedEnd),
                }
            }
            Some(c) if c.is_ascii_digit() || c == '.' => self.number(),
            Some(ch) => Err(CalcError::UnexpectedChar { ch, pos: self.pos }),
        }
    }

    fn number(&mut self) -> Result<f64, CalcError> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_digit() || c == '.')
        {
            self.pos += 1;
        }
        let literal: String = self.chars[start..self.pos].iter().collect();
        literal
            .parse::<f64>()
            .map_err(|_| CalcError::InvalidNumber(literal))
    }

    fn nested(
        &mut self,
        f: fn(&mut Self) -> Result<f64, CalcError>,
    ) -> Result<f64, CalcError> {
        if self.depth >= MAX_DEPTH {
            return Err(CalcError::TooDeep);
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }
}
