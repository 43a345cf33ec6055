//! Logical functions over the variables of a manager.
//!
//! Grammar, from the loosest to the tightest binding:
//!
//! ```text
//! expr    := expr '|' expr | expr '&' expr | '!' expr | '(' expr ')' | operand
//! operand := identifier [ ':' value ]
//! ```
//!
//! `|` and `&` are left-associative. An operand is true when its variable takes the given
//! value (`1` if omitted).
//!
//! ```
//! use mdd_rs::manager::MddManager;
//! use mdd_rs::parser::parse;
//!
//! let ddm = MddManager::builder()
//!     .variables(["a", "b"], 2)
//!     .variable("level", 3)
//!     .build()
//!     .unwrap();
//! let expr = parse(&ddm, "a & !b | level:2").unwrap();
//! let f = expr.build(&ddm).unwrap();
//! assert_eq!(ddm.node_count(), 3);
//! ddm.release(f);
//! ```

use std::iter::Peekable;
use std::str::CharIndices;

use log::debug;

use crate::error::{MddError, Result};
use crate::manager::MddManager;
use crate::operator::MddOperator;
use crate::ops::{And, Or};
use crate::reference::NodeId;
use crate::types::Var;

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Expr {
    Operand { var: Var, value: usize },
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
}

impl Expr {
    pub fn operand(var: Var, value: usize) -> Self {
        Expr::Operand { var, value }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(inner: Self) -> Self {
        Expr::Not(Box::new(inner))
    }

    pub fn and(lhs: Self, rhs: Self) -> Self {
        Expr::And(Box::new(lhs), Box::new(rhs))
    }

    pub fn or(lhs: Self, rhs: Self) -> Self {
        Expr::Or(Box::new(lhs), Box::new(rhs))
    }

    /// Build the diagram of this function, with leaf `1` for true.
    pub fn build(&self, ddm: &MddManager) -> Result<NodeId> {
        match self {
            Expr::Operand { var, value } => ddm.simple_node(*var, ddm.leaf(0), ddm.leaf(1), *value, *value),
            Expr::Not(inner) => {
                let node = inner.build(ddm)?;
                let res = ddm.not(node);
                ddm.release(node);
                Ok(res)
            }
            Expr::And(lhs, rhs) => build_binary(ddm, &And, lhs, rhs),
            Expr::Or(lhs, rhs) => build_binary(ddm, &Or, lhs, rhs),
        }
    }
}

fn build_binary(ddm: &MddManager, op: &dyn MddOperator, lhs: &Expr, rhs: &Expr) -> Result<NodeId> {
    let left = lhs.build(ddm)?;
    let right = match rhs.build(ddm) {
        Ok(right) => right,
        Err(e) => {
            ddm.release(left);
            return Err(e);
        }
    };
    let res = op.combine(ddm, left, right);
    ddm.release(left);
    ddm.release(right);
    Ok(res)
}

#[derive(Debug, Clone, Eq, PartialEq)]
enum Token {
    Operand(String, Option<usize>),
    Not,
    And,
    Or,
    Open,
    Close,
}

fn parse_error(position: usize, message: impl Into<String>) -> MddError {
    MddError::Parse {
        position,
        message: message.into(),
    }
}

struct Tokenizer<'a> {
    text: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> Tokenizer<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            chars: text.char_indices().peekable(),
        }
    }

    /// Consume characters while `accept` holds, returning the end offset.
    fn take_while(&mut self, start: usize, accept: impl Fn(char) -> bool) -> usize {
        let mut end = start;
        while let Some(&(i, c)) = self.chars.peek() {
            if !accept(c) {
                break;
            }
            end = i + c.len_utf8();
            self.chars.next();
        }
        end
    }

    fn operand(&mut self, start: usize) -> Result<Token> {
        let end = self.take_while(start + 1, |c| c.is_ascii_alphanumeric() || c == '_');
        let name = self.text[start..end].to_string();
        let value = match self.chars.peek() {
            Some(&(colon, ':')) => {
                self.chars.next();
                let digits_end = self.take_while(colon + 1, |c| c.is_ascii_digit());
                let digits = &self.text[colon + 1..digits_end];
                let value = digits
                    .parse()
                    .map_err(|_| parse_error(colon + 1, format!("expected a value after '{}:'", name)))?;
                Some(value)
            }
            _ => None,
        };
        Ok(Token::Operand(name, value))
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Result<(usize, Token)>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (i, c) = self.chars.next()?;
            let token = match c {
                c if c.is_whitespace() => continue,
                '!' => Token::Not,
                '&' => Token::And,
                '|' => Token::Or,
                '(' => Token::Open,
                ')' => Token::Close,
                c if c.is_ascii_alphabetic() || c == '_' => match self.operand(i) {
                    Ok(token) => token,
                    Err(e) => return Some(Err(e)),
                },
                c => return Some(Err(parse_error(i, format!("unexpected character '{}'", c)))),
            };
            return Some(Ok((i, token)));
        }
    }
}

/// Pending operators of the shunting-yard.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Op {
    Not,
    And,
    Or,
    Open,
}

impl Op {
    fn precedence(self) -> u8 {
        match self {
            Op::Open => 0,
            Op::Or => 1,
            Op::And => 2,
            Op::Not => 3,
        }
    }
}

fn reduce(output: &mut Vec<Expr>, op: Op) {
    // Operand counts are checked while reading tokens.
    let rhs = output.pop().unwrap_or_else(|| unreachable!("missing operand for {:?}", op));
    let expr = match op {
        Op::Not => Expr::not(rhs),
        Op::And | Op::Or => {
            let lhs = output.pop().unwrap_or_else(|| unreachable!("missing operand for {:?}", op));
            if op == Op::And {
                Expr::and(lhs, rhs)
            } else {
                Expr::or(lhs, rhs)
            }
        }
        Op::Open => unreachable!("parenthesis is not an operator"),
    };
    output.push(expr);
}

/// Parse `text` into a function over the variables of `ddm`.
pub fn parse(ddm: &MddManager, text: &str) -> Result<Expr> {
    debug!("parse(text = {:?})", text);
    let mut output: Vec<Expr> = Vec::new();
    let mut ops: Vec<(usize, Op)> = Vec::new();
    let mut expect_operand = true;

    for token in Tokenizer::new(text) {
        let (position, token) = token?;
        match token {
            Token::Operand(name, value) => {
                if !expect_operand {
                    return Err(parse_error(position, format!("expected an operator before '{}'", name)));
                }
                let var = ddm.var_by_key(&name)?;
                let value = value.unwrap_or(1);
                let nbval = ddm.nbval(var);
                if value >= nbval {
                    return Err(MddError::InvalidRange {
                        start: value,
                        end: value,
                        nbval,
                    });
                }
                output.push(Expr::operand(var, value));
                expect_operand = false;
            }
            Token::Not | Token::Open => {
                if !expect_operand {
                    return Err(parse_error(position, "expected an operator"));
                }
                ops.push((position, if token == Token::Not { Op::Not } else { Op::Open }));
            }
            Token::And | Token::Or => {
                if expect_operand {
                    return Err(parse_error(position, "expected an operand"));
                }
                let op = if token == Token::And { Op::And } else { Op::Or };
                while let Some(&(_, top)) = ops.last() {
                    if top.precedence() < op.precedence() {
                        break;
                    }
                    ops.pop();
                    reduce(&mut output, top);
                }
                ops.push((position, op));
                expect_operand = true;
            }
            Token::Close => {
                if expect_operand {
                    return Err(parse_error(position, "expected an operand"));
                }
                loop {
                    match ops.pop() {
                        Some((_, Op::Open)) => break,
                        Some((_, op)) => reduce(&mut output, op),
                        None => return Err(parse_error(position, "unbalanced ')'")),
                    }
                }
            }
        }
    }

    if expect_operand {
        return Err(parse_error(text.len(), "unexpected end of input"));
    }
    while let Some((position, op)) = ops.pop() {
        if op == Op::Open {
            return Err(parse_error(position, "unclosed '('"));
        }
        reduce(&mut output, op);
    }
    debug_assert_eq!(output.len(), 1);
    output.pop().ok_or_else(|| parse_error(0, "empty expression"))
}
