//! Precedence-climbing parser for the expression language.

use std::{fmt, iter::Peekable, ops::Add, vec::IntoIter};

use regex::Regex;

use super::{
    ast::{BinaryOp, Node, Pattern, UnaryOp},
    error::ParseError,
    functions,
    lexer::{Lexer, Spanned, Token},
};
use crate::value::Value;

/// Operator precedence.
type Precedence = u8;

enum Associativity {
    Left,
    Right,
}

impl Add<Associativity> for Precedence {
    type Output = Self;

    fn add(self, rhs: Associativity) -> Self {
        // Left-associative operators bind tighter to their left-hand side.
        self + match rhs {
            Associativity::Left => 1,
            Associativity::Right => 0,
        }
    }
}

const TERNARY: Precedence = 1;
const PREFIX: Precedence = 10;

enum Infix {
    Binary(BinaryOp),
    Match { negated: bool },
}

impl Infix {
    fn precedence(&self) -> Precedence {
        match self {
            Infix::Binary(BinaryOp::Coalesce) => 2,
            Infix::Binary(BinaryOp::Or) => 3,
            Infix::Binary(BinaryOp::And) => 4,
            Infix::Binary(BinaryOp::Equal | BinaryOp::NotEqual) | Infix::Match { .. } => 5,
            Infix::Binary(
                BinaryOp::GreaterThan
                | BinaryOp::GreaterThanOrEqual
                | BinaryOp::LessThan
                | BinaryOp::LessThanOrEqual,
            ) => 6,
            Infix::Binary(BinaryOp::Add | BinaryOp::Subtract) => 7,
            Infix::Binary(BinaryOp::Multiply | BinaryOp::Divide | BinaryOp::Remainder) => 8,
            Infix::Binary(BinaryOp::Power) => 9,
        }
    }

    fn associativity(&self) -> Associativity {
        match self {
            Infix::Binary(BinaryOp::Power) => Associativity::Right,
            _ => Associativity::Left,
        }
    }

    fn from_token(token: &Token) -> Option<Self> {
        let op = match token {
            Token::Plus => BinaryOp::Add,
            Token::Minus => BinaryOp::Subtract,
            Token::Asterisk => BinaryOp::Multiply,
            Token::Slash => BinaryOp::Divide,
            Token::Percent => BinaryOp::Remainder,
            Token::Power => BinaryOp::Power,
            Token::Equal => BinaryOp::Equal,
            Token::NotEqual => BinaryOp::NotEqual,
            Token::GreaterThan => BinaryOp::GreaterThan,
            Token::GreaterThanOrEqual => BinaryOp::GreaterThanOrEqual,
            Token::LessThan => BinaryOp::LessThan,
            Token::LessThanOrEqual => BinaryOp::LessThanOrEqual,
            Token::And => BinaryOp::And,
            Token::Or => BinaryOp::Or,
            Token::Coalesce => BinaryOp::Coalesce,
            Token::RegexMatch => return Some(Infix::Match { negated: false }),
            Token::RegexNotMatch => return Some(Infix::Match { negated: true }),
            _ => return None,
        };
        Some(Infix::Binary(op))
    }

    fn into_node(self, lhs: Node, rhs: Node) -> Result<Node, ParseError> {
        let lhs = Box::new(lhs);
        Ok(match self {
            Infix::Binary(op) => Node::Binary {
                op,
                lhs,
                rhs: Box::new(rhs),
            },
            Infix::Match { negated } => {
                let pattern = match rhs {
                    Node::Literal(Value::String(pattern)) => {
                        Pattern::Compiled(Regex::new(&pattern).map_err(|err| {
                            ParseError::InvalidRegex {
                                pattern: pattern.clone(),
                                message: err.to_string(),
                            }
                        })?)
                    }
                    other => Pattern::Dynamic(Box::new(other)),
                };
                Node::Match {
                    negated,
                    lhs,
                    pattern,
                }
            }
        })
    }
}

/// Deepest expression tree the parser builds, counting parentheses.
pub(crate) const MAX_DEPTH: usize = 256;

/// A parsed subtree and its height.
type Parsed = (Node, usize);

pub(crate) struct Parser {
    tokens: Peekable<IntoIter<Spanned>>,
    end: usize,
    depth: usize,
}

impl Parser {
    /// Parse `source` into an expression tree.
    pub(crate) fn parse(source: &str) -> Result<Node, ParseError> {
        let tokens = Lexer::new(source).tokenize()?;
        if tokens.is_empty() {
            return Err(ParseError::Empty);
        }
        let mut parser = Parser {
            tokens: tokens.into_iter().peekable(),
            end: source.len(),
            depth: 0,
        };
        let (node, _) = parser.parse_expression_at(0)?;
        match parser.tokens.next() {
            Some((position, token)) => Err(ParseError::UnexpectedToken {
                position,
                found: token.to_string(),
            }),
            None => Ok(node),
        }
    }

    fn next(&mut self) -> Result<Spanned, ParseError> {
        self.tokens.next().ok_or(ParseError::UnexpectedEnd)
    }

    fn next_is(&mut self, token: &Token) -> bool {
        self.tokens.next_if(|(_, t)| t == token).is_some()
    }

    fn expect(&mut self, token: Token) -> Result<(), ParseError> {
        let (position, found) = self.next()?;
        if found == token {
            Ok(())
        } else {
            Err(ParseError::UnexpectedToken {
                position,
                found: found.to_string(),
            })
        }
    }

    fn position(&mut self) -> usize {
        self.tokens.peek().map_or(self.end, |(position, _)| *position)
    }

    /// Fails once `height` exceeds [`MAX_DEPTH`].
    fn check_depth(&mut self, height: usize) -> Result<usize, ParseError> {
        if height > MAX_DEPTH {
            return Err(ParseError::TooDeep {
                position: self.position(),
                limit: MAX_DEPTH,
            });
        }
        Ok(height)
    }

    /// Parses an expression whose operators all bind at least as tightly as
    /// `min_precedence`.
    fn parse_expression_at(&mut self, min_precedence: Precedence) -> Result<Parsed, ParseError> {
        self.depth += 1;
        self.check_depth(self.depth)?;
        let parsed = self.parse_operators(min_precedence);
        self.depth -= 1;
        parsed
    }

    fn parse_operators(&mut self, min_precedence: Precedence) -> Result<Parsed, ParseError> {
        let (mut lhs, mut height) = match self.parse_prefix_operator() {
            Some(op) => {
                let (operand, height) = self.parse_expression_at(PREFIX + Associativity::Right)?;
                let node = Node::Unary {
                    op,
                    operand: Box::new(operand),
                };
                (node, self.check_depth(height + 1)?)
            }
            None => self.parse_atom()?,
        };

        loop {
            if let Some(infix) = self.parse_infix_operator_at(min_precedence) {
                let next_precedence = infix.precedence() + infix.associativity();
                let (rhs, rhs_height) = self.parse_expression_at(next_precedence)?;
                height = self.check_depth(height.max(rhs_height) + 1)?;
                lhs = infix.into_node(lhs, rhs)?;
            } else if TERNARY >= min_precedence && self.next_is(&Token::Question) {
                let (then, then_height) = self.parse_expression_at(0)?;
                self.expect(Token::Colon)?;
                let (otherwise, otherwise_height) =
                    self.parse_expression_at(TERNARY + Associativity::Right)?;
                height = self.check_depth(height.max(then_height).max(otherwise_height) + 1)?;
                lhs = Node::Ternary {
                    condition: Box::new(lhs),
                    then: Box::new(then),
                    otherwise: Box::new(otherwise),
                };
            } else {
                return Ok((lhs, height));
            }
        }
    }

    fn parse_prefix_operator(&mut self) -> Option<UnaryOp> {
        let (_, token) = self
            .tokens
            .next_if(|(_, t)| matches!(t, Token::Minus | Token::Not))?;
        match token {
            Token::Minus => Some(UnaryOp::Negate),
            _ => Some(UnaryOp::Not),
        }
    }

    fn parse_infix_operator_at(&mut self, min_precedence: Precedence) -> Option<Infix> {
        let infix = Infix::from_token(&self.tokens.peek()?.1)?;
        if infix.precedence() < min_precedence {
            return None;
        }
        self.tokens.next();
        Some(infix)
    }

    fn parse_atom(&mut self) -> Result<Parsed, ParseError> {
        let (position, token) = self.next()?;
        Ok(match token {
            Token::Number(n) => (Node::Literal(Value::Float(n)), 1),
            Token::String(s) => (Node::Literal(Value::String(s)), 1),
            Token::Quoted(name) => (Node::Variable(name), 1),
            Token::Ident(name) if self.next_is(&Token::OpenParen) => {
                let function = functions::lookup(&name)
                    .ok_or_else(|| ParseError::UnknownFunction(name.clone()))?;
                let (args, height) = self.parse_arguments()?;
                (Node::Call { function, args }, self.check_depth(height + 1)?)
            }
            Token::Ident(name) => match name.as_str() {
                "true" => (Node::Literal(Value::Bool(true)), 1),
                "false" => (Node::Literal(Value::Bool(false)), 1),
                _ => (Node::Variable(name), 1),
            },
            Token::OpenParen => {
                let inner = self.parse_expression_at(0)?;
                self.expect(Token::CloseParen)?;
                inner
            }
            other => {
                return Err(ParseError::UnexpectedToken {
                    position,
                    found: other.to_string(),
                })
            }
        })
    }

    /// Parses call arguments and their tallest height; the opening
    /// parenthesis is already consumed.
    fn parse_arguments(&mut self) -> Result<(Vec<Node>, usize), ParseError> {
        let mut args = Vec::new();
        let mut height = 0;
        if self.next_is(&Token::CloseParen) {
            return Ok((args, height));
        }
        loop {
            let (arg, arg_height) = self.parse_expression_at(0)?;
            args.push(arg);
            height = height.max(arg_height);
            let (position, token) = self.next()?;
            match token {
                Token::Comma => continue,
                Token::CloseParen => return Ok((args, height)),
                other => {
                    return Err(ParseError::UnexpectedToken {
                        position,
                        found: other.to_string(),
                    })
                }
            }
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "number {n}"),
            Token::String(s) => write!(f, "string '{s}'"),
            Token::Ident(name) => write!(f, "identifier '{name}'"),
            Token::Quoted(name) => write!(f, "field '[{name}]'"),
            Token::Plus => f.write_str("'+'"),
            Token::Minus => f.write_str("'-'"),
            Token::Asterisk => f.write_str("'*'"),
            Token::Slash => f.write_str("'/'"),
            Token::Percent => f.write_str("'%'"),
            Token::Power => f.write_str("'**'"),
            Token::Equal => f.write_str("'=='"),
            Token::NotEqual => f.write_str("'!='"),
            Token::GreaterThan => f.write_str("'>'"),
            Token::GreaterThanOrEqual => f.write_str("'>='"),
            Token::LessThan => f.write_str("'<'"),
            Token::LessThanOrEqual => f.write_str("'<='"),
            Token::RegexMatch => f.write_str("'=~'"),
            Token::RegexNotMatch => f.write_str("'!~'"),
            Token::And => f.write_str("'&&'"),
            Token::Or => f.write_str("'||'"),
            Token::Not => f.write_str("'!'"),
            Token::Coalesce => f.write_str("'??'"),
            Token::Question => f.write_str("'?'"),
            Token::Colon => f.write_str("':'"),
            Token::Comma => f.write_str("','"),
            Token::OpenParen => f.write_str("'('"),
            Token::CloseParen => f.write_str("')'"),
        }
    }
}
