use std::fmt;

use regex::Regex;

use super::functions::Function;
use crate::value::Value;

/// Binary operators, including the short-circuiting logical ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Remainder,
    Power,
    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    And,
    Or,
    Coalesce,
}

impl BinaryOp {
    pub(crate) fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Remainder => "%",
            BinaryOp::Power => "**",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::GreaterThan => ">",
            BinaryOp::GreaterThanOrEqual => ">=",
            BinaryOp::LessThan => "<",
            BinaryOp::LessThanOrEqual => "<=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::Coalesce => "??",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UnaryOp {
    Negate,
    Not,
}

/// Right-hand side of `=~` / `!~`.
#[derive(Debug, Clone)]
pub(crate) enum Pattern {
    /// A literal pattern, compiled with the expression.
    Compiled(Regex),
    /// A pattern computed at evaluation time.
    Dynamic(Box<Node>),
}

/// Parsed expression tree.
#[derive(Clone)]
pub(crate) enum Node {
    Literal(Value),
    Variable(String),
    Unary {
        op: UnaryOp,
        operand: Box<Node>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Node>,
        rhs: Box<Node>,
    },
    Match {
        negated: bool,
        lhs: Box<Node>,
        pattern: Pattern,
    },
    Ternary {
        condition: Box<Node>,
        then: Box<Node>,
        otherwise: Box<Node>,
    },
    Call {
        function: &'static dyn Function,
        args: Vec<Node>,
    },
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            Node::Variable(name) => f.debug_tuple("Variable").field(name).finish(),
            Node::Unary { op, operand } => f
                .debug_struct("Unary")
                .field("op", op)
                .field("operand", operand)
                .finish(),
            Node::Binary { op, lhs, rhs } => f
                .debug_struct("Binary")
                .field("op", op)
                .field("lhs", lhs)
                .field("rhs", rhs)
                .finish(),
            Node::Match {
                negated,
                lhs,
                pattern,
            } => f
                .debug_struct("Match")
                .field("negated", negated)
                .field("lhs", lhs)
                .field("pattern", pattern)
                .finish(),
            Node::Ternary {
                condition,
                then,
                otherwise,
            } => f
                .debug_struct("Ternary")
                .field("condition", condition)
                .field("then", then)
                .field("otherwise", otherwise)
                .finish(),
            Node::Call { function, args } => f
                .debug_struct("Call")
                .field("function", &function.name())
                .field("args", args)
                .finish(),
        }
    }
}
