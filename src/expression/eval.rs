use std::cmp::Ordering;

use regex::Regex;

use super::{
    ast::{BinaryOp, Node, Pattern, UnaryOp},
    binding::{Bindings, Operand},
    error::EvalError,
};
use crate::value::Value;

/// Evaluate `node` against `bindings`.
pub(crate) fn evaluate<'a>(node: &Node, bindings: &Bindings<'a>) -> Result<Operand<'a>, EvalError> {
    match node {
        Node::Literal(value) => Ok(Operand::Value(value.clone())),
        Node::Variable(name) => bindings
            .get(name)
            .cloned()
            .ok_or_else(|| EvalError::UnknownParameter(name.clone())),
        Node::Unary { op, operand } => {
            let value = evaluate(operand, bindings)?.into_value()?;
            apply_unary(*op, value).map(Operand::Value)
        }
        Node::Binary { op, lhs, rhs } => match op {
            BinaryOp::And | BinaryOp::Or => {
                let lhs = evaluate(lhs, bindings)?.into_value()?;
                let Value::Bool(lhs) = lhs else {
                    return Err(EvalError::UnaryOperand {
                        op: op.symbol(),
                        operand: lhs.type_name(),
                    });
                };
                // Short-circuit: `false && x` and `true || x` never look at x.
                if lhs == (*op == BinaryOp::Or) {
                    return Ok(Operand::Value(Value::Bool(lhs)));
                }
                match evaluate(rhs, bindings)?.into_value()? {
                    Value::Bool(rhs) => Ok(Operand::Value(Value::Bool(rhs))),
                    other => Err(EvalError::BinaryOperand {
                        op: op.symbol(),
                        lhs: "bool",
                        rhs: other.type_name(),
                    }),
                }
            }
            BinaryOp::Coalesce => match evaluate(lhs, bindings)? {
                Operand::Value(Value::Null) => evaluate(rhs, bindings),
                other => Ok(other),
            },
            _ => {
                let lhs = evaluate(lhs, bindings)?.into_value()?;
                let rhs = evaluate(rhs, bindings)?.into_value()?;
                apply_binary(*op, lhs, rhs).map(Operand::Value)
            }
        },
        Node::Match {
            negated,
            lhs,
            pattern,
        } => {
            let subject = evaluate(lhs, bindings)?.into_value()?;
            let matched = match pattern {
                Pattern::Compiled(regex) => regex_match(regex, &subject, *negated)?,
                Pattern::Dynamic(node) => {
                    let regex = match evaluate(node, bindings)?.into_value()? {
                        Value::String(pattern) => {
                            Regex::new(&pattern).map_err(|err| EvalError::InvalidRegex {
                                pattern: pattern.clone(),
                                message: err.to_string(),
                            })?
                        }
                        other => {
                            return Err(EvalError::BinaryOperand {
                                op: match_symbol(*negated),
                                lhs: subject.type_name(),
                                rhs: other.type_name(),
                            })
                        }
                    };
                    regex_match(&regex, &subject, *negated)?
                }
            };
            Ok(Operand::Value(Value::Bool(matched)))
        }
        Node::Ternary {
            condition,
            then,
            otherwise,
        } => match evaluate(condition, bindings)?.into_value()? {
            Value::Bool(true) => evaluate(then, bindings),
            Value::Bool(false) => evaluate(otherwise, bindings),
            other => Err(EvalError::TernaryCondition(other.type_name())),
        },
        Node::Call { function, args } => {
            let args = args
                .iter()
                .map(|arg| evaluate(arg, bindings))
                .collect::<Result<Vec<_>, _>>()?;
            function.call(&args).map(Operand::Value)
        }
    }
}

fn match_symbol(negated: bool) -> &'static str {
    if negated {
        "!~"
    } else {
        "=~"
    }
}

fn regex_match(regex: &Regex, subject: &Value, negated: bool) -> Result<bool, EvalError> {
    match subject {
        Value::String(s) => Ok(regex.is_match(s) != negated),
        other => Err(EvalError::BinaryOperand {
            op: match_symbol(negated),
            lhs: other.type_name(),
            rhs: "string",
        }),
    }
}

fn apply_unary(op: UnaryOp, value: Value) -> Result<Value, EvalError> {
    match (op, value) {
        (UnaryOp::Negate, Value::Float(v)) => Ok(Value::Float(-v)),
        (UnaryOp::Not, Value::Bool(v)) => Ok(Value::Bool(!v)),
        (op, other) => Err(EvalError::UnaryOperand {
            op: match op {
                UnaryOp::Negate => "-",
                UnaryOp::Not => "!",
            },
            operand: other.type_name(),
        }),
    }
}

fn apply_binary(op: BinaryOp, lhs: Value, rhs: Value) -> Result<Value, EvalError> {
    let mismatch = |lhs: &Value, rhs: &Value| EvalError::BinaryOperand {
        op: op.symbol(),
        lhs: lhs.type_name(),
        rhs: rhs.type_name(),
    };
    match op {
        BinaryOp::Equal => Ok(Value::Bool(lhs == rhs)),
        BinaryOp::NotEqual => Ok(Value::Bool(lhs != rhs)),
        BinaryOp::Add => match (&lhs, &rhs) {
            (Value::Float(a), Value::Float(b)) => Ok(Value::Float(a + b)),
            (Value::String(_), _) | (_, Value::String(_)) => {
                Ok(Value::String(format!("{lhs}{rhs}")))
            }
            _ => Err(mismatch(&lhs, &rhs)),
        },
        BinaryOp::Subtract
        | BinaryOp::Multiply
        | BinaryOp::Divide
        | BinaryOp::Remainder
        | BinaryOp::Power => {
            let (Value::Float(a), Value::Float(b)) = (&lhs, &rhs) else {
                return Err(mismatch(&lhs, &rhs));
            };
            Ok(Value::Float(match op {
                BinaryOp::Subtract => a - b,
                BinaryOp::Multiply => a * b,
                BinaryOp::Divide => a / b,
                BinaryOp::Remainder => a % b,
                _ => a.powf(*b),
            }))
        }
        BinaryOp::GreaterThan
        | BinaryOp::GreaterThanOrEqual
        | BinaryOp::LessThan
        | BinaryOp::LessThanOrEqual => {
            let ordering = match (&lhs, &rhs) {
                (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
                (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
                (Value::Time(a), Value::Time(b)) => Some(a.cmp(b)),
                _ => return Err(mismatch(&lhs, &rhs)),
            };
            Ok(Value::Bool(ordering.is_some_and(|ordering| match op {
                BinaryOp::GreaterThan => ordering == Ordering::Greater,
                BinaryOp::GreaterThanOrEqual => ordering != Ordering::Less,
                BinaryOp::LessThan => ordering == Ordering::Less,
                _ => ordering != Ordering::Greater,
            })))
        }
        BinaryOp::And | BinaryOp::Or | BinaryOp::Coalesce => Err(mismatch(&lhs, &rhs)),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::expression::parser::Parser;

    fn eval_with(source: &str, bindings: &Bindings<'_>) -> Result<Value, EvalError> {
        let node = Parser::parse(source).unwrap();
        evaluate(&node, bindings)?.into_value()
    }

    fn eval(source: &str) -> Result<Value, EvalError> {
        eval_with(source, &Bindings::new())
    }

    #[test]
    fn arithmetic() {
        assert_eq!(eval("1 + 2 * 3"), Ok(Value::Float(7.0)));
        assert_eq!(eval("(1 + 2) * 3"), Ok(Value::Float(9.0)));
        assert_eq!(eval("7 % 4"), Ok(Value::Float(3.0)));
        assert_eq!(eval("2 ** 3 ** 2"), Ok(Value::Float(512.0)));
        assert_eq!(eval("-2 + 5"), Ok(Value::Float(3.0)));
        assert_eq!(eval("1 / 0"), Ok(Value::Float(f64::INFINITY)));
    }

    #[test]
    fn string_concatenation() {
        assert_eq!(eval("'a' + 'b'"), Ok(Value::from("ab")));
        assert_eq!(eval("'n=' + 2.5"), Ok(Value::from("n=2.5")));
        assert_eq!(eval("3 + 'x'"), Ok(Value::from("3x")));
    }

    #[test]
    fn comparisons_and_logic() {
        assert_eq!(eval("1 < 2 && 'b' > 'a'"), Ok(Value::Bool(true)));
        assert_eq!(eval("1 == 1.0"), Ok(Value::Bool(true)));
        assert_eq!(eval("1 == '1'"), Ok(Value::Bool(false)));
        assert_eq!(eval("!(2 >= 3) || x"), Ok(Value::Bool(true)));
        assert_eq!(eval("false && x"), Ok(Value::Bool(false)));
    }

    #[test]
    fn null_handling() {
        let mut bindings = Bindings::new();
        bindings.insert("null".into(), Operand::Value(Value::Null));
        bindings.insert("x".into(), Operand::Value(Value::Float(2.0)));
        assert_eq!(eval_with("null == null", &bindings), Ok(Value::Bool(true)));
        assert_eq!(eval_with("x == null", &bindings), Ok(Value::Bool(false)));
        assert_eq!(eval_with("null ?? x", &bindings), Ok(Value::Float(2.0)));
        assert_eq!(
            eval_with("null + 1", &bindings),
            Err(EvalError::BinaryOperand {
                op: "+",
                lhs: "null",
                rhs: "number"
            })
        );
    }

    #[test]
    fn ternary() {
        assert_eq!(eval("2 > 1 ? 'big' : 'small'"), Ok(Value::from("big")));
        assert_eq!(
            eval("1 ? 2 : 3"),
            Err(EvalError::TernaryCondition("number"))
        );
    }

    #[test]
    fn regex_matching() {
        assert_eq!(eval("'abc' =~ '^a'"), Ok(Value::Bool(true)));
        assert_eq!(eval("'abc' !~ '^a'"), Ok(Value::Bool(false)));
        assert_eq!(eval("'abc' =~ ('^' + 'b')"), Ok(Value::Bool(false)));
        assert!(matches!(
            eval("'abc' =~ ('(' + '')"),
            Err(EvalError::InvalidRegex { .. })
        ));
        assert!(matches!(
            eval("1 =~ 'a'"),
            Err(EvalError::BinaryOperand { op: "=~", .. })
        ));
    }

    #[test]
    fn times_compare() {
        let mut bindings = Bindings::new();
        let early = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap();
        bindings.insert("a".into(), Operand::Value(Value::Time(early)));
        bindings.insert("b".into(), Operand::Value(Value::Time(late)));
        assert_eq!(eval_with("a < b", &bindings), Ok(Value::Bool(true)));
        assert!(eval_with("a < 1", &bindings).is_err());
    }

    #[test]
    fn unknown_parameters_fail_at_evaluation() {
        assert_eq!(
            eval("missing + 1"),
            Err(EvalError::UnknownParameter("missing".into()))
        );
    }

    #[test]
    fn type_errors() {
        assert!(matches!(
            eval("-'a'"),
            Err(EvalError::UnaryOperand { op: "-", .. })
        ));
        assert!(matches!(
            eval("'a' && true"),
            Err(EvalError::UnaryOperand { op: "&&", .. })
        ));
        assert!(matches!(
            eval("true && 1"),
            Err(EvalError::BinaryOperand { op: "&&", .. })
        ));
        assert!(matches!(
            eval("'a' < 1"),
            Err(EvalError::BinaryOperand { op: "<", .. })
        ));
    }
}
