//! String functions.
//!
//! A missing argument is an error. An argument that is present but not a
//! string yields the function's fallback (`""` or `false`) instead.

use super::{require, Function, FunctionRegistry};
use crate::{
    expression::{binding::Operand, error::EvalError},
    value::Value,
};

#[derive(Debug, Clone, Copy)]
enum StringOp {
    Trim,
    ToLower,
    ToUpper,
    StartsWith,
    EndsWith,
    Contains,
    Replace,
    ReplaceAll,
}

impl StringOp {
    fn arity(self) -> usize {
        match self {
            StringOp::Trim | StringOp::ToLower | StringOp::ToUpper => 1,
            StringOp::StartsWith | StringOp::EndsWith | StringOp::Contains => 2,
            StringOp::Replace | StringOp::ReplaceAll => 3,
        }
    }

    fn fallback(self) -> Value {
        match self {
            StringOp::StartsWith | StringOp::EndsWith | StringOp::Contains => Value::Bool(false),
            _ => Value::String(String::new()),
        }
    }

    fn apply(self, args: &[&str]) -> Value {
        match self {
            StringOp::Trim => Value::from(args[0].trim()),
            StringOp::ToLower => Value::from(args[0].to_lowercase()),
            StringOp::ToUpper => Value::from(args[0].to_uppercase()),
            StringOp::StartsWith => Value::Bool(args[0].starts_with(args[1])),
            StringOp::EndsWith => Value::Bool(args[0].ends_with(args[1])),
            StringOp::Contains => Value::Bool(args[0].contains(args[1])),
            StringOp::Replace => Value::from(args[0].replacen(args[1], args[2], 1)),
            StringOp::ReplaceAll => Value::from(args[0].replace(args[1], args[2])),
        }
    }
}

#[derive(Debug)]
struct StringFunction {
    name: &'static str,
    op: StringOp,
}

impl Function for StringFunction {
    fn name(&self) -> &'static str {
        self.name
    }

    fn call(&self, args: &[Operand<'_>]) -> Result<Value, EvalError> {
        let arity = self.op.arity();
        require(self.name, args, arity)?;
        let strings: Option<Vec<&str>> = args[..arity]
            .iter()
            .map(|arg| arg.as_value().and_then(Value::as_str))
            .collect();
        Ok(match strings {
            Some(strings) => self.op.apply(&strings),
            None => self.op.fallback(),
        })
    }
}

pub(super) fn register(registry: &mut FunctionRegistry) {
    for (name, op) in [
        ("trim", StringOp::Trim),
        ("tolower", StringOp::ToLower),
        ("toupper", StringOp::ToUpper),
        ("startswith", StringOp::StartsWith),
        ("endswith", StringOp::EndsWith),
        ("contains", StringOp::Contains),
        ("replace", StringOp::Replace),
        ("replace_all", StringOp::ReplaceAll),
    ] {
        registry.register(Box::new(StringFunction { name, op }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(name: &'static str, op: StringOp, args: Vec<Value>) -> Result<Value, EvalError> {
        let args: Vec<Operand<'_>> = args.into_iter().map(Operand::from).collect();
        StringFunction { name, op }.call(&args)
    }

    #[test]
    fn case_and_whitespace() {
        assert_eq!(
            call("trim", StringOp::Trim, vec!["  ford  ".into()]),
            Ok(Value::from("ford"))
        );
        assert_eq!(
            call("tolower", StringOp::ToLower, vec!["FoRd".into()]),
            Ok(Value::from("ford"))
        );
        assert_eq!(
            call("toupper", StringOp::ToUpper, vec!["FoRd".into()]),
            Ok(Value::from("FORD"))
        );
    }

    #[test]
    fn predicates() {
        let args = |a: &str, b: &str| vec![Value::from(a), Value::from(b)];
        assert_eq!(
            call("startswith", StringOp::StartsWith, args("chevrolet", "chev")),
            Ok(Value::Bool(true))
        );
        assert_eq!(
            call("endswith", StringOp::EndsWith, args("chevrolet", "chev")),
            Ok(Value::Bool(false))
        );
        assert_eq!(
            call("contains", StringOp::Contains, args("chevrolet", "vro")),
            Ok(Value::Bool(true))
        );
    }

    #[test]
    fn replace_first_and_all() {
        let args = vec![Value::from("a-b-c"), Value::from("-"), Value::from("+")];
        assert_eq!(
            call("replace", StringOp::Replace, args.clone()),
            Ok(Value::from("a+b-c"))
        );
        assert_eq!(
            call("replace_all", StringOp::ReplaceAll, args),
            Ok(Value::from("a+b+c"))
        );
    }

    #[test]
    fn missing_arguments_are_errors() {
        assert_eq!(
            call("contains", StringOp::Contains, vec!["abc".into()]),
            Err(EvalError::ArgumentCount {
                function: "contains",
                expected: 2,
                got: 1
            })
        );
        assert!(call("trim", StringOp::Trim, vec![]).is_err());
    }

    #[test]
    fn non_string_arguments_fall_back() {
        assert_eq!(
            call("trim", StringOp::Trim, vec![Value::Float(1.0)]),
            Ok(Value::from(""))
        );
        assert_eq!(
            call("contains", StringOp::Contains, vec!["abc".into(), Value::Null]),
            Ok(Value::Bool(false))
        );
        assert_eq!(
            call(
                "replace",
                StringOp::Replace,
                vec!["abc".into(), "b".into(), Value::Bool(true)]
            ),
            Ok(Value::from(""))
        );
    }
}
