//! The expression language used by filter, computed-column and summarize
//! transformations.
//!
//! An [`Expression`] is compiled once per transformation call and then
//! evaluated any number of times against fresh [`Bindings`].

mod ast;
pub mod binding;
pub mod error;
mod eval;
pub mod functions;
mod lexer;
mod parser;

pub use binding::{slugify, Bindings, FrameBinder, Operand};
pub use error::{EvalError, ParseError};

/// A compiled expression.
#[derive(Debug)]
pub struct Expression {
    source: String,
    root: ast::Node,
}

impl Expression {
    /// Compile `source`. Function names and literal regex patterns are
    /// resolved here; variable names are not.
    pub fn compile(source: &str) -> Result<Self, ParseError> {
        let root = parser::Parser::parse(source)?;
        Ok(Self {
            source: source.to_string(),
            root,
        })
    }

    /// The text this expression was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Evaluate against `bindings`.
    pub fn evaluate<'a>(&self, bindings: &Bindings<'a>) -> Result<Operand<'a>, EvalError> {
        eval::evaluate(&self.root, bindings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        frame::{Field, Frame},
        value::Value,
    };

    #[test]
    fn compile_rejects_unknown_functions() {
        assert_eq!(
            Expression::compile("nosuch(1)").unwrap_err(),
            ParseError::UnknownFunction("nosuch".into())
        );
        assert_eq!(Expression::compile("   ").unwrap_err(), ParseError::Empty);
    }

    #[test]
    fn compiled_once_evaluated_per_row() {
        let frame = Frame::new("cars").with_field(Field::new_float64(
            "Horsepower",
            vec![Some(90.0), Some(150.0), None],
        ));
        let binder = FrameBinder::new(&frame);
        let expression = Expression::compile("[Horsepower] > 100").unwrap();
        assert_eq!(expression.source(), "[Horsepower] > 100");

        let results: Vec<Value> = (0..frame.row_count())
            .map(|row| {
                expression
                    .evaluate(&binder.row(row))
                    .and_then(Operand::into_value)
                    .unwrap()
            })
            .collect();
        assert_eq!(
            results,
            vec![Value::Bool(false), Value::Bool(true), Value::Bool(false)]
        );
    }

    #[test]
    fn aggregates_in_frame_scope() {
        let frame = Frame::new("mass").with_field(Field::new_float64(
            "Mass",
            vec![Some(1.0), None, Some(3.0), Some(4.0), Some(5.0)],
        ));
        let binder = FrameBinder::new(&frame);
        let expression = Expression::compile("sum(Mass) + count(mass)").unwrap();
        assert_eq!(
            expression
                .evaluate(&binder.frame())
                .and_then(Operand::into_value),
            Ok(Value::Float(18.0))
        );

        let in_row = expression.evaluate(&binder.row(0));
        assert!(matches!(in_row, Err(EvalError::NotAField { .. })));
    }
}
