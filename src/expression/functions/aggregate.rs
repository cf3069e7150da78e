//! Whole-field aggregates: count, first, last, sum, mean, min, max.
//!
//! These take a field, so they only make sense in whole-frame scope; given a
//! scalar they fail with [`EvalError::NotAField`].

use arrow::{
    array::{Array, AsArray, Float64Array},
    compute::{cast, max, min, sum},
    datatypes::{DataType, Float64Type},
};

use super::{require, Function, FunctionRegistry};
use crate::{
    expression::{binding::Operand, error::EvalError},
    frame::Field,
    value::{is_numeric_type, Value},
};

fn field_arg<'a>(function: &'static str, args: &[Operand<'a>]) -> Result<&'a Field, EvalError> {
    require(function, args, 1)?;
    match &args[0] {
        Operand::Field(field) => Ok(*field),
        other => Err(EvalError::NotAField {
            function,
            found: other.type_name(),
        }),
    }
}

/// The field's values widened to `f64`; non-numeric fields are rejected.
fn numbers(function: &'static str, field: &Field) -> Result<Float64Array, EvalError> {
    let field_type_error = || EvalError::FieldType {
        function,
        found: field.data_type().to_string(),
    };
    if !is_numeric_type(field.data_type()) {
        return Err(field_type_error());
    }
    let widened =
        cast(field.values().as_ref(), &DataType::Float64).map_err(|_| field_type_error())?;
    Ok(widened.as_primitive::<Float64Type>().clone())
}

#[derive(Debug)]
struct Count;

impl Function for Count {
    fn name(&self) -> &'static str {
        "count"
    }

    fn call(&self, args: &[Operand<'_>]) -> Result<Value, EvalError> {
        let field = field_arg(self.name(), args)?;
        Ok(Value::from(field.len()))
    }
}

#[derive(Debug)]
struct First;

impl Function for First {
    fn name(&self) -> &'static str {
        "first"
    }

    fn call(&self, args: &[Operand<'_>]) -> Result<Value, EvalError> {
        let values = numbers(self.name(), field_arg(self.name(), args)?)?;
        if values.is_empty() {
            return Err(EvalError::NoData {
                function: self.name(),
            });
        }
        Ok(Value::from(values.is_valid(0).then(|| values.value(0))))
    }
}

#[derive(Debug)]
struct Last;

impl Function for Last {
    fn name(&self) -> &'static str {
        "last"
    }

    fn call(&self, args: &[Operand<'_>]) -> Result<Value, EvalError> {
        let values = numbers(self.name(), field_arg(self.name(), args)?)?;
        let Some(last) = values.len().checked_sub(1) else {
            return Err(EvalError::NoData {
                function: self.name(),
            });
        };
        Ok(Value::from(values.is_valid(last).then(|| values.value(last))))
    }
}

#[derive(Debug)]
struct Sum;

impl Function for Sum {
    fn name(&self) -> &'static str {
        "sum"
    }

    fn call(&self, args: &[Operand<'_>]) -> Result<Value, EvalError> {
        let values = numbers(self.name(), field_arg(self.name(), args)?)?;
        // Null slots contribute nothing, i.e. count as 0.
        Ok(Value::Float(sum(&values).unwrap_or(0.0)))
    }
}

#[derive(Debug)]
struct Mean;

impl Function for Mean {
    fn name(&self) -> &'static str {
        "mean"
    }

    fn call(&self, args: &[Operand<'_>]) -> Result<Value, EvalError> {
        let values = numbers(self.name(), field_arg(self.name(), args)?)?;
        if values.is_empty() {
            return Ok(Value::Float(0.0));
        }
        // Null slots count as 0 in the numerator and still count as rows.
        let total = sum(&values).unwrap_or(0.0);
        Ok(Value::Float(total / values.len() as f64))
    }
}

#[derive(Debug)]
struct Min;

impl Function for Min {
    fn name(&self) -> &'static str {
        "min"
    }

    fn call(&self, args: &[Operand<'_>]) -> Result<Value, EvalError> {
        let values = numbers(self.name(), field_arg(self.name(), args)?)?;
        min(&values).map(Value::Float).ok_or(EvalError::NoData {
            function: self.name(),
        })
    }
}

#[derive(Debug)]
struct Max;

impl Function for Max {
    fn name(&self) -> &'static str {
        "max"
    }

    fn call(&self, args: &[Operand<'_>]) -> Result<Value, EvalError> {
        let values = numbers(self.name(), field_arg(self.name(), args)?)?;
        max(&values).map(Value::Float).ok_or(EvalError::NoData {
            function: self.name(),
        })
    }
}

pub(super) fn register(registry: &mut FunctionRegistry) {
    registry.register(Box::new(Count));
    registry.register(Box::new(First));
    registry.register(Box::new(Last));
    registry.register(Box::new(Sum));
    registry.register(Box::new(Mean));
    registry.register(Box::new(Min));
    registry.register(Box::new(Max));
}
