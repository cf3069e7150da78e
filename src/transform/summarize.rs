use std::sync::Arc;

use arrow::array::{BooleanArray, Float64Array, StringArray};

use crate::{
    error::TransformError,
    expression::{Expression, FrameBinder, Operand},
    frame::{Field, Frame},
    observability::log_debug,
    option::TransformOptions,
    value::Value,
};

/// Reduce `frame` to a one-row frame holding the value of `expression`,
/// evaluated once with every field bound as a whole column.
///
/// The output field is named `alias`, or the configured summary field name
/// when `alias` is blank. A blank expression returns `frame` unchanged.
pub fn summarize(
    frame: &Frame,
    expression: &str,
    alias: &str,
    options: &TransformOptions,
) -> Result<Frame, TransformError> {
    if expression.trim().is_empty() {
        return Ok(frame.clone());
    }
    let compiled =
        Expression::compile(expression).map_err(|err| TransformError::parse(expression, err))?;
    let binder = FrameBinder::new(frame);
    let result = compiled
        .evaluate(&binder.frame())
        .map_err(|source| TransformError::Evaluation { row: None, source })?;

    let name = if alias.trim().is_empty() {
        options.summary_field.as_str()
    } else {
        alias
    };
    let field = summary_field(name, result)?;
    log_debug!(
        component = "summarize",
        event = "summarize_applied",
        field = %field.name,
        data_type = %field.data_type()
    );
    Ok(Frame {
        name: frame.name.clone(),
        fields: vec![field],
        metadata: frame.metadata.clone(),
    })
}

/// One-slot field holding `result`. Only numbers, strings and bools are
/// accepted; a null result is stored as a null number.
fn summary_field(name: &str, result: Operand<'_>) -> Result<Field, TransformError> {
    let value = match result {
        Operand::Value(value) => value,
        other => {
            return Err(TransformError::SummaryType {
                found: other.type_name(),
            })
        }
    };
    let field = match value {
        Value::Float(v) => Field::new(name, Arc::new(Float64Array::from(vec![v]))),
        Value::Null => Field::new_float64(name, vec![None]),
        Value::String(v) => Field::new(name, Arc::new(StringArray::from(vec![v]))),
        Value::Bool(v) => Field::new(name, Arc::new(BooleanArray::from(vec![v]))),
        other @ (Value::Time(_) | Value::Opaque(_)) => {
            return Err(TransformError::SummaryType {
                found: other.type_name(),
            })
        }
    };
    Ok(field)
}
