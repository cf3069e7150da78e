use arrow::{array::BooleanArray, compute};

use super::check_recognized;
use crate::{
    error::{SchemaError, TransformError},
    expression::{Expression, FrameBinder, Operand},
    frame::Frame,
    observability::log_debug,
    option::TransformOptions,
    value::Value,
};

/// Keep the rows of `frame` for which `predicate` evaluates to `true`.
///
/// The predicate must evaluate to a bool on every row. The first row that
/// errors or yields anything else aborts the whole call, and `frame` is left
/// as it was. Kept rows are copied from storage verbatim, in order.
pub fn filter(
    frame: &Frame,
    predicate: &str,
    options: &TransformOptions,
) -> Result<Frame, TransformError> {
    if let Some(name) = frame.duplicate_field_name() {
        return Err(SchemaError::DuplicateFieldName(name.to_string()).into());
    }
    let expression =
        Expression::compile(predicate).map_err(|err| TransformError::parse(predicate, err))?;
    let binder = FrameBinder::new(frame);
    check_recognized(&binder, options)?;

    let rows = frame.row_count();
    let mut keep = Vec::with_capacity(rows);
    for row in 0..rows {
        match expression.evaluate(&binder.row(row)) {
            Ok(Operand::Value(Value::Bool(accepted))) => keep.push(accepted),
            Ok(other) => {
                log_debug!(
                    component = "filter",
                    event = "filter_aborted",
                    row,
                    found = other.type_name()
                );
                return Err(TransformError::PredicateType {
                    row,
                    found: other.type_name(),
                });
            }
            Err(source) => {
                log_debug!(
                    component = "filter",
                    event = "filter_aborted",
                    row,
                    error = %source
                );
                return Err(TransformError::Evaluation {
                    row: Some(row),
                    source,
                });
            }
        }
    }

    let mask = BooleanArray::from(keep);
    let mut filtered = Frame {
        name: frame.name.clone(),
        fields: Vec::with_capacity(frame.fields.len()),
        metadata: frame.metadata.clone(),
    };
    for field in &frame.fields {
        let mut kept = field.clone();
        kept.replace_values(compute::filter(field.values().as_ref(), &mask)?);
        filtered.fields.push(kept);
    }
    log_debug!(
        component = "filter",
        event = "filter_applied",
        rows_in = rows,
        rows_out = mask.true_count()
    );
    Ok(filtered)
}
