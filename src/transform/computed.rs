use super::{check_recognized, ComputedColumn};
use crate::{
    error::TransformError,
    expression::{Expression, FrameBinder, Operand},
    frame::{build_field, Field, Frame},
    observability::{log_debug, log_warn},
    option::TransformOptions,
    value::Value,
};

/// Append one field per column definition, evaluated row by row.
///
/// Definitions with a blank selector are skipped. A selector that fails to
/// compile stops the call; columns appended by earlier definitions stay. A
/// row that fails to evaluate gets a null in the new column.
pub fn computed_columns(
    frame: &mut Frame,
    columns: &[ComputedColumn],
    options: &TransformOptions,
) -> Result<(), TransformError> {
    for column in columns {
        let selector = column.selector.trim();
        if selector.is_empty() {
            continue;
        }
        let expression =
            Expression::compile(selector).map_err(|err| TransformError::parse(selector, err))?;
        let name = if column.alias.trim().is_empty() {
            column.selector.clone()
        } else {
            column.alias.clone()
        };

        let rows = frame.row_count();
        let field = {
            let binder = FrameBinder::new(frame);
            check_recognized(&binder, options)?;
            let values: Vec<Value> = (0..rows)
                .map(|row| {
                    expression
                        .evaluate(&binder.row(row))
                        .and_then(Operand::into_value)
                        .unwrap_or_else(|err| {
                            log_debug!(
                                component = "computed_columns",
                                event = "row_evaluation_failed",
                                field = %name,
                                row,
                                error = %err
                            );
                            Value::Null
                        })
                })
                .collect();
            build_field(values, name.as_str())
        };

        append_field(frame, field, options)?;
    }
    Ok(())
}

/// Push `field` onto `frame` if it has one slot per row.
///
/// Fields built by [`computed_columns`] always do; a short or long field is
/// an error in strict mode and is dropped with a warning otherwise.
fn append_field(
    frame: &mut Frame,
    field: Field,
    options: &TransformOptions,
) -> Result<(), TransformError> {
    let (rows, actual) = (frame.row_count(), field.len());
    if actual != rows {
        if options.is_strict() {
            return Err(TransformError::LengthMismatch {
                field: field.name,
                expected: rows,
                actual,
            });
        }
        log_warn!(
            component = "computed_columns",
            event = "computed_column_dropped",
            field = %field.name,
            expected = rows,
            actual
        );
        return Ok(());
    }
    frame.fields.push(field);
    Ok(())
}
