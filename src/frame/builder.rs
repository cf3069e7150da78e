//! Materializes evaluated values back into typed columns.

use std::sync::Arc;

use arrow::array::{
    ArrayRef, BooleanBuilder, Float64Builder, StringBuilder, TimestampNanosecondBuilder,
};

use super::{Cell, Field, FieldType};
use crate::{
    observability::log_debug,
    value::{to_storage, Value},
};

/// Pick the column type for `values`.
///
/// The first value of a storage-compatible type decides. Nulls and opaque
/// values are skipped; if nothing decides, the column is a string column.
pub fn infer_field_type(values: &[Value]) -> FieldType {
    values
        .iter()
        .find_map(|value| match value {
            Value::Float(_) => Some(FieldType::Float64),
            Value::String(_) => Some(FieldType::String),
            Value::Bool(_) => Some(FieldType::Bool),
            Value::Time(_) => Some(FieldType::Time),
            Value::Null | Value::Opaque(_) => None,
        })
        .unwrap_or(FieldType::String)
}

/// A column of the inferred type with one null slot per value.
pub fn build_empty_field(values: &[Value], name: impl Into<String>) -> Field {
    Field::new_null(name, infer_field_type(values), values.len())
}

/// A column of the inferred type holding `values`.
///
/// Nulls stay null. A value whose type disagrees with the inferred column
/// type cannot be stored and leaves its slot null.
pub fn build_field(values: Vec<Value>, name: impl Into<String>) -> Field {
    let name = name.into();
    let field_type = infer_field_type(&values);
    let len = values.len();
    let mut mismatched = 0usize;
    let cells = values.into_iter().map(to_storage);

    let array: ArrayRef = match field_type {
        FieldType::Float64 => {
            let mut builder = Float64Builder::with_capacity(len);
            for cell in cells {
                match cell {
                    Some(Cell::Float64(v)) => builder.append_value(v),
                    other => {
                        mismatched += usize::from(other.is_some());
                        builder.append_null();
                    }
                }
            }
            Arc::new(builder.finish())
        }
        FieldType::String => {
            let mut builder = StringBuilder::with_capacity(len, len * 8);
            for cell in cells {
                match cell {
                    Some(Cell::String(v)) => builder.append_value(v),
                    other => {
                        mismatched += usize::from(other.is_some());
                        builder.append_null();
                    }
                }
            }
            Arc::new(builder.finish())
        }
        FieldType::Bool => {
            let mut builder = BooleanBuilder::with_capacity(len);
            for cell in cells {
                match cell {
                    Some(Cell::Bool(v)) => builder.append_value(v),
                    other => {
                        mismatched += usize::from(other.is_some());
                        builder.append_null();
                    }
                }
            }
            Arc::new(builder.finish())
        }
        FieldType::Time => {
            let mut builder = TimestampNanosecondBuilder::with_capacity(len);
            for cell in cells {
                match cell {
                    Some(Cell::Time(v)) => builder.append_option(v.timestamp_nanos_opt()),
                    other => {
                        mismatched += usize::from(other.is_some());
                        builder.append_null();
                    }
                }
            }
            Arc::new(builder.finish())
        }
    };

    if mismatched > 0 {
        log_debug!(
            component = "field_builder",
            event = "mismatched_values_nulled",
            field = %name,
            field_type = ?field_type,
            mismatched
        );
    }
    Field::new(name, array)
}

#[cfg(test)]
mod tests {
    use arrow::array::{Array, AsArray};
    use chrono::{TimeZone, Utc};

    use super::*;

    #[test]
    fn first_recognized_value_decides() {
        assert_eq!(
            infer_field_type(&[Value::Null, Value::Float(1.0), Value::from("x")]),
            FieldType::Float64
        );
        assert_eq!(
            infer_field_type(&[Value::Null, Value::Bool(true)]),
            FieldType::Bool
        );
        let when = Utc.with_ymd_and_hms(2021, 6, 1, 0, 0, 0).unwrap();
        assert_eq!(infer_field_type(&[Value::Time(when)]), FieldType::Time);
    }

    #[test]
    fn undecided_defaults_to_string() {
        assert_eq!(infer_field_type(&[]), FieldType::String);
        assert_eq!(
            infer_field_type(&[Value::Null, Value::Null]),
            FieldType::String
        );
        let opaque = Value::Opaque(Arc::new(arrow::array::BinaryArray::from_iter_values([
            b"x",
        ])));
        assert_eq!(infer_field_type(&[opaque, Value::Null]), FieldType::String);
    }

    #[test]
    fn empty_field_is_all_null() {
        let field = build_empty_field(&[Value::Null, Value::Float(2.0)], "x");
        assert_eq!(field.field_type(), Some(FieldType::Float64));
        assert_eq!(field.len(), 2);
        assert_eq!(field.values().null_count(), 2);
    }

    #[test]
    fn zero_values_build_zero_length_string_column() {
        let field = build_field(Vec::new(), "nothing");
        assert_eq!(field.len(), 0);
        assert_eq!(field.field_type(), Some(FieldType::String));
    }

    #[test]
    fn nulls_are_preserved() {
        let field = build_field(
            vec![Value::Float(3.3), Value::Null, Value::Float(6.5)],
            "power",
        );
        assert_eq!(field.name, "power");
        let values = field.values().as_primitive::<arrow::datatypes::Float64Type>();
        assert_eq!(values.value(0), 3.3);
        assert!(values.is_null(1));
        assert_eq!(values.value(2), 6.5);
    }

    #[test]
    fn mismatched_values_leave_null_slots() {
        let field = build_field(vec![Value::from("a"), Value::Float(1.0)], "mixed");
        let values = field.values().as_string::<i32>();
        assert_eq!(values.value(0), "a");
        assert!(values.is_null(1));
    }
}
