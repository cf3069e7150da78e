use arrow::{
    array::{Array, ArrayRef},
    compute::{cast, concat},
};

use crate::{
    error::{SchemaError, TransformError},
    frame::Frame,
    observability::log_debug,
};

/// Append the rows of every later frame to the first one.
///
/// All frames must have the same field names and types in the same order;
/// labels are not compared. Types match when they map to the same storage
/// type (`Utf8` and `LargeUtf8` are both strings) or are the same Arrow
/// type. The result keeps the first frame's name, metadata, labels and
/// column types. On a mismatch nothing is merged.
pub fn merge(frames: &[Frame]) -> Result<Frame, TransformError> {
    let Some((first, rest)) = frames.split_first() else {
        return Err(SchemaError::NoFrames.into());
    };
    for (offset, frame) in rest.iter().enumerate() {
        check_schema(first, frame, offset + 1)?;
    }

    let mut merged = first.clone();
    for (index, field) in merged.fields.iter_mut().enumerate() {
        let target = field.data_type().clone();
        let columns = frames
            .iter()
            .map(|frame| {
                let values = frame.fields[index].values();
                if values.data_type() == &target {
                    Ok(values.clone())
                } else {
                    cast(values, &target)
                }
            })
            .collect::<Result<Vec<ArrayRef>, _>>()?;
        let columns: Vec<&dyn Array> = columns.iter().map(|array| array.as_ref()).collect();
        field.replace_values(concat(&columns)?);
    }
    log_debug!(
        component = "merge",
        event = "merge_completed",
        frames = frames.len(),
        rows_out = merged.row_count()
    );
    Ok(merged)
}

fn check_schema(first: &Frame, other: &Frame, frame: usize) -> Result<(), SchemaError> {
    if first.fields.len() != other.fields.len() {
        return Err(SchemaError::FieldCountMismatch {
            frame,
            expected: first.fields.len(),
            actual: other.fields.len(),
        });
    }
    for (index, (expected, actual)) in first.fields.iter().zip(&other.fields).enumerate() {
        if expected.name != actual.name {
            return Err(SchemaError::FieldNameMismatch {
                frame,
                index,
                expected: expected.name.clone(),
                actual: actual.name.clone(),
            });
        }
        let same_type = match (expected.field_type(), actual.field_type()) {
            (Some(expected), Some(actual)) => expected == actual,
            _ => expected.data_type() == actual.data_type(),
        };
        if !same_type {
            return Err(SchemaError::FieldTypeMismatch {
                frame,
                field: expected.name.clone(),
                expected: expected.data_type().clone(),
                actual: actual.data_type().clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arrow::{array::LargeStringArray, datatypes::DataType};

    use super::*;
    use crate::{
        error::ErrorKind,
        frame::{Field, Labels},
        value::Value,
    };

    fn readings(name: &str, temps: Vec<Option<f64>>, unit: &str) -> Frame {
        let rows = temps.len();
        Frame::new(name)
            .with_field(
                Field::new_float64("temp", temps)
                    .with_labels(Labels::from([("unit".to_string(), unit.to_string())])),
            )
            .with_field(Field::new_string("site", vec![Some(name); rows]))
    }

    #[test]
    fn appends_rows_in_order() {
        let frames = vec![
            readings("north", vec![Some(1.0), None], "C"),
            readings("south", vec![Some(3.0)], "F"),
        ];
        let merged = merge(&frames).unwrap();

        assert_eq!(merged.name, "north");
        assert_eq!(merged.row_count(), 3);
        let temp = merged.field("temp").unwrap();
        assert!(temp.is_null(1));
        assert_eq!(temp.value(2), Value::Float(3.0));
        assert_eq!(temp.labels.get("unit").map(String::as_str), Some("C"));
        assert_eq!(merged.field("site").unwrap().value(2), Value::from("south"));
    }

    #[test]
    fn single_frame_is_returned_as_is() {
        let frames = vec![readings("north", vec![Some(1.0)], "C")];
        assert_eq!(merge(&frames).unwrap().row_count(), 1);
    }

    #[test]
    fn no_frames_is_an_error() {
        let err = merge(&[]).unwrap_err();
        assert!(matches!(err, TransformError::Schema(SchemaError::NoFrames)));
    }

    #[test]
    fn schema_mismatches_are_rejected() {
        let base = readings("north", vec![Some(1.0)], "C");

        let fewer = Frame::new("x").with_field(Field::new_float64("temp", vec![Some(2.0)]));
        let err = merge(&[base.clone(), fewer]).unwrap_err();
        assert!(matches!(
            err,
            TransformError::Schema(SchemaError::FieldCountMismatch {
                frame: 1,
                expected: 2,
                actual: 1
            })
        ));
        assert_eq!(err.kind(), ErrorKind::Schema);

        let reordered = Frame::new("x")
            .with_field(Field::new_string("site", vec![Some("x")]))
            .with_field(Field::new_float64("temp", vec![Some(2.0)]));
        let err = merge(&[base.clone(), base.clone(), reordered]).unwrap_err();
        assert!(matches!(
            err,
            TransformError::Schema(SchemaError::FieldNameMismatch {
                frame: 2,
                index: 0,
                ..
            })
        ));

        let retyped = Frame::new("x")
            .with_field(Field::new_string("temp", vec![Some("warm")]))
            .with_field(Field::new_string("site", vec![Some("x")]));
        let err = merge(&[base, retyped]).unwrap_err();
        assert!(matches!(
            err,
            TransformError::Schema(SchemaError::FieldTypeMismatch {
                expected: DataType::Float64,
                actual: DataType::Utf8,
                ..
            })
        ));
    }

    #[test]
    fn string_widths_merge_as_one_storage_type() {
        let narrow = Frame::new("a").with_field(Field::new_string("s", vec![Some("x")]));
        let wide = Frame::new("b").with_field(Field::new(
            "s",
            Arc::new(LargeStringArray::from(vec![Some("y"), None])),
        ));

        let merged = merge(&[narrow, wide]).unwrap();
        let s = merged.field("s").unwrap();
        assert_eq!(s.len(), 3);
        assert_eq!(s.value(1), Value::from("y"));
        assert!(s.is_null(2));
    }
}
