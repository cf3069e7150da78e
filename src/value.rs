//! Canonical values and the coercion layer between Arrow storage and
//! expression evaluation.
//!
//! Every numeric storage width folds into [`Value::Float`] on the way in, so
//! the evaluator only ever sees five shapes of data. Columns of a type the
//! engine does not model are carried through untouched as [`Value::Opaque`].

use std::fmt;

use arrow::{
    array::{Array, ArrayRef, AsArray},
    datatypes::{
        DataType, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type, Int8Type, TimeUnit,
        TimestampMicrosecondType, TimestampMillisecondType, TimestampNanosecondType,
        TimestampSecondType, UInt16Type, UInt32Type, UInt64Type, UInt8Type,
    },
};
use chrono::{DateTime, Utc};

use crate::frame::Cell;

/// A cell as seen by the expression evaluator.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absence of a value.
    Null,
    /// Any number, widened to `f64`.
    Float(f64),
    /// UTF-8 text.
    String(String),
    /// Boolean.
    Bool(bool),
    /// Instant in UTC.
    Time(DateTime<Utc>),
    /// One-slot slice of a column whose Arrow type has no canonical form.
    Opaque(ArrayRef),
}

impl Value {
    /// Whether this is [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The number, if this is a [`Value::Float`].
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// The text, if this is a [`Value::String`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v),
            _ => None,
        }
    }

    /// The flag, if this is a [`Value::Bool`].
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// The instant, if this is a [`Value::Time`].
    pub fn as_time(&self) -> Option<&DateTime<Utc>> {
        match self {
            Value::Time(v) => Some(v),
            _ => None,
        }
    }

    /// Short type name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Float(_) => "number",
            Value::String(_) => "string",
            Value::Bool(_) => "bool",
            Value::Time(_) => "time",
            Value::Opaque(_) => "opaque",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "<nil>"),
            Value::Float(v) => write!(f, "{v}"),
            Value::String(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Time(v) => write!(f, "{}", v.to_rfc3339()),
            Value::Opaque(array) => write!(f, "<{}>", array.data_type()),
        }
    }
}

macro_rules! impl_from_number {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::Float(value as f64)
                }
            }
        )+
    };
}

impl_from_number!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::Time(value)
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

macro_rules! widen {
    ($array:expr, $row:expr, $arrow_ty:ty) => {{
        let array = $array.as_primitive::<$arrow_ty>();
        if array.is_null($row) {
            Value::Float(0.0)
        } else {
            Value::Float(array.value($row) as f64)
        }
    }};
}

/// Read slot `row` of `array` as a canonical value.
///
/// Null slots read as the zero value of their column type (`0`, `""`,
/// `false`, Unix epoch), never as [`Value::Null`]. Unsupported column types
/// are passed through as [`Value::Opaque`]. A row past the end of the array
/// reads as [`Value::Null`].
pub fn to_canonical(array: &dyn Array, row: usize) -> Value {
    if row >= array.len() {
        return Value::Null;
    }
    match array.data_type() {
        DataType::Int8 => widen!(array, row, Int8Type),
        DataType::Int16 => widen!(array, row, Int16Type),
        DataType::Int32 => widen!(array, row, Int32Type),
        DataType::Int64 => widen!(array, row, Int64Type),
        DataType::UInt8 => widen!(array, row, UInt8Type),
        DataType::UInt16 => widen!(array, row, UInt16Type),
        DataType::UInt32 => widen!(array, row, UInt32Type),
        DataType::UInt64 => widen!(array, row, UInt64Type),
        DataType::Float32 => widen!(array, row, Float32Type),
        DataType::Float64 => widen!(array, row, Float64Type),
        DataType::Utf8 => {
            let array = array.as_string::<i32>();
            if array.is_null(row) {
                Value::String(String::new())
            } else {
                Value::String(array.value(row).to_string())
            }
        }
        DataType::LargeUtf8 => {
            let array = array.as_string::<i64>();
            if array.is_null(row) {
                Value::String(String::new())
            } else {
                Value::String(array.value(row).to_string())
            }
        }
        DataType::Boolean => {
            let array = array.as_boolean();
            Value::Bool(!array.is_null(row) && array.value(row))
        }
        DataType::Timestamp(unit, _) => {
            let time = if array.is_null(row) {
                None
            } else {
                time_at(array, row, unit)
            };
            Value::Time(time.unwrap_or(DateTime::<Utc>::UNIX_EPOCH))
        }
        _ => Value::Opaque(array.slice(row, 1)),
    }
}

/// Whether columns of this type canonicalize to [`Value::Float`].
pub fn is_numeric_type(data_type: &DataType) -> bool {
    matches!(
        data_type,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Whether [`to_canonical`] has a canonical form for columns of this type.
pub fn is_canonical_type(data_type: &DataType) -> bool {
    is_numeric_type(data_type)
        || matches!(
            data_type,
            DataType::Utf8 | DataType::LargeUtf8 | DataType::Boolean | DataType::Timestamp(_, _)
        )
}

/// Read a timestamp slot of any unit as UTC.
pub(crate) fn time_at(array: &dyn Array, row: usize, unit: &TimeUnit) -> Option<DateTime<Utc>> {
    let naive = match unit {
        TimeUnit::Second => array
            .as_primitive::<TimestampSecondType>()
            .value_as_datetime(row),
        TimeUnit::Millisecond => array
            .as_primitive::<TimestampMillisecondType>()
            .value_as_datetime(row),
        TimeUnit::Microsecond => array
            .as_primitive::<TimestampMicrosecondType>()
            .value_as_datetime(row),
        TimeUnit::Nanosecond => array
            .as_primitive::<TimestampNanosecondType>()
            .value_as_datetime(row),
    };
    naive.map(|naive| naive.and_utc())
}

/// Convert an evaluated value into its storage form.
///
/// `None` is a null slot. Opaque values come back as
/// [`Cell::Unrecognized`] unchanged.
pub fn to_storage(value: Value) -> Option<Cell> {
    match value {
        Value::Null => None,
        Value::Float(v) => Some(Cell::Float64(v)),
        Value::String(v) => Some(Cell::String(v)),
        Value::Bool(v) => Some(Cell::Bool(v)),
        Value::Time(v) => Some(Cell::Time(v)),
        Value::Opaque(array) => Some(Cell::Unrecognized(array)),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arrow::array::{
        BinaryArray, BooleanArray, Float32Array, Int16Array, Int64Array, StringArray,
        TimestampMillisecondArray, TimestampNanosecondArray, UInt8Array,
    };
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn numeric_widths_fold_to_float() {
        let ints = Int16Array::from(vec![Some(-3), None]);
        assert_eq!(to_canonical(&ints, 0), Value::Float(-3.0));
        assert_eq!(to_canonical(&ints, 1), Value::Float(0.0));

        let bytes = UInt8Array::from(vec![200u8]);
        assert_eq!(to_canonical(&bytes, 0), Value::Float(200.0));

        let halves = Float32Array::from(vec![0.5f32]);
        assert_eq!(to_canonical(&halves, 0), Value::Float(0.5));

        let big = Int64Array::from(vec![1i64 << 40]);
        assert_eq!(to_canonical(&big, 0), Value::Float((1i64 << 40) as f64));
    }

    #[test]
    fn null_slots_read_as_zero_values() {
        let strings = StringArray::from(vec![None::<&str>]);
        assert_eq!(to_canonical(&strings, 0), Value::String(String::new()));

        let bools = BooleanArray::from(vec![None]);
        assert_eq!(to_canonical(&bools, 0), Value::Bool(false));

        let times = TimestampNanosecondArray::from(vec![None]);
        assert_eq!(
            to_canonical(&times, 0),
            Value::Time(DateTime::<Utc>::UNIX_EPOCH)
        );
    }

    #[test]
    fn timestamps_of_any_unit_read_as_utc() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let millis = TimestampMillisecondArray::from(vec![expected.timestamp_millis()]);
        assert_eq!(to_canonical(&millis, 0), Value::Time(expected));
    }

    #[test]
    fn unrecognized_types_pass_through() {
        let binary = BinaryArray::from_iter_values([b"ab", b"cd"]);
        let value = to_canonical(&binary, 1);
        let Value::Opaque(slot) = &value else {
            panic!("expected opaque value, got {value:?}");
        };
        assert_eq!(slot.len(), 1);
        assert_eq!(slot.data_type(), &DataType::Binary);

        let cell = to_storage(value.clone());
        assert_eq!(cell, Some(Cell::Unrecognized(slot.clone())));
    }

    #[test]
    fn storage_round_trip_preserves_values() {
        let when = Utc.with_ymd_and_hms(2020, 1, 2, 3, 4, 5).unwrap();
        let floats: ArrayRef = Arc::new(Int64Array::from(vec![42i64]));
        let strings: ArrayRef = Arc::new(StringArray::from(vec!["hi"]));
        let bools: ArrayRef = Arc::new(BooleanArray::from(vec![true]));
        let times: ArrayRef = Arc::new(TimestampNanosecondArray::from(vec![when
            .timestamp_nanos_opt()
            .unwrap()]));

        assert_eq!(
            to_storage(to_canonical(floats.as_ref(), 0)),
            Some(Cell::Float64(42.0))
        );
        assert_eq!(
            to_storage(to_canonical(strings.as_ref(), 0)),
            Some(Cell::String("hi".into()))
        );
        assert_eq!(
            to_storage(to_canonical(bools.as_ref(), 0)),
            Some(Cell::Bool(true))
        );
        assert_eq!(
            to_storage(to_canonical(times.as_ref(), 0)),
            Some(Cell::Time(when))
        );
        assert_eq!(to_storage(Value::Null), None);
    }

    #[test]
    fn plain_scalars_canonicalize() {
        assert_eq!(Value::from(7u32), Value::Float(7.0));
        assert_eq!(Value::from(-1i8), Value::Float(-1.0));
        assert_eq!(Value::from(None::<f64>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::String("x".into()));
    }
}
