use std::{collections::BTreeMap, sync::Arc};

use arrow::{
    array::{
        new_null_array, Array, ArrayRef, AsArray, BooleanArray, Float64Array, StringArray,
        TimestampNanosecondArray,
    },
    datatypes::{DataType, Float64Type, TimeUnit},
};
use chrono::{DateTime, Utc};

use crate::value::{time_at, to_canonical, Value};

/// Field labels, carried through transformations but never compared.
pub type Labels = BTreeMap<String, String>;

/// The storage types a field produced by this crate can have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// Nullable UTF-8 text.
    String,
    /// Nullable 64-bit float.
    Float64,
    /// Nullable boolean.
    Bool,
    /// Nullable UTC timestamp.
    Time,
}

impl FieldType {
    /// Classify an Arrow type. Only the four storage types are recognized;
    /// narrower numeric widths are readable but are not storage types.
    pub fn of(data_type: &DataType) -> Option<Self> {
        match data_type {
            DataType::Utf8 | DataType::LargeUtf8 => Some(FieldType::String),
            DataType::Float64 => Some(FieldType::Float64),
            DataType::Boolean => Some(FieldType::Bool),
            DataType::Timestamp(_, _) => Some(FieldType::Time),
            _ => None,
        }
    }

    /// Arrow type used when materializing a column of this type.
    pub fn data_type(&self) -> DataType {
        match self {
            FieldType::String => DataType::Utf8,
            FieldType::Float64 => DataType::Float64,
            FieldType::Bool => DataType::Boolean,
            FieldType::Time => DataType::Timestamp(TimeUnit::Nanosecond, None),
        }
    }
}

/// A storage slot with a value in it. Null slots are `None` at the call site.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// A float slot.
    Float64(f64),
    /// A text slot.
    String(String),
    /// A boolean slot.
    Bool(bool),
    /// A timestamp slot.
    Time(DateTime<Utc>),
    /// A value of a type outside the storage model, kept as-is.
    Unrecognized(ArrayRef),
}

impl Cell {
    /// Storage type this cell belongs in; `None` for unrecognized cells.
    pub fn field_type(&self) -> Option<FieldType> {
        match self {
            Cell::Float64(_) => Some(FieldType::Float64),
            Cell::String(_) => Some(FieldType::String),
            Cell::Bool(_) => Some(FieldType::Bool),
            Cell::Time(_) => Some(FieldType::Time),
            Cell::Unrecognized(_) => None,
        }
    }
}

/// A named, nullable, typed column.
#[derive(Debug, Clone)]
pub struct Field {
    /// Field name; need not be a valid identifier.
    pub name: String,
    /// Free-form labels.
    pub labels: Labels,
    values: ArrayRef,
}

impl Field {
    /// Wrap an Arrow array. The array may be of any type.
    pub fn new(name: impl Into<String>, values: ArrayRef) -> Self {
        Self {
            name: name.into(),
            labels: Labels::new(),
            values,
        }
    }

    /// A column of `len` null slots.
    pub fn new_null(name: impl Into<String>, field_type: FieldType, len: usize) -> Self {
        Self::new(name, new_null_array(&field_type.data_type(), len))
    }

    /// A float column.
    pub fn new_float64(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self::new(name, Arc::new(Float64Array::from(values)))
    }

    /// A text column.
    pub fn new_string<S: AsRef<str>>(name: impl Into<String>, values: Vec<Option<S>>) -> Self {
        let array: StringArray = values.iter().map(Option::as_ref).collect();
        Self::new(name, Arc::new(array))
    }

    /// A boolean column.
    pub fn new_bool(name: impl Into<String>, values: Vec<Option<bool>>) -> Self {
        Self::new(name, Arc::new(BooleanArray::from(values)))
    }

    /// A nanosecond timestamp column. Instants outside the nanosecond range
    /// are stored as null.
    pub fn new_time(name: impl Into<String>, values: Vec<Option<DateTime<Utc>>>) -> Self {
        let array: TimestampNanosecondArray = values
            .into_iter()
            .map(|v| v.and_then(|t| t.timestamp_nanos_opt()))
            .collect();
        Self::new(name, Arc::new(array))
    }

    /// Replace the labels.
    pub fn with_labels(mut self, labels: Labels) -> Self {
        self.labels = labels;
        self
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the field has no slots.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The underlying Arrow array.
    pub fn values(&self) -> &ArrayRef {
        &self.values
    }

    /// Arrow type of the underlying array.
    pub fn data_type(&self) -> &DataType {
        self.values.data_type()
    }

    /// Storage type, if the column is one of the four modeled types.
    pub fn field_type(&self) -> Option<FieldType> {
        FieldType::of(self.data_type())
    }

    /// Whether slot `row` is null. Slots past the end count as null.
    pub fn is_null(&self, row: usize) -> bool {
        row >= self.len() || self.values.is_null(row)
    }

    /// Canonical value of slot `row`, see [`to_canonical`].
    pub fn value(&self, row: usize) -> Value {
        to_canonical(self.values.as_ref(), row)
    }

    /// Slot `row` exactly as stored; `None` for a null or out-of-range slot.
    pub fn cell(&self, row: usize) -> Option<Cell> {
        if row >= self.len() || self.values.is_null(row) {
            return None;
        }
        let array = self.values.as_ref();
        let cell = match array.data_type() {
            DataType::Float64 => Cell::Float64(array.as_primitive::<Float64Type>().value(row)),
            DataType::Utf8 => Cell::String(array.as_string::<i32>().value(row).to_string()),
            DataType::LargeUtf8 => Cell::String(array.as_string::<i64>().value(row).to_string()),
            DataType::Boolean => Cell::Bool(array.as_boolean().value(row)),
            DataType::Timestamp(unit, _) => match time_at(array, row, unit) {
                Some(time) => Cell::Time(time),
                None => Cell::Unrecognized(self.values.slice(row, 1)),
            },
            _ => Cell::Unrecognized(self.values.slice(row, 1)),
        };
        Some(cell)
    }

    pub(crate) fn replace_values(&mut self, values: ArrayRef) {
        self.values = values;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_type_classification() {
        assert_eq!(FieldType::of(&DataType::Utf8), Some(FieldType::String));
        assert_eq!(
            FieldType::of(&DataType::Timestamp(TimeUnit::Millisecond, Some("UTC".into()))),
            Some(FieldType::Time)
        );
        assert_eq!(FieldType::of(&DataType::Int32), None);
        assert_eq!(FieldType::of(&DataType::Binary), None);
    }

    #[test]
    fn null_field_has_requested_shape() {
        let field = Field::new_null("empty", FieldType::Bool, 3);
        assert_eq!(field.len(), 3);
        assert_eq!(field.field_type(), Some(FieldType::Bool));
        assert!((0..3).all(|row| field.is_null(row)));
    }

    #[test]
    fn value_reads_canonical_form() {
        let field = Field::new_string("city", vec![Some("Oslo"), None]);
        assert_eq!(field.value(0), Value::String("Oslo".into()));
        assert_eq!(field.value(1), Value::String(String::new()));
    }

    #[test]
    fn cell_reads_storage_verbatim() {
        let field = Field::new_float64("mass", vec![Some(2.5), None]);
        assert_eq!(field.cell(0), Some(Cell::Float64(2.5)));
        assert_eq!(field.cell(1), None);
        assert_eq!(field.cell(2), None);
        assert!(!field.is_null(0));
        assert!(field.is_null(1));
        assert!(field.is_null(2));

        let ints = Field::new("ints", Arc::new(arrow::array::Int32Array::from(vec![7])));
        assert!(matches!(ints.cell(0), Some(Cell::Unrecognized(slot)) if slot.len() == 1));
    }
}
