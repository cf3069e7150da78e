//! Columnar frames: a named list of equal-length typed fields.
//!
//! Fields hold Arrow arrays, so a frame converts to and from a
//! [`RecordBatch`] without copying column data.

mod builder;
mod field;

use std::{collections::HashSet, sync::Arc};

use arrow::{
    datatypes::{Field as ArrowField, Schema as ArrowSchema},
    error::ArrowError,
    record_batch::{RecordBatch, RecordBatchOptions},
};
pub use builder::{build_empty_field, build_field, infer_field_type};
pub use field::{Cell, Field, FieldType, Labels};

/// Provenance attached to a frame. Transformations copy it and never read it.
pub type Metadata = std::collections::BTreeMap<String, String>;

/// A named list of fields that share one row count.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    /// Frame name, kept through every transformation.
    pub name: String,
    /// Columns in order. Names should be unique.
    pub fields: Vec<Field>,
    /// Free-form provenance.
    pub metadata: Metadata,
}

impl Frame {
    /// An empty frame called `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            metadata: Metadata::new(),
        }
    }

    /// Append `field`.
    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Replace the metadata.
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Number of rows, taken from the first field.
    pub fn row_count(&self) -> usize {
        self.fields.first().map_or(0, Field::len)
    }

    /// First field named `name`.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// First field name that appears more than once, if any.
    pub fn duplicate_field_name(&self) -> Option<&str> {
        let mut seen = HashSet::with_capacity(self.fields.len());
        self.fields
            .iter()
            .map(|field| field.name.as_str())
            .find(|name| !seen.insert(*name))
    }

    /// Keep at most the first `len` rows of every field.
    pub fn truncate(&mut self, len: usize) {
        for field in &mut self.fields {
            if field.len() > len {
                let kept = field.values().slice(0, len);
                field.replace_values(kept);
            }
        }
    }

    /// View the frame as an Arrow record batch. Labels become field metadata
    /// and frame metadata becomes schema metadata.
    pub fn to_record_batch(&self) -> Result<RecordBatch, ArrowError> {
        let schema_fields: Vec<ArrowField> = self
            .fields
            .iter()
            .map(|field| {
                ArrowField::new(&field.name, field.data_type().clone(), true)
                    .with_metadata(field.labels.clone().into_iter().collect())
            })
            .collect();
        let schema = ArrowSchema::new_with_metadata(
            schema_fields,
            self.metadata.clone().into_iter().collect(),
        );
        let columns = self.fields.iter().map(|f| f.values().clone()).collect();
        let options = RecordBatchOptions::new().with_row_count(Some(self.row_count()));
        RecordBatch::try_new_with_options(Arc::new(schema), columns, &options)
    }

    /// Build a frame from an Arrow record batch.
    pub fn from_record_batch(name: impl Into<String>, batch: &RecordBatch) -> Self {
        let schema = batch.schema();
        let fields = schema
            .fields()
            .iter()
            .zip(batch.columns())
            .map(|(arrow_field, column)| {
                Field::new(arrow_field.name().clone(), column.clone())
                    .with_labels(arrow_field.metadata().clone().into_iter().collect())
            })
            .collect();
        Self {
            name: name.into(),
            fields,
            metadata: schema.metadata().clone().into_iter().collect(),
        }
    }
}
