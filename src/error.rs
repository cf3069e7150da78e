use arrow::{datatypes::DataType, error::ArrowError};
use thiserror::Error;

use crate::expression::{EvalError, ParseError};

/// Frames do not have the shape an operator requires.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SchemaError {
    /// Two fields of one frame share a name.
    #[error("duplicate field name '{0}' in frame")]
    DuplicateFieldName(String),
    /// Merge was given an empty batch.
    #[error("no frames to merge")]
    NoFrames,
    /// A frame has a different number of fields than the first one.
    #[error("frame {frame} has {actual} fields, expected {expected}")]
    FieldCountMismatch {
        /// Index of the offending frame in the batch.
        frame: usize,
        /// Field count of the first frame.
        expected: usize,
        /// Field count of the offending frame.
        actual: usize,
    },
    /// Fields at the same position have different names.
    #[error("frame {frame} field {index} is named '{actual}', expected '{expected}'")]
    FieldNameMismatch {
        /// Index of the offending frame in the batch.
        frame: usize,
        /// Position of the field.
        index: usize,
        /// Name in the first frame.
        expected: String,
        /// Name in the offending frame.
        actual: String,
    },
    /// Fields with the same name have different storage types.
    #[error("frame {frame} field '{field}' has type {actual:?}, expected {expected:?}")]
    FieldTypeMismatch {
        /// Index of the offending frame in the batch.
        frame: usize,
        /// Name of the field.
        field: String,
        /// Arrow type in the first frame.
        expected: DataType,
        /// Arrow type in the offending frame.
        actual: DataType,
    },
}

/// Coarse classification of a [`TransformError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The expression text did not compile.
    Parse,
    /// The frames had the wrong shape.
    Schema,
    /// An expression failed while being evaluated.
    Evaluation,
    /// An expression evaluated to a value of the wrong type.
    Type,
}

/// A transformation failed.
#[derive(Debug, Error)]
pub enum TransformError {
    /// An expression did not compile.
    #[error("failed to compile expression '{expression}': {source}")]
    Parse {
        /// The expression text as given.
        expression: String,
        /// Why compilation failed.
        #[source]
        source: ParseError,
    },
    /// The frames had the wrong shape.
    #[error(transparent)]
    Schema(#[from] SchemaError),
    /// An expression failed at runtime.
    #[error("evaluation failed{}: {source}", at_row(.row))]
    Evaluation {
        /// Row being evaluated, `None` for whole-frame evaluation.
        row: Option<usize>,
        /// Why evaluation failed.
        #[source]
        source: EvalError,
    },
    /// A filter predicate produced something other than a bool.
    #[error("filter expression must evaluate to a bool, got {found} at row {row}")]
    PredicateType {
        /// Row being evaluated.
        row: usize,
        /// Type name of the result.
        found: &'static str,
    },
    /// A summary produced a value that cannot be stored.
    #[error("summary expression produced an unsupported {found}")]
    SummaryType {
        /// Type name of the result.
        found: &'static str,
    },
    /// A computed field does not have one slot per row (strict mode only).
    #[error("computed field '{field}' has {actual} rows, frame has {expected}")]
    LengthMismatch {
        /// Name of the computed field.
        field: String,
        /// Row count of the frame.
        expected: usize,
        /// Length of the computed field.
        actual: usize,
    },
    /// A field's Arrow type has no canonical form (strict mode only).
    #[error("field '{field}' has unrecognized type {data_type:?}")]
    UnrecognizedType {
        /// Name of the field.
        field: String,
        /// Its Arrow type.
        data_type: DataType,
    },
    /// An Arrow kernel failed.
    #[error("arrow error: {0}")]
    Arrow(#[from] ArrowError),
}

fn at_row(row: &Option<usize>) -> String {
    row.map(|row| format!(" at row {row}")).unwrap_or_default()
}

impl TransformError {
    pub(crate) fn parse(expression: &str, source: ParseError) -> Self {
        TransformError::Parse {
            expression: expression.to_string(),
            source,
        }
    }

    /// Coarse classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            TransformError::Parse { .. } => ErrorKind::Parse,
            TransformError::Schema(_) | TransformError::Arrow(_) => ErrorKind::Schema,
            TransformError::Evaluation { .. } => ErrorKind::Evaluation,
            TransformError::PredicateType { .. }
            | TransformError::SummaryType { .. }
            | TransformError::LengthMismatch { .. }
            | TransformError::UnrecognizedType { .. } => ErrorKind::Type,
        }
    }
}
